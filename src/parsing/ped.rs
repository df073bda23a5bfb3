//! PED pedigree files.
//!
//! Each non-comment line holds at least five whitespace-separated columns:
//! family id, individual id, father id, mother id and sex (`1` male, `2`
//! female). A parent id of `0` means unknown.

use std::io::BufRead;
use std::path::Path;

use crate::core::config::ConfigError;
use crate::parsing::{open_text, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    fn parse(code: &str) -> Self {
        match code {
            "1" => Self::Male,
            "2" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PedEntry {
    pub family: String,
    pub individual: String,
    pub father: Option<String>,
    pub mother: Option<String>,
    pub sex: Sex,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pedigree {
    entries: Vec<PedEntry>,
}

impl Pedigree {
    /// Parse PED text
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MalformedRecord` for lines with fewer than five columns.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut entries = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 5 {
                return Err(ParseError::MalformedRecord {
                    line: index + 1,
                    reason: format!("expected at least 5 columns, found {}", fields.len()),
                });
            }

            let parent = |id: &str| (id != "0" && id != ".").then(|| id.to_string());
            entries.push(PedEntry {
                family: fields[0].to_string(),
                individual: fields[1].to_string(),
                father: parent(fields[2]),
                mother: parent(fields[3]),
                sex: Sex::parse(fields[4]),
            });
        }
        Ok(Self { entries })
    }

    /// Load a PED file
    ///
    /// # Errors
    ///
    /// See [`Pedigree::from_reader`].
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        Self::from_reader(open_text(path)?)
    }

    #[must_use]
    pub fn entries(&self) -> &[PedEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, individual: &str) -> Option<&PedEntry> {
        self.entries.iter().find(|e| e.individual == individual)
    }

    /// Confirm that `child` is declared with `father` and `mother` as parents
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPedigree`] if the child is missing, its
    /// parents differ, or a parent is declared with the opposite sex.
    pub fn validate_trio(&self, mother: &str, father: &str, child: &str) -> Result<(), ConfigError> {
        let entry = self
            .get(child)
            .ok_or_else(|| ConfigError::InvalidPedigree(format!("child '{child}' not listed")))?;

        if entry.father.as_deref() != Some(father) || entry.mother.as_deref() != Some(mother) {
            return Err(ConfigError::InvalidPedigree(format!(
                "'{child}' has parents {} and {}, expected {father} and {mother}",
                entry.father.as_deref().unwrap_or("0"),
                entry.mother.as_deref().unwrap_or("0"),
            )));
        }

        if self.get(father).is_some_and(|e| e.sex == Sex::Female) {
            return Err(ConfigError::InvalidPedigree(format!(
                "father '{father}' is declared female"
            )));
        }
        if self.get(mother).is_some_and(|e| e.sex == Sex::Male) {
            return Err(ConfigError::InvalidPedigree(format!(
                "mother '{mother}' is declared male"
            )));
        }
        Ok(())
    }
}
