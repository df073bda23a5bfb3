//! Orchestration of whole-genome comparisons.
//!
//! Variants are admitted per chromosome ([`provider`]), each chromosome is
//! reconciled on the worker pool ([`pool`], [`reconcile`]) and the per-variant
//! outcomes are gathered into a report ([`duo`], [`trio`]) with statistics
//! ([`stats`]). A chromosome whose search fails is reported as incomplete and
//! never affects the others.

pub mod duo;
pub mod mendelian;
pub mod pool;
pub mod provider;
pub mod reconcile;
pub mod stats;
pub mod trio;

use serde::Serialize;

/// Whether a chromosome's search ran to the end
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ChromosomeStatus {
    Complete,
    /// The search gave up; all its variants are reported as not assessed
    Incomplete(String),
}

impl ChromosomeStatus {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for ChromosomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Incomplete(_) => write!(f, "incomplete"),
        }
    }
}
