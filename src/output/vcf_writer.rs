//! Annotated VCF output.
//!
//! Each record keeps the site columns of its input call and adds one sample
//! column per compared call set. The FORMAT keys are:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `GT` | Genotype as read from the input |
//! | `BD` | Benchmarking decision: `TP`, `FN`, `FP` or `N` |
//! | `BK` | Match sub-type: `gm` genotype match, `am` allele match, `nm` no match |
//! | `MD` | Mendelian decision of a trio call |
//!
//! A sample without a call at a record gets `.` for every key.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::analysis::duo::DuoReport;
use crate::analysis::trio::TrioReport;
use crate::core::record::{LabelledVariant, RecordShape};
use crate::core::reference::Reference;
use crate::core::types::{MatchStatus, Side};
use crate::output::OutputError;
use crate::utils::validation::output_path;

pub const TRUTH_SAMPLE: &str = "TRUTH";
pub const QUERY_SAMPLE: &str = "QUERY";

/// Per-sample FORMAT key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKey {
    Genotype,
    Decision,
    MatchKind,
    Mendelian,
}

impl FormatKey {
    fn id(self) -> &'static str {
        match self {
            Self::Genotype => "GT",
            Self::Decision => "BD",
            Self::MatchKind => "BK",
            Self::Mendelian => "MD",
        }
    }

    fn header_line(self) -> String {
        let description = match self {
            Self::Genotype => "Genotype",
            Self::Decision => "Decision for call (TP/FP/FN/N)",
            Self::MatchKind => "Sub-type for decision (gm genotype match, am allele match, nm no match)",
            Self::Mendelian => {
                "Mendelian decision (compliant, violation, nocall_parent, nocall_child, skipped)"
            }
        };
        format!(
            "##FORMAT=<ID={},Number=1,Type=String,Description=\"{description}\">",
            self.id()
        )
    }

    fn value(self, call: &LabelledVariant, side: Side) -> String {
        match self {
            Self::Genotype => call.variant.genotype.to_string(),
            Self::Decision => call.status.decision_code(side).to_string(),
            Self::MatchKind => call.status.match_code().to_string(),
            Self::Mendelian => call.mendelian.unwrap_or_default().code().to_string(),
        }
    }
}

pub const DUO_FORMAT: &[FormatKey] = &[FormatKey::Genotype, FormatKey::Decision, FormatKey::MatchKind];
pub const TRIO_FORMAT: &[FormatKey] = &[FormatKey::Genotype, FormatKey::Decision, FormatKey::Mendelian];

/// One sample column: its name and the side its decisions are read from
#[derive(Debug, Clone)]
pub struct SampleColumn {
    pub name: String,
    pub side: Side,
}

impl SampleColumn {
    #[must_use]
    pub fn new(name: impl Into<String>, side: Side) -> Self {
        Self {
            name: name.into(),
            side,
        }
    }
}

/// Everything the header needs besides the records
#[derive(Debug, Clone, Copy)]
pub struct HeaderTemplate<'a> {
    pub reference: &'a Reference,
    /// Raw `##FILTER` lines collected from the inputs
    pub filters: &'a [String],
}

pub struct VcfWriter<W: Write> {
    inner: W,
    columns: Vec<SampleColumn>,
    format: &'static [FormatKey],
    records: usize,
}

impl<W: Write> VcfWriter<W> {
    /// Write the header and return a writer ready for records.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `inner` fails.
    pub fn new(
        mut inner: W,
        template: HeaderTemplate<'_>,
        columns: Vec<SampleColumn>,
        format: &'static [FormatKey],
    ) -> std::io::Result<Self> {
        write_header(&mut inner, template, &columns, format)?;
        Ok(Self {
            inner,
            columns,
            format,
            records: 0,
        })
    }

    /// Write one record; the shape must have one call slot per sample column.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_record(&mut self, record: &RecordShape<'_>) -> std::io::Result<()> {
        let Some(site) = record.representative() else {
            return Ok(());
        };
        let variant = &site.variant;
        let quality = variant
            .quality
            .map_or_else(|| ".".to_string(), |q| q.to_string());

        write!(
            self.inner,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t.\t{}",
            variant.chrom,
            variant.position + 1,
            variant.record_id,
            variant.ref_seq(),
            variant.alt_text(),
            quality,
            variant.filter_text(),
            format_column(self.format),
        )?;

        for (call, column) in record.samples().into_iter().zip(&self.columns) {
            let fields: Vec<String> = match call {
                Some(call) => self.format.iter().map(|key| key.value(call, column.side)).collect(),
                None => vec![".".to_string(); self.format.len()],
            };
            write!(self.inner, "\t{}", fields.join(":"))?;
        }
        writeln!(self.inner)?;
        self.records += 1;
        Ok(())
    }

    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

fn format_column(format: &[FormatKey]) -> String {
    format.iter().map(|k| k.id()).collect::<Vec<_>>().join(":")
}

fn write_header<W: Write>(
    out: &mut W,
    template: HeaderTemplate<'_>,
    columns: &[SampleColumn],
    format: &[FormatKey],
) -> std::io::Result<()> {
    writeln!(out, "##fileformat=VCFv4.2")?;
    writeln!(out, "##fileDate={}", chrono::Local::now().format("%Y%m%d"))?;
    writeln!(out, "##source=varsync {}", env!("CARGO_PKG_VERSION"))?;

    let mut filter_ids: Vec<&str> = Vec::new();
    for line in template.filters {
        let id = filter_id(line);
        if !filter_ids.contains(&id) {
            filter_ids.push(id);
            writeln!(out, "{line}")?;
        }
    }
    if !filter_ids.contains(&"PASS") {
        writeln!(out, "##FILTER=<ID=PASS,Description=\"All filters passed\">")?;
    }

    for key in format {
        writeln!(out, "{}", key.header_line())?;
    }
    for contig in template.reference.contigs() {
        writeln!(out, "##contig=<ID={},length={}>", contig.name, contig.length())?;
    }

    write!(out, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT")?;
    for column in columns {
        write!(out, "\t{}", column.name)?;
    }
    writeln!(out)
}

/// `ID` value of a raw `##FILTER=<ID=...,...>` line
fn filter_id(line: &str) -> &str {
    line.split_once("ID=")
        .map(|(_, rest)| rest.split([',', '>']).next().unwrap_or(rest))
        .unwrap_or(line)
}

fn create(path: &Path) -> Result<BufWriter<File>, OutputError> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write the merged TRUTH/QUERY VCF of a duo comparison.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_duo_merged(
    prefix: &Path,
    report: &DuoReport,
    template: HeaderTemplate<'_>,
) -> Result<PathBuf, OutputError> {
    let path = output_path(prefix, ".vcf");
    let columns = vec![
        SampleColumn::new(TRUTH_SAMPLE, Side::Base),
        SampleColumn::new(QUERY_SAMPLE, Side::Called),
    ];
    let mut writer = VcfWriter::new(create(&path)?, template, columns, DUO_FORMAT)?;

    for chromosome in &report.chromosomes {
        for record in RecordShape::pair_duo(&chromosome.base, &chromosome.called) {
            writer.write_record(&record)?;
        }
    }

    info!(path = %path.display(), records = writer.records(), "Wrote annotated VCF");
    writer.finish()?;
    Ok(path)
}

/// Which calls go into one split-mode file
struct SplitTarget {
    suffix: &'static str,
    side: Side,
    keep: fn(MatchStatus) -> bool,
}

const SPLIT_TARGETS: [SplitTarget; 4] = [
    SplitTarget {
        suffix: "_TP_base.vcf",
        side: Side::Base,
        keep: MatchStatus::is_match,
    },
    SplitTarget {
        suffix: "_TP_called.vcf",
        side: Side::Called,
        keep: MatchStatus::is_match,
    },
    SplitTarget {
        suffix: "_FN.vcf",
        side: Side::Base,
        keep: is_no_match,
    },
    SplitTarget {
        suffix: "_FP.vcf",
        side: Side::Called,
        keep: is_no_match,
    },
];

fn is_no_match(status: MatchStatus) -> bool {
    status == MatchStatus::NoMatch
}

/// Write one VCF per decision class of a duo comparison.
///
/// # Errors
///
/// Returns an error if any file cannot be written.
pub fn write_duo_split(
    prefix: &Path,
    report: &DuoReport,
    template: HeaderTemplate<'_>,
) -> Result<Vec<PathBuf>, OutputError> {
    let mut paths = Vec::with_capacity(SPLIT_TARGETS.len());

    for target in &SPLIT_TARGETS {
        let path = output_path(prefix, target.suffix);
        let name = match target.side {
            Side::Base => TRUTH_SAMPLE,
            Side::Called => QUERY_SAMPLE,
        };
        let columns = vec![SampleColumn::new(name, target.side)];
        let mut writer = VcfWriter::new(create(&path)?, template, columns, DUO_FORMAT)?;

        for chromosome in &report.chromosomes {
            let calls = match target.side {
                Side::Base => &chromosome.base,
                Side::Called => &chromosome.called,
            };
            for call in calls.iter().filter(|c| (target.keep)(c.status)) {
                writer.write_record(&RecordShape::Single(call))?;
            }
        }

        info!(path = %path.display(), records = writer.records(), "Wrote split VCF");
        writer.finish()?;
        paths.push(path);
    }

    Ok(paths)
}

/// Write the MOTHER/FATHER/CHILD VCF of a trio comparison.
///
/// Parents are compared as the base side, the child as the called side.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_trio(
    prefix: &Path,
    report: &TrioReport,
    template: HeaderTemplate<'_>,
) -> Result<PathBuf, OutputError> {
    let path = output_path(prefix, "_trio.vcf");
    let columns = vec![
        SampleColumn::new("MOTHER", Side::Base),
        SampleColumn::new("FATHER", Side::Base),
        SampleColumn::new("CHILD", Side::Called),
    ];
    let mut writer = VcfWriter::new(create(&path)?, template, columns, TRIO_FORMAT)?;

    for chromosome in &report.chromosomes {
        let records =
            RecordShape::group_trio(&chromosome.mother, &chromosome.father, &chromosome.child);
        for record in records {
            writer.write_record(&record)?;
        }
    }

    info!(path = %path.display(), records = writer.records(), "Wrote trio VCF");
    writer.finish()?;
    Ok(path)
}
