//! Statistics rendering: a JSON file next to the VCF output, plus text and TSV
//! tables for the terminal.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::stats::{DecisionCounts, MendelianCounts, RunStats, TrioStats};
use crate::analysis::ChromosomeStatus;
use crate::matching::engine::SearchStats;
use crate::output::OutputError;
use crate::utils::validation::output_path;

/// Write `<prefix>_stats.json`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialization fails.
pub fn write_stats_json<T: Serialize>(prefix: &Path, stats: &T) -> Result<PathBuf, OutputError> {
    let path = output_path(prefix, "_stats.json");
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, stats)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(path)
}

fn rate(value: Option<f64>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| format!("{v:.4}"))
}

fn status_text(status: &ChromosomeStatus) -> String {
    match status {
        ChromosomeStatus::Complete => "complete".to_string(),
        ChromosomeStatus::Incomplete(reason) => format!("incomplete ({reason})"),
    }
}

/// Human-readable duo statistics.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_duo_text<W: Write>(out: &mut W, stats: &RunStats) -> std::io::Result<()> {
    writeln!(out, "Comparison Results")?;
    writeln!(out, "{}", "=".repeat(60))?;

    writeln!(
        out,
        "\n{:<12} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}  Status",
        "Chromosome", "TP-base", "TP-call", "FN", "FP", "N-base", "N-call"
    )?;
    for chromosome in &stats.chromosomes {
        write_counts_row(out, &chromosome.chromosome, &chromosome.counts)?;
        writeln!(out, "  {}", status_text(&chromosome.status))?;
    }
    write_counts_row(out, "Total", &stats.total)?;
    writeln!(out)?;

    writeln!(
        out,
        "\nAllele matches (base/called): {}/{}",
        stats.total.allele_match_base, stats.total.allele_match_called
    )?;
    writeln!(out, "Precision: {}", rate(stats.precision))?;
    writeln!(out, "Recall:    {}", rate(stats.recall))?;
    writeln!(out, "F1:        {}", rate(stats.f1))?;
    write_search_text(out, &stats.search)?;

    if stats.malformed_base + stats.malformed_called > 0 {
        writeln!(
            out,
            "Malformed records skipped (base/called): {}/{}",
            stats.malformed_base, stats.malformed_called
        )?;
    }
    let incomplete = stats.incomplete();
    if !incomplete.is_empty() {
        writeln!(out, "\nIncomplete chromosomes: {}", incomplete.join(", "))?;
    }
    Ok(())
}

fn write_counts_row<W: Write>(out: &mut W, name: &str, counts: &DecisionCounts) -> std::io::Result<()> {
    write!(
        out,
        "{:<12} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        name,
        counts.tp_base,
        counts.tp_called,
        counts.false_negative,
        counts.false_positive,
        counts.not_assessed_base,
        counts.not_assessed_called
    )
}

fn write_search_text<W: Write>(out: &mut W, search: &SearchStats) -> std::io::Result<()> {
    writeln!(out, "\nSearch:")?;
    writeln!(out, "  Iterations: {}", search.iterations)?;
    writeln!(out, "  Largest path set: {}", search.max_paths)?;
    writeln!(out, "  Complex regions: {}", search.complex_regions)?;
    writeln!(out, "  Skipped variants: {}", search.skipped_variants)?;
    writeln!(out, "  Pruned branches: {}", search.pruned_branches)
}

/// Duo statistics as TSV, one row per chromosome plus a `total` row.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_duo_tsv<W: Write>(out: &mut W, stats: &RunStats) -> std::io::Result<()> {
    writeln!(
        out,
        "chromosome\tstatus\ttp_base\ttp_called\tallele_match_base\tallele_match_called\tfalse_negative\tfalse_positive\tnot_assessed_base\tnot_assessed_called\tcomplex_regions\tskipped_variants"
    )?;
    for chromosome in &stats.chromosomes {
        write_duo_tsv_row(
            out,
            &chromosome.chromosome,
            &chromosome.status.to_string(),
            &chromosome.counts,
            &chromosome.search,
        )?;
    }
    let status = if stats.incomplete().is_empty() {
        "complete"
    } else {
        "incomplete"
    };
    write_duo_tsv_row(out, "total", status, &stats.total, &stats.search)
}

fn write_duo_tsv_row<W: Write>(
    out: &mut W,
    name: &str,
    status: &str,
    counts: &DecisionCounts,
    search: &SearchStats,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        name,
        status,
        counts.tp_base,
        counts.tp_called,
        counts.allele_match_base,
        counts.allele_match_called,
        counts.false_negative,
        counts.false_positive,
        counts.not_assessed_base,
        counts.not_assessed_called,
        search.complex_regions,
        search.skipped_variants
    )
}

/// Human-readable trio statistics.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_trio_text<W: Write>(out: &mut W, stats: &TrioStats) -> std::io::Result<()> {
    writeln!(out, "Trio Results")?;
    writeln!(out, "{}", "=".repeat(60))?;

    writeln!(
        out,
        "\n{:<8} {:>10} {:>10} {:>14} {:>13} {:>8}",
        "Member", "Compliant", "Violation", "NoCall-parent", "NoCall-child", "Skipped"
    )?;
    for (name, counts) in [
        ("Mother", &stats.mother),
        ("Father", &stats.father),
        ("Child", &stats.child),
    ] {
        writeln!(
            out,
            "{:<8} {:>10} {:>10} {:>14} {:>13} {:>8}",
            name,
            counts.compliant,
            counts.violation,
            counts.nocall_parent,
            counts.nocall_child,
            counts.skipped
        )?;
    }

    writeln!(out, "\nChild compliance: {}", rate(stats.child_compliance))?;
    write_search_text(out, &stats.search)?;

    let incomplete = stats.incomplete();
    if !incomplete.is_empty() {
        writeln!(out, "\nIncomplete chromosomes: {}", incomplete.join(", "))?;
    }
    Ok(())
}

/// Trio statistics as TSV, one row per chromosome and member.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_trio_tsv<W: Write>(out: &mut W, stats: &TrioStats) -> std::io::Result<()> {
    writeln!(
        out,
        "chromosome\tstatus\tmember\tcompliant\tviolation\tnocall_parent\tnocall_child\tskipped"
    )?;
    for chromosome in &stats.chromosomes {
        let status = chromosome.status.to_string();
        for (member, counts) in [
            ("mother", &chromosome.mother),
            ("father", &chromosome.father),
            ("child", &chromosome.child),
        ] {
            write_trio_tsv_row(out, &chromosome.chromosome, &status, member, counts)?;
        }
    }
    for (member, counts) in [
        ("mother", &stats.mother),
        ("father", &stats.father),
        ("child", &stats.child),
    ] {
        write_trio_tsv_row(out, "total", "-", member, counts)?;
    }
    Ok(())
}

fn write_trio_tsv_row<W: Write>(
    out: &mut W,
    chromosome: &str,
    status: &str,
    member: &str,
    counts: &MendelianCounts,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        chromosome,
        status,
        member,
        counts.compliant,
        counts.violation,
        counts.nocall_parent,
        counts.nocall_child,
        counts.skipped
    )
}
