use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{info, warn};

use crate::analysis::provider::admit;
use crate::analysis::trio::{compare_trio, TrioCalls, TrioReport};
use crate::cli::{EngineArgs, OutputFormat, RunStatus};
use crate::core::config::{check_readable, ComparisonConfig, ConfigError};
use crate::core::types::MatchMode;
use crate::output::stats::{render_trio_text, render_trio_tsv, write_stats_json};
use crate::output::vcf_writer::{write_trio, HeaderTemplate};
use crate::parsing::bed::RegionSet;
use crate::parsing::fasta::load_reference;
use crate::parsing::ped::Pedigree;
use crate::parsing::vcf::{read_vcf, ReadOptions, VcfInput};
use crate::utils::validation::validate_output_prefix;

#[derive(Args)]
pub struct TrioArgs {
    /// Mother VCF, plain or gzipped
    #[arg(required = true)]
    pub mother: PathBuf,

    /// Father VCF, plain or gzipped
    #[arg(required = true)]
    pub father: PathBuf,

    /// Child VCF, plain or gzipped
    #[arg(required = true)]
    pub child: PathBuf,

    /// Reference FASTA the calls were made against
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Output prefix for the trio VCF and statistics
    #[arg(short, long)]
    pub output: PathBuf,

    /// Sample to read from the mother VCF (default: first)
    #[arg(long)]
    pub mother_sample: Option<String>,

    /// Sample to read from the father VCF (default: first)
    #[arg(long)]
    pub father_sample: Option<String>,

    /// Sample to read from the child VCF (default: first)
    #[arg(long)]
    pub child_sample: Option<String>,

    /// PED file that must list the selected samples as mother, father and child
    #[arg(long)]
    pub ped: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn run(args: TrioArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<RunStatus> {
    let config = args.engine.config(MatchMode::Genotype);
    validate(&args, &config)?;

    let reference = load_reference(&args.reference)?;
    let regions = args.engine.bed.as_deref().map(RegionSet::load).transpose()?;

    let mother = read_member(&args.mother, args.mother_sample.clone(), &config)?;
    let father = read_member(&args.father, args.father_sample.clone(), &config)?;
    let child = read_member(&args.child, args.child_sample.clone(), &config)?;

    if let Some(ped) = &args.ped {
        let pedigree = Pedigree::load(ped)?;
        pedigree.validate_trio(&mother.sample, &father.sample, &child.sample)?;
    }

    if verbose {
        info!(
            mother = %mother.sample,
            father = %father.sample,
            child = %child.sample,
            contigs = reference.len(),
            "Trio loaded"
        );
    }

    let mut filters = Vec::new();
    for input in [&mother, &father, &child] {
        filters.extend(input.header.filters.iter().cloned());
    }

    let calls = TrioCalls {
        mother: admit(mother.variants, &reference, &config, regions.as_ref()),
        father: admit(father.variants, &reference, &config, regions.as_ref()),
        child: admit(child.variants, &reference, &config, regions.as_ref()),
    };
    let report = compare_trio(&reference, calls, &config);

    let template = HeaderTemplate {
        reference: &reference,
        filters: &filters,
    };
    let outputs = vec![
        write_trio(&args.output, &report, template)?,
        write_stats_json(&args.output, &report.stats)?,
    ];

    match format {
        OutputFormat::Text => print_text_report(&report, &outputs)?,
        OutputFormat::Json => print_json_report(&report, &outputs)?,
        OutputFormat::Tsv => render_trio_tsv(&mut std::io::stdout().lock(), &report.stats)?,
    }

    let incomplete = report.stats.incomplete();
    if !incomplete.is_empty() {
        warn!(chromosomes = %incomplete.join(","), "Some chromosomes could not be compared");
    }
    Ok(RunStatus::from_complete(report.is_complete()))
}

fn validate(args: &TrioArgs, config: &ComparisonConfig) -> Result<(), ConfigError> {
    config.validate()?;
    for path in [&args.mother, &args.father, &args.child, &args.reference] {
        check_readable(path)?;
    }
    for path in [&args.engine.bed, &args.ped].into_iter().flatten() {
        check_readable(path)?;
    }
    validate_output_prefix(&args.output)?;
    Ok(())
}

fn read_member(path: &Path, sample: Option<String>, config: &ComparisonConfig) -> anyhow::Result<VcfInput> {
    let options = ReadOptions {
        sample,
        ref_overlap: config.ref_overlap,
    };
    let input = read_vcf(path, &options)?;
    if input.skipped > 0 {
        warn!(path = %path.display(), skipped = input.skipped, "Malformed records skipped");
    }
    Ok(input)
}

fn print_text_report(report: &TrioReport, outputs: &[PathBuf]) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render_trio_text(&mut out, &report.stats)?;

    writeln!(out, "\nOutput files:")?;
    for path in outputs {
        writeln!(out, "  {}", path.display())?;
    }
    Ok(())
}

fn print_json_report(report: &TrioReport, outputs: &[PathBuf]) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "complete": report.is_complete(),
        "outputs": outputs.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        "stats": &report.stats,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
