use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{info, warn};

use crate::analysis::duo::{compare_duo, DuoReport};
use crate::analysis::provider::admit;
use crate::analysis::reconcile::PassStrategy;
use crate::cli::{EngineArgs, OutputFormat, RunStatus};
use crate::core::config::{check_readable, ComparisonConfig, ConfigError};
use crate::core::reference::Reference;
use crate::core::types::MatchMode;
use crate::output::stats::{render_duo_text, render_duo_tsv, write_stats_json};
use crate::output::sync_dump::write_sync_points;
use crate::output::vcf_writer::{write_duo_merged, write_duo_split, HeaderTemplate};
use crate::output::OutputMode;
use crate::parsing::bed::RegionSet;
use crate::parsing::fasta::{is_fasta_file, load_reference};
use crate::parsing::vcf::{read_vcf, ReadOptions};
use crate::utils::validation::validate_output_prefix;

#[derive(Args)]
pub struct CompareArgs {
    /// Base (truth) VCF, plain or gzipped
    #[arg(required = true)]
    pub base: PathBuf,

    /// Called VCF to evaluate, plain or gzipped
    #[arg(required = true)]
    pub called: PathBuf,

    /// Reference FASTA the calls were made against
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Output prefix for VCF, statistics and sync point files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Sample to read from the base VCF (default: first)
    #[arg(long)]
    pub base_sample: Option<String>,

    /// Sample to read from the called VCF (default: first)
    #[arg(long)]
    pub called_sample: Option<String>,

    /// Layout of the annotated VCF output
    #[arg(long, value_enum, default_value_t = OutputMode::Ga4gh)]
    pub mode: OutputMode,

    /// Match mode of the single pass run in split mode
    #[arg(long, value_enum, default_value_t = MatchMode::Genotype)]
    pub match_mode: MatchMode,

    /// Also write the sync points as JSON
    #[arg(long)]
    pub sync_points: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn run(args: CompareArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<RunStatus> {
    let config = args.engine.config(args.match_mode);
    validate(&args, &config)?;

    let reference = load_reference(&args.reference)?;
    let regions = args.engine.bed.as_deref().map(RegionSet::load).transpose()?;

    let base_options = ReadOptions {
        sample: args.base_sample.clone(),
        ref_overlap: config.ref_overlap,
    };
    let called_options = ReadOptions {
        sample: args.called_sample.clone(),
        ref_overlap: config.ref_overlap,
    };
    let base_input = read_vcf(&args.base, &base_options)?;
    let called_input = read_vcf(&args.called, &called_options)?;

    if verbose {
        info!(
            base_sample = %base_input.sample,
            base_records = base_input.variants.len(),
            called_sample = %called_input.sample,
            called_records = called_input.variants.len(),
            contigs = reference.len(),
            "Inputs loaded"
        );
    }

    let mut filters = base_input.header.filters.clone();
    filters.extend(called_input.header.filters.iter().cloned());

    let base = admit(base_input.variants, &reference, &config, regions.as_ref());
    let called = admit(called_input.variants, &reference, &config, regions.as_ref());

    let strategy = match args.mode {
        OutputMode::Ga4gh => PassStrategy::GenotypeThenAllele,
        OutputMode::Split => PassStrategy::Single(config.match_mode),
    };
    let mut report = compare_duo(&reference, base, called, &config, strategy);
    report.stats.malformed_base = base_input.skipped;
    report.stats.malformed_called = called_input.skipped;

    let outputs = write_outputs(&args, &report, &reference, &filters)?;

    match format {
        OutputFormat::Text => print_text_report(&report, &outputs)?,
        OutputFormat::Json => print_json_report(&args, &report, &outputs)?,
        OutputFormat::Tsv => print_tsv_report(&report)?,
    }

    let incomplete = report.stats.incomplete();
    if !incomplete.is_empty() {
        warn!(chromosomes = %incomplete.join(","), "Some chromosomes could not be compared");
    }
    Ok(RunStatus::from_complete(report.is_complete()))
}

fn validate(args: &CompareArgs, config: &ComparisonConfig) -> Result<(), ConfigError> {
    config.validate()?;
    for path in [&args.base, &args.called, &args.reference] {
        check_readable(path)?;
    }
    if let Some(bed) = &args.engine.bed {
        check_readable(bed)?;
    }
    validate_output_prefix(&args.output)?;

    if !is_fasta_file(&args.reference) {
        warn!(path = %args.reference.display(), "Reference does not have a FASTA extension");
    }
    Ok(())
}

fn write_outputs(
    args: &CompareArgs,
    report: &DuoReport,
    reference: &Reference,
    filters: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let template = HeaderTemplate { reference, filters };

    let mut outputs = match args.mode {
        OutputMode::Ga4gh => vec![write_duo_merged(&args.output, report, template)?],
        OutputMode::Split => write_duo_split(&args.output, report, template)?,
    };
    if args.sync_points {
        outputs.push(write_sync_points(&args.output, report)?);
    }
    outputs.push(write_stats_json(&args.output, &report.stats)?);
    Ok(outputs)
}

fn print_text_report(report: &DuoReport, outputs: &[PathBuf]) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render_duo_text(&mut out, &report.stats)?;

    writeln!(out, "\nOutput files:")?;
    for path in outputs {
        writeln!(out, "  {}", path.display())?;
    }
    Ok(())
}

fn print_json_report(args: &CompareArgs, report: &DuoReport, outputs: &[PathBuf]) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "base": display(&args.base),
        "called": display(&args.called),
        "reference": display(&args.reference),
        "mode": format!("{:?}", args.mode).to_lowercase(),
        "complete": report.is_complete(),
        "outputs": outputs.iter().map(|p| display(p)).collect::<Vec<_>>(),
        "stats": &report.stats,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_report(report: &DuoReport) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    render_duo_tsv(&mut stdout.lock(), &report.stats)?;
    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
