mod error;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::error::{Error, Result};
use crate::input::{Table, TableFormat, load_table, read_table};
use crate::logging::LogLevel;
use crate::model::columns::ColumnSpec;
use crate::model::config::{PartitionPlan, PartitionSettings, RunConfig, SeedScope, SettingsFile};
use crate::model::transforms::{DEFAULT_PROFILE, TransformProfile};
use crate::pipeline::stage1_extract::run_stage1;
use crate::pipeline::stage2_normalize::run_stage2;
use crate::pipeline::stage3_score::run_stage3;
use crate::pipeline::stage4_rank::run_stage4;
use crate::pipeline::stage5_partition::{ControlPools, Provenance, compute_quota, run_stage5};
use crate::pipeline::stage6_write::{OutputSet, write_ranked, write_shards, write_summary};
use crate::report::{PartitionSummary, RunSummary, ShardSummary, score_stats};

/// Weighted ranking of astronomical catalogs with seeded subject-set partitioning
#[derive(Parser, Debug)]
#[command(name = "exorank", version)]
#[command(about = "Rank catalog rows by weighted column desirability", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank a catalog and write it whole or as subject sets
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Input catalog (CSV, ASCII or IPAC; `.gz` accepted)
    #[arg(long)]
    input: PathBuf,

    #[arg(long, value_enum, default_value_t = TableFormat::Auto)]
    format: TableFormat,

    /// Output file stem
    #[arg(long)]
    output: String,

    #[arg(long, default_value = "Output")]
    out_dir: PathBuf,

    /// Selected column, repeatable
    #[arg(long = "column", value_name = "NAME:KIND:WEIGHT")]
    columns: Vec<String>,

    /// JSON settings file with `columns` and `identity_columns`
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Column passed through for downstream joins, repeatable
    #[arg(long = "identity", value_name = "COLUMN")]
    identity: Vec<String>,

    /// Builtin transform profile name or a JSON profile file
    #[arg(long, default_value = DEFAULT_PROFILE)]
    profile: String,

    /// Rows per subject set; enables partition mode
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Positive control pool
    #[arg(long)]
    positive: Option<PathBuf>,

    /// Negative control pool
    #[arg(long)]
    negative: Option<PathBuf>,

    #[arg(long, default_value_t = 0.0)]
    positive_fraction: f64,

    #[arg(long, default_value_t = 0.0)]
    negative_fraction: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = SeedScope::Shared)]
    seed_scope: SeedScope,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

fn main() {
    let cli = Cli::parse();
    let Command::Run(args) = cli.command;
    logging::init(args.log_level);

    match build_config(&args).and_then(|config| run(&config)) {
        Ok(paths) => {
            tracing::info!(files = paths.len(), "exorank finished");
        }
        Err(err) => {
            tracing::error!(stage = err.stage(), "{err}");
            std::process::exit(1);
        }
    }
}

fn build_config(args: &RunArgs) -> Result<RunConfig> {
    let file = match &args.settings {
        Some(path) => SettingsFile::load(path)?,
        None => SettingsFile::default(),
    };

    let mut columns = file.columns;
    for arg in &args.columns {
        columns.push(ColumnSpec::parse_cli(arg)?);
    }
    let mut identity_columns = file.identity_columns;
    identity_columns.extend(args.identity.iter().cloned());

    let partition = match args.chunk_size {
        Some(chunk_size) => Some(PartitionPlan {
            settings: PartitionSettings {
                chunk_size,
                positive_fraction: args.positive_fraction,
                negative_fraction: args.negative_fraction,
                seed: args.seed,
                seed_scope: args.seed_scope,
            },
            positive: args.positive.clone(),
            negative: args.negative.clone(),
        }),
        None => {
            if args.positive.is_some()
                || args.negative.is_some()
                || args.positive_fraction != 0.0
                || args.negative_fraction != 0.0
            {
                return Err(Error::PartitionConfig(
                    "control pools and fractions require --chunk-size".to_string(),
                ));
            }
            None
        }
    };

    let config = RunConfig {
        input: args.input.clone(),
        format: args.format,
        output_name: args.output.clone(),
        out_dir: args.out_dir.clone(),
        columns,
        identity_columns,
        profile: TransformProfile::resolve(&args.profile)?,
        partition,
    };
    config.validate()?;
    Ok(config)
}

fn run(config: &RunConfig) -> Result<Vec<PathBuf>> {
    let table = load_table(&config.input, config.format)?;

    let (positive, negative) = match &config.partition {
        Some(plan) => {
            let positive = load_pool(plan.positive.as_deref(), config.format)?;
            let negative = load_pool(plan.negative.as_deref(), config.format)?;
            // Checked again in stage 5; failing here skips scoring work on a doomed run.
            compute_quota(
                &plan.settings,
                positive.as_ref().map(Table::n_rows),
                negative.as_ref().map(Table::n_rows),
            )?;
            (positive, negative)
        }
        None => (None, None),
    };

    let stage1 = run_stage1(&table, &config.columns, &config.identity_columns)?;
    let matrix = run_stage2(&stage1.columns, &config.profile);
    let scores = run_stage3(&matrix)?;
    let ranked = run_stage4(&table, &stage1.columns, &scores);

    let mut outputs = OutputSet::new(&config.out_dir)?;
    let mut files = Vec::new();
    let partition_summary = match &config.partition {
        None => {
            let path = write_ranked(&mut outputs, &config.out_dir, &config.output_name, &ranked)?;
            files.push(path);
            None
        }
        Some(plan) => {
            let pools = ControlPools {
                positive: positive.as_ref(),
                negative: negative.as_ref(),
            };
            let stage5 = run_stage5(&ranked, &pools, &plan.settings)?;
            let paths = write_shards(&mut outputs, &config.out_dir, &config.output_name, &stage5)?;
            let shards = stage5
                .shards
                .iter()
                .zip(&paths)
                .map(|(shard, path)| ShardSummary {
                    file: file_name(path),
                    offset: shard.offset,
                    rows: shard.len(),
                    ranked_rows: shard.count(Provenance::Ranked),
                    positive_controls: shard.count(Provenance::Positive),
                    negative_controls: shard.count(Provenance::Negative),
                })
                .collect();
            files.extend(paths);
            Some(PartitionSummary {
                settings: plan.settings.clone(),
                quota: stage5.quota,
                shards,
            })
        }
    };

    let summary = RunSummary {
        tool_name: "exorank".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        input: config.input.display().to_string(),
        format: config.format.resolve(&config.input)?,
        profile: config.profile.name.clone(),
        n_rows: stage1.n_rows,
        columns_applied: matrix.specs.clone(),
        columns_omitted: matrix.omitted.clone(),
        identity_columns: config.identity_columns.clone(),
        score: score_stats(&scores),
        outputs: files.iter().map(|p| file_name(p)).collect(),
        partition: partition_summary,
    };
    write_summary(&mut outputs, &config.out_dir, &config.output_name, &summary)?;

    outputs.commit()
}

fn load_pool(path: Option<&Path>, format: TableFormat) -> Result<Option<Table>> {
    path.map(|p| read_table(p, format)).transpose()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
