use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dimgroup::assemble::{Assembler, CubeMetadata, RawVector, ScalarCode, StaticMetadataSource};
use dimgroup::io;
use dimgroup::{analyze, GroupingConfig, LoggingSink, Record, Result};

/// Group comparable statistical observations and summarise each group
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Group flat records and export groups, partitions and the intersection table
    Group {
        /// JSON array of flat records
        #[arg(short, long)]
        records: PathBuf,

        /// TOML grouping configuration
        #[arg(short, long, env = "DIMGROUP_CONFIG")]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        out: PathBuf,

        /// Attribute used to split exported rows into files
        #[arg(long, default_value = "ProductId")]
        partition_by: String,

        /// Attribute used to title each partition
        #[arg(long, default_value = "Title")]
        title_by: String,

        /// Compare record pairs in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// Flatten raw vector observations into records
    Assemble {
        /// JSON array of raw vectors
        #[arg(long)]
        vectors: PathBuf,

        /// JSON array of cube metadata
        #[arg(long)]
        metadata: PathBuf,

        /// JSON array of scalar factor descriptions
        #[arg(long)]
        scalar_codes: Option<PathBuf>,

        /// JSON array of population records for per-capita values
        #[arg(long)]
        population: Option<PathBuf>,

        /// Output JSON file
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dimgroup=info".into()),
        )
        .init();

    let args = Args::parse();
    log::info!("dimgroup {}", dimgroup::VERSION);

    match args.command {
        Command::Group {
            records,
            config,
            out,
            partition_by,
            title_by,
            parallel,
        } => run_group(&records, config.as_deref(), &out, &partition_by, &title_by, parallel),
        Command::Assemble {
            vectors,
            metadata,
            scalar_codes,
            population,
            out,
        } => run_assemble(&vectors, &metadata, scalar_codes.as_deref(), population.as_deref(), &out),
    }
}

fn run_group(
    records_path: &Path,
    config_path: Option<&Path>,
    out: &Path,
    partition_by: &str,
    title_by: &str,
    parallel: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => GroupingConfig::from_file(path)?,
        None => GroupingConfig::default(),
    };
    if parallel {
        config.parallel = true;
    }

    let records = io::read_records(records_path)?;
    let analysis = analyze(&records, &config, Arc::new(LoggingSink))?;
    log::info!(
        "Grouped {} records into {} groups; {} shared attributes",
        records.len(),
        analysis.groups.len(),
        analysis.intersection.len()
    );

    fs::create_dir_all(out)?;
    io::write_groups(out.join("groups.json"), &analysis.groups)?;
    io::write_intersection(out.join("intersection.csv"), &analysis.intersection)?;

    for partition in io::partition_rows(&analysis.groups, partition_by, Some(title_by)) {
        let path = out.join(format!("{}.csv", file_stem(&partition.label)));
        log::info!("Writing {} rows to {}", partition.rows.len(), path.display());
        io::write_rows(&path, &partition.rows)?;
    }
    Ok(())
}

fn run_assemble(
    vectors_path: &Path,
    metadata_path: &Path,
    scalar_codes_path: Option<&Path>,
    population_path: Option<&Path>,
    out: &Path,
) -> Result<()> {
    let vectors: Vec<RawVector> = io::read_document(vectors_path)?;
    let metadata: Vec<CubeMetadata> = io::read_document(metadata_path)?;

    let mut assembler = Assembler::new(StaticMetadataSource::new(metadata));
    if let Some(path) = scalar_codes_path {
        let codes: Vec<ScalarCode> = io::read_document(path)?;
        assembler = assembler.with_scale_codes(codes);
    }
    if let Some(path) = population_path {
        let population: Vec<Record> = io::read_records(path)?;
        assembler = assembler.with_population(population);
    }

    let records = assembler.assemble(&vectors)?;
    io::write_records(out, &records)?;
    log::info!("Wrote {} records to {}", records.len(), out.display());
    Ok(())
}

fn file_stem(label: &str) -> String {
    let stem: String = label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "unpartitioned".to_string()
    } else {
        stem
    }
}
