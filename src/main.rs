use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dicom_slicer::{
    archive::ZipArchiver,
    select::Selection,
    slicer::Slicer,
    storage::{self, FsStore},
};

/// Extract normalized PNG slices from a DICOM dataset
#[derive(Parser)]
#[command(name = "dicom-slicer", version, about)]
struct Cli {
    /// DICOM file to slice
    input: PathBuf,

    /// Keep every nth slice, counting from the first
    #[arg(short = 'n', long, value_name = "N", conflicts_with = "all")]
    every: Option<i64>,

    /// Keep every slice
    #[arg(long)]
    all: bool,

    /// Directory the slice batches are written under
    #[arg(long, value_name = "DIR", default_value = "slices")]
    out: PathBuf,

    /// Also bundle the batch into a zip archive next to it
    #[arg(long)]
    zip: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let selection = match (cli.all, cli.every) {
        (true, _) => Selection::All,
        (false, Some(n)) => Selection::EveryNth(n),
        (false, None) => bail!("pass --every <N> or --all"),
    };

    let bytes = fs::read(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let stem = cli
        .input
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("dataset");
    let batch_id = storage::batch_id(stem);

    let store = FsStore::open(&cli.out)?;
    let batch = Slicer::run(&bytes, selection, &store, &batch_id)
        .with_context(|| format!("slicing {}", cli.input.display()))?;

    let batch_dir = store.root().join(&batch.batch_id);
    for slice in &batch.slices {
        println!("{}", batch_dir.join(&slice.filename).display());
    }

    if cli.zip {
        let archive = ZipArchiver::archive_batch(&store, &batch.batch_id, None)?;
        let path = store.root().join(ZipArchiver::archive_name(&batch.batch_id));
        fs::write(&path, archive).with_context(|| format!("writing {}", path.display()))?;
        println!("{}", path.display());
    }

    Ok(())
}
