//! Corrects the splice junctions of BED12 alignments against annotated splice
//! sites.
//!
//! ```shell
//! cargo run --release --bin=sscorrect --features=binaries -- \
//!     -i reads.bed -j junctions.tsv -o sample --correct-strand
//! ```
//!
//! Two files are written: `<prefix>_corrected.bed` and
//! `<prefix>_inconsistent.bed`.

use std::fs;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use flate2::read::GzDecoder;
use sscorrect::correct::Corrector;
use sscorrect::correct::Summary;
use sscorrect::index;
use sscorrect::resolve::Resolver;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

/// The extension of gzipped inputs.
const GZIP_EXTENSION: &str = "gz";

/// The extension added to outputs until the run succeeds.
const PARTIAL_EXTENSION: &str = "partial";

////////////////////////////////////////////////////////////////////////////////////////
// Outputs
////////////////////////////////////////////////////////////////////////////////////////

/// The pair of files a run writes to.
struct Outputs {
    /// The final path for consistent records.
    corrected: PathBuf,

    /// The final path for inconsistent records.
    inconsistent: PathBuf,
}

impl Outputs {
    /// Creates the output paths for a prefix.
    fn new(prefix: &str) -> Self {
        Self {
            corrected: PathBuf::from(format!("{prefix}_corrected.bed")),
            inconsistent: PathBuf::from(format!("{prefix}_inconsistent.bed")),
        }
    }

    /// Gets the path written to before `path` is complete.
    fn partial(path: &Path) -> PathBuf {
        let mut partial = path.as_os_str().to_owned();
        partial.push(".");
        partial.push(PARTIAL_EXTENSION);
        PathBuf::from(partial)
    }

    /// Moves both partial files into place.
    fn commit(&self) -> Result<()> {
        for path in [&self.corrected, &self.inconsistent] {
            fs::rename(Self::partial(path), path)
                .with_context(|| format!("moving output into place: {}", path.display()))?;
        }

        Ok(())
    }

    /// Removes whatever partial files exist.
    fn discard(&self) {
        for path in [&self.corrected, &self.inconsistent] {
            // The file may never have been created.
            let _ = fs::remove_file(Self::partial(path));
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Main
////////////////////////////////////////////////////////////////////////////////////////

/// Opens an input file, decompressing it if it is gzipped.
fn open(path: &Path) -> Result<sscorrect::Reader<Box<dyn BufRead>>> {
    if !path.exists() {
        bail!("input file does not exist: {}", path.display());
    }

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    let inner: Box<dyn BufRead> =
        if path.extension().and_then(|ext| ext.to_str()) == Some(GZIP_EXTENSION) {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

    Ok(sscorrect::Reader::new(inner))
}

/// Corrects every alignment, writing both partitions to their partial files.
fn correct(args: &Args, outputs: &Outputs) -> Result<Summary> {
    // Both inputs must exist before any work starts.
    let annotations = open(&args.juncs)?;
    let alignments = open(&args.input_bed)?;

    info!("indexing annotated junctions: {}", args.juncs.display());
    let index = index::Builder::new(args.wiggle_window)
        .try_build_from(annotations)
        .context("building the splice site index")?;
    info!("indexed {} annotated splice sites", index.len());

    let mut corrected = File::create(Outputs::partial(&outputs.corrected))
        .map(BufWriter::new)
        .context("creating the corrected output")?;
    let mut inconsistent = File::create(Outputs::partial(&outputs.inconsistent))
        .map(BufWriter::new)
        .context("creating the inconsistent output")?;

    info!("correcting alignments: {}", args.input_bed.display());
    let summary = Corrector::new(Resolver::new(index), args.correct_strand)
        .run(alignments, &mut corrected, &mut inconsistent)
        .context("correcting alignments")?;

    corrected.flush().context("writing the corrected output")?;
    inconsistent.flush().context("writing the inconsistent output")?;

    Ok(summary)
}

/// Runs the correction, keeping the outputs only if the run succeeds.
fn throw(args: &Args) -> Result<()> {
    let outputs = Outputs::new(&args.output_prefix);

    let summary = match correct(args, &outputs) {
        Ok(summary) => summary,
        Err(err) => {
            outputs.discard();
            return Err(err);
        }
    };

    outputs.commit()?;

    info!("{summary}");
    info!("corrected: {}", outputs.corrected.display());
    info!("inconsistent: {}", outputs.inconsistent.display());

    Ok(())
}

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The BED12 alignments to correct (optionally gzipped).
    #[arg(short, long)]
    input_bed: PathBuf,

    /// The annotated junctions (tab-separated contig, start, end, source,
    /// ..., strand).
    #[arg(short, long)]
    juncs: PathBuf,

    /// The distance on either side of an annotated splice site within which
    /// observed sites are corrected to it.
    #[arg(short, long, default_value_t = index::DEFAULT_WIGGLE)]
    wiggle_window: u64,

    /// The prefix of the two output files.
    #[arg(short, long)]
    output_prefix: String,

    /// Whether to adopt the strand of the annotated splice sites.
    #[arg(long, default_value_t = false)]
    correct_strand: bool,

    #[command(flatten)]
    verbose: Verbosity,
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .init(),
    };

    throw(&args)
}
