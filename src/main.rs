//! Optical Index CLI
//!
//! Command-line interface for selecting distinct random indices (and
//! playlist entries) from camera-observed motion, and for checking the
//! sampler.

use clap::{Parser, Subcommand};
use optical_index::{
    analysis::{sampler_self_test, ConfidenceLevel},
    capture::{FrameSource, SyntheticLampSource},
    conditioning::{HashAlgorithm, UniformSampler},
    config::FileConfig,
    detection::ThresholdBlobDetector,
    extraction::{EntropyBlob, EntropyCollector},
    features::FastKeypointExtractor,
    metrics::{MetricsRegistry, MetricsSnapshot},
    playlist::Playlist,
    selection::{BuildOutcome, UniqueIndexSetBuilder},
};
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, warn};

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "optical-index", version, about = "Distinct random indices from lava-lamp motion")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Select distinct indices, optionally picking playlist entries.
    Select {
        /// Number of distinct indices to select.
        #[arg(short = 'n', long)]
        count: usize,
        /// Size of the collection to index into.
        #[arg(short, long, required_unless_present = "playlist")]
        length: Option<usize>,
        /// Playlist file, one entry per line.
        #[arg(short, long)]
        playlist: Option<PathBuf>,
        /// Seed the synthetic lamp for a reproducible run.
        #[arg(long)]
        seed: Option<u64>,
        /// Read frames from the configured camera device.
        #[arg(long)]
        camera: bool,
        /// Print Prometheus metrics after the run.
        #[arg(long)]
        print_metrics: bool,
    },
    /// Sample one integer from the given blob values.
    #[command(allow_negative_numbers = true)]
    Sample {
        /// Blob values, in order.
        #[arg(required = true)]
        values: Vec<f64>,
        #[arg(long, default_value_t = 0)]
        min: i64,
        #[arg(long)]
        max: i64,
        /// Overrides the configured hash algorithm.
        #[arg(long)]
        algorithm: Option<HashAlgorithm>,
    },
    /// Chi-squared uniformity check of the sampler.
    Selftest {
        #[arg(long, default_value_t = 10)]
        range: usize,
        #[arg(long, default_value_t = 10_000)]
        trials: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let result = match cli.command {
        Command::Select {
            count,
            length,
            playlist,
            seed,
            camera,
            print_metrics,
        } => run_select(&config, count, length, playlist, seed, camera, print_metrics),
        Command::Sample {
            values,
            min,
            max,
            algorithm,
        } => run_sample(&config, values, min, max, algorithm),
        Command::Selftest {
            range,
            trials,
            seed,
        } => run_selftest(&config, range, trials, seed),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_select(
    config: &FileConfig,
    count: usize,
    length: Option<usize>,
    playlist: Option<PathBuf>,
    seed: Option<u64>,
    camera: bool,
    print_metrics: bool,
) -> CliResult {
    info!("Optical Index v{}", optical_index::VERSION);

    let playlist = playlist.map(Playlist::from_file).transpose()?;
    let length = match (&playlist, length) {
        (Some(playlist), _) => playlist.len(),
        (None, Some(length)) => length,
        (None, None) => return Err("either --length or --playlist is required".into()),
    };

    let collector = EntropyCollector::new(
        ThresholdBlobDetector::new(&config.detection),
        FastKeypointExtractor::new(&config.features),
        config.detection.entropy_class,
    );
    let mut builder = UniqueIndexSetBuilder::new(
        make_source(config, seed, camera)?,
        collector,
        UniformSampler::new(config.sampling.algorithm),
    );

    let cancel = builder.cancel_token();
    ctrlc::set_handler(move || cancel.cancel())?;

    info!(count, length, "Collecting indices (Ctrl-C to cancel)...");
    let outcome = builder.build(count, length)?;

    let selection = outcome.selection();
    let indices = selection.indices();
    let stats = selection.stats();
    info!(
        attempts = stats.attempts,
        empty = stats.empty_blobs,
        duplicates = stats.duplicates,
        "Build finished"
    );

    if let BuildOutcome::Cancelled(_) = &outcome {
        warn!("Cancelled after {} of {} indices", indices.len(), count);
    }

    println!("Selected indices: {:?}", indices);
    if config.output.show_blobs {
        for (i, record) in selection.records().iter().enumerate() {
            println!("Blob {} -> index {}: {}", i + 1, record.index, record.summary());
        }
    }
    if let Some(playlist) = &playlist {
        println!("Picked from {}:", playlist.name());
        for (i, entry) in playlist.pick(&indices).iter().enumerate() {
            println!("{:>3}. {}", i + 1, entry);
        }
    }

    let snapshot = MetricsSnapshot::from_outcome(&outcome, count);
    let registry = MetricsRegistry::new()?;
    registry.update(&snapshot);
    if print_metrics {
        print!("{}", registry.encode()?);
    }

    #[cfg(feature = "metrics")]
    serve_metrics(config.output.metrics_port, registry, &builder.cancel_token());

    Ok(())
}

fn make_source(
    config: &FileConfig,
    seed: Option<u64>,
    camera: bool,
) -> Result<Box<dyn FrameSource>, Box<dyn Error>> {
    if camera {
        #[cfg(feature = "camera")]
        return Ok(Box::new(optical_index::capture::NokhwaSource::new(
            config.capture.clone(),
        )));
        #[cfg(not(feature = "camera"))]
        return Err("built without the `camera` feature".into());
    }

    Ok(match seed {
        Some(seed) => Box::new(SyntheticLampSource::with_seed(config.capture.clone(), seed)),
        None => Box::new(SyntheticLampSource::new(config.capture.clone())),
    })
}

/// Serves the run's metrics until interrupted.
#[cfg(feature = "metrics")]
fn serve_metrics(
    port: u16,
    registry: MetricsRegistry,
    cancel: &optical_index::selection::CancelToken,
) {
    use optical_index::metrics::{MetricsServer, MetricsServerConfig};

    if port == 0 || cancel.is_cancelled() {
        return;
    }

    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
    std::thread::spawn(move || match tokio::runtime::Runtime::new() {
        Ok(runtime) => {
            if let Err(e) = runtime.block_on(server.run()) {
                warn!("Metrics server stopped: {}", e);
            }
        }
        Err(e) => warn!("Failed to start metrics runtime: {}", e),
    });

    info!(port, "Serving metrics until interrupted");
    while !cancel.is_cancelled() {
        std::thread::sleep(std::time::Duration::from_millis(200));
    }
}

fn run_sample(
    config: &FileConfig,
    values: Vec<f64>,
    min: i64,
    max: i64,
    algorithm: Option<HashAlgorithm>,
) -> CliResult {
    let sampler = UniformSampler::new(algorithm.unwrap_or(config.sampling.algorithm));
    let blob = EntropyBlob::from_values(values);
    let draw = sampler.draw(&blob, min, max)?;

    info!(
        algorithm = %sampler.algorithm(),
        digest = %draw.digest.to_hex(),
        rehashes = draw.rehashes,
        "Sampled"
    );
    println!("{}", draw.value);
    Ok(())
}

fn run_selftest(config: &FileConfig, range: usize, trials: usize, seed: Option<u64>) -> CliResult {
    let mut rng = match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => {
            let mut seed = [0u8; 32];
            OsRng.fill_bytes(&mut seed);
            ChaCha20Rng::from_seed(seed)
        }
    };

    let sampler = UniformSampler::new(config.sampling.algorithm);
    let test = sampler_self_test(&sampler, range, trials, &mut rng)?;

    println!(
        "chi-squared = {:.3} ({} dof, {} samples, {})",
        test.statistic,
        test.degrees_of_freedom,
        test.samples,
        sampler.algorithm()
    );
    for (label, level) in [
        ("95%", ConfidenceLevel::P95),
        ("99%", ConfidenceLevel::P99),
        ("99.9%", ConfidenceLevel::P999),
    ] {
        println!(
            "  {:>6}: critical {:.3} -> {}",
            label,
            test.critical_value(level),
            if test.passes(level) { "pass" } else { "FAIL" }
        );
    }

    if !test.passes(ConfidenceLevel::P999) {
        return Err("sampler output rejected as non-uniform at 99.9%".into());
    }
    Ok(())
}
