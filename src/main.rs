//! TRNG Conditioner CLI
//!
//! Drives the conditioner from a simulated biased noise source and
//! prints each full buffer as hex.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use trng_conditioner::{
    conditioning::{split, BitOrder, BufferStatus, Conditioner, ConditionerStats},
    config::{ConfigError, FileConfig},
    metrics::{MetricsError, MetricsRegistry, MetricsSnapshot},
    source::{fill, SimulatedSource, SourceError},
};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("producer thread panicked")]
    ProducerPanicked,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    Lsb,
    Msb,
}

impl From<OrderArg> for BitOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Lsb => BitOrder::LsbFirst,
            OrderArg::Msb => BitOrder::MsbFirst,
        }
    }
}

/// Collect Von Neumann corrected bytes from a simulated noise source.
#[derive(Debug, Parser)]
#[command(name = "trng-conditioner", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Buffer capacity in bytes.
    #[arg(long)]
    capacity: Option<usize>,

    /// Bit order inside each packed byte.
    #[arg(long, value_enum)]
    bit_order: Option<OrderArg>,

    /// Probability that a raw bit is one (0.5 = unbiased).
    #[arg(short, long)]
    probability_one: Option<f64>,

    /// Fixed source seed for reproducible output.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of full buffers to collect.
    #[arg(short = 'n', long)]
    buffers: Option<u32>,

    /// Keep collecting until Ctrl-C.
    #[arg(long)]
    continuous: bool,

    /// Run the producer on its own thread and poll from the main thread.
    #[arg(long)]
    shared: bool,

    /// Print Prometheus metrics on exit.
    #[arg(long)]
    metrics: bool,
}

impl Args {
    fn load_config(&self) -> Result<FileConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        if let Some(capacity) = self.capacity {
            config.buffer.capacity = capacity;
        }
        if let Some(order) = self.bit_order {
            config.buffer.bit_order = order.into();
        }
        if let Some(p) = self.probability_one {
            config.source.probability_one = p;
        }
        if self.seed.is_some() {
            config.source.seed = self.seed;
        }
        if let Some(buffers) = self.buffers {
            config.output.buffers = buffers;
        }
        config.output.continuous |= self.continuous;

        config.validate()?;
        Ok(config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = args.load_config()?;

    info!("TRNG Conditioner v{}", trng_conditioner::VERSION);
    info!(
        capacity = config.buffer.capacity,
        bit_order = ?config.buffer.bit_order,
        probability_one = config.source.probability_one,
        "Using simulated noise source"
    );

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    let source = SimulatedSource::from_config(&config.source)?;

    let snapshot = if args.shared {
        run_shared(&config, source, &running)?
    } else {
        run_owned(&config, source, &running)?
    };

    info!(
        raw_bits = snapshot.stats.raw_bits,
        corrected_bits = snapshot.stats.corrected_bits,
        efficiency = snapshot.stats.efficiency(),
        "Done"
    );

    if args.metrics {
        let registry = MetricsRegistry::new()?;
        registry.update(&snapshot);
        print!("{}", registry.encode()?);
    }

    Ok(())
}

fn wants_more(config: &FileConfig, collected: u32, running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst) && (config.output.continuous || collected < config.output.buffers)
}

fn print_buffer(index: u32, bytes: &[u8]) {
    println!(
        "{:>4}: {}",
        index,
        bytes.iter().map(|b| format!("{:02x}", b)).collect::<String>()
    );
}

/// Single-owner mode: sample, condition and read on one thread.
fn run_owned(
    config: &FileConfig,
    mut source: SimulatedSource,
    running: &AtomicBool,
) -> Result<MetricsSnapshot, CliError> {
    let mut conditioner = Conditioner::new(&config.buffer)?;
    let mut collected = 0u32;

    while wants_more(config, collected, running) {
        let outcome = fill(&mut source, &mut conditioner, config.output.max_raw_bits)?;
        if !outcome.is_full() {
            warn!(
                raw_bits = outcome.raw_bits,
                "Source did not fill the buffer within budget; giving up"
            );
            break;
        }

        if let Some(bytes) = conditioner.read_full() {
            print_buffer(collected, bytes);
        }
        collected += 1;
        conditioner.reset();
    }

    Ok(MetricsSnapshot::from_conditioner(&conditioner))
}

/// Split mode: a sampling thread feeds the producer half while this
/// thread polls the consumer half.
fn run_shared(
    config: &FileConfig,
    source: SimulatedSource,
    running: &Arc<AtomicBool>,
) -> Result<MetricsSnapshot, CliError> {
    let (mut producer, mut consumer) = split(&config.buffer)?;
    let producer_running = Arc::new(AtomicBool::new(true));
    let budget = config.output.max_raw_bits;

    let handle = {
        let producer_running = Arc::clone(&producer_running);
        let mut source = source;
        thread::spawn(move || -> Result<ConditionerStats, SourceError> {
            while producer_running.load(Ordering::Acquire) {
                if producer.buffer_status() == BufferStatus::Full {
                    thread::yield_now();
                    continue;
                }
                let outcome = fill(&mut source, &mut producer, budget)?;
                if !outcome.is_full() {
                    warn!(
                        raw_bits = outcome.raw_bits,
                        "Source did not fill the buffer within budget; stopping producer"
                    );
                    break;
                }
            }
            Ok(*producer.stats())
        })
    };

    let mut collected = 0u32;
    while wants_more(config, collected, running) {
        if let Some(bytes) = consumer.read_full() {
            print_buffer(collected, &bytes);
            collected += 1;
            // The producer does not commit while the status is Full.
            consumer.reset();
        } else if handle.is_finished() {
            break;
        } else {
            thread::sleep(Duration::from_millis(1));
        }
    }

    producer_running.store(false, Ordering::Release);
    let stats = handle.join().map_err(|_| CliError::ProducerPanicked)??;

    Ok(MetricsSnapshot {
        stats,
        status: consumer.buffer_status(),
        fill_index: consumer.fill_index(),
        capacity: consumer.capacity(),
    })
}
