//! tmix-ingest - Main Entry Point
//!
//! Samples Tmix connection vectors from an inbound (and optionally an
//! outbound) trace and distributes them over node pairs.

use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tmix_ingest::{
    config::IngestConfig,
    pipeline::{open_stream, ChannelPairFactory, DirectionRunner},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "tmix-ingest", version, about)]
struct Cli {
    /// Connection-vector file for the inbound side
    inbound: PathBuf,

    /// Connection-vector file for the outbound side
    outbound: Option<PathBuf>,

    /// Portion of cvecs to use, 0.0-1.0
    portion: Option<f64>,

    /// TOML configuration file; flags given here take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Connection vectors per node pair
    #[arg(long)]
    cvecs_per_pair: Option<usize>,

    /// Seed for the sampling draws
    #[arg(long)]
    seed: Option<u64>,

    /// Ingest both sides on separate threads
    #[arg(long)]
    parallel: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn ingest_config(&self) -> anyhow::Result<IngestConfig> {
        let mut config = match &self.config {
            Some(path) => IngestConfig::load(path)?,
            None => IngestConfig::default(),
        };
        if let Some(portion) = self.portion {
            config.keep_probability = portion;
        }
        if let Some(cvecs_per_pair) = self.cvecs_per_pair {
            config.cvecs_per_pair = cvecs_per_pair;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config.parallel |= self.parallel;
        Ok(config)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so a JSON summary on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tmix_ingest=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let runner = DirectionRunner::new(cli.ingest_config()?).context("Invalid configuration")?;

    let (factory, pairs) = ChannelPairFactory::new();
    let consumer = std::thread::spawn(move || {
        let mut handed_off = 0usize;
        for pair in pairs.iter() {
            tracing::debug!(
                "Handed off {} {} with {} cvecs",
                pair.direction,
                pair.id,
                pair.vectors.len()
            );
            handed_off += 1;
        }
        handed_off
    });

    let inbound = open_stream(&cli.inbound);
    let outbound = cli.outbound.as_ref().map(open_stream);

    let summary = if runner.config().parallel {
        runner.run_parallel(inbound, outbound, factory)
    } else {
        let mut factory = factory;
        let mut source = runner.draw_source();
        runner.run(inbound, outbound, &mut factory, &mut source)
    };

    let handed_off = consumer
        .join()
        .map_err(|_| anyhow!("Pair consumer thread panicked"))?;
    tracing::info!("{} node pairs handed off", handed_off);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for report in summary.reports() {
            println!("{report}");
        }
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
