//! Randmux command-line entry point.
//!
//! Seeds one stream per thread on the shared engine, draws integers from each
//! concurrently and prints one JSON line per stream.

use std::error::Error;
use std::thread;

use randmux_core::{EngineState, Rand, default_rand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;

use config::{Config, LogFormat};
use error::AppError;

/// Output line for one stream.
#[derive(Debug, Serialize)]
struct StreamReport {
    stream: usize,
    seed: u64,
    values: Vec<i64>,
    state: EngineState,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn base_seed(config: &Config) -> Result<u64, AppError> {
    if let Some(seed) = config.seed {
        return Ok(seed);
    }
    let drawn = default_rand().randint(0, Some(i64::MAX))?;
    debug!(seed = drawn, "drew base seed from default stream");
    Ok(drawn.unsigned_abs())
}

fn run_stream(config: &Config, stream: usize, seed: u64) -> Result<StreamReport, AppError> {
    let rand = Rand::with_seed(seed);
    let values = rand
        .randint_array(config.low, Some(config.high), config.draws)?
        .to_vec();
    debug!(stream, seed, "stream finished");
    Ok(StreamReport {
        stream,
        seed,
        values,
        state: rand.state(),
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    info!(
        streams = config.streams,
        draws = config.draws,
        "starting randmux"
    );

    let base = base_seed(&config)?;
    let reports = thread::scope(|s| {
        let handles: Vec<_> = (0..config.streams)
            .map(|stream| {
                let seed = base.wrapping_add(stream as u64);
                let config = &config;
                s.spawn(move || run_stream(config, stream, seed))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| "stream thread panicked"))
            .collect::<Result<Vec<_>, _>>()
    })?;

    for report in reports {
        println!("{}", serde_json::to_string(&report?).map_err(AppError::from)?);
    }

    info!("done");
    Ok(())
}
