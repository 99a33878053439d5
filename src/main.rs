//! IDGen Worker Service Entry Point
//!
//! Loads configuration, builds the tokio runtime and runs the service.

use anyhow::Context;
use idgen_worker::config::AppConfig;
use idgen_worker::run;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if config.server.workers > 0 {
        builder.worker_threads(config.server.workers);
    }
    let runtime = builder.enable_all().build()?;

    runtime.block_on(run(config))
}
