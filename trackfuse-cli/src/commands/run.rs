//! `run`: poll both entity classes until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use trackfuse::config::ConfigFile;
use trackfuse::record::EntityClass;
use trackfuse::service::DataCollectionService;

use super::output;
use crate::error::CliError;

pub async fn run(config: &ConfigFile) -> Result<(), CliError> {
    let service = Arc::new(DataCollectionService::from_config(config)?);
    let cancellation = CancellationToken::new();

    let mut loops = Vec::new();
    for class in [EntityClass::Aircraft, EntityClass::Vessel] {
        let has_sources = match class {
            EntityClass::Aircraft => !service.aircraft().adapters().is_empty(),
            EntityClass::Vessel => !service.vessel().adapters().is_empty(),
        };
        if !has_sources {
            warn!(class = %class, "No enabled sources, not polling");
            continue;
        }
        loops.push(spawn_poll_loop(
            Arc::clone(&service),
            class,
            config.poll_interval(class),
            cancellation.clone(),
        ));
    }

    if loops.is_empty() {
        return Err(CliError::Config(
            "No sources are enabled. Enable at least one [source.<name>] section.".to_string(),
        ));
    }

    info!(bounds = ?service.bounds(), "Collection running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.map_err(CliError::Signal)?;

    info!("Shutdown requested");
    cancellation.cancel();
    for handle in loops {
        if let Err(e) = handle.await {
            warn!(error = %e, "Poll loop ended abnormally");
        }
    }

    print!("{}", output::status_report(&service.get_all_sources_status()));
    Ok(())
}

fn spawn_poll_loop(
    service: Arc<DataCollectionService>,
    class: EntityClass,
    interval: Duration,
    cancellation: CancellationToken,
) -> JoinHandle<()> {
    info!(class = %class, interval_ms = interval.as_millis() as u64, "Starting poll loop");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => break,
                _ = ticker.tick() => {
                    let fused = match class {
                        EntityClass::Aircraft => service.collect_all_aircraft_data().await.len(),
                        EntityClass::Vessel => service.collect_all_vessel_data().await.len(),
                    };
                    info!(class = %class, fused, "Cycle complete");
                }
            }
        }
    })
}
