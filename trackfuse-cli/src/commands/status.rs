//! `status`: run one cycle per class, then print the status report.

use trackfuse::config::ConfigFile;
use trackfuse::service::DataCollectionService;

use super::output;
use crate::error::CliError;

pub async fn run(config: &ConfigFile, json: bool) -> Result<(), CliError> {
    let service = DataCollectionService::from_config(config)?;

    tokio::join!(
        service.collect_all_aircraft_data(),
        service.collect_all_vessel_data()
    );
    let report = service.get_all_sources_status();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::status_report(&report));
    }
    Ok(())
}
