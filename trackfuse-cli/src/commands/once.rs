//! `once`: run a single collection cycle and print the fused records.

use serde_json::{Map, Value};
use trackfuse::config::ConfigFile;
use trackfuse::record::EntityClass;
use trackfuse::service::DataCollectionService;

use super::common::ClassArg;
use super::output;
use crate::error::CliError;

pub async fn run(config: &ConfigFile, class: ClassArg, json: bool) -> Result<(), CliError> {
    let service = DataCollectionService::from_config(config)?;

    let aircraft = if class.includes(EntityClass::Aircraft) {
        Some(service.collect_all_aircraft_data().await)
    } else {
        None
    };
    let vessels = if class.includes(EntityClass::Vessel) {
        Some(service.collect_all_vessel_data().await)
    } else {
        None
    };

    if json {
        let mut body = Map::new();
        if let Some(aircraft) = &aircraft {
            body.insert("aircraft".into(), serde_json::to_value(aircraft)?);
        }
        if let Some(vessels) = &vessels {
            body.insert("vessels".into(), serde_json::to_value(vessels)?);
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(body))?);
        return Ok(());
    }

    if let Some(aircraft) = &aircraft {
        print!("{}", output::aircraft_table(aircraft));
    }
    if aircraft.is_some() && vessels.is_some() {
        println!();
    }
    if let Some(vessels) = &vessels {
        print!("{}", output::vessel_table(vessels));
    }
    Ok(())
}
