//! The collection service: the entry point a pipeline driver calls.
//!
//! [`DataCollectionService`] owns one [`CollectionOrchestrator`] per entity
//! class and exposes the three operations downstream processing needs:
//! fused aircraft, fused vessels and a status report.
//!
//! # Example
//!
//! ```no_run
//! use trackfuse::config::ConfigFile;
//! use trackfuse::service::DataCollectionService;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigFile::load()?;
//! let service = DataCollectionService::from_config(&config)?;
//!
//! let aircraft = service.collect_all_aircraft_data().await;
//! let vessels = service.collect_all_vessel_data().await;
//! let status = service.get_all_sources_status();
//! println!("{} aircraft, {} vessels, {} healthy sources",
//!     aircraft.len(), vessels.len(), status.healthy_sources());
//! # Ok(())
//! # }
//! ```
//!
//! [`CollectionOrchestrator`]: crate::orchestrator::CollectionOrchestrator

mod collection;
mod error;
mod status;

pub use collection::DataCollectionService;
pub use error::ServiceError;
pub use status::{SourceStatus, StatusReport};
