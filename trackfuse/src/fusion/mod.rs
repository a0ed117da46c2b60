//! Fusion engine: one best record per physical entity per cycle.
//!
//! ```text
//! records ──► admit (position, quality, identity) ──► group by identity
//!         ──► newest per source ──► rank ──► field-wise merge ──► FusedRecord
//! ```
//!
//! Grouping is by primary identity only. Records for different identities
//! are never merged, even when their positions coincide.

mod engine;
mod merge;

pub use engine::{FusionEngine, FusionOutput, FusionStats};
pub use merge::FieldPicker;
