//! Collection orchestration.
//!
//! Fans one fetch per adapter out onto its own task, waits for all of them,
//! forwards each non-empty result to the raw sink and fuses the union.
//!
//! ```text
//!            ┌─► adapter A ─┐
//! cycle ─────┼─► adapter B ─┼──► join all ──► sink (detached) ──► union ──► fusion
//!            └─► adapter C ─┘
//! ```

mod collector;
mod types;

pub use collector::{CollectionOrchestrator, DEFAULT_TIMEOUT_GRACE};
pub use types::{ClassStatus, SourceResult};
