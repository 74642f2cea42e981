//! HTTP clients for the three data sources
//!
//! - [`BackendClient`]: the CodyStats REST backend (schedule, scouted
//!   records)
//! - [`ResultsClient`]: the external match-result provider (opaque payload)
//!
//! The reconciliation layer itself never performs I/O; these clients fetch
//! complete payloads which are then handed to the pure functions.

mod backend;
mod results;

pub use backend::{BackendClient, BackendError};
pub use results::{ResultsClient, ResultsError};
