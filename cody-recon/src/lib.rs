//! cody-recon library interface
//!
//! The CodyStats record reconciler: canonicalizes loosely-typed match
//! identifiers, discovers team/alliance records inside externally-produced
//! JSON of unconstrained shape, indexes them by composite key behind an
//! identity-keyed cache, and compares aggregated score fields against
//! locally scouted data.
//!
//! Data flow: raw payload → [`walker`] discovers candidate records →
//! [`normalizer`] canonicalizes their identity → [`lookup`] indexes by
//! composite key → [`extract`]/[`aggregate`] read and sum fields on demand →
//! [`report`] renders per-alliance verdicts.

pub mod aggregate;
pub mod client;
pub mod extract;
pub mod fields;
pub mod lookup;
pub mod normalizer;
pub mod overrides;
pub mod report;
pub mod walker;

pub use fields::FieldTable;
pub use lookup::{Lookup, LookupCache};
pub use walker::ReconciledRecord;
