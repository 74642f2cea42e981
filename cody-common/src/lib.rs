//! # CodyStats Common Library
//!
//! Shared code for the CodyStats reconciliation tools including:
//! - Domain types (match levels, alliances, composite keys)
//! - Schedule and scouted-record models
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Alliance, Endgame, MatchLevel};
