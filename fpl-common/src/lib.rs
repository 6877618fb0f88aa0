//! # FPL Common Library
//!
//! Shared code for the FPL league tracker:
//! - Domain models (gameweeks, managers, ranked entries)
//! - Configuration loading and layered resolution
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{Gameweek, League, Manager, RankedEntry, TeamDetails, TeamId};
