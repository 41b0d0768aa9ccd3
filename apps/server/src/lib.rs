//! chartkeeper: a REST server for patient records
//!
//! Resources (`patient`, `person`, `location`, `patientidentifiertype`) share
//! one CRUD controller, one representation engine and one in-memory search
//! index. See [`resources`] for the resource layer and [`api`] for routing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod representation;
pub mod resources;
pub mod search;
pub mod startup;
pub mod state;

pub use error::{Error, Result};
