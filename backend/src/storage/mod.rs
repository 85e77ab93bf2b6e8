//! # Storage Module
//!
//! SQLite persistence for parents, children and vaccinations.
//!
//! - **connection**: pool creation, schema setup and the legacy `country`
//!   column migration
//! - **repositories**: one repository per table, each holding a cloned
//!   [`DbConnection`]
//!
//! Deletes cascade through foreign keys (parent -> children -> vaccinations),
//! so repositories never clean up child rows by hand.

pub mod connection;
pub mod repositories;

pub use connection::DbConnection;
pub use repositories::{ChildRepository, ParentRepository, VaccinationRepository};
