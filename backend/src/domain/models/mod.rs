//! Domain models for the vaccination tracker.
//!
//! These are the storage-facing representations; the REST layer maps them to
//! the DTOs in the `shared` crate.

pub mod child;
pub mod guest;
pub mod parent;
pub mod vaccination;

pub use child::Child;
pub use guest::GuestSession;
pub use parent::Parent;
pub use vaccination::{DoseStatus, GuestDose, Vaccination};
