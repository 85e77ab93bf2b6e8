//! Conversions from domain models to the DTOs in the `shared` crate.

pub mod child_mapper;
pub mod parent_mapper;
pub mod schedule_mapper;

pub use child_mapper::ChildMapper;
pub use parent_mapper::ParentMapper;
pub use schedule_mapper::ScheduleMapper;
