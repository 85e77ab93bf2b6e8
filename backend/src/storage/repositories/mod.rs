pub mod child_repository;
pub mod parent_repository;
pub mod vaccination_repository;

pub use child_repository::ChildRepository;
pub use parent_repository::ParentRepository;
pub use vaccination_repository::VaccinationRepository;
