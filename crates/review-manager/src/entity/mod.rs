//! Sea-ORM entities for review manager tables

pub mod reviews;

// Re-export entities for convenience
pub use reviews::Entity as Reviews;
