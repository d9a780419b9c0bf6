//! Petmatch - backend service for pet matching and pet care
//!
//! This library backs the petmatch HTTP API: a user directory for owners,
//! sitters, and shelters, a pet registry with image-based animal type
//! detection, a breeding match workflow, and sitter listings.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::classifier::{classify, Classification, Label};
pub use error::ApiError;
pub use models::{AnimalType, Match, MatchStatus, Pet, PetGender, SitterSpec, User, UserRef, UserRole};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let labels = vec![Label::new("golden retriever", 0.92)];
        let classification = classify(&labels);
        assert_eq!(classification.animal, AnimalType::Dog);
    }
}
