//! Unified error types for the domain layer
//!
//! Setters on the character builder reject malformed input with a
//! `DomainError` before any state is constructed. Downstream invalidations are
//! not errors; they travel through `InvalidationResult` instead.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced catalog entry does not exist
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Field or selection was pre-filled by the caller and cannot change
    #[error("Field is locked: {field}")]
    Locked { field: String },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when a value is outside its allowed range:
    /// - Levels above the edition maximum
    /// - Empty names
    /// - Skill choices beyond the class allowance
    ///
    /// # Example
    /// ```ignore
    /// if level == 0 {
    ///     return Err(DomainError::validation("Total level must be at least 1"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Create a locked field error
    pub fn locked(field: impl Into<String>) -> Self {
        Self::Locked {
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("name cannot be empty");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: name cannot be empty");
    }

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("CharacterClass", "artificer");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(
            err.to_string(),
            "Entity not found: CharacterClass with id artificer"
        );
    }

    #[test]
    fn test_constraint_error() {
        let err = DomainError::constraint("multiclassing is not allowed in 2e");
        assert!(matches!(err, DomainError::Constraint(_)));
        assert_eq!(
            err.to_string(),
            "Constraint violation: multiclassing is not allowed in 2e"
        );
    }

    #[test]
    fn test_locked_error() {
        let err = DomainError::locked("edition");
        assert_eq!(err.to_string(), "Field is locked: edition");
    }
}
