//! Error types for the placement engine

use thiserror::Error;

use super::config::ConfigError;
use super::types::ElementKind;

/// Errors that can occur while validating or computing a placement
#[derive(Debug, Error)]
pub enum PlacementError {
    /// A rectangle or canvas with a non-positive or non-finite extent
    #[error("invalid geometry for {subject}: {reason}")]
    InvalidGeometry { subject: String, reason: String },

    /// The element to place has no type name
    #[error("element type must not be empty")]
    EmptyElementType,

    /// Two existing elements share an identifier
    #[error("duplicate element id '{id}'")]
    DuplicateElementId { id: String },

    /// The request used the ambiguous `subject_bounds` field
    #[error(
        "'subject_bounds' is ambiguous; use 'containment_bounds' (stay inside) or 'obstacle_bounds' (stay clear)"
    )]
    AmbiguousBounds,

    /// A text element cannot fit any free-space region
    #[error(
        "{kind} of {width:.0}x{height:.0} does not fit the {available_width:.0}x{available_height:.0} working area"
    )]
    ElementTooLarge {
        kind: ElementKind,
        width: f64,
        height: f64,
        available_width: f64,
        available_height: f64,
    },

    /// The engine configuration cannot be used
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Unexpected failure inside candidate generation or scoring
    #[error("internal placement failure: {0}")]
    Internal(String),
}

impl PlacementError {
    /// Create an invalid geometry error
    pub fn invalid_geometry(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate id error
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateElementId { id: id.into() }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error stems from caller input rather than the engine itself
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidGeometry { .. }
                | Self::EmptyElementType
                | Self::DuplicateElementId { .. }
                | Self::AmbiguousBounds
        )
    }
}
