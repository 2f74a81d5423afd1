//! Placement engine for design canvases
//!
//! This module handles:
//! - Spatial indexing of existing elements and per-cell density
//! - Free-space analysis around the dominant subject
//! - Graduated constraint scoring of candidate rectangles
//! - Multi-strategy candidate generation, deduplication and ranking

pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod grid;
pub mod rules;
pub mod scorer;
pub mod space;
pub mod types;

pub use config::{
    ConfigError, FallbackConfig, GeneratorConfig, PlacementConfig, ScoringConfig, SpaceConfig,
};
pub use engine::{Placement, PlacementEngine, PlacementQuery};
pub use error::PlacementError;
pub use generator::{CandidateGenerator, PlacementCandidate};
pub use grid::SpatialGrid;
pub use rules::{KindRule, RuleTable};
pub use scorer::{ConstraintScorer, Evaluation, DISQUALIFIED};
pub use space::{FreeSpaceRegion, RegionKind, SpaceAnalyzer, SuggestedPosition};
pub use types::{Element, ElementKind, Point, Rect, Size};
