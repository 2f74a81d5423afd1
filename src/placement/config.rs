//! Configuration for the placement engine
//!
//! Every weight, margin and threshold used by the scorer, the space analyzer
//! and the candidate generator lives here so tests and deployments can tune
//! them without touching the algorithms.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Smallest accepted distance between uniform grid samples, in pixels
pub const MIN_GRID_STEP: f64 = 1.0;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Weights and thresholds for [`ConstraintScorer`](super::ConstraintScorer)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Penalty for a headline below its hierarchy line
    pub hierarchy_weight: f64,
    /// Headline top edge must stay above this fraction of canvas height
    pub headline_max_fraction: f64,
    /// Headline top edge at or above this fraction is reported as optimal
    pub headline_optimal_fraction: f64,
    /// Penalty for a subheading below its hierarchy line
    pub subheading_penalty: f64,
    pub subheading_max_fraction: f64,
    /// Penalty for a badge inside the middle band
    pub badge_band_penalty: f64,
    /// Vertical band (fractions of canvas height, exclusive) badges should avoid
    pub badge_band: (f64, f64),
    /// Multiplier applied to the collision overlap fraction
    pub collision_weight: f64,
    /// Multiplier applied to the overlap fraction with obstacle bounds
    pub obstacle_weight: f64,
    /// Bonus when at least `containment_full_fraction` lies inside the bounds
    pub containment_full_bonus: f64,
    pub containment_full_fraction: f64,
    /// Bonus when at least `containment_mostly_fraction` lies inside the bounds
    pub containment_mostly_bonus: f64,
    pub containment_mostly_fraction: f64,
    /// Multiplier applied to the outside fraction for partial containment
    pub containment_outside_weight: f64,
    /// At or below this inside fraction the candidate is disqualified
    pub containment_min_fraction: f64,
    pub alignment_bonus: f64,
    /// Spacing of the alignment grid in pixels
    pub alignment_grid: f64,
    /// Distance from a grid line still counted as aligned
    pub alignment_tolerance: f64,
    pub empty_region_bonus: f64,
    /// Cells below this density count as empty for the bonus
    pub empty_region_density: f64,
    pub spacing_bonus: f64,
    /// Clearance required from every canvas edge for the spacing bonus
    pub edge_clearance: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            hierarchy_weight: 50.0,
            headline_max_fraction: 0.30,
            headline_optimal_fraction: 0.15,
            subheading_penalty: 15.0,
            subheading_max_fraction: 0.50,
            badge_band_penalty: 10.0,
            badge_band: (0.30, 0.70),
            collision_weight: 40.0,
            obstacle_weight: 35.0,
            containment_full_bonus: 30.0,
            containment_full_fraction: 0.95,
            containment_mostly_bonus: 15.0,
            containment_mostly_fraction: 0.70,
            containment_outside_weight: 40.0,
            containment_min_fraction: 0.10,
            alignment_bonus: 10.0,
            alignment_grid: 40.0,
            alignment_tolerance: 5.0,
            empty_region_bonus: 15.0,
            empty_region_density: 0.30,
            spacing_bonus: 5.0,
            edge_clearance: 30.0,
        }
    }
}

/// Margins and offsets for [`SpaceAnalyzer`](super::SpaceAnalyzer)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    /// Gap kept between the subject and each free region
    pub subject_margin: f64,
    /// Regions must be strictly larger than this on both axes
    pub min_region_size: f64,
    /// Preferred margin when testing whether an element fits a region
    pub fit_margin: f64,
    /// Fallback margin when nothing fits with `fit_margin`
    pub relaxed_fit_margin: f64,
    /// How many viable regions produce positions
    pub max_regions: usize,
    /// Headline distance from the bottom edge of a bottom region
    pub text_bottom_inset: f64,
    /// Minimum headline distance from the top edge of a bottom region
    pub text_bottom_floor: f64,
    /// Headline distance from the top edge of a top region
    pub text_top_inset: f64,
    /// Badge inset from region corners
    pub corner_inset: f64,
    /// Image distance from the top edge of a top region
    pub image_top_inset: f64,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            subject_margin: 40.0,
            min_region_size: 80.0,
            fit_margin: 60.0,
            relaxed_fit_margin: 20.0,
            max_regions: 3,
            text_bottom_inset: 30.0,
            text_bottom_floor: 20.0,
            text_top_inset: 50.0,
            corner_inset: 50.0,
            image_top_inset: 40.0,
        }
    }
}

/// Sampling parameters for [`CandidateGenerator`](super::CandidateGenerator)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Distance between uniform grid samples
    pub grid_step: f64,
    /// Inset of the sampling grid from the sampled area
    pub grid_margin: f64,
    /// Top band cells denser than this are skipped
    pub top_band_density: f64,
    /// Bottom band cells denser than this are skipped
    pub bottom_band_density: f64,
    /// Gap between an anchor element and the candidate
    pub anchor_gap: f64,
    /// Inset of the conventional type-specific spots
    pub conventional_margin: f64,
    /// Extra lift of the subheading spot above the headline line
    pub subheading_lift: f64,
    /// Proposals closer than this collapse into the first one
    pub dedup_tolerance: f64,
    pub max_candidates: usize,
    /// Enable the empty-cell strategy
    pub empty_region_strategy: bool,
    /// Density below which a cell feeds the empty-cell strategy
    pub empty_region_threshold: f64,
    /// Inset of empty-cell corner proposals
    pub empty_corner_inset: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            grid_step: 80.0,
            grid_margin: 50.0,
            top_band_density: 0.6,
            bottom_band_density: 0.4,
            anchor_gap: 20.0,
            conventional_margin: 60.0,
            subheading_lift: 100.0,
            dedup_tolerance: 10.0,
            max_candidates: 100,
            empty_region_strategy: false,
            empty_region_threshold: 0.3,
            empty_corner_inset: 20.0,
        }
    }
}

/// The safe position returned when no candidate survives
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub x: i64,
    pub y: i64,
    pub confidence: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            x: 40,
            y: 40,
            confidence: 0.3,
        }
    }
}

/// Configuration options for placement computation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Number of spatial grid divisions per axis
    pub grid_size: usize,
    pub scoring: ScoringConfig,
    pub space: SpaceConfig,
    pub generator: GeneratorConfig,
    pub fallback: FallbackConfig,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            grid_size: 3,
            scoring: ScoringConfig::default(),
            space: SpaceConfig::default(),
            generator: GeneratorConfig::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

impl PlacementConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PlacementConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the algorithms cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::invalid("grid_size", "must be at least 1"));
        }
        let generator = &self.generator;
        if !generator.grid_step.is_finite() || generator.grid_step < MIN_GRID_STEP {
            return Err(ConfigError::invalid(
                "generator.grid_step",
                format!(
                    "must be a finite value of at least {}, got {}",
                    MIN_GRID_STEP, generator.grid_step
                ),
            ));
        }
        let space = &self.space;
        for (field, value) in [
            ("generator.grid_margin", generator.grid_margin),
            ("generator.anchor_gap", generator.anchor_gap),
            ("generator.conventional_margin", generator.conventional_margin),
            ("generator.subheading_lift", generator.subheading_lift),
            ("generator.dedup_tolerance", generator.dedup_tolerance),
            ("generator.empty_corner_inset", generator.empty_corner_inset),
            ("space.subject_margin", space.subject_margin),
            ("space.min_region_size", space.min_region_size),
            ("space.fit_margin", space.fit_margin),
            ("space.relaxed_fit_margin", space.relaxed_fit_margin),
            ("space.text_bottom_inset", space.text_bottom_inset),
            ("space.text_bottom_floor", space.text_bottom_floor),
            ("space.text_top_inset", space.text_top_inset),
            ("space.corner_inset", space.corner_inset),
            ("space.image_top_inset", space.image_top_inset),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be finite and non-negative, got {}", value),
                ));
            }
        }
        if space.max_regions == 0 {
            return Err(ConfigError::invalid("space.max_regions", "must be at least 1"));
        }
        if self.generator.max_candidates == 0 {
            return Err(ConfigError::invalid(
                "generator.max_candidates",
                "must be at least 1",
            ));
        }
        if self.scoring.alignment_grid <= 0.0 {
            return Err(ConfigError::invalid(
                "scoring.alignment_grid",
                "must be positive",
            ));
        }
        let (low, high) = self.scoring.badge_band;
        if low > high {
            return Err(ConfigError::invalid(
                "scoring.badge_band",
                format!("lower bound {low} exceeds upper bound {high}"),
            ));
        }
        let s = &self.scoring;
        if !(s.containment_min_fraction <= s.containment_mostly_fraction
            && s.containment_mostly_fraction <= s.containment_full_fraction)
        {
            return Err(ConfigError::invalid(
                "scoring.containment_*_fraction",
                "thresholds must be ordered min <= mostly <= full",
            ));
        }
        Ok(())
    }

    /// Set the number of grid divisions per axis
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Set the candidate cap
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.generator.max_candidates = max;
        self
    }

    /// Enable or disable the empty-cell strategy
    pub fn with_empty_region_strategy(mut self, enabled: bool) -> Self {
        self.generator.empty_region_strategy = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlacementConfig::default();
        assert_eq!(config.grid_size, 3);
        assert_eq!(config.scoring.hierarchy_weight, 50.0);
        assert_eq!(config.scoring.collision_weight, 40.0);
        assert_eq!(config.space.subject_margin, 40.0);
        assert_eq!(config.generator.grid_step, 80.0);
        assert_eq!(config.generator.max_candidates, 100);
        assert_eq!(config.fallback, FallbackConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PlacementConfig::new()
            .with_grid_size(4)
            .with_max_candidates(10)
            .with_empty_region_strategy(true);

        assert_eq!(config.grid_size, 4);
        assert_eq!(config.generator.max_candidates, 10);
        assert!(config.generator.empty_region_strategy);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PlacementConfig::from_toml_str(
            r#"
grid_size = 4

[scoring]
collision_weight = 60.0

[fallback]
x = 10
"#,
        )
        .unwrap();

        assert_eq!(config.grid_size, 4);
        assert_eq!(config.scoring.collision_weight, 60.0);
        assert_eq!(config.scoring.hierarchy_weight, 50.0);
        assert_eq!(config.fallback.x, 10);
        assert_eq!(config.fallback.y, 40);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PlacementConfig::from_toml_str("grid_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "grid_size", .. }));

        let err = PlacementConfig::from_toml_str("[generator]\ngrid_step = -4.0").unwrap_err();
        assert!(err.to_string().contains("grid_step"));
    }

    #[test]
    fn test_degenerate_sampling_rejected() {
        for toml in [
            "[generator]\ngrid_step = 1e-300",
            "[generator]\ngrid_step = 0.5",
            "[generator]\ndedup_tolerance = -1.0",
            "[generator]\ngrid_margin = -10.0",
            "[space]\nfit_margin = -5.0",
            "[space]\nmax_regions = 0",
        ] {
            let err = PlacementConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{}: {}", toml, err);
        }
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut config = PlacementConfig::default();
        config.generator.grid_step = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = PlacementConfig::default();
        config.space.subject_margin = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "space.subject_margin", .. })
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = PlacementConfig::from_toml_str("grid_size = \"three\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
