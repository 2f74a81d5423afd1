//! Placement engine façade
//!
//! Validates and normalizes a query, wires the grid, scorer, analyzer and
//! generator together, and turns the ranked list into a single answer.
//! [`PlacementEngine::place`] never fails: errors, panics and empty candidate
//! lists all resolve to the configured fallback position.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::{FallbackConfig, PlacementConfig};
use super::error::PlacementError;
use super::generator::{CandidateGenerator, PlacementCandidate};
use super::grid::SpatialGrid;
use super::rules::RuleTable;
use super::scorer::ConstraintScorer;
use super::space::SpaceAnalyzer;
use super::types::{Element, ElementKind, Rect, Size};

/// Number of scorer reasons quoted in the final reasoning
const QUOTED_REASONS: usize = 3;

/// Everything needed to place one element
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementQuery {
    pub canvas: Size,
    pub elements: Vec<Element>,
    pub kind: ElementKind,
    pub width: f64,
    pub height: f64,
    /// Area the new element should stay inside
    pub containment: Option<Rect>,
    /// Area the new element should stay clear of
    pub obstacle: Option<Rect>,
}

impl PlacementQuery {
    pub fn new(canvas: Size, kind: ElementKind, width: f64, height: f64) -> Self {
        Self {
            canvas,
            elements: vec![],
            kind,
            width,
            height,
            containment: None,
            obstacle: None,
        }
    }

    pub fn with_elements(mut self, elements: Vec<Element>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_containment(mut self, bounds: Rect) -> Self {
        self.containment = Some(bounds);
        self
    }

    pub fn with_obstacle(mut self, bounds: Rect) -> Self {
        self.obstacle = Some(bounds);
        self
    }

    /// Reject geometry the engine cannot reason about
    pub fn validate(&self) -> Result<(), PlacementError> {
        check("canvas", self.canvas.to_rect())?;
        check(
            "element to place",
            Rect::new(0.0, 0.0, self.width, self.height),
        )?;

        let mut ids = BTreeSet::new();
        for element in &self.elements {
            check(&format!("element '{}'", element.id), element.bounds)?;
            if !ids.insert(element.id.as_str()) {
                return Err(PlacementError::duplicate_id(&element.id));
            }
        }

        if let Some(bounds) = self.containment {
            check("containment bounds", bounds)?;
        }
        if let Some(bounds) = self.obstacle {
            check("obstacle bounds", bounds)?;
        }
        Ok(())
    }

    /// Copy of the query with every rectangle pulled onto the canvas
    fn normalized(&self) -> Self {
        let canvas = self.canvas;
        let elements = self
            .elements
            .iter()
            .map(|element| {
                let clamped = element.bounds.clamped_into(canvas);
                if clamped != element.bounds {
                    warn!(
                        "clamped element '{}' from ({:.0}, {:.0}) to ({:.0}, {:.0})",
                        element.id, element.bounds.x, element.bounds.y, clamped.x, clamped.y
                    );
                }
                Element {
                    bounds: clamped,
                    ..element.clone()
                }
            })
            .collect();

        Self {
            elements,
            containment: self.containment.map(|b| fit_bounds("containment", b, canvas)),
            obstacle: self.obstacle.map(|b| fit_bounds("obstacle", b, canvas)),
            ..self.clone()
        }
    }
}

/// Validate a rectangle, naming `subject` in the error
fn check(subject: &str, rect: Rect) -> Result<Rect, PlacementError> {
    Rect::try_new(rect.x, rect.y, rect.width, rect.height).map_err(|err| match err {
        PlacementError::InvalidGeometry { reason, .. } => {
            PlacementError::invalid_geometry(subject, reason)
        }
        other => other,
    })
}

/// Shrink bounds to the canvas size, then clamp the origin
fn fit_bounds(name: &str, bounds: Rect, canvas: Size) -> Rect {
    let shrunk = Rect::new(
        bounds.x,
        bounds.y,
        bounds.width.min(canvas.width),
        bounds.height.min(canvas.height),
    );
    let fitted = shrunk.clamped_into(canvas);
    if fitted != bounds {
        warn!(
            "clamped {} bounds from ({:.0}, {:.0}, {:.0}x{:.0}) to ({:.0}, {:.0}, {:.0}x{:.0})",
            name,
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            fitted.x,
            fitted.y,
            fitted.width,
            fitted.height
        );
    }
    fitted
}

/// Final answer for one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    /// Score of the chosen candidate divided by 100
    pub confidence: f64,
    pub reasoning: String,
}

impl Placement {
    /// The configured safe position
    pub fn fallback(config: &FallbackConfig, reasoning: impl Into<String>) -> Self {
        Self {
            x: config.x,
            y: config.y,
            confidence: config.confidence,
            reasoning: reasoning.into(),
        }
    }

    fn from_candidate(candidate: &PlacementCandidate) -> Self {
        let reasons: Vec<&str> = candidate
            .reasoning
            .iter()
            .take(QUOTED_REASONS)
            .map(String::as_str)
            .collect();
        Self {
            // Candidates lie on the canvas, so flooring never crosses its far edge
            x: candidate.x.floor() as i64,
            y: candidate.y.floor() as i64,
            confidence: candidate.score / 100.0,
            reasoning: format!(
                "{} placement (score: {:.1}). {}",
                candidate.method,
                candidate.score,
                reasons.join(" ")
            ),
        }
    }
}

/// Deterministic placement engine.
///
/// Holds only immutable configuration, so one engine can serve any number
/// of queries, from any number of threads.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    config: PlacementConfig,
    rules: RuleTable,
}

impl PlacementEngine {
    pub fn new(config: PlacementConfig) -> Self {
        let rules = RuleTable::from_config(&config);
        Self { config, rules }
    }

    /// Use a custom rule table instead of the one derived from the config
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Every surviving candidate, best first
    pub fn rank(&self, query: &PlacementQuery) -> Result<Vec<PlacementCandidate>, PlacementError> {
        self.config.validate()?;
        query.validate()?;
        let query = query.normalized();

        let grid = SpatialGrid::with_elements(
            query.canvas,
            self.config.grid_size,
            query.elements.clone(),
        );
        debug!(
            "indexed {} element(s) in a {n}x{n} grid",
            grid.len(),
            n = grid.grid_size()
        );
        let scorer = ConstraintScorer::new(
            &grid,
            query.containment,
            query.obstacle,
            &self.config.scoring,
            &self.rules,
        );
        let analyzer = SpaceAnalyzer::new(
            &grid,
            query.containment,
            query.obstacle,
            &self.config.space,
            &self.rules,
        );
        let generator = CandidateGenerator::new(
            &grid,
            &scorer,
            &analyzer,
            &self.config.generator,
            &self.rules,
        );

        let candidates = generator.generate(query.width, query.height, query.kind);
        debug!(
            "{} candidate(s) for {} {:.0}x{:.0}",
            candidates.len(),
            query.kind,
            query.width,
            query.height
        );
        Ok(candidates)
    }

    /// Best placement for the query, or the fallback position
    pub fn place(&self, query: &PlacementQuery) -> Placement {
        let fallback = &self.config.fallback;
        let ranked = match panic::catch_unwind(AssertUnwindSafe(|| self.rank(query))) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(PlacementError::internal(message))
            }
        };

        match ranked {
            Ok(candidates) => match candidates.first() {
                Some(best) => {
                    let placement = Placement::from_candidate(best);
                    info!(
                        "placed {} at ({}, {}) with confidence {:.2} via {}",
                        query.kind, placement.x, placement.y, placement.confidence, best.method
                    );
                    placement
                }
                None => {
                    warn!("no valid placements for {}", query.kind);
                    Placement::fallback(fallback, "no valid placements found")
                }
            },
            Err(err) => {
                warn!("placement failed: {}", err);
                Placement::fallback(fallback, format!("placement failed: {}", err))
            }
        }
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}
