//! Graduated constraint scoring for candidate rectangles
//!
//! A candidate starts at 100 points. Hard constraints short-circuit with the
//! [`DISQUALIFIED`] sentinel or apply heavy penalties, soft constraints
//! subtract in proportion to severity, and bonuses reward alignment, empty
//! surroundings and clearance. The result is clamped to `[0, 100]`.

use super::config::ScoringConfig;
use super::grid::SpatialGrid;
use super::rules::{HierarchyRule, RuleTable};
use super::types::{ElementKind, Rect, Size};

/// Score of a candidate that may not be used at all
pub const DISQUALIFIED: f64 = -100.0;

const PERFECT: f64 = 100.0;

/// Why a candidate was rejected outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disqualification {
    OutOfBounds,
    OutsideContainment,
}

/// Outcome of scoring one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: f64,
    pub reasoning: Vec<String>,
    pub disqualified: Option<Disqualification>,
}

impl Evaluation {
    fn rejected(reason: Disqualification, message: String) -> Self {
        Self {
            score: DISQUALIFIED,
            reasoning: vec![message],
            disqualified: Some(reason),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.disqualified.is_none()
    }
}

/// Scores candidate rectangles against the canvas and existing elements
pub struct ConstraintScorer<'a> {
    canvas: Size,
    grid: &'a SpatialGrid,
    containment: Option<Rect>,
    obstacle: Option<Rect>,
    config: &'a ScoringConfig,
    rules: &'a RuleTable,
    density: Vec<Vec<f64>>,
}

impl<'a> ConstraintScorer<'a> {
    pub fn new(
        grid: &'a SpatialGrid,
        containment: Option<Rect>,
        obstacle: Option<Rect>,
        config: &'a ScoringConfig,
        rules: &'a RuleTable,
    ) -> Self {
        Self {
            canvas: grid.canvas(),
            grid,
            containment,
            obstacle,
            config,
            rules,
            density: grid.density_map(),
        }
    }

    pub fn containment(&self) -> Option<Rect> {
        self.containment
    }

    /// Score a candidate rectangle for an element of `kind`
    pub fn score(&self, candidate: &Rect, kind: ElementKind) -> Evaluation {
        let cfg = self.config;

        if candidate.x < 0.0
            || candidate.y < 0.0
            || candidate.right() > self.canvas.width
            || candidate.bottom() > self.canvas.height
        {
            return Evaluation::rejected(
                Disqualification::OutOfBounds,
                "OUT OF BOUNDS - Invalid".to_string(),
            );
        }

        let mut score = PERFECT;
        let mut reasoning = Vec::new();

        let (penalty, message) = self.hierarchy_penalty(candidate, kind);
        score -= penalty;
        reasoning.extend(message);

        let (penalty, message) = self.collision_penalty(candidate);
        score -= penalty;
        reasoning.push(message);

        if let Some(bounds) = self.containment {
            let inside = candidate.overlap_area(&bounds) / candidate.area();
            if inside <= cfg.containment_min_fraction {
                return Evaluation::rejected(
                    Disqualification::OutsideContainment,
                    format!(
                        "-100pts: Outside working area ({:.0}% inside)",
                        inside * 100.0
                    ),
                );
            }
            let (adjustment, message) = self.containment_adjustment(inside);
            score += adjustment;
            reasoning.push(message);
        }

        if let Some(obstacle) = self.obstacle {
            let fraction = candidate.overlap_area(&obstacle) / candidate.area();
            if fraction > 0.0 {
                let penalty = fraction * cfg.obstacle_weight;
                score -= penalty;
                reasoning.push(format!(
                    "-{:.1}pts: {:.1}% overlap with obstacle",
                    penalty,
                    fraction * 100.0
                ));
            }
        }

        if self.is_grid_aligned(candidate) {
            score += cfg.alignment_bonus;
            reasoning.push(format!("+{:.0}pts: Grid aligned", cfg.alignment_bonus));
        }

        if self.is_in_empty_cell(candidate) {
            score += cfg.empty_region_bonus;
            reasoning.push(format!("+{:.0}pts: Empty region", cfg.empty_region_bonus));
        }

        if self.has_edge_clearance(candidate) {
            score += cfg.spacing_bonus;
            reasoning.push(format!("+{:.0}pts: Good margins", cfg.spacing_bonus));
        }

        Evaluation {
            score: score.clamp(0.0, PERFECT),
            reasoning,
            disqualified: None,
        }
    }

    fn hierarchy_penalty(&self, candidate: &Rect, kind: ElementKind) -> (f64, Option<String>) {
        let fraction = candidate.y / self.canvas.height;
        match &self.rules.get(kind).hierarchy {
            HierarchyRule::None => (0.0, None),
            HierarchyRule::StayAbove {
                max_fraction,
                penalty,
                optimal_fraction,
            } => {
                if fraction > *max_fraction {
                    let message = format!(
                        "-{:.0}pts: {} too low (at {:.0}%, should be <{:.0}%)",
                        penalty,
                        capitalize(kind.as_str()),
                        fraction * 100.0,
                        max_fraction * 100.0
                    );
                    (*penalty, Some(message))
                } else {
                    match optimal_fraction {
                        Some(optimal) if fraction <= *optimal => {
                            let message = format!(
                                "{} in optimal position (top {:.0}%)",
                                capitalize(kind.as_str()),
                                optimal * 100.0
                            );
                            (0.0, Some(message))
                        }
                        _ => (0.0, None),
                    }
                }
            }
            HierarchyRule::AvoidBand { low, high, penalty } => {
                if fraction > *low && fraction < *high {
                    let message = format!(
                        "-{:.0}pts: {} in middle band (prefer corners)",
                        penalty,
                        capitalize(kind.as_str())
                    );
                    (*penalty, Some(message))
                } else {
                    (0.0, None)
                }
            }
        }
    }

    fn collision_penalty(&self, candidate: &Rect) -> (f64, String) {
        let colliding = self.grid.elements_in_region(candidate);
        if colliding.is_empty() {
            return (0.0, "No collisions".to_string());
        }
        let overlap: f64 = colliding
            .iter()
            .map(|e| e.bounds.overlap_area(candidate))
            .sum();
        let fraction = overlap / candidate.area();
        let penalty = fraction * self.config.collision_weight;
        let message = format!(
            "-{:.1}pts: {:.1}% collision with {} element(s)",
            penalty,
            fraction * 100.0,
            colliding.len()
        );
        (penalty, message)
    }

    /// Positive values are bonuses; `inside` is above the disqualification floor
    fn containment_adjustment(&self, inside: f64) -> (f64, String) {
        let cfg = self.config;
        if inside >= cfg.containment_full_fraction {
            (
                cfg.containment_full_bonus,
                format!("+{:.0}pts: Fully inside working area", cfg.containment_full_bonus),
            )
        } else if inside >= cfg.containment_mostly_fraction {
            (
                cfg.containment_mostly_bonus,
                format!(
                    "+{:.0}pts: Mostly inside working area ({:.0}%)",
                    cfg.containment_mostly_bonus,
                    inside * 100.0
                ),
            )
        } else {
            let penalty = (1.0 - inside) * cfg.containment_outside_weight;
            (
                -penalty,
                format!(
                    "-{:.1}pts: Partially outside working area ({:.0}% inside)",
                    penalty,
                    inside * 100.0
                ),
            )
        }
    }

    fn is_grid_aligned(&self, candidate: &Rect) -> bool {
        let grid = self.config.alignment_grid;
        let tolerance = self.config.alignment_tolerance;
        let aligned = |v: f64| {
            let rem = v.rem_euclid(grid);
            rem < tolerance || rem > grid - tolerance
        };
        aligned(candidate.x) && aligned(candidate.y)
    }

    fn is_in_empty_cell(&self, candidate: &Rect) -> bool {
        let (row, col) = self.grid.cell_at(candidate.center());
        self.density[row][col] < self.config.empty_region_density
    }

    fn has_edge_clearance(&self, candidate: &Rect) -> bool {
        let margin = self.config.edge_clearance;
        candidate.x >= margin
            && candidate.y >= margin
            && candidate.right() <= self.canvas.width - margin
            && candidate.bottom() <= self.canvas.height - margin
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::config::PlacementConfig;
    use crate::placement::types::Element;

    struct Fixture {
        grid: SpatialGrid,
        config: PlacementConfig,
        rules: RuleTable,
    }

    impl Fixture {
        fn new(width: f64, height: f64, elements: Vec<Element>) -> Self {
            let config = PlacementConfig::default();
            Self {
                grid: SpatialGrid::with_elements(Size::new(width, height), 3, elements),
                rules: RuleTable::from_config(&config),
                config,
            }
        }

        fn scorer(&self, containment: Option<Rect>, obstacle: Option<Rect>) -> ConstraintScorer<'_> {
            ConstraintScorer::new(
                &self.grid,
                containment,
                obstacle,
                &self.config.scoring,
                &self.rules,
            )
        }
    }

    #[test]
    fn test_out_of_bounds_is_sentinel() {
        let fixture = Fixture::new(800.0, 600.0, vec![]);
        let eval = fixture
            .scorer(None, None)
            .score(&Rect::new(750.0, 10.0, 100.0, 50.0), ElementKind::Logo);
        assert_eq!(eval.score, DISQUALIFIED);
        assert_eq!(eval.disqualified, Some(Disqualification::OutOfBounds));
    }

    #[test]
    fn test_headline_too_low_penalized() {
        let fixture = Fixture::new(1000.0, 1000.0, vec![]);
        let scorer = fixture.scorer(None, None);
        // y = 500 (50%): -50, empty cell +15, clearance +5, aligned (x=40, y=500 rem 20) no
        let eval = scorer.score(&Rect::new(40.0, 500.0, 200.0, 50.0), ElementKind::Headline);
        assert_eq!(eval.score, 70.0);
        assert!(eval.reasoning[0].starts_with("-50pts: Headline too low"));
    }

    #[test]
    fn test_headline_optimal_noted_without_bonus() {
        let fixture = Fixture::new(1000.0, 1000.0, vec![]);
        let eval = fixture
            .scorer(None, None)
            .score(&Rect::new(50.0, 50.0, 200.0, 50.0), ElementKind::Headline);
        assert_eq!(eval.reasoning[0], "Headline in optimal position (top 15%)");
        assert_eq!(eval.score, 100.0);
    }

    #[test]
    fn test_badge_middle_band() {
        let fixture = Fixture::new(1000.0, 1000.0, vec![]);
        let scorer = fixture.scorer(None, None);
        let band_note = "-10pts: Badge in middle band (prefer corners)".to_string();
        let middle = scorer.score(&Rect::new(50.0, 500.0, 50.0, 50.0), ElementKind::Badge);
        let corner = scorer.score(&Rect::new(50.0, 850.0, 50.0, 50.0), ElementKind::Badge);
        assert!(middle.reasoning.contains(&band_note));
        assert!(!corner.reasoning.contains(&band_note));
    }

    #[test]
    fn test_collision_penalty_proportional() {
        let fixture = Fixture::new(
            1000.0,
            1000.0,
            vec![Element::new("a", ElementKind::Text, Rect::new(0.0, 0.0, 100.0, 100.0))],
        );
        let scorer = fixture.scorer(None, None);
        // Half of a 100x100 candidate overlaps the element: -20
        let eval = scorer.score(&Rect::new(50.0, 0.0, 100.0, 100.0), ElementKind::Generic);
        assert!(eval
            .reasoning
            .contains(&"-20.0pts: 50.0% collision with 1 element(s)".to_string()));
    }

    #[test]
    fn test_containment_tiers() {
        let fixture = Fixture::new(1000.0, 1000.0, vec![]);
        let bounds = Rect::new(0.0, 0.0, 500.0, 500.0);
        let scorer = fixture.scorer(Some(bounds), None);

        let inside = scorer.score(&Rect::new(100.0, 100.0, 100.0, 100.0), ElementKind::Generic);
        assert!(inside.reasoning.iter().any(|r| r.starts_with("+30pts")));

        // 80% inside
        let mostly = scorer.score(&Rect::new(420.0, 100.0, 100.0, 100.0), ElementKind::Generic);
        assert!(mostly.reasoning.iter().any(|r| r.starts_with("+15pts")));

        // 30% inside: -(0.7 * 40) = -28
        let partial = scorer.score(&Rect::new(470.0, 100.0, 100.0, 100.0), ElementKind::Generic);
        assert!(partial.reasoning.iter().any(|r| r.starts_with("-28.0pts")));

        let outside = scorer.score(&Rect::new(600.0, 600.0, 100.0, 100.0), ElementKind::Generic);
        assert_eq!(outside.score, DISQUALIFIED);
        assert_eq!(
            outside.disqualified,
            Some(Disqualification::OutsideContainment)
        );
    }

    #[test]
    fn test_obstacle_overlap_penalized() {
        let fixture = Fixture::new(1000.0, 1000.0, vec![]);
        let obstacle = Rect::new(0.0, 0.0, 500.0, 500.0);
        let clear = fixture.scorer(None, None);
        let avoiding = fixture.scorer(None, Some(obstacle));

        let rect = Rect::new(350.0, 350.0, 100.0, 100.0);
        let base = clear.score(&rect, ElementKind::Generic).score;
        let penalized = avoiding.score(&rect, ElementKind::Generic).score;
        assert!(penalized < base);
        assert!(avoiding
            .score(&rect, ElementKind::Generic)
            .reasoning
            .iter()
            .any(|r| r.contains("overlap with obstacle")));
    }

    #[test]
    fn test_grid_alignment_tolerance() {
        let fixture = Fixture::new(1000.0, 1000.0, vec![]);
        let scorer = fixture.scorer(None, None);
        assert!(scorer.is_grid_aligned(&Rect::new(82.0, 118.0, 10.0, 10.0)));
        assert!(!scorer.is_grid_aligned(&Rect::new(90.0, 120.0, 10.0, 10.0)));
    }

    #[test]
    fn test_score_clamped_to_range() {
        let fixture = Fixture::new(1000.0, 1000.0, vec![]);
        let eval = fixture
            .scorer(None, None)
            .score(&Rect::new(40.0, 40.0, 100.0, 100.0), ElementKind::Generic);
        assert_eq!(eval.score, 100.0);
    }
}
