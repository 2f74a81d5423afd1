//! Candidate generation and ranking
//!
//! Candidates come from several independent strategies: free-space
//! analysis, grid sampling, anchoring to existing elements, optionally
//! empty cells, and conventional per-kind spots. Proposals within the dedup
//! tolerance of an earlier one are dropped, the rest are scored, and the
//! ranked list keeps generation order on ties.

use serde::Serialize;
use tracing::{debug, warn};

use super::config::{GeneratorConfig, MIN_GRID_STEP};
use super::grid::SpatialGrid;
use super::rules::{AnchorRule, HAlign, RuleTable, SamplingRule, VAlign};
use super::scorer::ConstraintScorer;
use super::space::SpaceAnalyzer;
use super::types::{Element, ElementKind, Point, Rect};

/// A scored placement proposal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementCandidate {
    pub x: f64,
    pub y: f64,
    pub score: f64,
    pub reasoning: Vec<String>,
    /// Strategy tag, e.g. `space-analysis` or `anchor-below`
    pub method: String,
}

/// An unscored position produced by a strategy
#[derive(Debug, Clone, PartialEq)]
struct Proposal {
    x: f64,
    y: f64,
    method: String,
    note: Option<String>,
}

impl Proposal {
    fn new(x: f64, y: f64, method: impl Into<String>) -> Self {
        Self {
            x,
            y,
            method: method.into(),
            note: None,
        }
    }

    fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Produces a deduplicated, scored and ranked candidate list
pub struct CandidateGenerator<'a> {
    grid: &'a SpatialGrid,
    scorer: &'a ConstraintScorer<'a>,
    analyzer: &'a SpaceAnalyzer<'a>,
    config: &'a GeneratorConfig,
    rules: &'a RuleTable,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(
        grid: &'a SpatialGrid,
        scorer: &'a ConstraintScorer<'a>,
        analyzer: &'a SpaceAnalyzer<'a>,
        config: &'a GeneratorConfig,
        rules: &'a RuleTable,
    ) -> Self {
        Self {
            grid,
            scorer,
            analyzer,
            config,
            rules,
        }
    }

    /// Ranked candidates for an element, best first, capped at `max_candidates`.
    ///
    /// Disqualified positions never appear in the result, so an element that
    /// cannot fit the canvas yields an empty list.
    pub fn generate(&self, width: f64, height: f64, kind: ElementKind) -> Vec<PlacementCandidate> {
        let canvas = self.grid.canvas();
        if width > canvas.width || height > canvas.height {
            debug!(
                "{} {:.0}x{:.0} exceeds canvas {:.0}x{:.0}",
                kind, width, height, canvas.width, canvas.height
            );
            return vec![];
        }

        let mut proposals = Vec::new();
        proposals.extend(self.space_analysis(width, height, kind));
        proposals.extend(self.grid_sampling(width, height, kind));
        proposals.extend(self.anchor_based(width, height, kind));
        if self.config.empty_region_strategy {
            proposals.extend(self.empty_regions(width, height));
        }
        proposals.extend(self.conventional_spots(width, height, kind));

        let generated = proposals.len();
        let unique = self.deduplicate(proposals);
        debug!("{} proposal(s), {} after dedup", generated, unique.len());

        let mut candidates: Vec<PlacementCandidate> = unique
            .into_iter()
            .filter_map(|proposal| {
                let rect = Rect::new(proposal.x, proposal.y, width, height);
                let evaluation = self.scorer.score(&rect, kind);
                if !evaluation.is_valid() {
                    return None;
                }
                let mut reasoning: Vec<String> = proposal.note.into_iter().collect();
                reasoning.extend(evaluation.reasoning);
                Some(PlacementCandidate {
                    x: proposal.x,
                    y: proposal.y,
                    score: evaluation.score,
                    reasoning,
                    method: proposal.method,
                })
            })
            .collect();

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(self.config.max_candidates);
        candidates
    }

    fn space_analysis(&self, width: f64, height: f64, kind: ElementKind) -> Vec<Proposal> {
        match self.analyzer.best_positions(width, height, kind) {
            Ok(positions) => positions
                .into_iter()
                .map(|p| Proposal {
                    x: p.x,
                    y: p.y,
                    method: "space-analysis".to_string(),
                    note: Some(p.reasoning),
                })
                .collect(),
            Err(err) => {
                warn!("space analysis skipped: {}", err);
                vec![]
            }
        }
    }

    fn grid_sampling(&self, width: f64, height: f64, kind: ElementKind) -> Vec<Proposal> {
        let Some(bounds) = self.scorer.containment() else {
            return self.uniform_samples(self.grid.canvas().to_rect(), width, height);
        };

        let margin = self.config.grid_margin;
        match self.rules.get(kind).sampling {
            SamplingRule::Uniform => self.uniform_samples(bounds, width, height),
            SamplingRule::Bands => {
                let density = self.grid.density_map();
                let n = self.grid.grid_size();
                let (cell_width, _) = self.grid.cell_size();
                let mut proposals = Vec::new();
                let bands = [
                    (0, self.config.top_band_density, bounds.y + margin, "grid-top"),
                    (
                        n - 1,
                        self.config.bottom_band_density,
                        bounds.bottom() - height - margin,
                        "grid-bottom",
                    ),
                ];
                for (row, max_density, y, method) in bands {
                    for (col, cell_density) in density[row].iter().enumerate() {
                        if *cell_density >= max_density {
                            continue;
                        }
                        let x = bounds.x + col as f64 * cell_width + margin;
                        if x + width <= bounds.right() - margin {
                            proposals.push(Proposal::new(x, y, method));
                        }
                    }
                }
                proposals
            }
            SamplingRule::BottomCorners => {
                let y = bounds.bottom() - height - margin;
                vec![
                    Proposal::new(bounds.x + margin, y, "grid-corner"),
                    Proposal::new(bounds.right() - width - margin, y, "grid-corner"),
                ]
            }
        }
    }

    fn uniform_samples(&self, area: Rect, width: f64, height: f64) -> Vec<Proposal> {
        let margin = self.config.grid_margin;
        let step = self.config.grid_step;
        if !step.is_finite() || step < MIN_GRID_STEP {
            warn!("grid sampling skipped: step {} below {}", step, MIN_GRID_STEP);
            return vec![];
        }
        let mut proposals = Vec::new();
        let mut x = area.x + margin;
        while x + width <= area.right() - margin {
            let mut y = area.y + margin;
            while y + height <= area.bottom() - margin {
                proposals.push(Proposal::new(x, y, "grid"));
                y += step;
            }
            x += step;
        }
        proposals
    }

    fn anchor_based(&self, width: f64, height: f64, kind: ElementKind) -> Vec<Proposal> {
        let gap = self.config.anchor_gap;
        let rule = &self.rules.get(kind).anchor;
        let mut proposals = Vec::new();

        for element in self.grid.elements() {
            let r = element.bounds;
            match rule {
                AnchorRule::StackBelow { targets } if targets.contains(&element.kind) => {
                    let y = r.bottom() + gap;
                    proposals.push(Proposal::new(
                        r.x,
                        y,
                        format!("anchor-below-{}", element.kind),
                    ));
                    proposals.push(Proposal::new(
                        r.center().x - width / 2.0,
                        y,
                        "anchor-centered",
                    ));
                }
                AnchorRule::Sides { avoid } => {
                    if avoid.contains(&element.kind) {
                        continue;
                    }
                    for (x, y) in [
                        (r.x - width - gap, r.y),
                        (r.right() + gap, r.y),
                        (r.x, r.y - height - gap),
                        (r.x, r.bottom() + gap),
                    ] {
                        proposals.push(Proposal::new(x, y, "anchor-badge"));
                    }
                }
                _ => proposals.extend(cardinal(element, width, height, gap)),
            }
        }
        proposals
    }

    fn empty_regions(&self, width: f64, height: f64) -> Vec<Proposal> {
        let canvas = self.grid.canvas();
        let (cell_width, cell_height) = self.grid.cell_size();
        let inset = self.config.empty_corner_inset;
        let mut proposals = Vec::new();

        for (row, col) in self.grid.empty_cells(self.config.empty_region_threshold) {
            let center = self.grid.cell_center(row, col);
            proposals.push(Proposal::new(
                center.x - width / 2.0,
                center.y - height / 2.0,
                "empty-region",
            ));

            let cell = self.grid.cell_bounds(row, col);
            for (x, y) in [
                (cell.x + inset, cell.y + inset),
                (cell.x + cell_width - width - inset, cell.y + inset),
                (cell.x + inset, cell.y + cell_height - height - inset),
            ] {
                if x >= 0.0 && x <= canvas.width - width && y >= 0.0 && y <= canvas.height - height
                {
                    proposals.push(Proposal::new(x, y, "empty-corner"));
                }
            }
        }
        proposals
    }

    fn conventional_spots(&self, width: f64, height: f64, kind: ElementKind) -> Vec<Proposal> {
        let area = self.analyzer.working_area();
        let margin = self.config.conventional_margin;
        self.rules
            .get(kind)
            .spots
            .iter()
            .map(|spot| {
                let x = match spot.horizontal {
                    HAlign::Start => area.x + margin,
                    HAlign::Center => area.x + (area.width - width) / 2.0,
                    HAlign::End => area.right() - width - margin,
                };
                let y = match spot.vertical {
                    VAlign::Top => area.y + margin,
                    VAlign::Bottom => area.bottom() - height - margin,
                } - spot.lift;
                Proposal::new(x, y, format!("type-specific-{}-{}", kind, spot.label))
            })
            .collect()
    }

    fn deduplicate(&self, proposals: Vec<Proposal>) -> Vec<Proposal> {
        let mut unique: Vec<Proposal> = Vec::new();
        for proposal in proposals {
            let duplicate = unique
                .iter()
                .any(|kept| kept.point().distance(proposal.point()) < self.config.dedup_tolerance);
            if !duplicate {
                unique.push(proposal);
            }
        }
        unique
    }
}

/// Below, above, right and left of an element
fn cardinal(element: &Element, width: f64, height: f64, gap: f64) -> Vec<Proposal> {
    let r = element.bounds;
    vec![
        Proposal::new(r.x, r.bottom() + gap, "anchor-below"),
        Proposal::new(r.x, r.y - height - gap, "anchor-above"),
        Proposal::new(r.right() + gap, r.y, "anchor-right"),
        Proposal::new(r.x - width - gap, r.y, "anchor-left"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::config::PlacementConfig;
    use crate::placement::types::Size;

    struct Fixture {
        grid: SpatialGrid,
        config: PlacementConfig,
        rules: RuleTable,
        containment: Option<Rect>,
    }

    impl Fixture {
        fn new(width: f64, height: f64, elements: Vec<Element>) -> Self {
            Self::with_config(width, height, elements, PlacementConfig::default())
        }

        fn with_config(
            width: f64,
            height: f64,
            elements: Vec<Element>,
            config: PlacementConfig,
        ) -> Self {
            Self {
                grid: SpatialGrid::with_elements(Size::new(width, height), config.grid_size, elements),
                rules: RuleTable::from_config(&config),
                config,
                containment: None,
            }
        }

        fn contained_by(mut self, bounds: Rect) -> Self {
            self.containment = Some(bounds);
            self
        }

        fn run<T>(&self, f: impl FnOnce(&CandidateGenerator<'_>) -> T) -> T {
            let scorer = ConstraintScorer::new(
                &self.grid,
                self.containment,
                None,
                &self.config.scoring,
                &self.rules,
            );
            let analyzer = SpaceAnalyzer::new(
                &self.grid,
                self.containment,
                None,
                &self.config.space,
                &self.rules,
            );
            let generator = CandidateGenerator::new(
                &self.grid,
                &scorer,
                &analyzer,
                &self.config.generator,
                &self.rules,
            );
            f(&generator)
        }
    }

    fn el(id: &str, kind: ElementKind, x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(id, kind, Rect::new(x, y, w, h))
    }

    #[test]
    fn test_oversized_element_yields_nothing() {
        let fixture = Fixture::new(800.0, 600.0, vec![]);
        let candidates = fixture.run(|g| g.generate(900.0, 100.0, ElementKind::Headline));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_candidates_sorted_and_capped() {
        let config = PlacementConfig::default().with_max_candidates(5);
        let fixture = Fixture::with_config(800.0, 600.0, vec![], config);
        let candidates = fixture.run(|g| g.generate(100.0, 50.0, ElementKind::Generic));
        assert_eq!(candidates.len(), 5);
        for pair in candidates.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_uniform_grid_samples() {
        let fixture = Fixture::new(400.0, 300.0, vec![]);
        let area = Rect::new(0.0, 0.0, 400.0, 300.0);
        let samples = fixture.run(|g| g.uniform_samples(area, 100.0, 100.0));
        let points: Vec<(f64, f64)> = samples.iter().map(|p| (p.x, p.y)).collect();
        // x in {50, 130, 210}, y in {50, 130}
        assert_eq!(
            points,
            vec![
                (50.0, 50.0),
                (50.0, 130.0),
                (130.0, 50.0),
                (130.0, 130.0),
                (210.0, 50.0),
                (210.0, 130.0),
            ]
        );
    }

    #[test]
    fn test_subheading_stacks_below_headline() {
        let fixture = Fixture::new(
            800.0,
            600.0,
            vec![el("h", ElementKind::Headline, 100.0, 50.0, 400.0, 80.0)],
        );
        let proposals = fixture.run(|g| g.anchor_based(200.0, 40.0, ElementKind::Subheading));
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].method, "anchor-below-headline");
        assert_eq!((proposals[0].x, proposals[0].y), (100.0, 150.0));
        assert_eq!(proposals[1].method, "anchor-centered");
        assert_eq!((proposals[1].x, proposals[1].y), (200.0, 150.0));
    }

    #[test]
    fn test_degenerate_step_yields_no_samples() {
        let mut config = PlacementConfig::default();
        config.generator.grid_step = 0.0;
        let fixture = Fixture::with_config(400.0, 300.0, vec![], config);
        let area = Rect::new(0.0, 0.0, 400.0, 300.0);
        assert!(fixture.run(|g| g.uniform_samples(area, 100.0, 100.0)).is_empty());
    }

    #[test]
    fn test_badge_skips_other_badges() {
        let fixture = Fixture::new(
            800.0,
            600.0,
            vec![
                el("b", ElementKind::Badge, 10.0, 10.0, 50.0, 50.0),
                el("l", ElementKind::Logo, 300.0, 300.0, 100.0, 50.0),
            ],
        );
        let proposals = fixture.run(|g| g.anchor_based(60.0, 60.0, ElementKind::Badge));
        assert_eq!(proposals.len(), 4);
        assert!(proposals.iter().all(|p| p.method == "anchor-badge"));
        assert_eq!((proposals[0].x, proposals[0].y), (220.0, 300.0));
    }

    #[test]
    fn test_generic_uses_cardinal_directions() {
        let fixture = Fixture::new(
            800.0,
            600.0,
            vec![el("i", ElementKind::Image, 300.0, 200.0, 100.0, 100.0)],
        );
        let proposals = fixture.run(|g| g.anchor_based(50.0, 50.0, ElementKind::Logo));
        let methods: Vec<&str> = proposals.iter().map(|p| p.method.as_str()).collect();
        assert_eq!(
            methods,
            vec!["anchor-below", "anchor-above", "anchor-right", "anchor-left"]
        );
    }

    #[test]
    fn test_dedup_first_seen_wins() {
        let fixture = Fixture::new(800.0, 600.0, vec![]);
        let unique = fixture.run(|g| {
            g.deduplicate(vec![
                Proposal::new(100.0, 100.0, "first"),
                Proposal::new(106.0, 106.0, "second"),
                Proposal::new(110.0, 100.0, "third"),
            ])
        });
        let methods: Vec<&str> = unique.iter().map(|p| p.method.as_str()).collect();
        // (106,106) is 8.5px away, (110,100) exactly 10px
        assert_eq!(methods, vec!["first", "third"]);
    }

    #[test]
    fn test_conventional_spots_inside_containment() {
        let bounds = Rect::new(100.0, 100.0, 600.0, 400.0);
        let fixture = Fixture::new(800.0, 600.0, vec![]).contained_by(bounds);
        let spots = fixture.run(|g| g.conventional_spots(100.0, 50.0, ElementKind::Logo));
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].method, "type-specific-logo-bottom-right");
        assert_eq!((spots[0].x, spots[0].y), (540.0, 390.0));
    }

    #[test]
    fn test_band_sampling_with_containment() {
        let bounds = Rect::new(0.0, 0.0, 900.0, 900.0);
        let fixture = Fixture::new(900.0, 900.0, vec![]).contained_by(bounds);
        let proposals = fixture.run(|g| g.grid_sampling(250.0, 100.0, ElementKind::Headline));
        let top: Vec<_> = proposals.iter().filter(|p| p.method == "grid-top").collect();
        let bottom: Vec<_> = proposals.iter().filter(|p| p.method == "grid-bottom").collect();
        // Columns at x = 50, 350, 650; the last would cross the right margin
        assert_eq!(top.len(), 2);
        assert_eq!(bottom.len(), 2);
        assert_eq!(bottom[0].y, 750.0);
    }

    #[test]
    fn test_empty_region_strategy_is_opt_in() {
        let fixture = Fixture::new(900.0, 900.0, vec![]);
        let off = fixture.run(|g| g.generate(100.0, 100.0, ElementKind::Generic));
        assert!(off.iter().all(|c| !c.method.starts_with("empty-")));

        let config = PlacementConfig::default()
            .with_empty_region_strategy(true)
            .with_max_candidates(1000);
        let fixture = Fixture::with_config(900.0, 900.0, vec![], config);
        let empty = fixture.run(|g| g.empty_regions(100.0, 100.0));
        // 9 centers plus 3 corners per cell
        assert_eq!(empty.len(), 36);
    }

    #[test]
    fn test_space_analysis_note_kept_in_reasoning() {
        let fixture = Fixture::new(
            800.0,
            600.0,
            vec![el("p", ElementKind::Image, 300.0, 100.0, 200.0, 200.0)],
        );
        let candidates = fixture.run(|g| g.generate(400.0, 80.0, ElementKind::Headline));
        let from_space = candidates
            .iter()
            .find(|c| c.method == "space-analysis")
            .unwrap();
        assert_eq!(from_space.reasoning[0], "bottom region (100% empty)");
    }
}
