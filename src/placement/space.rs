//! Free-space analysis around the dominant subject
//!
//! Rather than sampling blindly, the analyzer locates the subject (an
//! explicit obstacle, or the largest image on the canvas), carves the
//! working area into the bands above, below, left and right of it, and
//! ranks those bands by how much usable room they offer.

use std::fmt;

use tracing::{debug, warn};

use super::config::SpaceConfig;
use super::error::PlacementError;
use super::grid::SpatialGrid;
use super::rules::{InteriorRule, RuleTable};
use super::types::{ElementKind, Rect};

/// Position of a free region relative to the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Top,
    Bottom,
    Left,
    Right,
    /// No subject: the whole working area
    Full,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegionKind::Top => "top",
            RegionKind::Bottom => "bottom",
            RegionKind::Left => "left",
            RegionKind::Right => "right",
            RegionKind::Full => "full",
        };
        f.write_str(name)
    }
}

/// A contiguous free region of the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct FreeSpaceRegion {
    pub bounds: Rect,
    pub kind: RegionKind,
    pub area: f64,
    /// Occupied fraction; may exceed 1.0 when elements overlap each other
    pub density: f64,
}

impl FreeSpaceRegion {
    /// Whether an element fits with `margin` on every side
    pub fn can_fit(&self, width: f64, height: f64, margin: f64) -> bool {
        self.bounds.width >= width + 2.0 * margin && self.bounds.height >= height + 2.0 * margin
    }

    /// Area weighted by emptiness, the ranking key
    pub fn usable_space(&self) -> f64 {
        self.area * (1.0 - self.density)
    }

    /// Empty share in percent, floored at zero
    pub fn empty_percent(&self) -> f64 {
        ((1.0 - self.density) * 100.0).max(0.0)
    }
}

/// A position proposed inside a free region
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedPosition {
    pub x: f64,
    pub y: f64,
    pub region: RegionKind,
    pub reasoning: String,
}

/// Finds free-space regions around the subject of the canvas
pub struct SpaceAnalyzer<'a> {
    grid: &'a SpatialGrid,
    working_area: Rect,
    obstacle: Option<Rect>,
    config: &'a SpaceConfig,
    rules: &'a RuleTable,
}

impl<'a> SpaceAnalyzer<'a> {
    /// `containment` restricts the working area; without it the whole canvas is used
    pub fn new(
        grid: &'a SpatialGrid,
        containment: Option<Rect>,
        obstacle: Option<Rect>,
        config: &'a SpaceConfig,
        rules: &'a RuleTable,
    ) -> Self {
        Self {
            grid,
            working_area: containment.unwrap_or_else(|| grid.canvas().to_rect()),
            obstacle,
            config,
            rules,
        }
    }

    pub fn working_area(&self) -> Rect {
        self.working_area
    }

    /// Explicit obstacle bounds, else the largest subject-kind element
    pub fn subject_bounds(&self) -> Option<Rect> {
        if self.obstacle.is_some() {
            return self.obstacle;
        }
        let mut best: Option<Rect> = None;
        for element in self.grid.elements() {
            if !self.rules.get(element.kind).subject {
                continue;
            }
            if best.map_or(true, |b| element.bounds.area() > b.area()) {
                best = Some(element.bounds);
            }
        }
        best
    }

    /// Free regions around the subject, best first
    pub fn analyze_free_space(&self) -> Vec<FreeSpaceRegion> {
        let area = self.working_area;

        let Some(subject) = self.subject_bounds() else {
            return vec![self.region(RegionKind::Full, area)];
        };
        debug!(
            "subject at {:.0},{:.0} size {:.0}x{:.0}",
            subject.x, subject.y, subject.width, subject.height
        );

        let margin = self.config.subject_margin;
        let below = subject.bottom() + margin;
        let beside = subject.right() + margin;
        let proposals = [
            (
                RegionKind::Top,
                area.x,
                area.y,
                area.width,
                subject.y - area.y - margin,
            ),
            (
                RegionKind::Bottom,
                area.x,
                below,
                area.width,
                area.bottom() - below,
            ),
            (
                RegionKind::Left,
                area.x,
                area.y,
                subject.x - area.x - margin,
                area.height,
            ),
            (
                RegionKind::Right,
                beside,
                area.y,
                area.right() - beside,
                area.height,
            ),
        ];

        let mut regions = Vec::new();
        for (kind, x, y, width, height) in proposals {
            let x = x.max(area.x);
            let y = y.max(area.y);
            let width = width.min(area.right() - x);
            let height = height.min(area.bottom() - y);
            if width > self.config.min_region_size && height > self.config.min_region_size {
                let region = self.region(kind, Rect::new(x, y, width, height));
                debug!(
                    "{} region {:.0}x{:.0}px, {:.0}% empty",
                    kind,
                    width,
                    height,
                    region.empty_percent()
                );
                regions.push(region);
            }
        }

        regions.sort_by(|a, b| b.usable_space().total_cmp(&a.usable_space()));
        regions
    }

    fn region(&self, kind: RegionKind, bounds: Rect) -> FreeSpaceRegion {
        FreeSpaceRegion {
            bounds,
            kind,
            area: bounds.area(),
            density: self.region_density(&bounds),
        }
    }

    fn region_density(&self, region: &Rect) -> f64 {
        let occupied: f64 = self
            .grid
            .elements_in_region(region)
            .iter()
            .map(|e| e.bounds.overlap_area(region))
            .sum();
        occupied / region.area()
    }

    /// Positions for an element of the given size and kind, best first.
    ///
    /// Text-priority kinds that fit no region at all yield
    /// [`PlacementError::ElementTooLarge`] instead of being squeezed into one.
    pub fn best_positions(
        &self,
        width: f64,
        height: f64,
        kind: ElementKind,
    ) -> Result<Vec<SuggestedPosition>, PlacementError> {
        let rule = self.rules.get(kind);
        let regions = self.analyze_free_space();

        let mut viable: Vec<&FreeSpaceRegion> = regions
            .iter()
            .filter(|r| r.can_fit(width, height, self.config.fit_margin))
            .collect();
        if viable.is_empty() {
            viable = regions
                .iter()
                .filter(|r| r.can_fit(width, height, self.config.relaxed_fit_margin))
                .collect();
        }
        if viable.is_empty() {
            if let Some(largest) = regions.first() {
                if rule.text_priority {
                    warn!(
                        "{} {:.0}x{:.0} too large for working area {:.0}x{:.0}",
                        kind, width, height, self.working_area.width, self.working_area.height
                    );
                    return Err(PlacementError::ElementTooLarge {
                        kind,
                        width,
                        height,
                        available_width: self.working_area.width,
                        available_height: self.working_area.height,
                    });
                }
                viable.push(largest);
            }
        }

        if rule.text_priority {
            // Stable partition: bottom regions first
            viable.sort_by_key(|r| r.kind != RegionKind::Bottom);
        }

        let mut positions = Vec::new();
        for region in viable.into_iter().take(self.config.max_regions) {
            let (x, y) = self.position_in_region(region, width, height, rule.interior);
            let candidate = Rect::new(x, y, width, height);
            if self.working_area.contains_rect(&candidate) {
                positions.push(SuggestedPosition {
                    x,
                    y,
                    region: region.kind,
                    reasoning: format!(
                        "{} region ({:.0}% empty)",
                        region.kind,
                        region.empty_percent()
                    ),
                });
            } else {
                debug!("rejected ({:.0}, {:.0}): leaves working area", x, y);
            }
        }
        debug!("space analysis produced {} position(s)", positions.len());
        Ok(positions)
    }

    fn position_in_region(
        &self,
        region: &FreeSpaceRegion,
        width: f64,
        height: f64,
        interior: InteriorRule,
    ) -> (f64, f64) {
        let r = region.bounds;
        let cfg = self.config;
        let centered_x = r.x + (r.width - width) / 2.0;
        let centered_y = r.y + (r.height - height) / 2.0;

        match interior {
            InteriorRule::TextBand => {
                let y = match region.kind {
                    RegionKind::Bottom => (r.bottom() - height - cfg.text_bottom_inset)
                        .max(r.y + cfg.text_bottom_floor),
                    RegionKind::Top => r.y + cfg.text_top_inset,
                    _ => centered_y,
                };
                (centered_x, y)
            }
            InteriorRule::Corner => match region.kind {
                RegionKind::Bottom | RegionKind::Top => (
                    r.x + cfg.corner_inset,
                    r.bottom() - height - cfg.corner_inset,
                ),
                _ => (r.x + cfg.corner_inset, r.y + cfg.corner_inset),
            },
            InteriorRule::Prominent => {
                let y = match region.kind {
                    RegionKind::Top => r.y + cfg.image_top_inset,
                    _ => r.y + (r.height - height) / 3.0,
                };
                (centered_x, y)
            }
            InteriorRule::Centered => (centered_x, centered_y),
        }
    }

    /// Human-readable listing of the ranked regions
    pub fn summary(&self) -> String {
        let rule = "=".repeat(50);
        let mut lines = vec!["Free Space Analysis:".to_string(), rule.clone()];
        for (i, region) in self.analyze_free_space().iter().enumerate() {
            lines.push(format!(
                "{}. {}: {:.0}x{:.0}px ({:.1}k px2) - {:.0}% empty",
                i + 1,
                region.kind.to_string().to_uppercase(),
                region.bounds.width,
                region.bounds.height,
                region.area / 1000.0,
                region.empty_percent()
            ));
        }
        lines.push(rule);
        lines.join("\n")
    }
}
