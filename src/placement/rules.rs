//! Per-kind placement rules
//!
//! The scorer, analyzer and generator never branch on element kinds directly;
//! they look up a [`KindRule`] here. The table is built from
//! [`PlacementConfig`] so weights stay in one place.

use std::collections::BTreeMap;

use super::config::PlacementConfig;
use super::types::ElementKind;

/// Vertical hierarchy constraint, evaluated on the candidate's top edge
/// as a fraction of canvas height
#[derive(Debug, Clone, PartialEq)]
pub enum HierarchyRule {
    None,
    /// Penalize when the top edge sits below `max_fraction`
    StayAbove {
        max_fraction: f64,
        penalty: f64,
        /// At or above this fraction the position is reported as optimal
        optimal_fraction: Option<f64>,
    },
    /// Penalize when the top edge sits strictly inside `(low, high)`
    AvoidBand { low: f64, high: f64, penalty: f64 },
}

/// How candidates are derived from existing elements
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorRule {
    /// Stack beneath elements of the target kinds; cardinal around the rest
    StackBelow { targets: Vec<ElementKind> },
    /// All four sides of every element except the avoided kinds
    Sides { avoid: Vec<ElementKind> },
    /// Below, above, right and left of every element
    Cardinal,
}

/// Grid sampling used when containment bounds are known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingRule {
    Uniform,
    /// Top and bottom bands of the bounds
    Bands,
    /// Both bottom corners of the bounds
    BottomCorners,
}

/// Where inside a free-space region the analyzer puts an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteriorRule {
    TextBand,
    Corner,
    Prominent,
    Centered,
}

/// Horizontal alignment of a conventional spot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Start,
    Center,
    End,
}

/// Vertical alignment of a conventional spot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Bottom,
}

/// A conventional position inside the working area, inset by the
/// generator's conventional margin
#[derive(Debug, Clone, PartialEq)]
pub struct ConventionalSpot {
    pub label: &'static str,
    pub horizontal: HAlign,
    pub vertical: VAlign,
    /// Additional upward shift from the aligned position
    pub lift: f64,
}

impl ConventionalSpot {
    fn new(label: &'static str, horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            label,
            horizontal,
            vertical,
            lift: 0.0,
        }
    }

    fn lifted(mut self, lift: f64) -> Self {
        self.lift = lift;
        self
    }
}

/// Everything the engine knows about one element kind
#[derive(Debug, Clone, PartialEq)]
pub struct KindRule {
    pub hierarchy: HierarchyRule,
    pub anchor: AnchorRule,
    pub sampling: SamplingRule,
    pub interior: InteriorRule,
    /// Prefer bottom regions and refuse to fall back to an undersized region
    pub text_priority: bool,
    /// Elements of this kind count as the dominant subject
    pub subject: bool,
    pub spots: Vec<ConventionalSpot>,
}

impl Default for KindRule {
    fn default() -> Self {
        Self {
            hierarchy: HierarchyRule::None,
            anchor: AnchorRule::Cardinal,
            sampling: SamplingRule::Uniform,
            interior: InteriorRule::Centered,
            text_priority: false,
            subject: false,
            spots: vec![],
        }
    }
}

/// Lookup table from element kind to rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    rules: BTreeMap<ElementKind, KindRule>,
    fallback: KindRule,
}

impl RuleTable {
    /// Build the standard retail-layout rules from a configuration
    pub fn from_config(config: &PlacementConfig) -> Self {
        let scoring = &config.scoring;
        let mut rules = BTreeMap::new();

        rules.insert(
            ElementKind::Headline,
            KindRule {
                hierarchy: HierarchyRule::StayAbove {
                    max_fraction: scoring.headline_max_fraction,
                    penalty: scoring.hierarchy_weight,
                    optimal_fraction: Some(scoring.headline_optimal_fraction),
                },
                sampling: SamplingRule::Bands,
                interior: InteriorRule::TextBand,
                text_priority: true,
                spots: vec![
                    ConventionalSpot::new("bottom-center", HAlign::Center, VAlign::Bottom),
                    ConventionalSpot::new("bottom-left", HAlign::Start, VAlign::Bottom),
                    ConventionalSpot::new("top-center", HAlign::Center, VAlign::Top),
                ],
                ..KindRule::default()
            },
        );

        rules.insert(
            ElementKind::Subheading,
            KindRule {
                hierarchy: HierarchyRule::StayAbove {
                    max_fraction: scoring.subheading_max_fraction,
                    penalty: scoring.subheading_penalty,
                    optimal_fraction: None,
                },
                anchor: AnchorRule::StackBelow {
                    targets: vec![ElementKind::Headline, ElementKind::Text],
                },
                sampling: SamplingRule::Bands,
                interior: InteriorRule::TextBand,
                text_priority: true,
                spots: vec![
                    ConventionalSpot::new("above-headline", HAlign::Center, VAlign::Bottom)
                        .lifted(config.generator.subheading_lift),
                ],
                ..KindRule::default()
            },
        );

        rules.insert(
            ElementKind::Badge,
            KindRule {
                hierarchy: HierarchyRule::AvoidBand {
                    low: scoring.badge_band.0,
                    high: scoring.badge_band.1,
                    penalty: scoring.badge_band_penalty,
                },
                anchor: AnchorRule::Sides {
                    avoid: vec![ElementKind::Badge],
                },
                sampling: SamplingRule::BottomCorners,
                interior: InteriorRule::Corner,
                spots: vec![ConventionalSpot::new(
                    "bottom-left",
                    HAlign::Start,
                    VAlign::Bottom,
                )],
                ..KindRule::default()
            },
        );

        rules.insert(
            ElementKind::Logo,
            KindRule {
                spots: vec![ConventionalSpot::new(
                    "bottom-right",
                    HAlign::End,
                    VAlign::Bottom,
                )],
                ..KindRule::default()
            },
        );

        rules.insert(
            ElementKind::Image,
            KindRule {
                interior: InteriorRule::Prominent,
                subject: true,
                ..KindRule::default()
            },
        );

        rules.insert(
            ElementKind::ProductImage,
            KindRule {
                interior: InteriorRule::Prominent,
                ..KindRule::default()
            },
        );

        Self {
            rules,
            fallback: KindRule::default(),
        }
    }

    /// Rule for a kind; kinds without an entry get the neutral default
    pub fn get(&self, kind: ElementKind) -> &KindRule {
        self.rules.get(&kind).unwrap_or(&self.fallback)
    }

    /// Replace the rule for one kind
    pub fn set(&mut self, kind: ElementKind, rule: KindRule) {
        self.rules.insert(kind, rule);
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::from_config(&PlacementConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_rule_uses_config_weights() {
        let mut config = PlacementConfig::default();
        config.scoring.hierarchy_weight = 70.0;
        let table = RuleTable::from_config(&config);

        match &table.get(ElementKind::Headline).hierarchy {
            HierarchyRule::StayAbove {
                max_fraction,
                penalty,
                optimal_fraction,
            } => {
                assert_eq!(*max_fraction, 0.30);
                assert_eq!(*penalty, 70.0);
                assert_eq!(*optimal_fraction, Some(0.15));
            }
            other => panic!("unexpected headline hierarchy {:?}", other),
        }
    }

    #[test]
    fn test_unlisted_kinds_get_neutral_rule() {
        let table = RuleTable::default();
        let rule = table.get(ElementKind::Text);
        assert_eq!(rule.hierarchy, HierarchyRule::None);
        assert_eq!(rule.anchor, AnchorRule::Cardinal);
        assert!(rule.spots.is_empty());
        assert!(!rule.subject);
    }

    #[test]
    fn test_only_images_are_subjects() {
        let table = RuleTable::default();
        let subjects: Vec<_> = ElementKind::ALL
            .into_iter()
            .filter(|k| table.get(*k).subject)
            .collect();
        assert_eq!(subjects, vec![ElementKind::Image]);
    }

    #[test]
    fn test_rule_override() {
        let mut table = RuleTable::default();
        table.set(
            ElementKind::Logo,
            KindRule {
                text_priority: true,
                ..KindRule::default()
            },
        );
        assert!(table.get(ElementKind::Logo).text_priority);
        assert!(table.get(ElementKind::Logo).spots.is_empty());
    }
}
