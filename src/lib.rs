//! Canvas Placer - Deterministic element placement for design canvases
//!
//! This library computes where a new element (headline, badge, logo, ...)
//! should go on a canvas that already holds other elements. It combines a
//! spatial density grid, free-space analysis around the dominant subject and
//! graduated constraint scoring over several candidate strategies. The same
//! input always yields the same answer.
//!
//! # Example
//!
//! ```rust
//! use canvas_placer::{place, ElementKind, PlacementQuery, Size};
//!
//! let query = PlacementQuery::new(Size::new(1080.0, 1920.0), ElementKind::Headline, 600.0, 120.0);
//! let placement = place(&query);
//! assert!(placement.confidence > 0.9);
//! ```

pub mod error;
pub mod placement;
pub mod schema;

pub use error::RequestError;
pub use placement::{
    ConfigError, Element, ElementKind, Placement, PlacementCandidate, PlacementConfig,
    PlacementEngine, PlacementError, PlacementQuery, Rect, RuleTable, Size,
};
pub use schema::{parse_request, PlacementRequest};

/// Place an element with the default configuration
///
/// Never fails: when nothing fits, or the query is invalid, the configured
/// fallback position is returned with a reasoning that says why.
pub fn place(query: &PlacementQuery) -> Placement {
    PlacementEngine::default().place(query)
}

/// Place an element with a custom configuration
///
/// # Example
///
/// ```rust
/// use canvas_placer::{place_with_config, ElementKind, PlacementConfig, PlacementQuery, Size};
///
/// let config = PlacementConfig::new().with_grid_size(4).with_max_candidates(10);
/// let query = PlacementQuery::new(Size::new(800.0, 600.0), ElementKind::Logo, 100.0, 50.0);
/// let placement = place_with_config(&query, config);
/// assert!(placement.x >= 0 && placement.x <= 700);
/// ```
pub fn place_with_config(query: &PlacementQuery, config: PlacementConfig) -> Placement {
    PlacementEngine::new(config).place(query)
}

/// Decode a JSON request and place its element with the default configuration
///
/// # Example
///
/// ```rust
/// use canvas_placer::place_json;
///
/// let placement = place_json(r#"{
///     "canvas_size": {"w": 800, "h": 600},
///     "element_to_place": {"type": "badge", "width": 100, "height": 100}
/// }"#).unwrap();
/// assert!(placement.confidence > 0.0);
/// ```
pub fn place_json(json: &str) -> Result<Placement, RequestError> {
    place_json_with_config(json, PlacementConfig::default())
}

/// Decode a JSON request and place its element with a custom configuration
pub fn place_json_with_config(
    json: &str,
    config: PlacementConfig,
) -> Result<Placement, RequestError> {
    let query = parse_request(json)?;
    Ok(PlacementEngine::new(config).place(&query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_empty_canvas() {
        let query = PlacementQuery::new(Size::new(800.0, 600.0), ElementKind::Badge, 100.0, 100.0);
        let placement = place(&query);
        assert!(placement.x >= 0 && placement.x <= 700);
        assert!(placement.y >= 0 && placement.y <= 500);
        assert!(placement.reasoning.contains("placement (score:"));
    }

    #[test]
    fn test_place_json_response_shape() {
        let placement = place_json(
            r#"{
                "canvas_size": {"w": 800, "h": 600},
                "elements": [{"id": "a", "type": "image", "x": 0, "y": 0, "width": 400, "height": 600}],
                "element_to_place": {"type": "logo", "width": 100, "height": 50}
            }"#,
        )
        .unwrap();
        let value = serde_json::to_value(&placement).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["confidence", "reasoning", "x", "y"]);
        assert!(object["x"].is_i64());
    }

    #[test]
    fn test_place_json_rejects_bad_payload() {
        assert!(matches!(place_json("{"), Err(RequestError::Json(_))));
    }

    #[test]
    fn test_place_with_config_uses_fallback_settings() {
        let mut config = PlacementConfig::default();
        config.fallback.x = 5;
        let query = PlacementQuery::new(Size::new(100.0, 100.0), ElementKind::Logo, 200.0, 50.0);
        assert_eq!(place_with_config(&query, config).x, 5);
    }
}
