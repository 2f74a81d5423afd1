//! JSON request and response schema
//!
//! The wire format is transport neutral: a request names the canvas, the
//! elements already on it and the element to place, plus optional
//! containment and obstacle bounds. [`parse_request`] decodes and validates
//! a request into a [`PlacementQuery`].

use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::placement::{Element, ElementKind, PlacementError, PlacementQuery, Rect, Size};

/// Canvas dimensions on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub w: f64,
    pub h: f64,
}

/// An existing element on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The element being placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementToPlace {
    #[serde(rename = "type")]
    pub kind: String,
    pub width: f64,
    pub height: f64,
}

/// A rectangle on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsSpec {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<BoundsSpec> for Rect {
    fn from(b: BoundsSpec) -> Self {
        Rect::new(b.x, b.y, b.width, b.height)
    }
}

/// A complete placement request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub canvas_size: CanvasSize,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    pub element_to_place: ElementToPlace,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containment_bounds: Option<BoundsSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstacle_bounds: Option<BoundsSpec>,
    /// Rejected when present; callers must pick containment or obstacle bounds
    #[serde(default, skip_serializing)]
    pub subject_bounds: Option<serde_json::Value>,
}

impl PlacementRequest {
    /// Validate the request and convert it into engine input
    pub fn into_query(self) -> Result<PlacementQuery, PlacementError> {
        if self.subject_bounds.is_some() {
            return Err(PlacementError::AmbiguousBounds);
        }
        if self.element_to_place.kind.trim().is_empty() {
            return Err(PlacementError::EmptyElementType);
        }

        let elements = self
            .elements
            .into_iter()
            .map(|spec| {
                let element = Element::new(
                    spec.id,
                    ElementKind::from_name(&spec.kind),
                    Rect::new(spec.x, spec.y, spec.width, spec.height),
                );
                match spec.text {
                    Some(text) => element.with_text(text),
                    None => element,
                }
            })
            .collect();

        let query = PlacementQuery {
            canvas: Size::new(self.canvas_size.w, self.canvas_size.h),
            elements,
            kind: ElementKind::from_name(&self.element_to_place.kind),
            width: self.element_to_place.width,
            height: self.element_to_place.height,
            containment: self.containment_bounds.map(Rect::from),
            obstacle: self.obstacle_bounds.map(Rect::from),
        };
        query.validate()?;
        Ok(query)
    }
}

/// Decode and validate a JSON request
pub fn parse_request(json: &str) -> Result<PlacementQuery, RequestError> {
    let request: PlacementRequest = serde_json::from_str(json)?;
    Ok(request.into_query()?)
}
