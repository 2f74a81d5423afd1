//! Core geometry and element types for the placement engine

use std::fmt;

use serde::Serialize;

use super::error::PlacementError;

/// A 2D point in canvas pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Dimensions of the design surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The full canvas as a rectangle anchored at the origin
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// An axis-aligned rectangle. Width and height are expected to be positive;
/// use [`Rect::try_new`] at trust boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle, rejecting non-finite values and empty extents
    pub fn try_new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, PlacementError> {
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return Err(PlacementError::invalid_geometry(
                "rectangle",
                format!("non-finite value in ({x}, {y}, {width}, {height})"),
            ));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(PlacementError::invalid_geometry(
                "rectangle",
                format!("dimensions must be positive, got {width}x{height}"),
            ));
        }
        Ok(Self::new(x, y, width, height))
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Center point of the rectangle
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Check whether two rectangles share interior area (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Area of the intersection with another rectangle, 0 when disjoint
    pub fn overlap_area(&self, other: &Rect) -> f64 {
        if !self.overlaps(other) {
            return 0.0;
        }
        let overlap_x = (self.right().min(other.right()) - self.x.max(other.x)).max(0.0);
        let overlap_y = (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0);
        overlap_x * overlap_y
    }

    /// Check if this rectangle contains a point, boundaries included
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Check if another rectangle lies entirely within this one
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// Same size, moved to a new top-left corner
    pub fn with_origin(&self, x: f64, y: f64) -> Rect {
        Rect::new(x, y, self.width, self.height)
    }

    /// Move the origin into `[0, canvas - size]` on both axes.
    ///
    /// When the rectangle is larger than the canvas along an axis the origin
    /// is pinned to 0 on that axis.
    pub fn clamped_into(&self, canvas: Size) -> Rect {
        let x = self.x.min(canvas.width - self.width).max(0.0);
        let y = self.y.min(canvas.height - self.height).max(0.0);
        self.with_origin(x, y)
    }
}

/// The closed set of element kinds the engine has rules for.
///
/// Wire strings that match none of the named kinds become [`ElementKind::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Headline,
    Subheading,
    Badge,
    Logo,
    Image,
    ProductImage,
    Text,
    Generic,
}

impl ElementKind {
    pub const ALL: [ElementKind; 8] = [
        ElementKind::Headline,
        ElementKind::Subheading,
        ElementKind::Badge,
        ElementKind::Logo,
        ElementKind::Image,
        ElementKind::ProductImage,
        ElementKind::Text,
        ElementKind::Generic,
    ];

    /// Parse a wire type name. Matching ignores case and treats `-` like `_`.
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "headline" | "title" => ElementKind::Headline,
            "subheading" | "subheadline" | "subtitle" => ElementKind::Subheading,
            "badge" => ElementKind::Badge,
            "logo" => ElementKind::Logo,
            "image" => ElementKind::Image,
            "product_image" | "product" => ElementKind::ProductImage,
            "text" => ElementKind::Text,
            _ => ElementKind::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Headline => "headline",
            ElementKind::Subheading => "subheading",
            ElementKind::Badge => "badge",
            ElementKind::Logo => "logo",
            ElementKind::Image => "image",
            ElementKind::ProductImage => "product_image",
            ElementKind::Text => "text",
            ElementKind::Generic => "generic",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An element already placed on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    pub bounds: Rect,
    pub text: Option<String>,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementKind, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            kind,
            bounds,
            text: None,
        }
    }

    /// Attach text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges_and_area() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert_eq!(r.area(), 5000.0);
        assert_eq!(r.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_overlap_area_disjoint_is_zero() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(100.0, 100.0, 50.0, 50.0);
        assert!(!a.overlaps(&b));
        assert_eq!(a.overlap_area(&b), 0.0);
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(50.0, 0.0, 50.0, 50.0);
        assert!(!a.overlaps(&b));
        assert_eq!(a.overlap_area(&b), 0.0);
    }

    #[test]
    fn test_overlap_area_partial() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.overlap_area(&b), 2500.0);
        assert_eq!(b.overlap_area(&a), 2500.0);
    }

    #[test]
    fn test_contains_point_inclusive() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(r.contains_point(Point::new(0.0, 0.0)));
        assert!(r.contains_point(Point::new(100.0, 100.0)));
        assert!(!r.contains_point(Point::new(100.1, 50.0)));
    }

    #[test]
    fn test_try_new_rejects_bad_geometry() {
        assert!(Rect::try_new(0.0, 0.0, 0.0, 10.0).is_err());
        assert!(Rect::try_new(0.0, 0.0, 10.0, -1.0).is_err());
        assert!(Rect::try_new(f64::NAN, 0.0, 10.0, 10.0).is_err());
        assert!(Rect::try_new(-5.0, -5.0, 10.0, 10.0).is_ok());
    }

    #[test]
    fn test_clamped_into_canvas() {
        let canvas = Size::new(800.0, 600.0);
        let r = Rect::new(-30.0, 590.0, 100.0, 50.0).clamped_into(canvas);
        assert_eq!(r, Rect::new(0.0, 550.0, 100.0, 50.0));

        let oversized = Rect::new(40.0, 10.0, 900.0, 50.0).clamped_into(canvas);
        assert_eq!(oversized.x, 0.0);
    }

    #[test]
    fn test_element_kind_parsing() {
        assert_eq!(ElementKind::from_name("Headline"), ElementKind::Headline);
        assert_eq!(
            ElementKind::from_name("product-image"),
            ElementKind::ProductImage
        );
        assert_eq!(ElementKind::from_name("sticker"), ElementKind::Generic);
        for kind in ElementKind::ALL {
            if kind != ElementKind::Generic {
                assert_eq!(ElementKind::from_name(kind.as_str()), kind);
            }
        }
    }
}
