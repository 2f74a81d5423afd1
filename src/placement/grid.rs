//! Spatial grid for canvas density analysis
//!
//! Divides the canvas into an NxN grid so region queries only touch the
//! cells they overlap. An element spanning several cells is registered in
//! every one of them, which keeps per-cell density sums accurate.

use std::collections::BTreeSet;

use super::types::{Element, Point, Rect, Size};

/// NxN partition of the canvas indexing existing elements
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    canvas: Size,
    grid_size: usize,
    cell_width: f64,
    cell_height: f64,
    /// Row-major cells holding indices into `elements`
    cells: Vec<Vec<usize>>,
    elements: Vec<Element>,
}

impl SpatialGrid {
    /// Create an empty grid; a `grid_size` of 0 is raised to 1
    pub fn new(canvas: Size, grid_size: usize) -> Self {
        let grid_size = grid_size.max(1);
        Self {
            canvas,
            grid_size,
            cell_width: canvas.width / grid_size as f64,
            cell_height: canvas.height / grid_size as f64,
            cells: vec![Vec::new(); grid_size * grid_size],
            elements: Vec::new(),
        }
    }

    /// Build a grid and register every element
    pub fn with_elements(canvas: Size, grid_size: usize, elements: Vec<Element>) -> Self {
        let mut grid = Self::new(canvas, grid_size);
        for element in elements {
            grid.add_element(element);
        }
        grid
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Width and height of one cell
    pub fn cell_size(&self) -> (f64, f64) {
        (self.cell_width, self.cell_height)
    }

    /// All elements in insertion order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn axis_index(&self, coord: f64, cell: f64) -> usize {
        let raw = (coord / cell).floor();
        if raw.is_nan() || raw <= 0.0 {
            return 0;
        }
        (raw as usize).min(self.grid_size - 1)
    }

    /// Inclusive `(start_row, end_row, start_col, end_col)` covered by a rectangle
    fn cell_range(&self, rect: &Rect) -> (usize, usize, usize, usize) {
        (
            self.axis_index(rect.y, self.cell_height),
            self.axis_index(rect.bottom(), self.cell_height),
            self.axis_index(rect.x, self.cell_width),
            self.axis_index(rect.right(), self.cell_width),
        )
    }

    /// Register an element in the flat list and in every cell it touches
    pub fn add_element(&mut self, element: Element) {
        let index = self.elements.len();
        let (start_row, end_row, start_col, end_col) = self.cell_range(&element.bounds);
        for row in start_row..=end_row {
            for col in start_col..=end_col {
                self.cells[row * self.grid_size + col].push(index);
            }
        }
        self.elements.push(element);
    }

    /// Bounds of one cell
    pub fn cell_bounds(&self, row: usize, col: usize) -> Rect {
        Rect::new(
            col as f64 * self.cell_width,
            row as f64 * self.cell_height,
            self.cell_width,
            self.cell_height,
        )
    }

    /// Geometric center of one cell
    pub fn cell_center(&self, row: usize, col: usize) -> Point {
        self.cell_bounds(row, col).center()
    }

    /// `(row, col)` of the cell containing a point, clamped to the grid
    pub fn cell_at(&self, point: Point) -> (usize, usize) {
        (
            self.axis_index(point.y, self.cell_height),
            self.axis_index(point.x, self.cell_width),
        )
    }

    /// Occupied fraction of each cell, indexed `[row][col]`.
    ///
    /// Overlapping elements are summed, so values above 1.0 are possible.
    pub fn density_map(&self) -> Vec<Vec<f64>> {
        let cell_area = self.cell_width * self.cell_height;
        (0..self.grid_size)
            .map(|row| {
                (0..self.grid_size)
                    .map(|col| {
                        let cell = self.cell_bounds(row, col);
                        let occupied: f64 = self.cells[row * self.grid_size + col]
                            .iter()
                            .map(|&i| self.elements[i].bounds.overlap_area(&cell))
                            .sum();
                        occupied / cell_area
                    })
                    .collect()
            })
            .collect()
    }

    /// Elements that geometrically overlap a region, in insertion order.
    ///
    /// Only the cells covered by the region are scanned.
    pub fn elements_in_region(&self, region: &Rect) -> Vec<&Element> {
        let (start_row, end_row, start_col, end_col) = self.cell_range(region);
        let mut hits = BTreeSet::new();
        for row in start_row..=end_row {
            for col in start_col..=end_col {
                for &i in &self.cells[row * self.grid_size + col] {
                    if self.elements[i].bounds.overlaps(region) {
                        hits.insert(i);
                    }
                }
            }
        }
        hits.into_iter().map(|i| &self.elements[i]).collect()
    }

    /// Cells whose density is below `threshold`, row-major
    pub fn empty_cells(&self, threshold: f64) -> Vec<(usize, usize)> {
        let density = self.density_map();
        let mut cells = Vec::new();
        for (row, values) in density.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                if *value < threshold {
                    cells.push((row, col));
                }
            }
        }
        cells
    }

    /// Summed overlap area between a rectangle and every element
    pub fn total_overlap(&self, rect: &Rect) -> f64 {
        self.elements
            .iter()
            .map(|e| e.bounds.overlap_area(rect))
            .sum()
    }

    /// Text rendering of the density map for diagnostics
    pub fn visual_summary(&self) -> String {
        let density = self.density_map();
        let rule = "=".repeat(40);
        let mut lines = vec![
            format!(
                "Spatial Grid ({n}x{n}) - Canvas: {:.0}x{:.0}px",
                self.canvas.width,
                self.canvas.height,
                n = self.grid_size
            ),
            rule.clone(),
        ];
        for (row, values) in density.iter().enumerate() {
            let cells: Vec<String> = values
                .iter()
                .map(|d| format!("{} {:5.1}%", density_marker(*d), d * 100.0))
                .collect();
            lines.push(format!("Row {}: {}", row, cells.join("  ")));
        }
        lines.push(rule);
        lines.push(format!("Total elements: {}", self.elements.len()));
        lines.join("\n")
    }
}

fn density_marker(density: f64) -> char {
    if density < 0.1 {
        '□'
    } else if density < 0.4 {
        '▤'
    } else if density < 0.7 {
        '▥'
    } else {
        '▣'
    }
}
