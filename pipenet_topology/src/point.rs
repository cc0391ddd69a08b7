// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tolerance-quantized points and the per-build vertex pool.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use std::collections::HashMap;

use kurbo::Point;

/// Integer grid cell of a coordinate pair at a given tolerance.
type Cell = (i64, i64);

#[allow(
    clippy::cast_possible_truncation,
    reason = "Coordinates are validated finite; cells beyond i64 range saturate."
)]
fn cell_of(p: Point, tolerance: f64) -> Cell {
    ((p.x / tolerance).round() as i64, (p.y / tolerance).round() as i64)
}

/// A 2D point snapped to a tolerance grid.
///
/// Equality, ordering and hashing use only the integer grid cell, so two
/// points that compare equal always hash equal. The stored coordinates are
/// the cell center.
#[derive(Copy, Clone, Debug)]
pub struct Point2D {
    x: f64,
    y: f64,
    cell: Cell,
}

impl Point2D {
    /// Snap `p` to the grid of spacing `tolerance`.
    pub fn snapped(p: Point, tolerance: f64) -> Self {
        let cell = cell_of(p, tolerance);
        Self {
            x: cell.0 as f64 * tolerance,
            y: cell.1 as f64 * tolerance,
            cell,
        }
    }

    /// X coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// The snapped coordinates as a kurbo point.
    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Exact squared Euclidean distance between the snapped coordinates.
    pub fn distance_squared_to(&self, other: &Self) -> f64 {
        self.to_point().distance_squared(other.to_point())
    }

    /// Whether `other` lies within `tolerance` on both axes.
    pub fn within(&self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }
}

impl From<Point2D> for Point {
    fn from(p: Point2D) -> Self {
        p.to_point()
    }
}

impl PartialEq for Point2D {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for Point2D {}

impl Hash for Point2D {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cell.hash(state);
    }
}

impl PartialOrd for Point2D {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Lexicographic by x then y.
impl Ord for Point2D {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cell.cmp(&other.cell)
    }
}

#[derive(Copy, Clone, Debug)]
struct Pooled {
    vertex: Point2D,
    // First raw point that created the vertex; matches compare against it.
    origin: Point,
}

/// Canonicalizes points for one graph build.
///
/// A point within tolerance of a point already seen snaps to that point's
/// vertex, even across a grid cell boundary. Otherwise it becomes a new
/// vertex at its own grid cell.
#[derive(Clone, Debug)]
pub struct VertexPool {
    tolerance: f64,
    cells: HashMap<Cell, Pooled>,
}

impl VertexPool {
    /// Create an empty pool. `tolerance` must be finite and positive.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            cells: HashMap::new(),
        }
    }

    /// The pool's tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Number of distinct vertices handed out.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Return the canonical vertex for `p`.
    pub fn snap(&mut self, p: Point) -> Point2D {
        let tol = self.tolerance;
        let (cx, cy) = cell_of(p, tol);
        let mut best: Option<(f64, Point2D)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(pooled) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                let o = pooled.origin;
                if (o.x - p.x).abs() < tol && (o.y - p.y).abs() < tol {
                    let d = o.distance_squared(p);
                    if best.is_none_or(|(bd, bv)| d < bd || (d == bd && pooled.vertex < bv)) {
                        best = Some((d, pooled.vertex));
                    }
                }
            }
        }
        if let Some((_, vertex)) = best {
            return vertex;
        }
        let vertex = Point2D::snapped(p, tol);
        // A fresh vertex never shares a cell: any earlier point in this cell
        // would have been within tolerance and matched above.
        self.cells.insert(vertex.cell, Pooled { vertex, origin: p });
        vertex
    }
}
