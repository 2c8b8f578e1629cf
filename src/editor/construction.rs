//! Interactive polygon and line construction.
//!
//! The helper only collects vertices and validates them. Committing the finished
//! geometry to the store is the tool state machine's job.

use thiserror::Error;

use crate::map::{Coord, Geometry};

/// Vertices closer than this are treated as the same click.
const DUPLICATE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionKind {
    Polygon,
    Line,
}

impl ConstructionKind {
    pub fn min_vertices(&self) -> usize {
        match self {
            ConstructionKind::Polygon => 3,
            ConstructionKind::Line => 2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ConstructionKind::Polygon => "polygon",
            ConstructionKind::Line => "line",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("polygon edges cannot cross")]
    SelfIntersection,
    #[error("needs at least {required} vertices, got {got}")]
    TooFewVertices { required: usize, got: usize },
    #[error("vertex repeats an earlier vertex")]
    DuplicateVertex,
    #[error("polygon has no area")]
    Degenerate,
}

fn orientation(a: Coord, b: Coord, c: Coord) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Coord, b: Coord, p: Coord) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Whether the path `a-b-c` turns straight back over `a-b`.
fn folds_back(a: Coord, b: Coord, c: Coord) -> bool {
    let dot = (b.x - a.x) * (c.x - b.x) + (b.y - a.y) * (c.y - b.y);
    orientation(a, b, c).abs() < DUPLICATE_EPSILON && dot < 0.0
}

/// Twice the signed area of the open ring `vertices`.
fn doubled_area(vertices: &[Coord]) -> f64 {
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum()
}

/// Whether segment `p1-p2` touches or crosses segment `p3-p4`.
pub fn segments_intersect(p1: Coord, p2: Coord, p3: Coord, p4: Coord) -> bool {
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(p3, p4, p1))
        || (d2 == 0.0 && on_segment(p3, p4, p2))
        || (d3 == 0.0 && on_segment(p1, p2, p3))
        || (d4 == 0.0 && on_segment(p1, p2, p4))
}

/// In-progress polygon or line.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionHelper {
    kind: ConstructionKind,
    vertices: Vec<Coord>,
}

impl ConstructionHelper {
    pub fn new(kind: ConstructionKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
        }
    }

    pub fn kind(&self) -> ConstructionKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Coord] {
        &self.vertices
    }

    /// Append a vertex. A polygon rejects a vertex that repeats an earlier one,
    /// turns back over the previous edge, or whose new edge would cross an
    /// earlier edge; the helper is left unchanged in those cases.
    pub fn push_vertex(&mut self, at: Coord) -> Result<(), ConstructionError> {
        let Some(&last) = self.vertices.last() else {
            self.vertices.push(at);
            return Ok(());
        };
        if last.distance(at) < DUPLICATE_EPSILON {
            return Ok(());
        }

        if self.kind == ConstructionKind::Polygon {
            if self
                .vertices
                .iter()
                .any(|v| v.distance(at) < DUPLICATE_EPSILON)
            {
                return Err(ConstructionError::DuplicateVertex);
            }
            let n = self.vertices.len();
            if n >= 2 && folds_back(self.vertices[n - 2], last, at) {
                return Err(ConstructionError::SelfIntersection);
            }
            // The edge ending at `last` shares a vertex with the new edge and is skipped
            for i in 0..n.saturating_sub(2) {
                if segments_intersect(last, at, self.vertices[i], self.vertices[i + 1]) {
                    return Err(ConstructionError::SelfIntersection);
                }
            }
        }

        self.vertices.push(at);
        Ok(())
    }

    pub fn pop_vertex(&mut self) -> Option<Coord> {
        self.vertices.pop()
    }

    /// Whether a click at `point` lands on the first vertex of a closable polygon.
    pub fn closes_on(&self, point: Coord, radius: f64) -> bool {
        self.kind == ConstructionKind::Polygon
            && self.vertices.len() >= self.kind.min_vertices()
            && self
                .vertices
                .first()
                .is_some_and(|first| first.distance(point) <= radius)
    }

    pub fn can_finish(&self) -> bool {
        self.vertices.len() >= self.kind.min_vertices()
            && self.closing_edge_is_clear()
            && self.has_area()
    }

    fn closing_edge_is_clear(&self) -> bool {
        if self.kind != ConstructionKind::Polygon {
            return true;
        }
        let (Some(&first), Some(&last)) = (self.vertices.first(), self.vertices.last()) else {
            return true;
        };
        let n = self.vertices.len();
        if n >= 3
            && (folds_back(self.vertices[n - 2], last, first)
                || folds_back(last, first, self.vertices[1]))
        {
            return false;
        }
        // Skip the first and last edges; both share a vertex with the closing edge
        (1..n.saturating_sub(2))
            .all(|i| !segments_intersect(last, first, self.vertices[i], self.vertices[i + 1]))
    }

    fn has_area(&self) -> bool {
        self.kind != ConstructionKind::Polygon
            || doubled_area(&self.vertices).abs() > DUPLICATE_EPSILON
    }

    /// Take the finished geometry, leaving the helper empty. On error the
    /// vertices are kept so construction can continue.
    pub fn finish(&mut self) -> Result<Geometry, ConstructionError> {
        let required = self.kind.min_vertices();
        if self.vertices.len() < required {
            return Err(ConstructionError::TooFewVertices {
                required,
                got: self.vertices.len(),
            });
        }
        if !self.closing_edge_is_clear() {
            return Err(ConstructionError::SelfIntersection);
        }
        if !self.has_area() {
            return Err(ConstructionError::Degenerate);
        }

        let vertices = std::mem::take(&mut self.vertices);
        Ok(match self.kind {
            ConstructionKind::Polygon => Geometry::polygon(vertices),
            ConstructionKind::Line => Geometry::LineString(vertices),
        })
    }
}
