//! Hit testing for picking features under the cursor.

use super::feature::{Coord, Feature, Geometry, PointSymbol};

/// Approximate glyph width relative to the label height, for text hit boxes.
const LABEL_CHAR_WIDTH: f64 = 0.6;

/// Check if a point is within a given distance of a line segment
fn point_near_segment(point: Coord, seg_start: Coord, seg_end: Coord, threshold: f64) -> bool {
    let (dx, dy) = (seg_end.x - seg_start.x, seg_end.y - seg_start.y);
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-9 {
        return point.distance(seg_start) <= threshold;
    }

    // Project point onto line, clamped to segment
    let t = (((point.x - seg_start.x) * dx + (point.y - seg_start.y) * dy) / len_sq).clamp(0.0, 1.0);
    let projection = Coord::new(seg_start.x + dx * t, seg_start.y + dy * t);

    point.distance(projection) <= threshold
}

fn point_near_polyline(point: Coord, coords: &[Coord], threshold: f64) -> bool {
    coords
        .windows(2)
        .any(|w| point_near_segment(point, w[0], w[1], threshold))
}

/// Even-odd ray casting against a closed ring.
fn point_in_ring(point: Coord, ring: &[Coord]) -> bool {
    let mut inside = false;
    for w in ring.windows(2) {
        let (a, b) = (w[0], w[1]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

fn point_in_label(point: Coord, anchor: Coord, text: &str, height: f64) -> bool {
    let half_width = (text.chars().count() as f64 * height * LABEL_CHAR_WIDTH / 2.0).max(height);
    (point.x - anchor.x).abs() <= half_width && (point.y - anchor.y).abs() <= height / 2.0
}

/// Whether `point` picks `feature`. `tolerance` is in world units and is widened by
/// the stroke weight so thick lines are easier to grab.
pub fn feature_hit(feature: &Feature, point: Coord, tolerance: f64) -> bool {
    let threshold = tolerance.max(feature.style.weight as f64 * 2.0);
    match &feature.geometry {
        Geometry::Point(anchor) => match (feature.symbol, feature.label.as_deref()) {
            (PointSymbol::Text, Some(text)) => {
                point_in_label(point, *anchor, text, tolerance.max(1.0) * 2.0)
            }
            _ => point.distance(*anchor) <= threshold,
        },
        Geometry::LineString(line) => point_near_polyline(point, line, threshold),
        Geometry::Polygon(rings) => {
            let Some((outer, holes)) = rings.split_first() else {
                return false;
            };
            let inside = point_in_ring(point, outer) && !holes.iter().any(|h| point_in_ring(point, h));
            inside || rings.iter().any(|r| point_near_polyline(point, r, threshold))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::feature::Style;

    fn square() -> Vec<Coord> {
        vec![
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 0.0),
            Coord::new(10.0, 10.0),
            Coord::new(0.0, 10.0),
            Coord::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_point_near_segment_projection() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(10.0, 0.0);
        assert!(point_near_segment(Coord::new(5.0, 2.0), a, b, 3.0));
        assert!(!point_near_segment(Coord::new(5.0, 4.0), a, b, 3.0));
        // Beyond the end, distance is to the endpoint
        assert!(!point_near_segment(Coord::new(14.0, 0.0), a, b, 3.0));
    }

    #[test]
    fn test_point_in_ring() {
        assert!(point_in_ring(Coord::new(5.0, 5.0), &square()));
        assert!(!point_in_ring(Coord::new(15.0, 5.0), &square()));
    }

    #[test]
    fn test_line_hit() {
        let line = Feature::new(
            Geometry::LineString(vec![Coord::new(0.0, 0.0), Coord::new(0.0, 100.0)]),
            Style::default(),
        );
        assert!(feature_hit(&line, Coord::new(3.0, 50.0), 4.0));
        assert!(!feature_hit(&line, Coord::new(30.0, 50.0), 4.0));
    }

    #[test]
    fn test_polygon_hole_is_not_inside() {
        let hole = vec![
            Coord::new(3.0, 3.0),
            Coord::new(7.0, 3.0),
            Coord::new(7.0, 7.0),
            Coord::new(3.0, 7.0),
            Coord::new(3.0, 3.0),
        ];
        let hairline = Style {
            weight: 0.0,
            ..Style::default()
        };
        let polygon = Feature::new(Geometry::Polygon(vec![square(), hole]), hairline);
        assert!(feature_hit(&polygon, Coord::new(1.0, 5.0), 0.1));
        assert!(!feature_hit(&polygon, Coord::new(5.0, 5.0), 0.1));
    }

    #[test]
    fn test_text_label_hit_box_scales_with_text() {
        let label = Feature::text_label(Coord::new(0.0, 0.0), "Lighthouse", Style::default());
        assert!(feature_hit(&label, Coord::new(20.0, 0.0), 5.0));
        assert!(!feature_hit(&label, Coord::new(0.0, 20.0), 5.0));
    }
}
