use crate::Point;
use crate::geom::EPS;

/// Closest point to `pt` on the segment `a -> b`.
pub fn closest_point_on_segment(pt: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len2 = ab.dot(&ab);
    if len2 < EPS * EPS {
        return a;
    }
    let t = ((pt - a).dot(&ab) / len2).clamp(0., 1.);
    a + ab * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_inside() {
        let c = closest_point_on_segment(
            Point::new(1., 3., 0.),
            Point::new(0., 0., 0.),
            Point::new(4., 0., 0.),
        );
        assert!(c.is_close(&Point::new(1., 0., 0.)));
    }

    #[test]
    fn test_clamped_to_endpoint() {
        let b = Point::new(4., 0., 0.);
        let c = closest_point_on_segment(Point::new(7., 4., 0.), Point::new(0., 0., 0.), b);
        assert!(c.is_close(&b));
    }

    #[test]
    fn test_zero_length_segment() {
        let a = Point::new(1., 1., 1.);
        assert!(closest_point_on_segment(Point::new(1., 1., 3.), a, a).is_close(&a));
    }
}
