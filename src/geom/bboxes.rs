use crate::geom::point::Point;

/// Axis-aligned (min, max) corners enclosing all `pts`, `None` if empty.
pub fn bounding_box(pts: &[Point]) -> Option<(Point, Point)> {
    let (first, rest) = pts.split_first()?;
    Some(rest.iter().fold((*first, *first), |(lo, hi), p| {
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
        )
    }))
}

pub fn bbox_diagonal(lo: Point, hi: Point) -> f64 {
    lo.distance_to(&hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let pts = [
            Point::new(1., -2., 3.),
            Point::new(-1., 2., 0.),
            Point::new(0., 0., 5.),
        ];
        let (lo, hi) = bounding_box(&pts).unwrap();
        assert!(lo.is_close(&Point::new(-1., -2., 0.)));
        assert!(hi.is_close(&Point::new(1., 2., 5.)));
        assert!((bbox_diagonal(lo, hi) - (4f64 + 16. + 25.).sqrt()).abs() < 1e-12);
        assert!(bounding_box(&[]).is_none());
    }
}
