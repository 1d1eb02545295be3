//! Ear-clipping triangulation of simple polygons in plane coordinates.

use anyhow::{Result, anyhow};

/// Type for holding vertex indices for a triangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangleIndex(pub usize, pub usize, pub usize);

/// Twice the signed area of a 2D polygon (positive when counter-clockwise).
pub fn signed_area_2d(pts: &[(f64, f64)]) -> f64 {
    let n = pts.len();
    (0..n)
        .map(|i| {
            let (x0, y0) = pts[i];
            let (x1, y1) = pts[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum::<f64>()
}

/// Triangulates a simple 2D polygon with the ear-clipping algorithm.
///
/// Triangles are returned counter-clockwise regardless of the input order.
pub fn triangulate_2d(pts: &[(f64, f64)]) -> Result<Vec<TriangleIndex>> {
    if pts.len() < 3 {
        return Err(anyhow!("Polygon must have at least 3 vertices"));
    }
    let area2 = signed_area_2d(pts);
    if area2.abs() < 1e-14 {
        return Err(anyhow!("Polygon has zero area"));
    }

    let mut vertices: Vec<usize> = if area2 > 0. {
        (0..pts.len()).collect()
    } else {
        (0..pts.len()).rev().collect()
    };
    let mut triangles: Vec<TriangleIndex> = Vec::with_capacity(pts.len() - 2);
    let mut pos: usize = 0;
    let mut num_fail: usize = 0;

    while vertices.len() > 3 {
        if num_fail > vertices.len() {
            return Err(anyhow!("Ear-clipping algorithm failed."));
        }

        // If last vertex, start from the beginning
        if pos > vertices.len() - 1 {
            pos = 0;
        }

        let prev_pos = if pos > 0 { pos - 1 } else { vertices.len() - 1 };
        let next_pos = if pos < vertices.len() - 1 { pos + 1 } else { 0 };

        let (prev_id, curr_id, next_id) = (vertices[prev_pos], vertices[pos], vertices[next_pos]);
        let (a, b, c) = (pts[prev_id], pts[curr_id], pts[next_id]);

        if is_corner_convex(a, b, c) {
            // Check if no other point is within this triangle
            // Needed for non-convex polygons
            let any_point_inside = vertices
                .iter()
                .filter(|&&id| id != prev_id && id != curr_id && id != next_id)
                .any(|&id| is_point_inside_triangle_2d(pts[id], a, b, c));

            if !any_point_inside {
                triangles.push(TriangleIndex(prev_id, curr_id, next_id));
                vertices.remove(pos);
                num_fail = 0;
                continue;
            }
        }
        num_fail += 1;
        pos += 1;
    }

    triangles.push(TriangleIndex(vertices[0], vertices[1], vertices[2]));
    Ok(triangles)
}

/// Checks if the corner a -> b -> c turns left (counter-clockwise, strictly).
pub fn is_corner_convex(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    cross_2d(a, b, c) > 1e-14
}

/// Tests if point `p` is inside or on the boundary of the triangle `(a, b, c)`.
pub fn is_point_inside_triangle_2d(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let d1 = cross_2d(a, b, p);
    let d2 = cross_2d(b, c, p);
    let d3 = cross_2d(c, a, p);
    let has_neg = d1 < -1e-14 || d2 < -1e-14 || d3 < -1e-14;
    let has_pos = d1 > 1e-14 || d2 > 1e-14 || d3 > 1e-14;
    !(has_neg && has_pos)
}

fn cross_2d(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}
