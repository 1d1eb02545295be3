use std::collections::HashMap;

use crate::Point;
use crate::geom::bboxes::bounding_box;

/// Target number of cells along the longest scene axis.
const CELLS_PER_AXIS: f64 = 32.;

/// Uniform voxel grid mapping cells to the items whose bounding boxes overlap them.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    grid: HashMap<(i32, i32, i32), Vec<usize>>,
    step: f64,
    bbox: Option<(Point, Point)>,
}

impl VoxelGrid {
    /// Builds a grid over item bounding boxes. Item `i` is `bboxes[i]`.
    pub fn new(bboxes: &[(Point, Point)], step: f64) -> Self {
        let mut grid: HashMap<(i32, i32, i32), Vec<usize>> = HashMap::new();
        let corners: Vec<Point> = bboxes.iter().flat_map(|(a, b)| [*a, *b]).collect();
        let bbox = bounding_box(&corners);
        let pad = step * 1e-6;

        for (idx, (pmin, pmax)) in bboxes.iter().enumerate() {
            let (imin, jmin, kmin) = cell_of(
                Point::new(pmin.x - pad, pmin.y - pad, pmin.z - pad),
                step,
            );
            let (imax, jmax, kmax) = cell_of(
                Point::new(pmax.x + pad, pmax.y + pad, pmax.z + pad),
                step,
            );
            for i in imin..=imax {
                for j in jmin..=jmax {
                    for k in kmin..=kmax {
                        grid.entry((i, j, k)).or_default().push(idx);
                    }
                }
            }
        }

        Self { grid, step, bbox }
    }

    /// Picks a cell size so that the scene spans about 32 cells on its longest axis.
    pub fn auto_step(bboxes: &[(Point, Point)]) -> f64 {
        let corners: Vec<Point> = bboxes.iter().flat_map(|(a, b)| [*a, *b]).collect();
        match bounding_box(&corners) {
            Some((lo, hi)) => {
                let extent = (hi.x - lo.x).max(hi.y - lo.y).max(hi.z - lo.z);
                (extent / CELLS_PER_AXIS).max(1e-6)
            }
            None => 1.,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Returns sorted item indices from all cells crossed by the segment `a -> b`.
    pub fn find_along_segment(&self, a: Point, b: Point) -> Vec<usize> {
        let Some((lo, hi)) = self.bbox else {
            return Vec::new();
        };
        let pad = self.step;
        let lo = Point::new(lo.x - pad, lo.y - pad, lo.z - pad);
        let hi = Point::new(hi.x + pad, hi.y + pad, hi.z + pad);
        let Some((t0, t1)) = clip_segment(a, b, lo, hi) else {
            return Vec::new();
        };

        let d = b - a;
        let start = a + d * t0;
        let end = a + d * t1;
        let mut cell = cell_of(start, self.step);
        let last = cell_of(end, self.step);

        // Amanatides-Woo traversal in segment parameter t (0 at a, 1 at b)
        let axis = |p0: f64, dp: f64, c: i32| -> (i32, f64, f64) {
            if dp > 0. {
                let next = (c + 1) as f64 * self.step;
                (1, (next - p0) / dp, self.step / dp)
            } else if dp < 0. {
                let next = c as f64 * self.step;
                (-1, (next - p0) / dp, -self.step / dp)
            } else {
                (0, f64::INFINITY, f64::INFINITY)
            }
        };
        let (si, mut tx, dtx) = axis(a.x, d.dx, cell.0);
        let (sj, mut ty, dty) = axis(a.y, d.dy, cell.1);
        let (sk, mut tz, dtz) = axis(a.z, d.dz, cell.2);

        let max_steps = ((last.0 - cell.0).abs() + (last.1 - cell.1).abs() + (last.2 - cell.2).abs())
            as usize
            + 3;
        let mut found: Vec<usize> = Vec::new();
        for _ in 0..=max_steps {
            if let Some(indices) = self.grid.get(&cell) {
                found.extend(indices);
            }
            if cell == last {
                break;
            }
            if tx <= ty && tx <= tz {
                if tx > t1 {
                    break;
                }
                cell.0 += si;
                tx += dtx;
            } else if ty <= tz {
                if ty > t1 {
                    break;
                }
                cell.1 += sj;
                ty += dty;
            } else {
                if tz > t1 {
                    break;
                }
                cell.2 += sk;
                tz += dtz;
            }
        }

        found.sort_unstable();
        found.dedup();
        found
    }
}

fn cell_of(p: Point, step: f64) -> (i32, i32, i32) {
    (
        (p.x / step).floor() as i32,
        (p.y / step).floor() as i32,
        (p.z / step).floor() as i32,
    )
}

/// Slab clipping of the segment `a -> b` to an axis-aligned box.
/// Returns the parameter range inside the box.
fn clip_segment(a: Point, b: Point, lo: Point, hi: Point) -> Option<(f64, f64)> {
    let d = b - a;
    let mut t0: f64 = 0.;
    let mut t1: f64 = 1.;
    for (p, dp, min, max) in [
        (a.x, d.dx, lo.x, hi.x),
        (a.y, d.dy, lo.y, hi.y),
        (a.z, d.dz, lo.z, hi.z),
    ] {
        if dp.abs() < 1e-15 {
            if p < min || p > max {
                return None;
            }
            continue;
        }
        let (mut ta, mut tb) = ((min - p) / dp, (max - p) / dp);
        if ta > tb {
            std::mem::swap(&mut ta, &mut tb);
        }
        t0 = t0.max(ta);
        t1 = t1.min(tb);
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}
