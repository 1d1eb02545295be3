//! Line-of-sight tests against the occluder set.

use crate::Point;
use crate::geom::ray::Ray;
use crate::sim::view_factor::occluder::{OccluderOwner, OccluderSet};
use crate::sim::view_factor::transmissivity::Transmissivity;

/// Crossings closer than this to either segment end do not count.
pub const DISTANCE_TOL: f64 = 1e-6;

/// Crossings closer than this to an occluder's outline do not count.
pub const EDGE_TOL: f64 = 1e-6;

/// Transmissivity of the line of sight from `from` to `to`.
///
/// Every occluder crossed strictly between the two ends multiplies the
/// result by its transmissivity, once per crossing even where the line
/// runs along a seam between two faces of the same object. Faces owned by
/// `exclude` are ignored. Returns `Constant(0.)` as soon as the line is
/// fully blocked.
pub fn visibility(
    occluders: &OccluderSet,
    from: Point,
    to: Point,
    exclude: Option<OccluderOwner>,
) -> Transmissivity {
    let Some(ray) = Ray::from_points(from, to) else {
        return Transmissivity::transparent();
    };
    let length = from.distance_to(&to);
    let mut result = Transmissivity::transparent();
    let mut crossings: Vec<(OccluderOwner, f64)> = Vec::new();

    for idx in occluders.candidates(from, to) {
        let face = &occluders.faces()[idx];
        if Some(face.owner) == exclude {
            continue;
        }
        let Some(t) = ray.intersect_convex_face(&face.pts, &face.normal, &face.edge_tol) else {
            continue;
        };
        if t <= DISTANCE_TOL || t >= length - DISTANCE_TOL {
            continue;
        }
        if crossings
            .iter()
            .any(|&(owner, t0)| owner == face.owner && (t - t0).abs() < DISTANCE_TOL)
        {
            continue;
        }
        crossings.push((face.owner, t));
        let face_t = occluders.transmissivity_of(face);
        if face_t.is_opaque() {
            return Transmissivity::opaque();
        }
        result = &result * face_t;
        if result.is_opaque() {
            return Transmissivity::opaque();
        }
    }
    result
}
