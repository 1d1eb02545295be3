//! Point-to-element view factor summation and per-point normalization.

use std::f64::consts::PI;

use ndarray as nd;

use crate::Point;
use crate::geom::EPS;
use crate::sim::view_factor::element::MeshElement;
use crate::sim::view_factor::occluder::{OccluderOwner, OccluderSet};
use crate::sim::view_factor::transmissivity::Transmissivity;
use crate::sim::view_factor::visibility::visibility;

/// A line of sight traced during aggregation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewRay {
    pub point: usize,
    pub surface: usize,
    pub target: Point,
    /// Hour-mean transmissivity of the line of sight.
    pub transmissivity: f64,
}

/// Unoccluded view factor of one element from `pt`.
///
/// `area * max(0, cos) / (4 pi r^2)`, the solid angle fraction subtended by
/// the element. Elements seen from their back side give 0.
pub fn element_view_factor(pt: Point, element: &MeshElement) -> f64 {
    let r = element.centroid - pt;
    let r2 = r.dot(&r);
    if r2 < EPS * EPS {
        return 0.;
    }
    let cos = r.dot(&element.normal) / r2.sqrt();
    if cos <= 0. {
        return 0.;
    }
    element.area * cos / (4. * PI * r2)
}

/// Sums the visible contributions of a surface's detail elements.
///
/// Returns one value per hour (`hours` >= 1). The surface's own occluder
/// faces never block its elements. Traced lines of sight are appended to
/// `rays` if given.
pub fn pair_view_factor(
    pt: Point,
    elements: &[MeshElement],
    occluders: &OccluderSet,
    owner: OccluderOwner,
    hours: usize,
    mut rays: Option<&mut Vec<ViewRay>>,
    (point, surface): (usize, usize),
) -> Vec<f64> {
    let mut acc = vec![0.; hours.max(1)];
    for element in elements {
        let w = element_view_factor(pt, element);
        if w <= 0. {
            continue;
        }
        let t = visibility(occluders, pt, element.centroid, Some(owner));
        match &t {
            Transmissivity::Constant(c) => acc.iter_mut().for_each(|a| *a += w * c),
            Transmissivity::Hourly(_) => acc
                .iter_mut()
                .enumerate()
                .for_each(|(h, a)| *a += w * t.value_at(h)),
        }
        if let Some(rays) = rays.as_deref_mut() {
            let mean = (0..acc.len()).map(|h| t.value_at(h)).sum::<f64>() / acc.len() as f64;
            rays.push(ViewRay {
                point,
                surface,
                target: element.centroid,
                transmissivity: mean,
            });
        }
    }
    acc
}

/// Normalizes the view factors of one point and returns its sky view factor.
///
/// A total above 1 is discretization overshoot: all factors are rescaled to
/// sum to 1 and the sky view factor is 0.
pub fn normalize_point(mut factors: nd::ArrayViewMut1<f64>) -> f64 {
    let total = factors.sum();
    if total > 1. {
        factors.mapv_inplace(|f| f / total);
        0.
    } else {
        (1. - total).max(0.)
    }
}
