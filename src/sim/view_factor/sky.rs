//! Sky-patch view directions (Tregenza / Reinhart) and ray-traced sky view.

use crate::sim::view_factor::occluder::OccluderSet;
use crate::sim::view_factor::visibility::visibility;
use crate::{Point, Vector};

/// Altitude band height of the Tregenza sky [deg].
const BAND_HEIGHT: f64 = 12.;

/// Patches per Tregenza altitude band, from the horizon up. The zenith cap is one more patch.
const TREGENZA_BANDS: [usize; 7] = [30, 30, 24, 24, 18, 12, 6];

/// Patch center directions for a sky subdivided `view_resolution + 1` times
/// (Reinhart scheme). Resolution 0 gives the 145 Tregenza patches.
///
/// Directions are unit vectors with +z up and +y north, ordered band by
/// band from the horizon, the zenith last.
pub fn sky_directions(view_resolution: u8) -> Vec<Vector> {
    let mf = view_resolution as usize + 1;
    let mut dirs = Vec::with_capacity(144 * mf * mf + 1);
    for (band, count) in TREGENZA_BANDS.iter().enumerate() {
        for row in 0..mf {
            let alt = (band as f64 * BAND_HEIGHT + (row as f64 + 0.5) * BAND_HEIGHT / mf as f64).to_radians();
            let n_az = count * mf;
            for j in 0..n_az {
                let az = (j as f64 * 360. / n_az as f64).to_radians();
                dirs.push(Vector::new(
                    alt.cos() * az.sin(),
                    alt.cos() * az.cos(),
                    alt.sin(),
                ));
            }
        }
    }
    dirs.push(Vector::new(0., 0., 1.));
    dirs
}

/// Fraction of sky directions from `pt` that escape the occluders,
/// weighted by transmissivity and averaged over `hours`.
///
/// `reach` must exceed the distance from `pt` to any occluder.
pub fn ray_sky_view(
    pt: Point,
    directions: &[Vector],
    occluders: &OccluderSet,
    reach: f64,
    hours: usize,
) -> f64 {
    if directions.is_empty() {
        return 0.;
    }
    let hours = hours.max(1);
    let escaped: f64 = directions
        .iter()
        .map(|dir| {
            let t = visibility(occluders, pt, pt + *dir * reach, None);
            (0..hours).map(|h| t.value_at(h)).sum::<f64>() / hours as f64
        })
        .sum();
    escaped / directions.len() as f64
}
