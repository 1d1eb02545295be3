use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ndarray as nd;
use rayon::prelude::*;

use crate::Point;
use crate::error::{Result, VfError};
use crate::geom::bboxes::{bbox_diagonal, bounding_box};
use crate::geom::mesh::Mesh;
use crate::sim::view_factor::aggregate::{ViewRay, normalize_point, pair_view_factor};
use crate::sim::view_factor::config::{PairErrorPolicy, ViewFactorConfig};
use crate::sim::view_factor::discretize::{coarse_mesh, detail_mesh};
use crate::sim::view_factor::distance::{DistanceTable, distance};
use crate::sim::view_factor::element::extract_elements;
use crate::sim::view_factor::occluder::{OccluderOwner, OccluderSet};
use crate::sim::view_factor::provider::{GeometryProvider, MeshDensity};
use crate::sim::view_factor::result::{
    Byproducts, DetailMesh, HourlyViewFactors, RunWarning, Stratification, ViewFactorMatrix,
    ViewFactorResult, WindowInfo,
};
use crate::sim::view_factor::sky::{ray_sky_view, sky_directions};
use crate::sim::view_factor::surface::{BoundingSurface, Shading, SurfaceKind};

/// Cooperative cancellation flag, checked before every task of a run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// View factors from sample points to the bounding surfaces of a zone.
pub struct ViewFactorSimulation<'a, P: GeometryProvider> {
    provider: &'a P,
    points: &'a [Point],
    surfaces: &'a [BoundingSurface<P::Surface>],
    shading: &'a [Shading<P::Surface>],
    config: ViewFactorConfig,
    /// Length of the hourly transmissivity series, if any.
    hours: Option<usize>,
}

/// Output of one (point, surface) pair.
struct PairOutcome {
    factors: Vec<f64>,
    detail: Option<Mesh>,
    rays: Vec<ViewRay>,
}

impl<'a, P: GeometryProvider> ViewFactorSimulation<'a, P> {
    /// Validates configuration and inputs. No geometry work is done here.
    pub fn new(
        provider: &'a P,
        points: &'a [Point],
        surfaces: &'a [BoundingSurface<P::Surface>],
        config: ViewFactorConfig,
    ) -> Result<Self> {
        Self::with_shading(provider, points, surfaces, &[], config)
    }

    /// Like [`Self::new`], with additional shading geometry.
    pub fn with_shading(
        provider: &'a P,
        points: &'a [Point],
        surfaces: &'a [BoundingSurface<P::Surface>],
        shading: &'a [Shading<P::Surface>],
        config: ViewFactorConfig,
    ) -> Result<Self> {
        config.validate()?;
        if points.is_empty() {
            return Err(VfError::InvalidConfiguration("no sample points".to_string()));
        }
        if surfaces.is_empty() {
            return Err(VfError::InvalidConfiguration("no bounding surfaces".to_string()));
        }
        if let Some(p) = points.iter().position(|p| !p.is_finite()) {
            return Err(VfError::InvalidConfiguration(format!(
                "sample point {p} has non-finite coordinates"
            )));
        }

        let mut hours: Option<usize> = None;
        let all_t = surfaces
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("surface {i}"), &s.transmissivity))
            .chain(
                shading
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (format!("shading {i}"), &s.transmissivity)),
            );
        for (what, t) in all_t {
            t.validate()
                .map_err(|e| VfError::InvalidConfiguration(format!("{what}: {e}")))?;
            match (hours, t.hours()) {
                (Some(h), Some(n)) if h != n => {
                    return Err(VfError::InvalidConfiguration(format!(
                        "{what}: hourly transmissivity has {n} values, expected {h}"
                    )));
                }
                (None, Some(n)) => hours = Some(n),
                _ => {}
            }
        }

        Ok(Self {
            provider,
            points,
            surfaces,
            shading,
            config,
            hours,
        })
    }

    pub fn config(&self) -> &ViewFactorConfig {
        &self.config
    }

    pub fn run(&self) -> Result<ViewFactorResult> {
        self.run_with_cancel(&CancelToken::new())
    }

    /// Runs the simulation. A cancelled run returns `VfError::Cancelled`
    /// and no partial results.
    pub fn run_with_cancel(&self, cancel: &CancelToken) -> Result<ViewFactorResult> {
        if !self.config.parallel {
            return self.execute(cancel);
        }
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = self.config.num_workers {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().map_err(|e| {
            VfError::InvalidConfiguration(format!("cannot start worker pool: {e}"))
        })?;
        pool.install(|| self.execute(cancel))
    }

    fn execute(&self, cancel: &CancelToken) -> Result<ViewFactorResult> {
        let n_points = self.points.len();
        let n_surfaces = self.surfaces.len();
        let n_hours = self.hours.unwrap_or(1);
        let mut active: Vec<bool> = self
            .surfaces
            .iter()
            .map(|s| !(self.config.remove_air_walls && s.is_air_wall()))
            .collect();
        log::info!(
            "View factor run: {} points, {} surfaces ({} active), {} shading objects, {} hour(s)",
            n_points,
            n_surfaces,
            active.iter().filter(|a| **a).count(),
            self.shading.len(),
            n_hours
        );
        let mut warnings: Vec<RunWarning> = Vec::new();

        // Coarse occluder meshes, once per surface
        let coarse: Vec<Option<Result<Mesh>>> = self.map_indexed(n_surfaces, |s| {
            active[s].then(|| coarse_mesh(self.provider, &self.surfaces[s].geometry, s))
        });
        let mut coarse_meshes: Vec<Option<Mesh>> = Vec::with_capacity(n_surfaces);
        for (s, mesh) in coarse.into_iter().enumerate() {
            match mesh.transpose() {
                Ok(mesh) => coarse_meshes.push(mesh),
                Err(e) => {
                    self.handle_surface_error(e, s, &mut warnings)?;
                    active[s] = false;
                    coarse_meshes.push(None);
                }
            }
        }
        let shading_meshes = self.shading_meshes(&mut warnings);

        let mut entries = Vec::new();
        for (s, mesh) in coarse_meshes.iter().enumerate() {
            if let Some(mesh) = mesh {
                entries.push((
                    OccluderOwner::Surface(s),
                    mesh,
                    self.surfaces[s].transmissivity.clone(),
                ));
            }
        }
        for (i, mesh) in shading_meshes.iter().enumerate() {
            if !mesh.is_empty() {
                entries.push((
                    OccluderOwner::Shading(i),
                    mesh,
                    self.shading[i].transmissivity.clone(),
                ));
            }
        }
        let occluders = OccluderSet::build(entries);

        // Distances for every pair before any detail mesh is built
        let n_pairs = n_points * n_surfaces;
        let distances: Vec<Option<Result<f64>>> = self.map_indexed(n_pairs, |idx| {
            let (p, s) = (idx / n_surfaces, idx % n_surfaces);
            if !active[s] {
                return None;
            }
            if cancel.is_cancelled() {
                return Some(Err(VfError::Cancelled));
            }
            Some(distance(self.provider, &self.surfaces[s].geometry, self.points[p], p, s))
        });
        let mut table = DistanceTable::new(n_points, n_surfaces);
        for (idx, d) in distances.into_iter().enumerate() {
            let (p, s) = (idx / n_surfaces, idx % n_surfaces);
            match d {
                None => {}
                Some(Ok(d)) => table.set(p, s, d),
                Some(Err(e)) => self.handle_pair_error(e, p, s, &mut warnings)?,
            }
        }

        // Detail meshes, visibility and aggregation per pair
        let outcomes: Vec<Option<Result<PairOutcome>>> = self.map_indexed(n_pairs, |idx| {
            let (p, s) = (idx / n_surfaces, idx % n_surfaces);
            let d = table.get(p, s)?;
            if cancel.is_cancelled() {
                return Some(Err(VfError::Cancelled));
            }
            Some(self.compute_pair(p, s, d, &occluders, n_hours))
        });

        let mut tensor = nd::Array3::<f64>::zeros((n_points, n_surfaces, n_hours));
        let mut byproducts = Byproducts::default();
        for (idx, outcome) in outcomes.into_iter().enumerate() {
            let (p, s) = (idx / n_surfaces, idx % n_surfaces);
            match outcome {
                None => {}
                Some(Ok(out)) => {
                    for (h, f) in out.factors.into_iter().enumerate() {
                        tensor[[p, s, h]] = f;
                    }
                    if let Some(mesh) = out.detail {
                        byproducts.detail_meshes.push(DetailMesh {
                            point: p,
                            surface: s,
                            mesh,
                        });
                    }
                    byproducts.view_rays.extend(out.rays);
                }
                Some(Err(e)) => self.handle_pair_error(e, p, s, &mut warnings)?,
            }
        }

        let ray_sky = if self.config.ray_sky_view {
            Some(self.ray_sky_views(&occluders, n_hours, cancel)?)
        } else {
            None
        };
        if cancel.is_cancelled() {
            return Err(VfError::Cancelled);
        }

        let mut sky_hourly = nd::Array2::<f64>::zeros((n_points, n_hours));
        for p in 0..n_points {
            for h in 0..n_hours {
                sky_hourly[[p, h]] = normalize_point(tensor.slice_mut(nd::s![p, .., h]));
            }
        }
        let matrix = ViewFactorMatrix::new(
            tensor.sum_axis(nd::Axis(2)) / n_hours as f64,
            sky_hourly.sum_axis(nd::Axis(1)) / n_hours as f64,
        );

        let outdoor_view_factors = self.config.include_outdoor.then(|| {
            nd::Array1::from_shape_fn(n_points, |p| {
                let outdoor: f64 = (0..n_surfaces)
                    .filter(|&s| active[s] && self.surfaces[s].outdoor)
                    .filter_map(|s| matrix.get(p, s))
                    .sum();
                matrix.sky_view_factor(p).unwrap_or(0.) + outdoor
            })
        });

        let stratification = Stratification {
            point_heights: self.points.iter().map(|p| p.z).collect(),
            windows: (0..n_surfaces)
                .filter(|&s| active[s] && self.surfaces[s].kind == SurfaceKind::Window)
                .filter_map(|s| {
                    let (z_min, z_max, area) = occluders.extent_of(OccluderOwner::Surface(s))?;
                    Some(WindowInfo {
                        surface: s,
                        z_min,
                        z_max,
                        area,
                    })
                })
                .collect(),
        };

        let hourly = self.hours.map(|_| HourlyViewFactors {
            view_factors: tensor,
            sky_view_factors: sky_hourly,
        });
        byproducts.coarse_meshes = coarse_meshes;
        byproducts.shading_meshes = shading_meshes;

        let degraded = warnings
            .iter()
            .filter(|w| matches!(w, RunWarning::PairDegraded { .. }))
            .count();
        log::info!(
            "View factor run finished: {} pairs, {} degraded, {} warnings",
            n_pairs,
            degraded,
            warnings.len()
        );

        Ok(ViewFactorResult {
            points: self.points.to_vec(),
            matrix,
            hourly,
            outdoor_view_factors,
            ray_sky_view: ray_sky,
            view_vectors: sky_directions(self.config.view_resolution),
            stratification,
            warnings,
            byproducts,
        })
    }

    fn compute_pair(
        &self,
        p: usize,
        s: usize,
        d: f64,
        occluders: &OccluderSet,
        n_hours: usize,
    ) -> Result<PairOutcome> {
        let edge = self.config.detail_edge_length(d);
        let mesh = detail_mesh(self.provider, &self.surfaces[s].geometry, edge, p, s)?;
        let elements = extract_elements(&mesh, p, s)?;
        log::trace!(
            "Pair ({p}, {s}): distance {d:.3}, edge {edge:.4}, {} elements",
            elements.len()
        );

        let keep = self.config.keep_byproducts;
        let mut rays = Vec::new();
        let factors = pair_view_factor(
            self.points[p],
            &elements,
            occluders,
            OccluderOwner::Surface(s),
            n_hours,
            keep.then_some(&mut rays),
            (p, s),
        );
        Ok(PairOutcome {
            factors,
            detail: keep.then_some(mesh),
            rays,
        })
    }

    /// Coarse shading meshes. Failed or empty ones are replaced by an empty
    /// mesh and reported as warnings.
    fn shading_meshes(&self, warnings: &mut Vec<RunWarning>) -> Vec<Mesh> {
        let results: Vec<std::result::Result<Mesh, String>> =
            self.map_indexed(self.shading.len(), |i| {
                match self
                    .provider
                    .tessellate(&self.shading[i].geometry, MeshDensity::Coarse)
                {
                    Ok(mesh) if mesh.is_empty() => Err("tessellation produced no faces".to_string()),
                    Ok(mesh) => Ok(mesh),
                    Err(e) => Err(format!("{e:#}")),
                }
            });

        let mut meshes = Vec::with_capacity(results.len());
        for (i, r) in results.into_iter().enumerate() {
            match r {
                Ok(mesh) => meshes.push(mesh),
                Err(reason) => {
                    log::warn!("Shading object {i} ignored: {reason}");
                    warnings.push(RunWarning::ShadingSkipped { shading: i, reason });
                    meshes.push(Mesh::default());
                }
            }
        }
        if !meshes.is_empty() && meshes.iter().all(Mesh::is_empty) {
            log::warn!("Additional shading produced no occluder faces; running without shading");
            warnings.push(RunWarning::NoShadingOccluders);
        }
        meshes
    }

    fn ray_sky_views(
        &self,
        occluders: &OccluderSet,
        n_hours: usize,
        cancel: &CancelToken,
    ) -> Result<nd::Array1<f64>> {
        let directions = sky_directions(self.config.view_resolution);
        let mut corners: Vec<Point> = self.points.to_vec();
        for face in occluders.faces() {
            corners.extend_from_slice(&face.pts);
        }
        let reach = bounding_box(&corners)
            .map(|(lo, hi)| 2. * bbox_diagonal(lo, hi) + 1.)
            .unwrap_or(1.);

        let views: Vec<Result<f64>> = self.map_indexed(self.points.len(), |p| {
            if cancel.is_cancelled() {
                return Err(VfError::Cancelled);
            }
            Ok(ray_sky_view(self.points[p], &directions, occluders, reach, n_hours))
        });
        let views: Vec<f64> = views.into_iter().collect::<Result<_>>()?;
        Ok(nd::Array1::from(views))
    }

    /// A surface without a coarse mesh is left out of the run under
    /// `Degrade`: it occludes nothing and its view factors stay 0.
    fn handle_surface_error(
        &self,
        err: VfError,
        surface: usize,
        warnings: &mut Vec<RunWarning>,
    ) -> Result<()> {
        if self.config.pair_error_policy == PairErrorPolicy::Abort {
            return Err(err);
        }
        log::warn!("Surface {surface} left out of the run: {err}");
        warnings.push(RunWarning::SurfaceDegraded {
            surface,
            error: err.to_string(),
        });
        Ok(())
    }

    fn handle_pair_error(
        &self,
        err: VfError,
        point: usize,
        surface: usize,
        warnings: &mut Vec<RunWarning>,
    ) -> Result<()> {
        if !err.is_pair_scoped() || self.config.pair_error_policy == PairErrorPolicy::Abort {
            return Err(err);
        }
        log::warn!("Pair (point {point}, surface {surface}) degraded to 0: {err}");
        warnings.push(RunWarning::PairDegraded {
            point,
            surface,
            error: err.to_string(),
        });
        Ok(())
    }

    /// Maps `f` over `0..n` on the worker pool or the calling thread.
    /// Results are in index order either way.
    fn map_indexed<T, F>(&self, n: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        if self.config.parallel {
            (0..n).into_par_iter().map(f).collect()
        } else {
            (0..n).map(f).collect()
        }
    }
}
