//! View factor results.

use ndarray as nd;
use serde::{Deserialize, Serialize};

use crate::geom::mesh::Mesh;
use crate::sim::view_factor::aggregate::ViewRay;
use crate::{Point, Vector};

/// View factors from every sample point to every bounding surface.
///
/// Rows are sample points and columns are surfaces in input order. For every
/// point the row sum plus the sky view factor is 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFactorMatrix {
    view_factors: nd::Array2<f64>,
    sky_view_factors: nd::Array1<f64>,
}

impl ViewFactorMatrix {
    pub(crate) fn new(view_factors: nd::Array2<f64>, sky_view_factors: nd::Array1<f64>) -> Self {
        Self {
            view_factors,
            sky_view_factors,
        }
    }

    pub fn n_points(&self) -> usize {
        self.view_factors.nrows()
    }

    pub fn n_surfaces(&self) -> usize {
        self.view_factors.ncols()
    }

    pub fn get(&self, point: usize, surface: usize) -> Option<f64> {
        self.view_factors.get((point, surface)).copied()
    }

    pub fn sky_view_factor(&self, point: usize) -> Option<f64> {
        self.sky_view_factors.get(point).copied()
    }

    /// View factors of one point aligned to the surface order.
    pub fn row(&self, point: usize) -> nd::ArrayView1<'_, f64> {
        self.view_factors.row(point)
    }

    pub fn view_factors(&self) -> &nd::Array2<f64> {
        &self.view_factors
    }

    pub fn sky_view_factors(&self) -> &nd::Array1<f64> {
        &self.sky_view_factors
    }
}

/// Hourly view factors, produced when any occluder has an hourly transmissivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyViewFactors {
    /// point x surface x hour
    pub view_factors: nd::Array3<f64>,
    /// point x hour
    pub sky_view_factors: nd::Array2<f64>,
}

impl HourlyViewFactors {
    pub fn hours(&self) -> usize {
        self.view_factors.len_of(nd::Axis(2))
    }

    /// Snapshot of a single hour.
    pub fn at_hour(&self, hour: usize) -> Option<ViewFactorMatrix> {
        if hour >= self.hours() {
            return None;
        }
        Some(ViewFactorMatrix::new(
            self.view_factors.index_axis(nd::Axis(2), hour).to_owned(),
            self.sky_view_factors.column(hour).to_owned(),
        ))
    }
}

/// Window placement used downstream to estimate air stratification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub surface: usize,
    pub z_min: f64,
    pub z_max: f64,
    pub area: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stratification {
    /// Height (z) of every sample point.
    pub point_heights: Vec<f64>,
    pub windows: Vec<WindowInfo>,
}

/// Non-fatal problems of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// The pair failed and was given a zero view factor.
    PairDegraded {
        point: usize,
        surface: usize,
        error: String,
    },
    /// The surface could not be meshed. It occludes nothing and all its
    /// view factors are 0.
    SurfaceDegraded { surface: usize, error: String },
    /// A shading object produced no occluder faces and was ignored.
    ShadingSkipped { shading: usize, reason: String },
    /// Shading was supplied but none of it produced occluder faces.
    NoShadingOccluders,
}

/// A detail mesh kept for inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailMesh {
    pub point: usize,
    pub surface: usize,
    pub mesh: Mesh,
}

/// Meshes and rays used by the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Byproducts {
    /// Coarse occluder mesh per surface, `None` for removed air walls and
    /// surfaces that failed to mesh.
    pub coarse_meshes: Vec<Option<Mesh>>,
    pub shading_meshes: Vec<Mesh>,
    /// Filled only when byproducts are kept.
    pub detail_meshes: Vec<DetailMesh>,
    /// Filled only when byproducts are kept.
    pub view_rays: Vec<ViewRay>,
}

/// Per-point view of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointViewFactors {
    pub point: Point,
    pub view_factors: Vec<f64>,
    pub sky_view_factor: f64,
    pub outdoor_view_factor: Option<f64>,
    pub ray_sky_view: Option<f64>,
}

/// Everything a view factor run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewFactorResult {
    pub points: Vec<Point>,
    pub matrix: ViewFactorMatrix,
    pub hourly: Option<HourlyViewFactors>,
    /// Sky view factor plus view factors to outdoor-boundary surfaces.
    pub outdoor_view_factors: Option<nd::Array1<f64>>,
    /// Fraction of sky-patch rays that escape, weighted by transmissivity.
    pub ray_sky_view: Option<nd::Array1<f64>>,
    /// Sky-patch directions for the configured view resolution.
    pub view_vectors: Vec<Vector>,
    pub stratification: Stratification,
    pub warnings: Vec<RunWarning>,
    pub byproducts: Byproducts,
}

impl ViewFactorResult {
    pub fn n_points(&self) -> usize {
        self.matrix.n_points()
    }

    /// Result packaged for one sample point.
    pub fn point(&self, point: usize) -> Option<PointViewFactors> {
        let pt = *self.points.get(point)?;
        Some(PointViewFactors {
            point: pt,
            view_factors: self.matrix.row(point).to_vec(),
            sky_view_factor: self.matrix.sky_view_factor(point)?,
            outdoor_view_factor: self
                .outdoor_view_factors
                .as_ref()
                .and_then(|a| a.get(point).copied()),
            ray_sky_view: self.ray_sky_view.as_ref().and_then(|a| a.get(point).copied()),
        })
    }

    pub fn per_point(&self) -> Vec<PointViewFactors> {
        (0..self.points.len()).filter_map(|p| self.point(p)).collect()
    }
}
