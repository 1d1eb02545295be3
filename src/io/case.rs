//! JSON case files and result export.
//!
//! A case holds the zone surfaces as planar polygons, the sample points
//! (explicit, generated from a reference surface, or both), optional
//! shading geometry and the run configuration.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::sim::view_factor::sample::sample_points;
use crate::sim::view_factor::{
    BoundingSurface, PlanarProvider, Shading, SurfaceKind, Transmissivity, ViewFactorConfig,
    ViewFactorResult, ViewFactorSimulation,
};
use crate::{Point, Polygon, Vector};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub name: String,
    /// Vertex loop; reversed if it disagrees with `normal`.
    pub vertices: Vec<Point>,
    /// Outward normal hint.
    #[serde(default)]
    pub normal: Option<Vector>,
    #[serde(default)]
    pub kind: SurfaceKind,
    #[serde(default)]
    pub outdoor: bool,
    #[serde(default)]
    pub transmissivity: Transmissivity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadingSpec {
    pub name: String,
    pub vertices: Vec<Point>,
}

/// Sample points over the faces of a reference surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleGrid {
    /// Index of the reference surface (usually the floor).
    pub surface: usize,
    pub cell_size: f64,
}

/// Shading transmissivity: one value for all objects, or one entry per
/// object (each a constant or an hourly series).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShadingTransmissivity {
    All(f64),
    PerObject(Vec<Transmissivity>),
}

impl Default for ShadingTransmissivity {
    fn default() -> Self {
        Self::All(0.)
    }
}

impl ShadingTransmissivity {
    /// Transmissivity of each of `n` shading objects.
    pub fn resolve(&self, n: usize) -> Result<Vec<Transmissivity>> {
        match self {
            Self::All(t) => Ok(vec![Transmissivity::Constant(*t); n]),
            Self::PerObject(list) if list.len() == n => Ok(list.clone()),
            Self::PerObject(list) => Err(anyhow!(
                "{} shading transmissivities given for {n} shading objects",
                list.len()
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    #[serde(default)]
    pub config: ViewFactorConfig,
    pub surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub sample_grid: Option<SampleGrid>,
    #[serde(default)]
    pub shading: Vec<ShadingSpec>,
    #[serde(default)]
    pub shading_transmissivity: ShadingTransmissivity,
    /// Cap on detail mesh cells per axis of a surface.
    #[serde(default)]
    pub max_cells_per_axis: Option<usize>,
}

impl Case {
    pub fn bounding_surfaces(&self) -> Result<Vec<BoundingSurface<Polygon>>> {
        self.surfaces
            .iter()
            .map(|s| {
                let poly = Polygon::new(s.name.clone(), s.vertices.clone(), s.normal)
                    .with_context(|| format!("Invalid surface {}", s.name))?;
                Ok(BoundingSurface::new(poly, s.kind)
                    .with_outdoor(s.outdoor)
                    .with_transmissivity(s.transmissivity.clone()))
            })
            .collect()
    }

    pub fn shading_objects(&self) -> Result<Vec<Shading<Polygon>>> {
        let transmissivity = self.shading_transmissivity.resolve(self.shading.len())?;
        self.shading
            .iter()
            .zip(transmissivity)
            .map(|(s, t)| {
                let poly = Polygon::new(s.name.clone(), s.vertices.clone(), None)
                    .with_context(|| format!("Invalid shading object {}", s.name))?;
                Ok(Shading::new(poly, t))
            })
            .collect()
    }

    pub fn provider(&self) -> PlanarProvider {
        match self.max_cells_per_axis {
            Some(n) => PlanarProvider::with_max_cells_per_axis(n),
            None => PlanarProvider::new(),
        }
    }

    /// Explicit points followed by the generated grid points.
    pub fn sample_points(&self, surfaces: &[BoundingSurface<Polygon>]) -> Result<Vec<Point>> {
        let mut points = self.points.clone();
        if let Some(grid) = &self.sample_grid {
            let reference = surfaces.get(grid.surface).ok_or_else(|| {
                anyhow!("Sample grid references missing surface {}", grid.surface)
            })?;
            points.extend(sample_points(
                &self.provider(),
                &reference.geometry,
                grid.cell_size,
                self.config.distance_from_reference,
            )?);
        }
        Ok(points)
    }

    /// Runs the case with the planar polygon provider.
    pub fn run(&self) -> Result<ViewFactorResult> {
        let surfaces = self.bounding_surfaces()?;
        let shading = self.shading_objects()?;
        let points = self.sample_points(&surfaces)?;
        let provider = self.provider();
        let sim = ViewFactorSimulation::with_shading(
            &provider,
            &points,
            &surfaces,
            &shading,
            self.config.clone(),
        )?;
        Ok(sim.run()?)
    }
}

/// Reads a case from a JSON file.
pub fn read_case(path: &Path) -> Result<Case> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let case: Case = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize case from: {}", path.display()))?;
    Ok(case)
}

/// Writes a result to a JSON file.
pub fn write_result(path: &Path, result: &ViewFactorResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, result)
        .with_context(|| format!("Failed to serialize result to: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ROOM: &str = r#"{
        "config": { "grid_size": 0.2, "parallel": false, "include_outdoor": true },
        "surfaces": [
            { "name": "floor", "kind": "floor", "normal": {"dx": 0, "dy": 0, "dz": -1},
              "vertices": [{"x":0,"y":0,"z":0},{"x":2,"y":0,"z":0},{"x":2,"y":2,"z":0},{"x":0,"y":2,"z":0}] },
            { "name": "roof", "kind": "ceiling", "outdoor": true, "normal": {"dx": 0, "dy": 0, "dz": 1},
              "vertices": [{"x":0,"y":0,"z":2},{"x":2,"y":0,"z":2},{"x":2,"y":2,"z":2},{"x":0,"y":2,"z":2}] }
        ],
        "points": [{"x":1,"y":1,"z":1}],
        "sample_grid": { "surface": 0, "cell_size": 1.0 }
    }"#;

    #[test]
    fn test_case_from_string() -> Result<()> {
        let case: Case = serde_json::from_str(ROOM)?;
        assert_eq!(case.surfaces.len(), 2);
        assert_eq!(case.surfaces[1].kind, SurfaceKind::Ceiling);
        assert!(case.surfaces[1].outdoor);
        assert_eq!(case.surfaces[0].transmissivity, Transmissivity::opaque());
        assert!((case.config.grid_size - 0.2).abs() < 1e-12);
        assert!((case.config.min_edge_length - 0.01).abs() < 1e-12);
        assert_eq!(case.max_cells_per_axis, None);

        let surfaces = case.bounding_surfaces()?;
        let points = case.sample_points(&surfaces)?;
        // One explicit point and a 2 x 2 grid at the default 0.75 above the floor
        assert_eq!(points.len(), 5);
        assert!(points[1..].iter().all(|p| (p.z - 0.75).abs() < 1e-12));
        Ok(())
    }

    #[test]
    fn test_shading_transmissivity_forms() -> Result<()> {
        let all: ShadingTransmissivity = serde_json::from_str("0.5")?;
        assert_eq!(all.resolve(2)?, vec![Transmissivity::Constant(0.5); 2]);

        let per: ShadingTransmissivity = serde_json::from_str("[0.2, [1.0, 0.0]]")?;
        assert_eq!(
            per.resolve(2)?,
            vec![
                Transmissivity::Constant(0.2),
                Transmissivity::Hourly(vec![1.0, 0.0])
            ]
        );
        assert!(per.resolve(3).is_err());
        Ok(())
    }

    #[test]
    fn test_run_and_write_result() -> Result<()> {
        let mut case_file = tempfile::NamedTempFile::new()?;
        case_file.write_all(ROOM.as_bytes())?;
        let case = read_case(case_file.path())?;
        let result = case.run()?;
        assert_eq!(result.n_points(), 5);

        let dir = tempfile::tempdir()?;
        let out = dir.path().join("result.json");
        write_result(&out, &result)?;

        let json: serde_json::Value = serde_json::from_reader(File::open(&out)?)?;
        assert!(json.get("matrix").is_some());
        assert_eq!(json["points"].as_array().map(|a| a.len()), Some(5));
        let outdoor = result.outdoor_view_factors.as_ref().context("outdoor view factors")?;
        for p in 0..result.n_points() {
            let sky = result.matrix.sky_view_factor(p).context("sky")?;
            let roof = result.matrix.get(p, 1).context("roof")?;
            assert!((outdoor[p] - (sky + roof)).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_cell_cap_limits_detail_meshes() -> Result<()> {
        let mut case: Case = serde_json::from_str(ROOM)?;
        case.config.keep_byproducts = true;
        case.sample_grid = None;
        case.max_cells_per_axis = Some(4);
        let result = case.run()?;
        assert!(!result.byproducts.detail_meshes.is_empty());
        for detail in &result.byproducts.detail_meshes {
            assert!(detail.mesh.face_count() <= 16);
        }
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        assert!(read_case(Path::new("/nonexistent/case.json")).is_err());
    }
}
