//! Discretized geometric view factors from sample points to the bounding
//! surfaces of a zone, with occlusion by the zone itself and by additional
//! shading.

pub mod aggregate;
pub mod config;
pub mod discretize;
pub mod distance;
pub mod element;
pub mod occluder;
pub mod planar;
pub mod provider;
pub mod result;
pub mod sample;
pub mod simulation;
pub mod sky;
pub mod surface;
pub mod transmissivity;
pub mod visibility;
pub mod voxel_grid;

pub use config::{PairErrorPolicy, ViewFactorConfig};
pub use planar::PlanarProvider;
pub use provider::{GeometryProvider, MeshDensity};
pub use result::{PointViewFactors, RunWarning, ViewFactorMatrix, ViewFactorResult};
pub use simulation::{CancelToken, ViewFactorSimulation};
pub use surface::{BoundingSurface, Shading, SurfaceKind};
pub use transmissivity::Transmissivity;
