pub mod error;
pub mod geom;
pub mod io;
pub mod sim;

// Prelude
pub use error::VfError;
pub use geom::mesh::Mesh;
pub use geom::point::Point;
pub use geom::polygon::Polygon;
pub use geom::vector::Vector;
pub use sim::view_factor::{
    BoundingSurface, CancelToken, GeometryProvider, PairErrorPolicy, PlanarProvider, Shading,
    SurfaceKind, Transmissivity, ViewFactorConfig, ViewFactorResult, ViewFactorSimulation,
};
