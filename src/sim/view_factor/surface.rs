use serde::{Deserialize, Serialize};

use crate::sim::view_factor::transmissivity::Transmissivity;

/// Role of a bounding surface in the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    #[default]
    Wall,
    Floor,
    Ceiling,
    Window,
    /// Non-physical partition between zones sharing one air volume.
    AirWall,
}

/// A bounding surface handle plus the metadata the engine needs.
///
/// `geometry` is opaque to the engine and only handed to the Geometry Provider.
#[derive(Debug, Clone)]
pub struct BoundingSurface<S> {
    pub geometry: S,
    pub kind: SurfaceKind,
    /// Faces the outdoors (exterior boundary condition).
    pub outdoor: bool,
    /// Transmissivity when the surface occludes other surfaces.
    pub transmissivity: Transmissivity,
}

impl<S> BoundingSurface<S> {
    /// Opaque indoor surface of the given kind.
    pub fn new(geometry: S, kind: SurfaceKind) -> Self {
        Self {
            geometry,
            kind,
            outdoor: false,
            transmissivity: Transmissivity::opaque(),
        }
    }

    pub fn with_outdoor(mut self, outdoor: bool) -> Self {
        self.outdoor = outdoor;
        self
    }

    pub fn with_transmissivity(mut self, transmissivity: Transmissivity) -> Self {
        self.transmissivity = transmissivity;
        self
    }

    pub fn is_air_wall(&self) -> bool {
        self.kind == SurfaceKind::AirWall
    }
}

/// Geometry outside the zone surfaces that can block lines of sight
/// (outdoor context, furniture).
#[derive(Debug, Clone)]
pub struct Shading<S> {
    pub geometry: S,
    pub transmissivity: Transmissivity,
}

impl<S> Shading<S> {
    pub fn new(geometry: S, transmissivity: Transmissivity) -> Self {
        Self {
            geometry,
            transmissivity,
        }
    }
}
