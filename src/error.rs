//! Error types for view factor runs.

use thiserror::Error;

/// Failures of a view factor run.
///
/// Pair-scoped variants name the sample point and surface that caused them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VfError {
    /// Bad configuration or empty inputs, detected before any geometry work.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The geometry provider could not project a point onto a surface.
    #[error("geometry error at point {point}, surface {surface}: {reason}")]
    Geometry {
        point: usize,
        surface: usize,
        reason: String,
    },

    /// Tessellation failed or produced no faces.
    ///
    /// `point` is `None` for the coarse occluder mesh, which is shared by all points.
    #[error("discretization error on surface {surface}{}: {reason}", fmt_point(.point))]
    Discretization {
        surface: usize,
        point: Option<usize>,
        reason: String,
    },

    /// A mesh face has fewer than 3 or more than 4 vertices.
    #[error("unsupported face topology on surface {surface}: face {face} has {vertices} vertices")]
    UnsupportedFaceTopology {
        surface: usize,
        face: usize,
        vertices: usize,
    },

    /// The run was cancelled before all pairs were computed.
    #[error("run cancelled")]
    Cancelled,
}

fn fmt_point(point: &Option<usize>) -> String {
    point.map(|p| format!(" (point {p})")).unwrap_or_default()
}

impl VfError {
    /// True for errors tied to a single (point, surface) pair.
    pub fn is_pair_scoped(&self) -> bool {
        match self {
            Self::Geometry { .. } | Self::UnsupportedFaceTopology { .. } => true,
            Self::Discretization { point, .. } => point.is_some(),
            Self::InvalidConfiguration(_) | Self::Cancelled => false,
        }
    }
}

/// A specialized Result type for view factor runs.
pub type Result<T> = std::result::Result<T, VfError>;
