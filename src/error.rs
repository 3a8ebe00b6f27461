use crate::glm;
use itertools::Itertools;
use thiserror::Error;

/// all error kinds the library surfaces
///
/// singular solves are not represented here: the cost solver recovers from
/// them in place with its candidate fallback
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error(
        "degenerate face {indices:?} with collinear vertices {}",
        format_positions(.positions)
    )]
    DegenerateFace {
        indices: [usize; 3],
        positions: [glm::DVec3; 3],
    },

    #[error("incompatible options: {0}")]
    IncompatibleOptions(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_positions(positions: &[glm::DVec3; 3]) -> String {
    positions
        .iter()
        .map(|p| format!("({}, {}, {})", p.x, p.y, p.z))
        .join(", ")
}
