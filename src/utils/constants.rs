/// smallest face count a LOD level is reduced to
pub const LOD_FACE_FLOOR: usize = 4;

/// absolute tolerance for position and cost comparisons
pub const GEOMETRY_TOLERANCE: f64 = 1e-9;
