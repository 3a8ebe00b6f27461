use crate::glm;

/// converts a ``glm::DVec3`` to a ``glm::DVec4`` by adding a 1.0 in the w slot
pub fn to_homogeneous(v: &glm::DVec3) -> glm::DVec4 {
    glm::DVec4::new(v.x, v.y, v.z, 1.0)
}

/// normalizes a vector if the vector has a length, otherwise returns ``None``
pub fn normalize_non_zero(v: glm::DVec3) -> Option<glm::DVec3> {
    v.try_normalize(f64::EPSILON)
}

/// midpoint of two positions
pub fn midpoint(a: &glm::DVec3, b: &glm::DVec3) -> glm::DVec3 {
    (a + b) / 2.0
}
