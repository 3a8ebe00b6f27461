use crate::glm;
use crate::utils::tools::{midpoint, normalize_non_zero, to_homogeneous};

// The error of moving a vertex v = (x, y, z, 1) against a set of planes is the
// quadric form delta(v) = v^T * Q * v with Q = sum(K_p for p in planes) and
// K_p = p * p^T for the plane ax + by + cz + d = 0, a^2 + b^2 + c^2 = 1.

/// plane quadric ``K_p`` for the supporting plane of a triangle, or ``None``
/// if the three positions are collinear
pub(crate) fn plane_quadric(
    p0: &glm::DVec3,
    p1: &glm::DVec3,
    p2: &glm::DVec3,
) -> Option<glm::DMat4> {
    let normal = normalize_non_zero((p1 - p0).cross(&(p2 - p0)))?;
    let distance_from_origin = -normal.dot(p0);
    let mut p = to_homogeneous(&normal);
    p.w = distance_from_origin;
    Some(p * p.transpose())
}

/// evaluates the quadric form of ``q`` at a position
pub(crate) fn quadric_error(q: &glm::DMat4, at: &glm::DVec3) -> f64 {
    let v = to_homogeneous(at);
    (v.transpose() * q * v).x
}

/// optimal contraction target and cost for the combined quadric of a pair
///
/// minimizing delta is linear: zeroing the partial derivatives for x, y, z is
/// solving the quadric with its last row replaced by (0, 0, 0, 1) against
/// (0, 0, 0, 1). when that matrix is singular the minimum over the two
/// endpoints and their midpoint is used instead.
pub(crate) fn solve_target(
    q: &glm::DMat4,
    pos1: &glm::DVec3,
    pos2: &glm::DVec3,
) -> (glm::DVec3, f64) {
    let partial_derivative_mat = glm::DMat4::new(
        q[(0, 0)],
        q[(0, 1)],
        q[(0, 2)],
        q[(0, 3)],
        q[(1, 0)],
        q[(1, 1)],
        q[(1, 2)],
        q[(1, 3)],
        q[(2, 0)],
        q[(2, 1)],
        q[(2, 2)],
        q[(2, 3)],
        0.0,
        0.0,
        0.0,
        1.0,
    );
    if let Some(inv_deriv_mat) = partial_derivative_mat.try_inverse() {
        let target = (inv_deriv_mat * glm::DVec4::new(0.0, 0.0, 0.0, 1.0)).xyz();
        (target, quadric_error(q, &target))
    } else {
        let mut best = (*pos1, quadric_error(q, pos1));
        for candidate in [*pos2, midpoint(pos1, pos2)] {
            let error = quadric_error(q, &candidate);
            if error < best.1 {
                best = (candidate, error);
            }
        }
        best
    }
}
