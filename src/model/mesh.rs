use crate::glm;
use std::collections::{BTreeSet, VecDeque};

/// a triangle mesh with optional vertex split records attached
///
/// vertex indices are stable handles: the simplifier never renumbers them
/// mid-run and compacts them only when it emits its output mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<glm::DVec3>,
    /// ordered index triples; the ordering carries the front-face normal
    pub faces: Vec<[usize; 3]>,
    /// replay-ordered split records; the front is the first split the
    /// expander consumes (the last contraction the simplifier performed)
    pub splits: VecDeque<VertexSplit>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// computes for every vertex the set of faces containing it
    pub(crate) fn incidence_map(&self) -> Vec<BTreeSet<usize>> {
        let mut incidence = vec![BTreeSet::new(); self.vertices.len()];
        for (fid, face) in self.faces.iter().enumerate() {
            for &v in face {
                incidence[v].insert(fid);
            }
        }
        incidence
    }
}

/// reversible record of one pair contraction
#[derive(Debug, Clone, PartialEq)]
pub struct VertexSplit {
    /// index of the vertex that survived the contraction
    pub survivor: usize,
    /// survivor position before the contraction moved it
    pub survivor_pos: glm::DVec3,
    /// position of the vertex that was folded away
    pub removed_pos: glm::DVec3,
    /// faces incident to the removed vertex at contraction time;
    /// a ``None`` slot marks where the re-materialized vertex goes
    pub faces: Vec<[Option<usize>; 3]>,
}
