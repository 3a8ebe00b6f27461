mod pairs;
mod quadric;

use crate::error::MeshError;
use crate::glm;
use crate::model::{Mesh, VertexSplit};
use crate::utils::constants::LOD_FACE_FLOOR;
use itertools::Itertools;
use self::pairs::{pair_key, solve_pair, Pair, PairQueue};
use self::quadric::plane_quadric;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// options controlling a simplification run
#[derive(Debug, Clone)]
pub struct SimplifyOptions {
    /// face count the contraction loop reduces the mesh to; a soft floor, the
    /// run stops at or just below it
    pub target_faces: usize,
    /// record a reversible vertex split for every contraction
    pub record_splits: bool,
    /// fail on degenerate faces instead of dropping them with a warning
    pub strict: bool,
    /// distance below which two unconnected vertices form a valid pair;
    /// zero seeds edge pairs only
    pub distance_threshold: f64,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            target_faces: 1,
            record_splits: false,
            strict: false,
            distance_threshold: 0.0,
        }
    }
}

/// reduces ``mesh`` to at most ``options.target_faces`` faces by iterated
/// pair contraction, greedily picking the contraction of least quadric error
///
/// the input mesh is left untouched on every path; any split records it
/// carries do not survive into the simplified output
pub fn simplify(mesh: &Mesh, options: &SimplifyOptions) -> Result<Mesh, MeshError> {
    if options.record_splits && !mesh.splits.is_empty() {
        return Err(MeshError::IncompatibleOptions(
            "cannot record splits for a mesh that already carries them".into(),
        ));
    }
    let mut state = SimplifyState::build(mesh, options)?;
    state.run(options.target_faces);
    Ok(state.into_mesh())
}

/// successively halved versions of the mesh for LOD rendering, finest first
pub fn lod_chain(mesh: &Mesh, levels: usize) -> Result<Vec<Mesh>, MeshError> {
    let mut chain: Vec<Mesh> = Vec::with_capacity(levels);
    for _ in 0..levels {
        let source = chain.last().unwrap_or(mesh);
        let options = SimplifyOptions {
            target_faces: (source.faces.len() / 2).max(LOD_FACE_FLOOR),
            ..SimplifyOptions::default()
        };
        chain.push(simplify(source, &options)?);
    }
    Ok(chain)
}

/// working state of one simplification run
///
/// faces keep their slot in ``faces`` for their whole life so that incidence
/// entries stay valid; a removed face leaves ``None`` behind
struct SimplifyState {
    positions: Vec<glm::DVec3>,
    live: Vec<bool>,
    quadrics: Vec<glm::DMat4>,
    faces: Vec<Option<[usize; 3]>>,
    face_count: usize,
    incidence: Vec<BTreeSet<usize>>,
    vertex_pairs: Vec<BTreeSet<(usize, usize)>>,
    pairs: HashMap<(usize, usize), Pair>,
    queue: PairQueue,
    record_splits: bool,
    splits: Vec<VertexSplit>,
    removed: Vec<usize>,
}

impl SimplifyState {
    fn build(mesh: &Mesh, options: &SimplifyOptions) -> Result<Self, MeshError> {
        let positions = mesh.vertices.clone();

        // degenerate faces fail a strict run and are dropped otherwise,
        // before they can contribute quadrics or pairs
        let mut kept = Vec::with_capacity(mesh.faces.len());
        let mut face_quadrics = Vec::with_capacity(mesh.faces.len());
        for face in &mesh.faces {
            let [i0, i1, i2] = *face;
            match plane_quadric(&positions[i0], &positions[i1], &positions[i2]) {
                Some(kp) => {
                    kept.push(*face);
                    face_quadrics.push(kp);
                }
                None if options.strict => {
                    return Err(MeshError::DegenerateFace {
                        indices: *face,
                        positions: [positions[i0], positions[i1], positions[i2]],
                    });
                }
                None => {
                    log::warn!("dropping degenerate face ({i0}, {i1}, {i2})");
                }
            }
        }

        let mut quadrics = vec![glm::DMat4::zeros(); positions.len()];
        for (face, kp) in kept.iter().zip(&face_quadrics) {
            for &v in face {
                quadrics[v] += *kp;
            }
        }

        let mut incidence = vec![BTreeSet::new(); positions.len()];
        for (fid, face) in kept.iter().enumerate() {
            for &v in face {
                incidence[v].insert(fid);
            }
        }

        let face_count = kept.len();
        let mut state = Self {
            live: vec![true; positions.len()],
            vertex_pairs: vec![BTreeSet::new(); positions.len()],
            positions,
            quadrics,
            faces: kept.into_iter().map(Some).collect(),
            face_count,
            incidence,
            pairs: HashMap::new(),
            queue: PairQueue::default(),
            record_splits: options.record_splits,
            splits: Vec::new(),
            removed: Vec::new(),
        };
        state.seed_pairs(options.distance_threshold);
        Ok(state)
    }

    /// seeds edge pairs from the face list, plus every pair of vertices
    /// closer than the distance threshold; deduplication is by index set
    fn seed_pairs(&mut self, distance_threshold: f64) {
        let mut keys = BTreeSet::new();
        for face in self.faces.iter().flatten() {
            for (a, b) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                keys.insert(pair_key(a, b));
            }
        }
        if distance_threshold > 0.0 {
            for (v1, v2) in (0..self.positions.len()).tuple_combinations::<(_, _)>() {
                if glm::distance(&self.positions[v1], &self.positions[v2]) < distance_threshold {
                    keys.insert(pair_key(v1, v2));
                }
            }
        }
        log::debug!("seeded {} candidate pairs", keys.len());
        for (v1, v2) in keys {
            let pair = solve_pair(v1, v2, &self.positions, &self.quadrics);
            self.queue.insert(&pair);
            self.pairs.insert((v1, v2), pair);
            self.vertex_pairs[v1].insert((v1, v2));
            self.vertex_pairs[v2].insert((v1, v2));
        }
    }

    /// pops and contracts the cheapest pair until the face count reaches the
    /// target or no valid contraction is left
    fn run(&mut self, target_faces: usize) {
        let initial = self.face_count;
        let mut contractions = 0usize;
        while self.face_count > target_faces {
            let Some(key) = self.queue.pop_min() else { break };
            if let Some(pair) = self.pairs.remove(&key) {
                self.contract(pair);
                contractions += 1;
            }
        }
        log::info!(
            "simplified {initial} faces down to {} with {contractions} contractions",
            self.face_count
        );
    }

    /// contracts ``pair``: folds v2 into v1 at the cached target position and
    /// rebuilds every pair that mentioned either endpoint
    fn contract(&mut self, pair: Pair) {
        let Pair { v1, v2, target, .. } = pair;
        log::debug!("contracting ({v1}, {v2}) with cost {:.3e}", pair.cost);

        if self.record_splits {
            self.push_split(&pair);
        }

        self.positions[v1] = target;
        self.quadrics[v1] = self.quadrics[v1] + self.quadrics[v2];

        // faces of v2 either degenerate (they also contain v1) or are rewired
        for fid in std::mem::take(&mut self.incidence[v2]) {
            if self.incidence[v1].contains(&fid) {
                if let Some(face) = self.faces[fid].take() {
                    self.face_count -= 1;
                    for v in face {
                        if v != v2 {
                            self.incidence[v].remove(&fid);
                        }
                    }
                }
            } else if let Some(face) = self.faces[fid].as_mut() {
                for slot in face.iter_mut() {
                    if *slot == v2 {
                        *slot = v1;
                    }
                }
                self.incidence[v1].insert(fid);
            }
        }
        self.live[v2] = false;

        // the surviving vertex inherits v2's pairs; endpoint rewriting can
        // collapse two pairs onto the same index set, which merges them
        let old_keys: BTreeSet<(usize, usize)> = std::mem::take(&mut self.vertex_pairs[v1])
            .into_iter()
            .chain(std::mem::take(&mut self.vertex_pairs[v2]))
            .collect();
        let mut new_keys = BTreeSet::new();
        for key in old_keys {
            if let Some(stale) = self.pairs.remove(&key) {
                self.queue.remove(&stale);
            }
            let (a, b) = key;
            for endpoint in [a, b] {
                if endpoint != v1 && endpoint != v2 {
                    self.vertex_pairs[endpoint].remove(&key);
                }
            }
            let a = if a == v2 { v1 } else { a };
            let b = if b == v2 { v1 } else { b };
            if a != b {
                new_keys.insert(pair_key(a, b));
            }
        }
        for (a, b) in new_keys {
            let rebuilt = solve_pair(a, b, &self.positions, &self.quadrics);
            self.queue.insert(&rebuilt);
            self.pairs.insert((a, b), rebuilt);
            self.vertex_pairs[a].insert((a, b));
            self.vertex_pairs[b].insert((a, b));
        }
    }

    /// records the reversible split for ``pair``; runs before any mutation
    /// because it needs the old positions and v2's old incidence
    fn push_split(&mut self, pair: &Pair) {
        let faces = self.incidence[pair.v2]
            .iter()
            .filter_map(|&fid| self.faces[fid])
            .map(|face| face.map(|v| (v != pair.v2).then_some(v)))
            .collect();
        self.splits.push(VertexSplit {
            survivor: pair.v1,
            survivor_pos: self.positions[pair.v1],
            removed_pos: self.positions[pair.v2],
            faces,
        });
        self.removed.push(pair.v2);
    }

    /// compacts live vertices, renumbers faces, and translates the split
    /// records into the emitted index space
    fn into_mesh(self) -> Mesh {
        let mut remap = vec![usize::MAX; self.positions.len()];
        let mut vertices = Vec::new();
        for (v, position) in self.positions.iter().enumerate() {
            if self.live[v] {
                remap[v] = vertices.len();
                vertices.push(*position);
            }
        }
        let faces = self
            .faces
            .iter()
            .flatten()
            .map(|face| face.map(|v| remap[v]))
            .collect_vec();

        // vertices folded away mid-run resurface during expansion with
        // predictable indices: the j-th contraction of k is undone (k-1-j)
        // splits into the replay, right after the base vertices
        let base = vertices.len();
        let total = self.splits.len();
        for (j, &removed) in self.removed.iter().enumerate() {
            remap[removed] = base + (total - 1 - j);
        }
        let splits: VecDeque<VertexSplit> = self
            .splits
            .into_iter()
            .rev()
            .map(|split| VertexSplit {
                survivor: remap[split.survivor],
                survivor_pos: split.survivor_pos,
                removed_pos: split.removed_pos,
                faces: split
                    .faces
                    .iter()
                    .map(|face| face.map(|slot| slot.map(|v| remap[v])))
                    .collect(),
            })
            .collect();

        Mesh {
            vertices,
            faces,
            splits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Mesh {
        Mesh {
            vertices: vec![
                glm::DVec3::new(1.0, 1.0, 1.0),
                glm::DVec3::new(1.0, -1.0, -1.0),
                glm::DVec3::new(-1.0, 1.0, -1.0),
                glm::DVec3::new(-1.0, -1.0, 1.0),
            ],
            faces: vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
            splits: VecDeque::new(),
        }
    }

    #[test]
    fn queue_state_matches_pair_table() {
        let mesh = tetrahedron();
        let state = SimplifyState::build(&mesh, &SimplifyOptions::default()).unwrap();
        assert_eq!(state.pairs.len(), 6);
        for (key, pair) in &state.pairs {
            assert_eq!(*key, (pair.v1, pair.v2));
            assert!(state.queue.contains(pair));
            assert!(state.vertex_pairs[pair.v1].contains(key));
            assert!(state.vertex_pairs[pair.v2].contains(key));
        }
    }

    #[test]
    fn contraction_keeps_incidence_consistent() {
        let mesh = tetrahedron();
        let mut state = SimplifyState::build(&mesh, &SimplifyOptions::default()).unwrap();
        state.run(2);
        assert_eq!(state.face_count, 2);
        for (fid, face) in state.faces.iter().enumerate() {
            let Some(face) = face else { continue };
            assert_eq!(face.iter().unique().count(), 3);
            for &v in face {
                assert!(state.live[v]);
                assert!(state.incidence[v].contains(&fid));
            }
        }
        for (v, incident) in state.incidence.iter().enumerate() {
            for fid in incident {
                let face = state.faces[*fid].expect("incidence entry for a removed face");
                assert!(face.contains(&v));
            }
        }
    }

    #[test]
    fn recomputed_pairs_track_the_merged_quadrics() {
        let mesh = tetrahedron();
        let mut state = SimplifyState::build(&mesh, &SimplifyOptions::default()).unwrap();
        state.run(2);
        for (key, pair) in &state.pairs {
            let combined = state.quadrics[key.0] + state.quadrics[key.1];
            let expected = quadric::quadric_error(&combined, &pair.target);
            assert!((pair.cost - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }
}
