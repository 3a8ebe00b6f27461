use crate::glm;
use crate::model::{Mesh, VertexSplit};
use itertools::Itertools;
use std::collections::BTreeSet;

/// grows ``mesh`` back towards ``target_faces`` by replaying its split
/// records front to back
///
/// replay stops once the face count reaches the target or the records run
/// out; records that were not consumed stay attached to the result
pub fn expand(mesh: &Mesh, target_faces: usize) -> Mesh {
    let mut vertices = mesh.vertices.clone();
    let mut faces = mesh.faces.clone();
    let mut splits = mesh.splits.clone();
    let mut incidence = mesh.incidence_map();

    let mut replayed = 0usize;
    while faces.len() < target_faces {
        let Some(split) = splits.pop_front() else { break };
        if !split_applies(&split, vertices.len()) {
            log::warn!(
                "split record for vertex {} does not fit this mesh; stopping replay",
                split.survivor
            );
            splits.push_front(split);
            break;
        }
        apply_split(&split, &mut vertices, &mut faces, &mut incidence);
        replayed += 1;
    }
    log::debug!("replayed {replayed} splits up to {} faces", faces.len());

    Mesh {
        vertices,
        faces,
        splits,
    }
}

/// a record is usable when every index it names exists by replay time; the
/// re-materialized vertex itself is the highest index a record may name
fn split_applies(split: &VertexSplit, vertex_count: usize) -> bool {
    split.survivor < vertex_count
        && split
            .faces
            .iter()
            .flat_map(|face| face.iter())
            .all(|slot| slot.map_or(true, |v| v <= vertex_count))
}

/// replays one split: restores the survivor, re-materializes the removed
/// vertex, points the removed vertex's old faces back at it, and re-creates
/// the faces the contraction collapsed
fn apply_split(
    split: &VertexSplit,
    vertices: &mut Vec<glm::DVec3>,
    faces: &mut Vec<[usize; 3]>,
    incidence: &mut Vec<BTreeSet<usize>>,
) {
    let s = split.survivor;
    let t = vertices.len();
    vertices[s] = split.survivor_pos;
    vertices.push(split.removed_pos);
    incidence.push(BTreeSet::new());

    // sentinel slots and serialized future indices both resolve to t
    let recorded = split
        .faces
        .iter()
        .map(|face| face.map(|slot| slot.unwrap_or(t)))
        .collect_vec();

    // a live face matches a record when the record's t slot holds s on the
    // face and the two remaining slots agree position by position
    let mut consumed = vec![false; recorded.len()];
    for fid in incidence[s].clone() {
        let face = faces[fid];
        let matched = recorded.iter().enumerate().find_map(|(r, rec)| {
            if consumed[r] || rec.contains(&s) {
                return None;
            }
            let c = rec.iter().position(|&slot| slot == t)?;
            (face[c] == s && (0..3).all(|j| j == c || face[j] == rec[j])).then_some((r, c))
        });
        if let Some((r, c)) = matched {
            consumed[r] = true;
            faces[fid][c] = t;
            incidence[s].remove(&fid);
            incidence[t].insert(fid);
        }
    }

    // collapsed faces contained both endpoints and come back whole
    for rec in recorded.iter().filter(|rec| rec.contains(&s)) {
        let fid = faces.len();
        faces.push(*rec);
        for &v in rec {
            incidence[v].insert(fid);
        }
    }
}
