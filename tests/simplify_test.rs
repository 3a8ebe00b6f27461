use meshfold::prelude::*;

fn tetrahedron() -> Mesh {
    Mesh {
        vertices: vec![
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(1.0, -1.0, -1.0),
            DVec3::new(-1.0, 1.0, -1.0),
            DVec3::new(-1.0, -1.0, 1.0),
        ],
        faces: vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        splits: Default::default(),
    }
}

/// n x n vertex sheet bent along x so contraction costs are not all equal
fn grid(n: usize) -> Mesh {
    let mut vertices = Vec::new();
    for i in 0..n {
        for j in 0..n {
            let (x, y) = (i as f64, j as f64);
            vertices.push(DVec3::new(x, y, 0.05 * x * x + 0.02 * x * y));
        }
    }
    let mut faces = Vec::new();
    for i in 0..n - 1 {
        for j in 0..n - 1 {
            let a = i * n + j;
            let (b, c, d) = (a + 1, a + n, a + n + 1);
            faces.push([a, b, c]);
            faces.push([b, d, c]);
        }
    }
    Mesh {
        vertices,
        faces,
        splits: Default::default(),
    }
}

fn simplify_to(mesh: &Mesh, target_faces: usize) -> Mesh {
    let options = SimplifyOptions {
        target_faces,
        ..SimplifyOptions::default()
    };
    simplify(mesh, &options).unwrap()
}

#[test]
fn tetrahedron_reaches_the_target() {
    let simplified = simplify_to(&tetrahedron(), 2);
    assert_eq!(simplified.faces.len(), 2);
    assert_eq!(simplified.vertices.len(), 3);
}

#[test]
fn target_above_face_count_changes_nothing() {
    let mesh = tetrahedron();
    let simplified = simplify_to(&mesh, 10);
    assert_eq!(simplified, mesh);
}

#[test]
fn grid_simplification_upholds_face_structure() {
    let simplified = simplify_to(&grid(8), 30);
    assert!(simplified.faces.len() <= 30);
    assert!(!simplified.faces.is_empty());
    for face in &simplified.faces {
        assert!(face.iter().all(|&v| v < simplified.vertices.len()));
        assert_ne!(face[0], face[1]);
        assert_ne!(face[1], face[2]);
        assert_ne!(face[0], face[2]);
    }
}

#[test]
fn strict_mode_rejects_collinear_faces() {
    let mesh = Mesh {
        vertices: vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(2.0, 2.0, 2.0),
        ],
        faces: vec![[0, 1, 2]],
        splits: Default::default(),
    };
    let options = SimplifyOptions {
        target_faces: 1,
        strict: true,
        ..SimplifyOptions::default()
    };
    let error = simplify(&mesh, &options).unwrap_err();
    assert!(matches!(
        error,
        MeshError::DegenerateFace {
            indices: [0, 1, 2],
            ..
        }
    ));
    assert!(error.to_string().contains("(1, 1, 1)"));
}

#[test]
fn lenient_mode_drops_collinear_faces() {
    let mesh = Mesh {
        vertices: vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(2.0, 2.0, 2.0),
        ],
        faces: vec![[0, 1, 2]],
        splits: Default::default(),
    };
    let simplified = simplify_to(&mesh, 1);
    assert!(simplified.faces.is_empty());
    assert_eq!(simplified.vertices.len(), 3);
}

/// two disjoint coplanar triangles, one cross pair within reach: the tie-break
/// pops the cross pair first, welding the components before faces collapse
#[test]
fn distance_pairs_merge_disconnected_components() {
    let mesh = Mesh {
        vertices: vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(0.5, 0.0, 0.0),
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(1.5, 0.0, 0.0),
            DVec3::new(0.0, -1.0, 0.0),
            DVec3::new(0.5, 1.0, 0.0),
        ],
        faces: vec![[0, 2, 4], [1, 3, 5]],
        splits: Default::default(),
    };

    // edge pairs alone never touch the other component
    let separate = simplify_to(&mesh, 1);
    assert_eq!(separate.faces.len(), 1);
    assert_eq!(separate.vertices.len(), 5);

    // the cross pair {0, 1} sits 0.5 apart and joins the run below 0.6
    let options = SimplifyOptions {
        target_faces: 1,
        distance_threshold: 0.6,
        ..SimplifyOptions::default()
    };
    let merged = simplify(&mesh, &options).unwrap();
    assert_eq!(merged.faces.len(), 1);
    assert_eq!(merged.vertices.len(), 4);
}

#[test]
fn identical_runs_serialize_identically() {
    let mesh = grid(8);
    let options = SimplifyOptions {
        target_faces: 30,
        record_splits: true,
        ..SimplifyOptions::default()
    };

    let mut first = Vec::new();
    write_obj(&simplify(&mesh, &options).unwrap(), &mut first).unwrap();
    let mut second = Vec::new();
    write_obj(&simplify(&mesh, &options).unwrap(), &mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn recording_rejects_meshes_that_already_carry_splits() {
    let options = SimplifyOptions {
        target_faces: 2,
        record_splits: true,
        ..SimplifyOptions::default()
    };
    let progressive = simplify(&tetrahedron(), &options).unwrap();
    assert!(!progressive.splits.is_empty());

    let error = simplify(&progressive, &options).unwrap_err();
    assert!(matches!(error, MeshError::IncompatibleOptions(_)));
}

#[test]
fn lod_chain_halves_every_level() {
    let mesh = grid(6);
    let chain = lod_chain(&mesh, 3).unwrap();
    assert_eq!(chain.len(), 3);

    let mut expected_ceiling = mesh.faces.len();
    for level in &chain {
        expected_ceiling = (expected_ceiling / 2).max(LOD_FACE_FLOOR);
        assert!(level.faces.len() <= expected_ceiling);
        assert!(!level.faces.is_empty());
        expected_ceiling = level.faces.len();
    }
    // the source mesh is never consumed
    assert_eq!(mesh.faces.len(), 50);
}
