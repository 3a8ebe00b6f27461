pub mod error;
pub mod expand;
pub mod io;
pub mod model;
pub mod simplify;
pub mod utils;

pub use env_logger;
pub use itertools;
pub use log;
pub use nalgebra_glm as glm;

/// All features that are very common to use.
pub mod prelude {
    pub use crate::error::MeshError;
    pub use crate::expand::expand;
    pub use crate::glm;
    pub use crate::glm::DMat4;
    pub use crate::glm::DVec3;
    pub use crate::glm::DVec4;
    pub use crate::io::obj::{read_obj, read_obj_file, write_obj, write_obj_file};
    pub use crate::itertools::Itertools;
    pub use crate::log;
    pub use crate::model::{Mesh, VertexSplit};
    pub use crate::simplify::{lod_chain, simplify, SimplifyOptions};
    pub use crate::utils::constants::*;
    pub use crate::utils::tools::*;
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn flat_quad() -> Mesh {
        Mesh {
            vertices: vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            faces: vec![[0, 1, 2], [0, 2, 3]],
            splits: Default::default(),
        }
    }

    #[test]
    fn quad_collapses_to_one_face() {
        let options = SimplifyOptions {
            target_faces: 1,
            ..SimplifyOptions::default()
        };
        let simplified = simplify(&flat_quad(), &options).unwrap();
        assert_eq!(simplified.faces.len(), 1);
        assert_eq!(simplified.vertices.len(), 3);
        assert!(simplified.splits.is_empty());
    }

    #[test]
    fn incidence_covers_every_face() {
        let mesh = flat_quad();
        let incidence = mesh.incidence_map();
        assert_eq!(incidence[0].len(), 2);
        assert_eq!(incidence[1].len(), 1);
        assert_eq!(incidence[2].len(), 2);
        assert_eq!(incidence[3].len(), 1);
    }
}
