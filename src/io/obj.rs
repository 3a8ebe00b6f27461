//! reader and writer for the triangles-only ``.obj`` subset
//!
//! vertex splits ride along as ``#vsplit`` comment lines so a progressive
//! mesh file stays a valid ``.obj`` for any other consumer.

use crate::error::MeshError;
use crate::glm;
use crate::model::{Mesh, VertexSplit};
use itertools::Itertools;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

/// reads a mesh from ``v``, ``f`` and ``#vsplit`` lines; every other line is
/// ignored
pub fn read_obj(reader: impl BufRead) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let number = number + 1;
        if let Some(rest) = line.strip_prefix("v ") {
            mesh.vertices.push(parse_vertex(rest, number)?);
        } else if let Some(rest) = line.strip_prefix("f ") {
            mesh.faces.push(parse_face(rest, mesh.vertices.len(), number)?);
        } else if let Some(rest) = line.strip_prefix("#vsplit ") {
            mesh.splits.push_back(parse_split(rest, number)?);
        }
    }
    Ok(mesh)
}

/// reads a mesh from a file path
pub fn read_obj_file(path: impl AsRef<Path>) -> Result<Mesh, MeshError> {
    let file = File::open(path)?;
    read_obj(BufReader::new(file))
}

/// writes the mirror of ``read_obj``
///
/// all emitted indices are resolved and 1-based: a sentinel slot becomes the
/// index the expander will assign to the re-materialized vertex, which for
/// the m-th split (front to back) is the vertex count plus m
pub fn write_obj(mesh: &Mesh, writer: &mut impl Write) -> Result<(), MeshError> {
    writeln!(writer, "# {} vertices", mesh.vertices.len())?;
    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    writeln!(writer, "# {} faces", mesh.faces.len())?;
    for face in &mesh.faces {
        writeln!(writer, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
    }
    if !mesh.splits.is_empty() {
        writeln!(writer, "# {} vertex splits", mesh.splits.len())?;
    }
    for (m, split) in mesh.splits.iter().enumerate() {
        let t = mesh.vertices.len() + m;
        let faces = split
            .faces
            .iter()
            .map(|face| {
                let [a, b, c] = face.map(|slot| slot.unwrap_or(t) + 1);
                format!("({a} {b} {c})")
            })
            .join(" ");
        writeln!(
            writer,
            "#vsplit {} {{{} {} {}}} {{{} {} {}}} {{ {} }}",
            split.survivor + 1,
            split.survivor_pos.x,
            split.survivor_pos.y,
            split.survivor_pos.z,
            split.removed_pos.x,
            split.removed_pos.y,
            split.removed_pos.z,
            faces
        )?;
    }
    Ok(())
}

/// writes a mesh to a file path
pub fn write_obj_file(mesh: &Mesh, path: impl AsRef<Path>) -> Result<(), MeshError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_obj(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn malformed(line: usize, reason: impl Into<String>) -> MeshError {
    MeshError::MalformedInput {
        line,
        reason: reason.into(),
    }
}

fn parse_vertex(text: &str, line: usize) -> Result<glm::DVec3, MeshError> {
    let coords: Vec<f64> = text
        .split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|_| malformed(line, format!("'{token}' is not a decimal number")))
        })
        .try_collect()?;
    let &[x, y, z] = coords.as_slice() else {
        return Err(malformed(
            line,
            format!("expected 3 vertex coordinates, found {}", coords.len()),
        ));
    };
    Ok(glm::DVec3::new(x, y, z))
}

fn parse_face(text: &str, vertex_count: usize, line: usize) -> Result<[usize; 3], MeshError> {
    let indices: Vec<i64> = text
        .split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|_| malformed(line, format!("'{token}' is not an integer index")))
        })
        .try_collect()?;
    let &[i0, i1, i2] = indices.as_slice() else {
        return Err(malformed(
            line,
            format!("expected 3 face indices, found {}", indices.len()),
        ));
    };
    let mut face = [0usize; 3];
    for (slot, index) in face.iter_mut().zip([i0, i1, i2]) {
        if index < 1 || index as usize > vertex_count {
            return Err(malformed(
                line,
                format!("face index {index} is outside 1..={vertex_count}"),
            ));
        }
        *slot = index as usize - 1;
    }
    Ok(face)
}

/// token stream over one ``#vsplit`` payload with braces and parens padded
/// into standalone tokens
struct TokenCursor<'a> {
    tokens: SplitWhitespace<'a>,
    line: usize,
}

impl<'a> TokenCursor<'a> {
    fn next(&mut self) -> Result<&'a str, MeshError> {
        self.tokens
            .next()
            .ok_or_else(|| malformed(self.line, "truncated #vsplit record"))
    }

    fn expect(&mut self, expected: &str) -> Result<(), MeshError> {
        let token = self.next()?;
        if token != expected {
            return Err(malformed(
                self.line,
                format!("expected '{expected}' in #vsplit record, found '{token}'"),
            ));
        }
        Ok(())
    }

    fn number<T: FromStr>(&mut self) -> Result<T, MeshError> {
        let token = self.next()?;
        token
            .parse()
            .map_err(|_| malformed(self.line, format!("'{token}' is not a number")))
    }

    /// 1-based vertex reference
    fn vertex_index(&mut self) -> Result<usize, MeshError> {
        let index: i64 = self.number()?;
        if index < 1 {
            return Err(malformed(
                self.line,
                format!("vertex reference {index} must be positive"),
            ));
        }
        Ok(index as usize - 1)
    }

    /// 1-based face slot; negative values are the sentinel for the vertex
    /// being re-materialized
    fn split_slot(&mut self) -> Result<Option<usize>, MeshError> {
        let index: i64 = self.number()?;
        match index {
            i if i < 0 => Ok(None),
            0 => Err(malformed(self.line, "face indices are 1-based")),
            i => Ok(Some(i as usize - 1)),
        }
    }

    fn position(&mut self) -> Result<glm::DVec3, MeshError> {
        self.expect("{")?;
        let position = glm::DVec3::new(self.number()?, self.number()?, self.number()?);
        self.expect("}")?;
        Ok(position)
    }
}

fn parse_split(text: &str, line: usize) -> Result<VertexSplit, MeshError> {
    let padded = text
        .replace('{', " { ")
        .replace('}', " } ")
        .replace('(', " ( ")
        .replace(')', " ) ");
    let mut cursor = TokenCursor {
        tokens: padded.split_whitespace(),
        line,
    };

    let survivor = cursor.vertex_index()?;
    let survivor_pos = cursor.position()?;
    let removed_pos = cursor.position()?;

    cursor.expect("{")?;
    let mut faces = Vec::new();
    loop {
        match cursor.next()? {
            "}" => break,
            "(" => {
                let face = [
                    cursor.split_slot()?,
                    cursor.split_slot()?,
                    cursor.split_slot()?,
                ];
                cursor.expect(")")?;
                faces.push(face);
            }
            token => {
                return Err(malformed(
                    line,
                    format!("unexpected token '{token}' in #vsplit faces"),
                ));
            }
        }
    }
    if cursor.tokens.next().is_some() {
        return Err(malformed(line, "trailing tokens after #vsplit record"));
    }

    Ok(VertexSplit {
        survivor,
        survivor_pos,
        removed_pos,
        faces,
    })
}
