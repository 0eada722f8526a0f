// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OFF, OBJ and MTL parsers using pest
//!
//! The grammars only handle the lexical shape of each line. Record counts, index
//! ranges and keyword arity are checked here so errors carry a readable message and
//! the position of the offending record.

use crate::error::{MeshError, MeshResult};
use crate::extra_data::Material;
use log::debug;
use nalgebra::{Point3, Vector2, Vector3};
use pest::error::{Error as PestError, LineColLocation};
use pest::iterators::Pair;
use pest::{Parser, RuleType};

mod off {
    use pest_derive::Parser;

    #[derive(Parser)]
    #[grammar = "io/off.pest"]
    pub struct OffParser;
}

mod obj {
    use pest_derive::Parser;

    #[derive(Parser)]
    #[grammar = "io/obj.pest"]
    pub struct ObjParser;
}

mod mtl {
    use pest_derive::Parser;

    #[derive(Parser)]
    #[grammar = "io/mtl.pest"]
    pub struct MtlParser;
}

/// Line and column, both 1-based
pub(crate) type Position = (usize, usize);

/// A value tagged with the position of the record it came from
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Located<T> {
    pub position: Position,
    pub value: T,
}

/// Contents of an OFF file
#[derive(Debug, Clone, Default)]
pub(crate) struct OffDocument {
    pub vertices: Vec<Point3<f64>>,
    /// Polygons as 0-based vertex indices
    pub faces: Vec<Located<Vec<usize>>>,
}

/// One polygon corner of an OBJ face, with raw (1-based or negative) indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ObjCorner {
    pub vertex: i64,
    pub tex_coord: Option<i64>,
    pub normal: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ObjStatement {
    Vertex(Point3<f64>),
    TexCoord(Vector2<f64>),
    Normal(Vector3<f64>),
    Face(Vec<ObjCorner>),
    UseMaterial(String),
    MaterialLibraries(Vec<String>),
    /// Any other directive, kept verbatim
    Directive(String),
}

const OBJ_KEYWORDS: &[&str] = &["v", "vt", "vn", "f", "usemtl", "mtllib"];
const MTL_KEYWORDS: &[&str] = &[
    "newmtl", "Ka", "Kd", "Ks", "Ke", "Ns", "Ni", "d", "map_Ka", "map_Kd", "map_Ks",
];

fn syntax_error<R: RuleType>(format: &'static str, err: PestError<R>) -> MeshError {
    let position = match err.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    MeshError::parse(format, position, err.variant.message().into_owned())
}

fn position_of<R: RuleType>(pair: &Pair<'_, R>) -> Position {
    pair.as_span().start_pos().line_col()
}

fn number<R: RuleType>(format: &'static str, pair: Pair<'_, R>) -> MeshResult<f64> {
    pair.as_str().parse::<f64>().map_err(|_| {
        MeshError::parse(format, position_of(&pair), format!("invalid number '{}'", pair.as_str()))
    })
}

fn numbers<'i, R: RuleType>(
    format: &'static str,
    pairs: impl Iterator<Item = Pair<'i, R>>,
) -> MeshResult<Vec<f64>> {
    pairs.map(|pair| number(format, pair)).collect()
}

/// Parse an OFF document
pub(crate) fn parse_off(source: &str) -> MeshResult<OffDocument> {
    use off::{OffParser, Rule};
    const FORMAT: &str = "OFF";

    let file = OffParser::parse(Rule::file, source)
        .map_err(|e| syntax_error(FORMAT, e))?
        .next()
        .ok_or_else(|| MeshError::parse(FORMAT, (1, 1), "empty input"))?;

    let mut counts: Option<(usize, usize)> = None;
    let mut end = (1, 1);
    let mut document = OffDocument::default();

    for pair in file.into_inner() {
        let position = position_of(&pair);
        match pair.as_rule() {
            Rule::counts => {
                let values = pair
                    .into_inner()
                    .map(|count| {
                        count.as_str().parse::<usize>().map_err(|_| {
                            MeshError::parse(FORMAT, position, format!("invalid count '{}'", count.as_str()))
                        })
                    })
                    .collect::<MeshResult<Vec<_>>>()?;
                let (vertices, faces) = (values[0], values[1]);
                // Header counts are untrusted; every record occupies its own line.
                let lines = source.lines().count();
                document.vertices.reserve(vertices.min(lines));
                document.faces.reserve(faces.min(lines));
                counts = Some((vertices, faces));
            }
            Rule::record => {
                let (vertex_count, face_count) =
                    counts.ok_or_else(|| MeshError::parse(FORMAT, position, "record before element counts"))?;
                let values = numbers(FORMAT, pair.into_inner())?;

                if document.vertices.len() < vertex_count {
                    if values.len() < 3 {
                        return Err(MeshError::parse(FORMAT, position, "vertex record needs three coordinates"));
                    }
                    document.vertices.push(Point3::new(values[0], values[1], values[2]));
                } else if document.faces.len() < face_count {
                    let corners = off_face(&values).map_err(|message| MeshError::parse(FORMAT, position, message))?;
                    document.faces.push(Located { position, value: corners });
                } else {
                    return Err(MeshError::parse(
                        FORMAT,
                        position,
                        format!("unexpected record after {} vertices and {} faces", vertex_count, face_count),
                    ));
                }
            }
            Rule::EOI => end = position,
            _ => {}
        }
    }

    let (vertex_count, face_count) =
        counts.ok_or_else(|| MeshError::parse(FORMAT, end, "missing element counts"))?;
    if document.vertices.len() != vertex_count || document.faces.len() != face_count {
        return Err(MeshError::parse(
            FORMAT,
            end,
            format!(
                "expected {} vertices and {} faces, found {} and {}",
                vertex_count,
                face_count,
                document.vertices.len(),
                document.faces.len()
            ),
        ));
    }
    Ok(document)
}

/// `n i0 .. i(n-1) [color]`
fn off_face(values: &[f64]) -> Result<Vec<usize>, String> {
    let as_index = |value: f64| -> Result<usize, String> {
        if value >= 0.0 && value.fract() == 0.0 {
            Ok(value as usize)
        } else {
            Err(format!("invalid vertex index {}", value))
        }
    };

    let (&size, rest) = values.split_first().ok_or("empty face record")?;
    let size = as_index(size)?;
    if size < 3 {
        return Err(format!("face with {} vertices", size));
    }
    if rest.len() < size {
        return Err(format!("face declares {} vertices but lists {}", size, rest.len()));
    }
    rest[..size].iter().map(|&value| as_index(value)).collect()
}

/// Parse an OBJ document into positioned statements
pub(crate) fn parse_obj(source: &str) -> MeshResult<Vec<Located<ObjStatement>>> {
    use obj::{ObjParser, Rule};
    const FORMAT: &str = "OBJ";

    let file = ObjParser::parse(Rule::file, source)
        .map_err(|e| syntax_error(FORMAT, e))?
        .next()
        .ok_or_else(|| MeshError::parse(FORMAT, (1, 1), "empty input"))?;

    let mut statements = Vec::new();
    for pair in file.into_inner() {
        let position = position_of(&pair);
        let statement = match pair.as_rule() {
            Rule::vertex => {
                let v = numbers(FORMAT, pair.into_inner())?;
                ObjStatement::Vertex(Point3::new(v[0], v[1], v[2]))
            }
            Rule::tex_coord => {
                let t = numbers(FORMAT, pair.into_inner())?;
                ObjStatement::TexCoord(Vector2::new(t[0], t.get(1).copied().unwrap_or(0.0)))
            }
            Rule::normal => {
                let n = numbers(FORMAT, pair.into_inner())?;
                ObjStatement::Normal(Vector3::new(n[0], n[1], n[2]))
            }
            Rule::face => {
                let corners = pair
                    .into_inner()
                    .map(obj_corner)
                    .collect::<MeshResult<Vec<_>>>()?;
                ObjStatement::Face(corners)
            }
            Rule::use_material => {
                let name = pair.into_inner().next().map(|t| t.as_str().trim()).unwrap_or("");
                ObjStatement::UseMaterial(name.to_string())
            }
            Rule::material_lib => {
                let files = pair
                    .into_inner()
                    .flat_map(|t| t.as_str().split_whitespace().map(str::to_string).collect::<Vec<_>>())
                    .collect();
                ObjStatement::MaterialLibraries(files)
            }
            Rule::directive => {
                let keyword = pair.clone().into_inner().next().map(|k| k.as_str()).unwrap_or("");
                if OBJ_KEYWORDS.contains(&keyword) {
                    return Err(MeshError::parse(FORMAT, position, format!("malformed '{}' statement", keyword)));
                }
                ObjStatement::Directive(pair.as_str().trim().to_string())
            }
            _ => continue,
        };
        statements.push(Located { position, value: statement });
    }
    Ok(statements)
}

fn obj_corner(pair: Pair<'_, obj::Rule>) -> MeshResult<ObjCorner> {
    use obj::Rule;

    let position = position_of(&pair);
    let mut corner = ObjCorner {
        vertex: 0,
        tex_coord: None,
        normal: None,
    };
    for part in pair.into_inner() {
        let value = part
            .as_str()
            .parse::<i64>()
            .map_err(|_| MeshError::parse("OBJ", position, format!("invalid index '{}'", part.as_str())))?;
        match part.as_rule() {
            Rule::vertex_index => corner.vertex = value,
            Rule::tex_index => corner.tex_coord = Some(value),
            Rule::normal_index => corner.normal = Some(value),
            _ => {}
        }
    }
    Ok(corner)
}

/// Parse an MTL material library
pub(crate) fn parse_mtl(source: &str) -> MeshResult<Vec<Material>> {
    use mtl::{MtlParser, Rule};
    const FORMAT: &str = "MTL";

    let file = MtlParser::parse(Rule::file, source)
        .map_err(|e| syntax_error(FORMAT, e))?
        .next()
        .ok_or_else(|| MeshError::parse(FORMAT, (1, 1), "empty input"))?;

    let mut materials: Vec<Material> = Vec::new();
    for pair in file.into_inner() {
        let position = position_of(&pair);
        let rule = pair.as_rule();
        if rule == Rule::EOI {
            continue;
        }
        if rule == Rule::new_material {
            let name = pair.into_inner().next().map(|t| t.as_str().trim()).unwrap_or("");
            materials.push(Material::new(name));
            continue;
        }
        if rule == Rule::directive {
            let keyword = pair.clone().into_inner().next().map(|k| k.as_str()).unwrap_or("");
            if MTL_KEYWORDS.contains(&keyword) {
                return Err(MeshError::parse(FORMAT, position, format!("malformed '{}' statement", keyword)));
            }
            debug!("MTL line {}: ignoring '{}'", position.0, pair.as_str().trim());
            continue;
        }

        let material = materials
            .last_mut()
            .ok_or_else(|| MeshError::parse(FORMAT, position, "material property before 'newmtl'"))?;
        let mut inner = pair.into_inner();
        let key = inner.next().map(|k| k.as_str()).unwrap_or("");
        match rule {
            Rule::color => {
                let c = numbers(FORMAT, inner)?;
                let color = if c.len() == 3 {
                    Vector3::new(c[0], c[1], c[2])
                } else {
                    Vector3::repeat(c[0])
                };
                match key {
                    "Ka" => material.ambient = color,
                    "Kd" => material.diffuse = color,
                    "Ks" => material.specular = color,
                    _ => material.emissive = color,
                }
            }
            Rule::scalar => {
                let value = numbers(FORMAT, inner)?[0];
                match key {
                    "Ns" => material.shininess = value,
                    "Ni" => material.optical_density = value,
                    _ => material.dissolve = value,
                }
            }
            Rule::texture_map => {
                let file = inner.next().map(|t| t.as_str().trim().to_string());
                match key {
                    "map_Ka" => material.ambient_map = file,
                    "map_Kd" => material.diffuse_map = file,
                    _ => material.specular_map = file,
                }
            }
            _ => {}
        }
    }
    Ok(materials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_off_with_comments_and_polygons() {
        let source = "# cube corner\nOFF\n4 2 0\n0 0 0\n1 0 0  # x\n\n1 1 0\n0 1 0\n3 0 1 2\n3 0 2 3 255 0 0\n";
        let document = parse_off(source).unwrap();
        assert_eq!(document.vertices.len(), 4);
        assert_eq!(document.vertices[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(document.faces.len(), 2);
        assert_eq!(document.faces[1].value, vec![0, 2, 3]);
        assert_eq!(document.faces[1].position.0, 10);
    }

    #[test]
    fn test_parse_off_reports_positions() {
        let err = parse_off("OFF\n3 1 0\n0 0 0\n1 0\n0 1 0\n3 0 1 2\n").unwrap_err();
        match err {
            MeshError::Parse { format, line, .. } => {
                assert_eq!(format, "OFF");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected error {other:?}"),
        }

        assert!(parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n").unwrap_err().is_parse_error());
        assert!(parse_off("PLY\n").unwrap_err().is_parse_error());
        assert!(parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 1.5\n").is_err());
    }

    #[test]
    fn test_parse_off_oversized_counts() {
        let err = parse_off("OFF\n1000000000000000000 0 0\n0 0 0\n").unwrap_err();
        match err {
            MeshError::Parse { format, message, .. } => {
                assert_eq!(format, "OFF");
                assert!(message.contains("expected 1000000000000000000 vertices"));
            }
            other => panic!("unexpected error {other:?}"),
        }

        assert!(parse_off("OFF\n0 18446744073709551615 0\n").unwrap_err().is_parse_error());
        assert!(parse_off("OFF\n99999999999999999999999 0 0\n").unwrap_err().is_parse_error());
    }

    #[test]
    fn test_parse_obj_statements() {
        let source = "mtllib a.mtl b.mtl\no thing\nv 0 0 0\nv 1 0 0\nv 0 1 0 # apex\nvt 0.5\nvn 0 0 1\nusemtl red\nf 1/1/1 2//1 -1\n";
        let statements = parse_obj(source).unwrap();
        let values: Vec<&ObjStatement> = statements.iter().map(|s| &s.value).collect();

        assert_eq!(
            values[0],
            &ObjStatement::MaterialLibraries(vec!["a.mtl".into(), "b.mtl".into()])
        );
        assert_eq!(values[1], &ObjStatement::Directive("o thing".into()));
        assert_eq!(values[5], &ObjStatement::TexCoord(Vector2::new(0.5, 0.0)));
        assert_eq!(values[7], &ObjStatement::UseMaterial("red".into()));
        assert_eq!(
            values[8],
            &ObjStatement::Face(vec![
                ObjCorner { vertex: 1, tex_coord: Some(1), normal: Some(1) },
                ObjCorner { vertex: 2, tex_coord: None, normal: Some(1) },
                ObjCorner { vertex: -1, tex_coord: None, normal: None },
            ])
        );
        assert_eq!(statements[8].position.0, 9);
    }

    #[test]
    fn test_parse_obj_rejects_malformed_known_statements() {
        let err = parse_obj("v 0 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 2, .. }));
        assert!(parse_obj("v 0 zero 0\n").is_err());
        assert_eq!(parse_obj("usemtl\n").unwrap()[0].value, ObjStatement::UseMaterial(String::new()));
    }

    #[test]
    fn test_parse_mtl() {
        let source = "newmtl red\nKa 0.1 0.1 0.1\nKd 1 0 0\nNs 10\nd 0.5\nillum 2\nmap_Kd red.png\n\nnewmtl grey\nKd 0.5\n";
        let materials = parse_mtl(source).unwrap();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].name, "red");
        assert_eq!(materials[0].diffuse, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(materials[0].shininess, 10.0);
        assert_eq!(materials[0].dissolve, 0.5);
        assert_eq!(materials[0].diffuse_map.as_deref(), Some("red.png"));
        assert_eq!(materials[1].diffuse, Vector3::new(0.5, 0.5, 0.5));

        assert!(parse_mtl("Kd 1 0 0\n").is_err());
    }
}
