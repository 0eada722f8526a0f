// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! One-ring circulation
//!
//! A walk around a pivot vertex is a sequence of [`Cursor`] values. Each cursor
//! names the current triangle and the vertex whose edge with the pivot is crossed
//! next; [`advance`] crosses it. Triangles are taken as counter-clockwise, so
//! walking forward visits the one-ring counter-clockwise. Open fans start at their
//! clockwise-most triangle, closed fans at the pivot's first incident triangle.

use super::mesh::Mesh;
use super::primitive::{TriangleId, VertexId, VertexPair, NEXT, PREV};
use ahash::RandomState;
use std::collections::HashSet;

/// Position of a walk around a pivot vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub triangle: TriangleId,
    /// Corner whose edge with the pivot is crossed by the next step
    pub exit: VertexId,
}

/// Cross the edge `(pivot, cursor.exit)`; `None` at a boundary edge
pub fn advance(mesh: &Mesh, pivot: VertexId, cursor: Cursor) -> Option<Cursor> {
    let current = mesh.triangle_record(cursor.triangle)?;
    let corner = current.opposite_corner(VertexPair::new(pivot, cursor.exit))?;
    let next = current.neighbor(corner)?;
    let exit = mesh
        .triangle_record(next)?
        .vertices()
        .into_iter()
        .find(|&v| v != pivot && v != cursor.exit)?;
    Some(Cursor {
        triangle: next,
        exit,
    })
}

/// One connected fan of triangles around a pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fan {
    pub start: Cursor,
    /// Boundary vertex behind the first triangle, `None` for closed fans
    pub entry: Option<VertexId>,
}

impl Fan {
    pub fn is_closed(&self) -> bool {
        self.entry.is_none()
    }

    /// Locate the fan containing `anchor` by rewinding clockwise to a boundary
    fn locate(mesh: &Mesh, pivot: VertexId, anchor: TriangleId, limit: usize) -> Option<Fan> {
        let record = mesh.triangle_record(anchor)?;
        let local = record.local_index(pivot)?;
        let forward_exit = record.vertex(PREV[local])?;

        let mut back = Cursor {
            triangle: anchor,
            exit: record.vertex(NEXT[local])?,
        };
        let mut entered_through = forward_exit;
        for _ in 0..limit {
            match advance(mesh, pivot, back) {
                None => {
                    return Some(Fan {
                        start: Cursor {
                            triangle: back.triangle,
                            exit: entered_through,
                        },
                        entry: Some(back.exit),
                    })
                }
                Some(next) if next.triangle == anchor => break,
                Some(next) => {
                    entered_through = back.exit;
                    back = next;
                }
            }
        }

        Some(Fan {
            start: Cursor {
                triangle: anchor,
                exit: forward_exit,
            },
            entry: None,
        })
    }
}

fn collect_fans(mesh: &Mesh, pivot: VertexId) -> Vec<Fan> {
    let incident = mesh.incident_slice(pivot);
    let limit = incident.len();
    let mut fans = Vec::with_capacity(1);
    let mut seen: HashSet<TriangleId, RandomState> =
        HashSet::with_capacity_and_hasher(limit, RandomState::new());

    for &anchor in incident {
        if seen.len() >= limit {
            break;
        }
        if seen.contains(&anchor) {
            continue;
        }
        let Some(fan) = Fan::locate(mesh, pivot, anchor, limit) else {
            continue;
        };
        let walk = TriangleCirculator {
            walker: Walker::new(mesh, pivot, std::slice::from_ref(&fan)),
        };
        seen.extend(walk);
        fans.push(fan);
    }
    fans
}

/// Restartable range over the triangles around a vertex
#[derive(Debug, Clone)]
pub struct TrianglesAroundVertex<'m> {
    mesh: &'m Mesh,
    pivot: VertexId,
    fans: Vec<Fan>,
}

impl<'m> TrianglesAroundVertex<'m> {
    pub(crate) fn new(mesh: &'m Mesh, pivot: VertexId) -> Self {
        Self {
            mesh,
            pivot,
            fans: collect_fans(mesh, pivot),
        }
    }

    pub fn pivot(&self) -> VertexId {
        self.pivot
    }

    pub fn fans(&self) -> &[Fan] {
        &self.fans
    }

    /// First cursor of the walk, `None` for an isolated vertex
    pub fn begin(&self) -> Option<Cursor> {
        self.fans.first().map(|fan| fan.start)
    }

    /// True when at least one fan has a gap
    pub fn is_open(&self) -> bool {
        self.fans.iter().any(|fan| !fan.is_closed())
    }

    pub fn iter(&self) -> TriangleCirculator<'_> {
        TriangleCirculator {
            walker: Walker::new(self.mesh, self.pivot, &self.fans),
        }
    }
}

impl<'a, 'm> IntoIterator for &'a TrianglesAroundVertex<'m> {
    type Item = TriangleId;
    type IntoIter = TriangleCirculator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Restartable range over the one-ring vertices of a vertex
#[derive(Debug, Clone)]
pub struct VerticesAroundVertex<'m> {
    mesh: &'m Mesh,
    pivot: VertexId,
    fans: Vec<Fan>,
}

impl<'m> VerticesAroundVertex<'m> {
    pub(crate) fn new(mesh: &'m Mesh, pivot: VertexId) -> Self {
        Self {
            mesh,
            pivot,
            fans: collect_fans(mesh, pivot),
        }
    }

    pub fn pivot(&self) -> VertexId {
        self.pivot
    }

    pub fn is_open(&self) -> bool {
        self.fans.iter().any(|fan| !fan.is_closed())
    }

    pub fn iter(&self) -> VertexCirculator<'_> {
        VertexCirculator {
            walker: Walker::new(self.mesh, self.pivot, &self.fans),
        }
    }
}

impl<'a, 'm> IntoIterator for &'a VerticesAroundVertex<'m> {
    type Item = VertexId;
    type IntoIter = VertexCirculator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Shared walk state: which fan is active and where in it we are
#[derive(Debug, Clone)]
struct Walker<'a> {
    mesh: &'a Mesh,
    pivot: VertexId,
    fans: &'a [Fan],
    next_fan: usize,
    start: TriangleId,
    cursor: Option<Cursor>,
    remaining: usize,
}

enum Step {
    Entry(VertexId),
    Cursor(Cursor),
}

impl<'a> Walker<'a> {
    fn new(mesh: &'a Mesh, pivot: VertexId, fans: &'a [Fan]) -> Self {
        Self {
            mesh,
            pivot,
            fans,
            next_fan: 0,
            start: TriangleId(0),
            cursor: None,
            remaining: 0,
        }
    }

    fn step(&mut self) -> Option<Step> {
        if self.cursor.is_none() {
            let fan = self.fans.get(self.next_fan)?;
            self.next_fan += 1;
            self.start = fan.start.triangle;
            self.cursor = Some(fan.start);
            self.remaining = self.mesh.incident_slice(self.pivot).len();
            if let Some(entry) = fan.entry {
                return Some(Step::Entry(entry));
            }
        }

        let cursor = self.cursor?;
        self.remaining = self.remaining.saturating_sub(1);
        self.cursor = advance(self.mesh, self.pivot, cursor)
            .filter(|next| next.triangle != self.start && self.remaining > 0);
        Some(Step::Cursor(cursor))
    }
}

/// Lazy walk over the triangles around a vertex
#[derive(Debug, Clone)]
pub struct TriangleCirculator<'a> {
    walker: Walker<'a>,
}

impl Iterator for TriangleCirculator<'_> {
    type Item = TriangleId;

    fn next(&mut self) -> Option<TriangleId> {
        loop {
            match self.walker.step()? {
                Step::Entry(_) => continue,
                Step::Cursor(cursor) => return Some(cursor.triangle),
            }
        }
    }
}

/// Lazy walk over the one-ring vertices of a vertex
#[derive(Debug, Clone)]
pub struct VertexCirculator<'a> {
    walker: Walker<'a>,
}

impl Iterator for VertexCirculator<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        match self.walker.step()? {
            Step::Entry(vertex) => Some(vertex),
            Step::Cursor(cursor) => Some(cursor.exit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    /// Square fan of four triangles around a center vertex
    fn closed_fan() -> (Mesh, VertexId, Vec<VertexId>, Vec<TriangleId>) {
        let mut mesh = Mesh::new();
        let center = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let ring: Vec<VertexId> = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(Point3::new(x, y, 0.0)))
            .collect();
        let triangles = (0..4)
            .map(|i| mesh.add_triangle(center, ring[i], ring[(i + 1) % 4]).unwrap())
            .collect();
        (mesh, center, ring, triangles)
    }

    #[test]
    fn test_closed_fan_visits_each_triangle_once() {
        let (mesh, center, ring, triangles) = closed_fan();
        let range = mesh.triangles_around_vertex(center).unwrap();
        assert!(!range.is_open());
        assert_eq!(range.iter().collect::<Vec<_>>(), triangles);

        let vertices: Vec<_> = mesh.vertices_around_vertex(center).unwrap().iter().collect();
        assert_eq!(vertices, vec![ring[1], ring[2], ring[3], ring[0]]);
    }

    #[test]
    fn test_open_fan_starts_at_boundary() {
        let (mut mesh, center, ring, triangles) = closed_fan();
        mesh.remove_triangle(triangles[1]).unwrap();

        let range = mesh.triangles_around_vertex(center).unwrap();
        assert!(range.is_open());
        assert_eq!(
            range.iter().collect::<Vec<_>>(),
            vec![triangles[2], triangles[3], triangles[0]]
        );
        let vertices: Vec<_> = mesh.vertices_around_vertex(center).unwrap().iter().collect();
        assert_eq!(vertices, vec![ring[2], ring[3], ring[0], ring[1]]);
    }

    #[test]
    fn test_range_is_restartable() {
        let (mesh, center, _, _) = closed_fan();
        let range = mesh.triangles_around_vertex(center).unwrap();
        let first: Vec<_> = range.iter().collect();
        let second: Vec<_> = (&range).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(range.begin().map(|c| c.triangle), first.first().copied());
    }

    #[test]
    fn test_advance_is_pure() {
        let (mesh, center, ring, triangles) = closed_fan();
        let cursor = Cursor {
            triangle: triangles[0],
            exit: ring[1],
        };
        let next = advance(&mesh, center, cursor).unwrap();
        assert_eq!(next, advance(&mesh, center, cursor).unwrap());
        assert_eq!(next.triangle, triangles[1]);
        assert_eq!(next.exit, ring[2]);
    }

    #[test]
    fn test_isolated_vertex_has_empty_ring() {
        let mut mesh = Mesh::new();
        let v = mesh.add_vertex(Point3::origin());
        let range = mesh.triangles_around_vertex(v).unwrap();
        assert_eq!(range.iter().count(), 0);
        assert!(range.begin().is_none());
        assert_eq!(mesh.vertices_around_vertex(v).unwrap().iter().count(), 0);
    }

    #[test]
    fn test_bowtie_vertex_walks_every_fan() {
        let mut mesh = Mesh::new();
        let pivot = mesh.add_vertex(Point3::origin());
        let p: Vec<VertexId> = [(1.0, 0.0), (1.0, 1.0), (-1.0, 0.0), (-1.0, -1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(Point3::new(x, y, 0.0)))
            .collect();
        let t0 = mesh.add_triangle(pivot, p[0], p[1]).unwrap();
        let t1 = mesh.add_triangle(pivot, p[2], p[3]).unwrap();

        let range = mesh.triangles_around_vertex(pivot).unwrap();
        assert_eq!(range.fans().len(), 2);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![t0, t1]);
        assert_eq!(mesh.vertices_around_vertex(pivot).unwrap().iter().count(), 4);
    }

    #[test]
    fn test_many_wedges_share_one_vertex() {
        let mut mesh = Mesh::new();
        let pivot = mesh.add_vertex(Point3::origin());
        let wedges = 64;
        let mut expected = Vec::new();
        for i in 0..wedges {
            let z = i as f64;
            let a = mesh.add_vertex(Point3::new(1.0, 0.0, z));
            let b = mesh.add_vertex(Point3::new(1.0, 1.0, z));
            let c = mesh.add_vertex(Point3::new(0.0, 1.0, z));
            expected.push(mesh.add_triangle(pivot, a, b).unwrap());
            expected.push(mesh.add_triangle(pivot, b, c).unwrap());
        }

        let range = mesh.triangles_around_vertex(pivot).unwrap();
        assert_eq!(range.fans().len(), wedges);
        assert!(range.fans().iter().all(|fan| !fan.is_closed()));

        let mut visited: Vec<_> = range.iter().collect();
        visited.sort();
        assert_eq!(visited, expected);
    }
}
