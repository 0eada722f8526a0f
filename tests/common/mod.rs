// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh builders shared by the integration tests

#![allow(dead_code)]

use nalgebra::Point3;
use surfmesh::{Mesh, TriangleId, VertexId};

/// A(0,0,0), B(1,0,0), C(0,1,0), D(1,1,0) with triangles ABC and BDC
pub fn quad() -> (Mesh, [VertexId; 4], [TriangleId; 2]) {
    let mut mesh = Mesh::new();
    let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
    let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
    let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
    let abc = mesh.add_triangle(a, b, c).unwrap();
    let bdc = mesh.add_triangle(b, d, c).unwrap();
    (mesh, [a, b, c, d], [abc, bdc])
}

/// Unit cube with outward counter-clockwise triangles
pub fn cube() -> Mesh {
    let mut mesh = Mesh::new();
    let corners = [
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (0.0, 1.0, 1.0),
    ];
    for (x, y, z) in corners {
        mesh.add_vertex(Point3::new(x, y, z));
    }
    let faces = [
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    for [a, b, c] in faces {
        mesh.add_triangle(VertexId(a), VertexId(b), VertexId(c)).unwrap();
    }
    mesh
}

/// `n` x `n` grid of unit quads in the z = 0 plane, two triangles per quad
pub fn grid(n: usize) -> Mesh {
    grid_with(n, |x, y| Point3::new(x as f64, y as f64, 0.0))
}

/// Grid whose vertex at column `x`, row `y` is placed by `place`
pub fn grid_with(n: usize, mut place: impl FnMut(usize, usize) -> Point3<f64>) -> Mesh {
    let mut mesh = Mesh::new();
    for y in 0..=n {
        for x in 0..=n {
            mesh.add_vertex(place(x, y));
        }
    }
    for y in 0..n {
        for x in 0..n {
            let [a, b, c, d] = [
                grid_vertex(n, x, y),
                grid_vertex(n, x + 1, y),
                grid_vertex(n, x, y + 1),
                grid_vertex(n, x + 1, y + 1),
            ];
            mesh.add_triangle(a, b, c).unwrap();
            mesh.add_triangle(b, d, c).unwrap();
        }
    }
    mesh
}

pub fn grid_vertex(n: usize, x: usize, y: usize) -> VertexId {
    VertexId(y * (n + 1) + x)
}
