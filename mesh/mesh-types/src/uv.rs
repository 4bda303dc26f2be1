//! Texture coordinates and UV-space overlap detection.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nalgebra::{Point2, Vector2};

use crate::mesh::PolyMesh;
use crate::polygon::signed_area;

/// Tolerance below which a UV triangle is treated as having no area, and
/// below which two UV triangles are treated as merely touching.
const OVERLAP_EPSILON: f64 = 1e-9;

/// A texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Uv {
    /// Horizontal texture coordinate.
    pub u: f64,
    /// Vertical texture coordinate.
    pub v: f64,
}

impl Uv {
    /// Create a UV from its components.
    #[inline]
    #[must_use]
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Whether both components are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.u.is_finite() && self.v.is_finite()
    }

    /// The integer texture tile containing this coordinate.
    ///
    /// Tiles are half-open: a coordinate of exactly `1.0` belongs to tile 1,
    /// and negative coordinates map to the tile below (`-0.25` is tile -1).
    /// Meaningless unless [`is_finite`](Self::is_finite) holds.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::Uv;
    ///
    /// assert_eq!(Uv::new(0.5, 0.5).tile(), (0, 0));
    /// assert_eq!(Uv::new(1.0, 2.5).tile(), (1, 2));
    /// assert_eq!(Uv::new(-0.25, 0.0).tile(), (-1, 0));
    /// ```
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn tile(self) -> (i64, i64) {
        (self.u.floor() as i64, self.v.floor() as i64)
    }

    #[inline]
    fn point(self) -> Point2<f64> {
        Point2::new(self.u, self.v)
    }
}

/// A mapped face, triangulated in UV space.
struct UvShell {
    face: usize,
    triangles: Vec<[Point2<f64>; 3]>,
    min: Point2<f64>,
    max: Point2<f64>,
}

impl UvShell {
    fn from_face(face: usize, uvs: &[Uv]) -> Option<Self> {
        let points: Vec<Point2<f64>> = uvs.iter().map(|uv| uv.point()).collect();
        let first = *points.first()?;

        let triangles: Vec<[Point2<f64>; 3]> = triangulate(&points)
            .into_iter()
            .filter(|tri| signed_area(tri).abs() > OVERLAP_EPSILON)
            .collect();
        if triangles.is_empty() {
            return None;
        }

        let mut min = first;
        let mut max = first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Some(Self {
            face,
            triangles,
            min,
            max,
        })
    }

    fn overlaps(&self, other: &Self) -> bool {
        if self.max.y - other.min.y <= OVERLAP_EPSILON
            || other.max.y - self.min.y <= OVERLAP_EPSILON
        {
            return false;
        }
        self.triangles
            .iter()
            .any(|a| other.triangles.iter().any(|b| triangles_overlap(a, b)))
    }
}

/// Ear-clipping triangulation of a simple polygon in either winding.
///
/// Collinear corners are dropped. If no ear can be found, which only happens
/// for outlines that cross themselves, the remainder is fanned.
fn triangulate(points: &[Point2<f64>]) -> Vec<[Point2<f64>; 3]> {
    let mut ring: Vec<Point2<f64>> = points.to_vec();
    if signed_area(&ring) < 0.0 {
        ring.reverse();
    }

    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));
    while ring.len() > 3 {
        let n = ring.len();
        let corner = |i: usize| (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);

        let ear = (0..n).find(|&i| {
            let (a, b, c) = corner(i);
            cross(&a, &b, &c) > OVERLAP_EPSILON
                && ring
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i && j != (i + n - 1) % n && j != (i + 1) % n)
                    .all(|(_, p)| !in_triangle(&a, &b, &c, p))
        });

        if let Some(i) = ear {
            let (a, b, c) = corner(i);
            triangles.push([a, b, c]);
            ring.remove(i);
        } else if let Some(i) = (0..n).find(|&i| {
            let (a, b, c) = corner(i);
            cross(&a, &b, &c).abs() <= OVERLAP_EPSILON
        }) {
            ring.remove(i);
        } else {
            triangles.extend(ring[1..].windows(2).map(|pair| [ring[0], pair[0], pair[1]]));
            return triangles;
        }
    }

    if let [a, b, c] = ring[..] {
        triangles.push([a, b, c]);
    }
    triangles
}

/// Twice the signed area of `a, b, c`; positive when counter-clockwise.
#[inline]
fn cross(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let ab = *b - *a;
    let ac = *c - *a;
    ab.x * ac.y - ab.y * ac.x
}

/// Whether `p` lies inside or on the counter-clockwise triangle `a, b, c`.
fn in_triangle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, p: &Point2<f64>) -> bool {
    cross(a, b, p) >= -OVERLAP_EPSILON
        && cross(b, c, p) >= -OVERLAP_EPSILON
        && cross(c, a, p) >= -OVERLAP_EPSILON
}

/// Whether two segments cross at a single point interior to both.
fn segments_cross(p: &Point2<f64>, q: &Point2<f64>, r: &Point2<f64>, s: &Point2<f64>) -> bool {
    let opposite = |x: f64, y: f64| {
        (x > OVERLAP_EPSILON && y < -OVERLAP_EPSILON)
            || (x < -OVERLAP_EPSILON && y > OVERLAP_EPSILON)
    };
    opposite(cross(p, q, r), cross(p, q, s)) && opposite(cross(r, s, p), cross(r, s, q))
}

/// Whether any two non-adjacent edges of the outline cross.
fn folds_over(uvs: &[Uv]) -> bool {
    let n = uvs.len();
    if n < 4 {
        return false;
    }
    let edge = |i: usize| (uvs[i].point(), uvs[(i + 1) % n].point());

    (0..n).any(|i| {
        let (p, q) = edge(i);
        (i + 2..n)
            .filter(|&j| !(i == 0 && j == n - 1))
            .any(|j| {
                let (r, s) = edge(j);
                segments_cross(&p, &q, &r, &s)
            })
    })
}

/// Find faces whose UVs overlap another face's UVs or fold over themselves.
///
/// Faces are triangulated in UV space by ear clipping and tested pairwise
/// after a sort-and-sweep on the U axis. Faces that only share a border or a
/// corner do not overlap. A face whose UV outline crosses itself is flagged
/// on its own. Unmapped faces and faces with no UV area are ignored.
///
/// Returns the overlapping face indices in ascending order.
///
/// # Example
///
/// ```
/// use mesh_types::{PolyMesh, Polygon, Uv, overlapping_faces};
///
/// let mut mesh = PolyMesh::unit_quad();
/// // A second face mapped onto the same UVs as the first
/// mesh.faces.push(Polygon::new([0, 1, 2, 3]).with_uvs([0, 1, 2, 3]));
///
/// assert_eq!(overlapping_faces(&mesh), vec![0, 1]);
/// ```
#[must_use]
pub fn overlapping_faces(mesh: &PolyMesh) -> Vec<usize> {
    let mut flagged = vec![false; mesh.face_count()];
    let mut shells: Vec<UvShell> = Vec::new();
    for face in 0..mesh.face_count() {
        let Some(uvs) = mesh.polygon_uvs(face) else {
            continue;
        };
        if folds_over(&uvs) {
            flagged[face] = true;
        }
        shells.extend(UvShell::from_face(face, &uvs));
    }
    shells.sort_by(|a, b| a.min.x.total_cmp(&b.min.x).then(a.face.cmp(&b.face)));

    for (i, shell) in shells.iter().enumerate() {
        for other in &shells[i + 1..] {
            if other.min.x >= shell.max.x - OVERLAP_EPSILON {
                break;
            }
            if shell.overlaps(other) {
                flagged[shell.face] = true;
                flagged[other.face] = true;
            }
        }
    }

    flagged
        .iter()
        .enumerate()
        .filter(|(_, hit)| **hit)
        .map(|(face, _)| face)
        .collect()
}

/// Separating-axis test for two triangles, requiring a positive overlap depth.
fn triangles_overlap(a: &[Point2<f64>; 3], b: &[Point2<f64>; 3]) -> bool {
    for tri in [a, b] {
        for i in 0..3 {
            let edge = tri[(i + 1) % 3] - tri[i];
            let axis = Vector2::new(-edge.y, edge.x);
            let len = axis.norm();
            if len <= 0.0 {
                continue;
            }
            let axis = axis / len;

            let (a_min, a_max) = project(a, &axis);
            let (b_min, b_max) = project(b, &axis);
            if a_max.min(b_max) - a_min.max(b_min) <= OVERLAP_EPSILON {
                return false;
            }
        }
    }
    true
}

fn project(tri: &[Point2<f64>; 3], axis: &Vector2<f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in tri {
        let d = p.coords.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}
