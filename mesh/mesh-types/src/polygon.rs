//! Polygon geometry predicates.
//!
//! All functions take a polygon as its ordered vertex positions. Polygons do
//! not need to be planar; they are measured through their Newell normal and
//! projected onto its dominant plane when a 2D test is required.

use nalgebra::{Point2, Point3, Vector3};

/// Compute the Newell normal of a polygon.
///
/// The magnitude equals twice the polygon's area for planar polygons, and the
/// direction follows the right-hand rule over the winding order.
#[must_use]
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::zeros();

    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }

    normal
}

/// Area of a polygon.
///
/// # Example
///
/// ```
/// use mesh_types::Point3;
/// use mesh_types::polygon::polygon_area;
///
/// let quad = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(2.0, 3.0, 0.0),
///     Point3::new(0.0, 3.0, 0.0),
/// ];
/// assert!((polygon_area(&quad) - 6.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn polygon_area(points: &[Point3<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    newell_normal(points).norm() * 0.5
}

/// Check whether a polygon is starlike.
///
/// A polygon is starlike when at least one interior point sees every vertex,
/// i.e. its kernel is non-empty. Convex polygons are always starlike.
/// Degenerate polygons (fewer than three vertices or zero area) are not.
///
/// The kernel is computed by clipping the polygon's bounding rectangle against
/// the inner half-plane of every edge.
///
/// # Example
///
/// ```
/// use mesh_types::Point3;
/// use mesh_types::polygon::is_starlike;
///
/// // An arrow head whose notch still leaves a visible core
/// let arrow = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 1.0, 0.0),
///     Point3::new(4.0, 0.0, 0.0),
///     Point3::new(2.0, 4.0, 0.0),
/// ];
/// assert!(is_starlike(&arrow));
/// ```
#[must_use]
pub fn is_starlike(points: &[Point3<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let normal = newell_normal(points);
    if normal.norm() <= 0.0 {
        return false;
    }

    let mut outline = project_to_plane(points, &normal);
    if signed_area(&outline) < 0.0 {
        outline.reverse();
    }

    let Some((min, max)) = bounds(&outline) else {
        return false;
    };
    let extent = (max - min).norm();
    let eps = extent * 1e-12;

    let mut kernel = vec![
        Point2::new(min.x - extent, min.y - extent),
        Point2::new(max.x + extent, min.y - extent),
        Point2::new(max.x + extent, max.y + extent),
        Point2::new(min.x - extent, max.y + extent),
    ];

    let n = outline.len();
    for i in 0..n {
        kernel = clip_to_left(&kernel, &outline[i], &outline[(i + 1) % n], eps);
        if kernel.is_empty() {
            return false;
        }
    }

    true
}

/// Signed area of a 2D polygon; positive for counter-clockwise winding.
#[must_use]
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    twice * 0.5
}

/// Drop the coordinate along the normal's dominant axis.
///
/// Axis pairs are chosen cyclically so a positive dominant component keeps
/// the winding counter-clockwise.
fn project_to_plane(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());

    points
        .iter()
        .map(|p| {
            if az >= ax && az >= ay {
                Point2::new(p.x, p.y)
            } else if ax >= ay {
                Point2::new(p.y, p.z)
            } else {
                Point2::new(p.z, p.x)
            }
        })
        .collect()
}

fn bounds(points: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

/// Which side of the directed line `a -> b` a point lies on, scaled by the edge length.
#[inline]
fn side(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> f64 {
    let ab = *b - *a;
    let ap = *p - *a;
    let len = ab.norm();
    if len <= 0.0 {
        return 0.0;
    }
    (ab.x * ap.y - ab.y * ap.x) / len
}

/// Sutherland-Hodgman clip of a convex region against the left half-plane of `a -> b`.
fn clip_to_left(
    region: &[Point2<f64>],
    a: &Point2<f64>,
    b: &Point2<f64>,
    eps: f64,
) -> Vec<Point2<f64>> {
    let n = region.len();
    let mut out = Vec::with_capacity(n + 1);

    for i in 0..n {
        let current = &region[i];
        let next = &region[(i + 1) % n];
        let d_current = side(a, b, current);
        let d_next = side(a, b, next);
        let current_in = d_current >= -eps;
        let next_in = d_next >= -eps;

        if current_in {
            out.push(*current);
        }
        if current_in != next_in {
            let t = d_current / (d_current - d_next);
            out.push(*current + (*next - *current) * t);
        }
    }

    out
}
