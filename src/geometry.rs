//! Procedural meshes for the scene: a ground plane, a flat square and an
//! extruded frame (an outline with one hole).
//!
//! Every face gets its own vertices so normals stay flat. Triangles are
//! counter-clockwise when seen from the side their normal points to, which is
//! what the back-face culling of the lit pipeline expects.

use anyhow::{bail, ensure};
use cgmath::{InnerSpace, Point2, Vector3};

use crate::data_structures::mesh::{MeshData, ModelVertex};

/// Append a quad whose corners are given counter-clockwise as seen from `normal`.
fn push_quad(mesh: &mut MeshData, corners: [[f32; 3]; 4], normal: [f32; 3]) {
    let base = mesh.vertices.len() as u32;
    mesh.vertices
        .extend(corners.iter().map(|&p| ModelVertex::new(p, normal)));
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Horizontal quad in the XZ plane facing +Y, centred on the origin.
pub fn plane(width: f32, depth: f32) -> MeshData {
    let (w, d) = (width / 2.0, depth / 2.0);
    let mut mesh = MeshData::default();
    push_quad(
        &mut mesh,
        [[-w, 0.0, -d], [-w, 0.0, d], [w, 0.0, d], [w, 0.0, -d]],
        [0.0, 1.0, 0.0],
    );
    mesh
}

/// Vertical quad in the XY plane facing +Z, centred on the origin.
pub fn square(size: f32) -> MeshData {
    let s = size / 2.0;
    let mut mesh = MeshData::default();
    push_quad(
        &mut mesh,
        [[-s, -s, 0.0], [s, -s, 0.0], [s, s, 0.0], [-s, s, 0.0]],
        [0.0, 0.0, 1.0],
    );
    mesh
}

/// A closed 2D outline in the XY plane with a single hole.
///
/// `hole[i]` is bridged to `outer[i]`, so both loops need the same number of
/// points and should start at corresponding corners. Either winding is
/// accepted.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameShape {
    pub outer: Vec<Point2<f32>>,
    pub hole: Vec<Point2<f32>>,
}

impl FrameShape {
    pub fn new(outer: Vec<Point2<f32>>, hole: Vec<Point2<f32>>) -> Self {
        Self { outer, hole }
    }

    /// Square outline of `outer_size` with a centred square hole of `hole_size`.
    pub fn square(outer_size: f32, hole_size: f32) -> Self {
        let corners = |half: f32| {
            vec![
                Point2::new(-half, -half),
                Point2::new(half, -half),
                Point2::new(half, half),
                Point2::new(-half, half),
            ]
        };
        Self::new(corners(outer_size / 2.0), corners(hole_size / 2.0))
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.outer.len() >= 3,
            "outer loop needs at least 3 points, got {}",
            self.outer.len()
        );
        ensure!(
            self.outer.len() == self.hole.len(),
            "outer loop has {} points but the hole has {}",
            self.outer.len(),
            self.hole.len()
        );
        ensure!(
            signed_area(&self.outer).abs() > f32::EPSILON,
            "outer loop has no area"
        );
        ensure!(
            signed_area(&self.hole).abs() > f32::EPSILON,
            "hole has no area"
        );
        let (outer_min, outer_max) = bounds(&self.outer);
        let (hole_min, hole_max) = bounds(&self.hole);
        if hole_min.x <= outer_min.x
            || hole_min.y <= outer_min.y
            || hole_max.x >= outer_max.x
            || hole_max.y >= outer_max.y
        {
            bail!("hole is not strictly inside the outer loop");
        }
        Ok(())
    }

    /// Extrude along +Z from `z = 0` to `z = depth`.
    pub fn extrude(&self, depth: f32) -> anyhow::Result<MeshData> {
        ensure!(
            depth.is_finite() && depth > 0.0,
            "extrusion depth must be positive, got {}",
            depth
        );
        self.validate()?;

        let outer = counter_clockwise(&self.outer);
        let hole = counter_clockwise(&self.hole);
        let n = outer.len();
        let mut mesh = MeshData::default();
        let at = |p: Point2<f32>, z: f32| [p.x, p.y, z];

        for i in 0..n {
            let j = (i + 1) % n;
            let (o0, o1, h0, h1) = (outer[i], outer[j], hole[i], hole[j]);

            // caps
            push_quad(
                &mut mesh,
                [at(o0, depth), at(o1, depth), at(h1, depth), at(h0, depth)],
                [0.0, 0.0, 1.0],
            );
            push_quad(
                &mut mesh,
                [at(o0, 0.0), at(h0, 0.0), at(h1, 0.0), at(o1, 0.0)],
                [0.0, 0.0, -1.0],
            );

            // outer wall faces away from the shape
            let edge = o1 - o0;
            let out = Vector3::new(edge.y, -edge.x, 0.0).normalize();
            push_quad(
                &mut mesh,
                [at(o0, 0.0), at(o1, 0.0), at(o1, depth), at(o0, depth)],
                out.into(),
            );

            // hole wall faces into the hole
            let edge = h1 - h0;
            let inward = Vector3::new(-edge.y, edge.x, 0.0).normalize();
            push_quad(
                &mut mesh,
                [at(h0, 0.0), at(h0, depth), at(h1, depth), at(h1, 0.0)],
                inward.into(),
            );
        }
        Ok(mesh)
    }
}

fn signed_area(points: &[Point2<f32>]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        / 2.0
}

fn bounds(points: &[Point2<f32>]) -> (Point2<f32>, Point2<f32>) {
    points.iter().fold(
        (
            Point2::new(f32::INFINITY, f32::INFINITY),
            Point2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
        ),
        |(min, max), p| {
            (
                Point2::new(min.x.min(p.x), min.y.min(p.y)),
                Point2::new(max.x.max(p.x), max.y.max(p.y)),
            )
        },
    )
}

fn counter_clockwise(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
    if signed_area(points) < 0.0 {
        // Keep the start point so hole[i] still pairs with outer[i]
        let mut reversed = vec![points[0]];
        reversed.extend(points[1..].iter().rev());
        reversed
    } else {
        points.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle's winding must agree with the normal stored on its vertices.
    fn assert_winding_matches_normals(mesh: &MeshData) {
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
            let pa = Vector3::from(a.position);
            let face = (Vector3::from(b.position) - pa).cross(Vector3::from(c.position) - pa);
            assert!(
                face.dot(Vector3::from(a.normal)) > 0.0,
                "triangle {:?} winds against its normal {:?}",
                tri,
                a.normal
            );
        }
    }

    #[test]
    fn plane_faces_up() {
        let mesh = plane(200.0, 100.0);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.vertices.iter().all(|v| v.position[1] == 0.0));
        assert!(mesh.vertices.iter().any(|v| v.position == [100.0, 0.0, 50.0]));
        assert_winding_matches_normals(&mesh);
    }

    #[test]
    fn square_faces_viewer() {
        let mesh = square(10.0);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert!(mesh.vertices.iter().any(|v| v.position == [-5.0, 5.0, 0.0]));
        assert_winding_matches_normals(&mesh);
    }

    #[test]
    fn square_frame_extrusion() {
        let mesh = FrameShape::square(40.0, 20.0).extrude(8.0).unwrap();
        // 4 segments x (2 caps + outer wall + hole wall)
        assert_eq!(mesh.vertices.len(), 64);
        assert_eq!(mesh.triangle_count(), 32);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.position[2] == 0.0 || v.position[2] == 8.0));
        assert_winding_matches_normals(&mesh);
    }

    #[test]
    fn hole_is_left_open() {
        let mesh = FrameShape::square(40.0, 20.0).extrude(8.0).unwrap();
        // No cap triangle may cover the hole's centre
        for tri in mesh.indices.chunks(3) {
            let ps = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize].position);
            if ps.iter().all(|p| p[2] == 8.0) {
                let inside = ps.iter().all(|p| p[0].abs() < 10.0 && p[1].abs() < 10.0);
                assert!(!inside);
            }
        }
    }

    #[test]
    fn clockwise_input_gives_same_orientation() {
        let ccw = FrameShape::square(40.0, 20.0);
        let cw = FrameShape::new(
            reverse_winding(&ccw.outer),
            reverse_winding(&ccw.hole),
        );
        let mesh = cw.extrude(5.0).unwrap();
        assert_winding_matches_normals(&mesh);
    }

    fn reverse_winding(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
        let mut reversed = vec![points[0]];
        reversed.extend(points[1..].iter().rev());
        reversed
    }

    #[test]
    fn rejects_invalid_shapes() {
        let frame = FrameShape::square(40.0, 20.0);
        assert!(frame.extrude(0.0).is_err());
        assert!(frame.extrude(f32::NAN).is_err());

        assert!(FrameShape::square(20.0, 40.0).extrude(1.0).is_err());
        assert!(FrameShape::square(20.0, 20.0).extrude(1.0).is_err());

        let mut mismatched = FrameShape::square(40.0, 20.0);
        mismatched.hole.pop();
        assert!(mismatched.extrude(1.0).is_err());

        let degenerate = FrameShape::new(
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
            vec![Point2::new(0.2, 0.0), Point2::new(0.8, 0.0)],
        );
        assert!(degenerate.extrude(1.0).is_err());
    }
}
