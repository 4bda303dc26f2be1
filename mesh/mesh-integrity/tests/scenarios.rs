//! End-to-end scenarios for the integrity checker.
//!
//! Each scenario builds a small scene, runs the checker through the public
//! API and inspects the report.

// Allow test-specific patterns
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::cast_lossless)]

use mesh_integrity::{
    CheckParams, CheckRequest, CheckRunResult, CheckRunner, ElementKind, InMemoryScene, NodeId,
    NodeResolver, RuleStatus, Uv, expand_hierarchy,
};
use mesh_types::{Point3, PolyMesh, Polygon};

// =============================================================================
// Helpers
// =============================================================================

fn run(scene: &InMemoryScene, rules: &[&str], nodes: &[NodeId]) -> CheckRunResult {
    let request = CheckRequest::new(rules.iter().copied(), nodes.iter().copied()).unwrap();
    CheckRunner::new(scene).run(&request).unwrap()
}

fn flagged(result: &CheckRunResult, rule: &str, node: NodeId) -> Vec<usize> {
    result
        .get(rule)
        .unwrap()
        .by_node()
        .get(&node)
        .cloned()
        .unwrap_or_default()
}

/// A fan of `spokes` triangles around vertex 0.
fn fan(spokes: u32) -> PolyMesh {
    let mut positions = vec![Point3::new(0.0, 0.0, 0.0)];
    for i in 0..spokes {
        let angle = i as f64 * std::f64::consts::TAU / spokes as f64;
        positions.push(Point3::new(angle.cos(), angle.sin(), 0.0));
    }
    let faces = (0..spokes)
        .map(|i| Polygon::new(vec![0, i + 1, (i + 1) % spokes + 1]))
        .collect();
    PolyMesh::from_parts(positions, faces)
}

// =============================================================================
// Scenario A: a single quad
// =============================================================================

mod single_quad {
    use super::*;

    #[test]
    fn only_open_edges_are_reported() {
        let mut scene = InMemoryScene::new();
        let (quad, _) = scene.add_mesh_object("quad", None, PolyMesh::unit_quad());

        let result = run(
            &scene,
            &[
                "triangles",
                "ngons",
                "lamina",
                "poles",
                "non_manifold_edges",
                "open_edges",
            ],
            &[quad],
        );

        for rule in ["triangles", "ngons", "lamina", "poles", "non_manifold_edges"] {
            assert!(result.get(rule).unwrap().is_empty(), "{rule} should be empty");
            assert_eq!(result.get(rule).unwrap().status(), RuleStatus::Passed);
        }

        let open = result.get("open_edges").unwrap();
        assert_eq!(open.kind(), ElementKind::Edge);
        assert_eq!(flagged(&result, "open_edges", quad), vec![0, 1, 2, 3]);
        assert_eq!(result.failed_rules(), vec!["open_edges"]);
    }

    #[test]
    fn mapped_quad_has_uvs_in_range() {
        let mut scene = InMemoryScene::new();
        let (quad, _) = scene.add_mesh_object("quad", None, PolyMesh::unit_quad());

        let result = run(
            &scene,
            &["missing_uvs", "uv_range", "self_penetrating_uvs"],
            &[quad],
        );
        assert!(result.is_clean());
    }
}

// =============================================================================
// Scenario B: three faces sharing one edge
// =============================================================================

mod shared_edge {
    use super::*;

    fn fin() -> PolyMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![
            Polygon::new(vec![0, 1, 2]),
            Polygon::new(vec![1, 0, 3]),
            Polygon::new(vec![0, 1, 4]),
        ];
        PolyMesh::from_parts(positions, faces)
    }

    #[test]
    fn shared_edge_is_non_manifold() {
        let mut scene = InMemoryScene::new();
        let (node, _) = scene.add_mesh_object("fin", None, fin());

        let result = run(&scene, &["non_manifold_edges", "open_edges"], &[node]);

        // Edge 0 is the first edge of face 0, between vertices 0 and 1.
        assert_eq!(flagged(&result, "non_manifold_edges", node), vec![0]);

        let open = flagged(&result, "open_edges", node);
        assert_eq!(open.len(), 6);
        assert!(!open.contains(&0));
    }
}

// =============================================================================
// Scenario C: UV range
// =============================================================================

mod uv_range {
    use super::*;

    #[test]
    fn u_beyond_ten_is_out_of_range() {
        let mesh = PolyMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Polygon::new(vec![0, 1, 2]).with_uvs(vec![0, 1, 2])],
        )
        .with_uvs(vec![
            Uv::new(11.0, 0.5),
            Uv::new(5.0, 0.3),
            Uv::new(5.5, 0.3),
        ]);

        let mut scene = InMemoryScene::new();
        let (node, _) = scene.add_mesh_object("tri", None, mesh);

        let result = run(&scene, &["uv_range"], &[node]);
        assert_eq!(result.get("uv_range").unwrap().kind(), ElementKind::Uv);
        assert_eq!(flagged(&result, "uv_range", node), vec![0]);
    }

    #[test]
    fn custom_range_is_honored() {
        let mut scene = InMemoryScene::new();
        let (quad, _) = scene.add_mesh_object("quad", None, PolyMesh::unit_quad());
        let request = CheckRequest::new(["uv_range"], [quad]).unwrap();

        let tight = CheckParams::default().with_uv_u_range(0.0, 0.5);
        let result = CheckRunner::new(&scene).with_params(tight).run(&request).unwrap();

        // UVs 1 and 2 sit at u = 1.0.
        assert_eq!(flagged(&result, "uv_range", quad), vec![1, 2]);
    }
}

// =============================================================================
// Scenario D: poles
// =============================================================================

mod poles {
    use super::*;

    #[test]
    fn six_edges_make_a_pole() {
        let mut scene = InMemoryScene::new();
        let (six, _) = scene.add_mesh_object("six", None, fan(6));
        let (five, _) = scene.add_mesh_object("five", None, fan(5));

        let result = run(&scene, &["poles"], &[six, five]);
        let poles = result.get("poles").unwrap();

        assert_eq!(poles.kind(), ElementKind::Vertex);
        assert_eq!(flagged(&result, "poles", six), vec![0]);
        assert!(flagged(&result, "poles", five).is_empty());
        assert_eq!(poles.nodes(), vec![six]);
    }
}

// =============================================================================
// Scenario E: trailing numbers
// =============================================================================

mod naming {
    use super::*;

    #[test]
    fn trailing_digit_is_flagged() {
        let mut scene = InMemoryScene::new();
        let numbered = scene.add_transform("arm02", None);
        let clean = scene.add_transform("arm_L", None);

        let result = run(&scene, &["trailing_numbers"], &[numbered, clean]);
        let rule = result.get("trailing_numbers").unwrap();

        assert_eq!(rule.kind(), ElementKind::Node);
        assert_eq!(rule.nodes(), vec![numbered]);
    }

    #[test]
    fn renaming_does_not_change_identity() {
        let mut scene = InMemoryScene::new();
        let node = scene.add_transform("arm02", None);
        let before = run(&scene, &["trailing_numbers"], &[node]);

        scene.rename(node, "arm_L");
        let after = run(&scene, &["trailing_numbers"], &[node]);

        assert_eq!(before.get("trailing_numbers").unwrap().nodes(), vec![node]);
        assert!(after.is_clean());
    }
}

// =============================================================================
// Whole-asset runs
// =============================================================================

mod asset {
    use super::*;

    #[test]
    fn hierarchy_run_reports_every_rule() {
        let mut scene = InMemoryScene::new();
        let root = scene.add_transform("character", None);
        let (body, body_shape) = scene.add_mesh_object("body", Some(root), PolyMesh::unit_cube());
        scene.add_mesh_object("hat1", Some(root), fan(6));
        scene.add_transform("empty", Some(root));
        scene.set_display_layer(body, "geo");
        scene.assign_shading_group(body_shape, "skinSG");

        let nodes = expand_hierarchy(&[root], &scene).unwrap();
        assert_eq!(nodes.len(), 4);

        let request = CheckRequest::all_rules(nodes).unwrap();
        let result = CheckRunner::new(&scene).run(&request).unwrap();

        assert_eq!(result.len(), mesh_integrity::rules::all().len());
        assert_eq!(result.get("layers").unwrap().nodes(), vec![body]);
        assert_eq!(result.get("shaders").unwrap().nodes(), vec![body]);
        assert_eq!(result.get("empty_groups").unwrap().len(), 1);
        assert_eq!(result.get("trailing_numbers").unwrap().len(), 1);
        assert_eq!(result.get("triangles").unwrap().len(), 6);
        assert!(result.get("history").unwrap().is_empty());
        assert!(!result.is_clean());
    }

    #[test]
    fn deleted_node_degrades_but_does_not_abort() {
        let mut scene = InMemoryScene::new();
        let (keep, _) = scene.add_mesh_object("keep", None, PolyMesh::unit_quad());
        let (gone, _) = scene.add_mesh_object("gone", None, PolyMesh::unit_quad());
        scene.remove(gone);

        let result = run(&scene, &["open_edges", "duplicated_names"], &[keep, gone]);

        let open = result.get("open_edges").unwrap();
        assert_eq!(open.status(), RuleStatus::Degraded);
        assert_eq!(flagged(&result, "open_edges", keep).len(), 4);

        let duplicated = result.get("duplicated_names").unwrap();
        assert_eq!(duplicated.status(), RuleStatus::Degraded);
        assert!(duplicated.is_empty());
    }

    #[test]
    fn render_resolves_names_late() {
        let mut scene = InMemoryScene::new();
        let (quad, _) = scene.add_mesh_object("quad", None, PolyMesh::unit_quad());
        let result = run(&scene, &["open_edges"], &[quad]);

        scene.rename(quad, "floor");
        let text = result.render(&scene);

        assert!(text.contains("open_edges [failed] 4 violation(s)"));
        assert!(text.contains("|floor: edge 0, 1, 2, 3"));
        assert_eq!(scene.resolve_name(quad).unwrap(), "|floor");
    }
}
