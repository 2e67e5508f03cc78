mod support;

use resmesh::attr::{ObjectNode, Value};
use resmesh::dataset::MemoryDatasetStore;
use resmesh::errors::MeshError;
use resmesh::mesh::{
    GridOutput, MeshKind, grid2d::read_grid2d, read_point_set, read_polyline_set,
    read_representation, read_triangulated,
};
use resmesh::repository::MemoryRepository;
use support::*;

fn titled(type_name: &str, title: &str) -> ObjectNode {
    ObjectNode::new(type_name).with("Citation", ObjectNode::new("Citation").with("Title", title))
}

fn geometry(points: Value) -> Value {
    ObjectNode::new("PointGeometry").with("Points", points).into()
}

#[test]
fn polyline_runs_and_closure() {
    let rep: Value = titled("PolylineSetRepresentation", "lines")
        .with(
            "LinePatch",
            Value::List(vec![
                ObjectNode::new("PolylinePatch")
                    .with("NodeCountPerPolyline", explicit_array(&[2.0, 2.0]))
                    .with("ClosedPolylines", explicit_array(&[0.0, 1.0]))
                    .with(
                        "Geometry",
                        geometry(explicit_points(&[
                            [0.0, 0.0, 0.0],
                            [1.0, 0.0, 0.0],
                            [2.0, 0.0, 0.0],
                            [3.0, 0.0, 0.0],
                        ])),
                    )
                    .into(),
            ]),
        )
        .into();
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_polyline_set(&rep, &repo, &store).unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].identifier, "lines_patch0");
    assert_eq!(meshes[0].kind, MeshKind::PolylineSet);
    assert_eq!(meshes[0].topology, vec![vec![0, 1], vec![2, 3, 2]]);
}

#[test]
fn polyline_counts_mismatch_falls_back_to_single_run() {
    let rep: Value = titled("PolylineSetRepresentation", "lines")
        .with(
            "LinePatch",
            Value::List(vec![
                ObjectNode::new("PolylinePatch")
                    .with("NodeCountPerPolyline", explicit_array(&[3.0]))
                    .with(
                        "Geometry",
                        geometry(explicit_points(&[
                            [0.0, 0.0, 0.0],
                            [1.0, 0.0, 0.0],
                            [2.0, 0.0, 0.0],
                            [3.0, 0.0, 0.0],
                        ])),
                    )
                    .into(),
            ]),
        )
        .into();
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_polyline_set(&rep, &repo, &store).unwrap();
    assert_eq!(meshes[0].topology, vec![vec![0, 1, 2, 3]]);
}

#[test]
fn point_set_reads_flat_triples_and_drops_remainder() {
    let rep: Value = titled("PointSetRepresentation", "pts")
        .with(
            "NodePatch",
            Value::List(vec![
                ObjectNode::new("NodePatch")
                    .with(
                        "Geometry",
                        geometry(explicit_array(&[0.0, 0.0, 5.0, 1.0, 1.0, 6.0, 9.0])),
                    )
                    .into(),
            ]),
        )
        .into();
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_point_set(&rep, &repo, &store).unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].identifier, "pts_nodes0");
    assert_eq!(meshes[0].kind, MeshKind::PointSet);
    assert_eq!(meshes[0].point_count(), 2);
    assert!(meshes[0].topology.is_empty());
}

#[test]
fn point_set_accepts_node_patch_geometry_lists() {
    let rep: Value = titled("PointSetRepresentation", "pts")
        .with(
            "NodePatchGeometry",
            Value::List(vec![
                geometry(explicit_points(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])),
            ]),
        )
        .into();
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_point_set(&rep, &repo, &store).unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].identifier, "pts_geom0");
    assert_eq!(meshes[0].point_count(), 2);
    assert!(approx_eq(meshes[0].points[1].z, 6.0));
}

fn grid_rep(z_values: [f64; 4]) -> Value {
    titled("Grid2dRepresentation", "grid")
        .with(
            "Grid2dPatch",
            ObjectNode::new("Grid2dPatch")
                .with("SlowestAxisCount", 2i64)
                .with("FastestAxisCount", 2i64)
                .with(
                    "Geometry",
                    geometry(explicit_points(&[
                        [0.0, 0.0, z_values[0]],
                        [1.0, 0.0, z_values[1]],
                        [0.0, 1.0, z_values[2]],
                        [1.0, 1.0, z_values[3]],
                    ])),
                ),
        )
        .into()
}

#[test]
fn grid_compact_drops_holes_and_their_quads() {
    let rep = grid_rep([1.0, 2.0, f64::NAN, 4.0]);
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_grid2d(&rep, &repo, &store, GridOutput::Compact).unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].kind, MeshKind::Surface);
    assert_eq!(meshes[0].point_count(), 3);
    assert_eq!(meshes[0].element_count(), 0);
}

#[test]
fn grid_keep_holes_zeroes_and_keeps_quads() {
    let rep = grid_rep([1.0, 2.0, f64::NAN, 4.0]);
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_grid2d(&rep, &repo, &store, GridOutput::KeepHoles).unwrap();
    assert_eq!(meshes[0].point_count(), 4);
    assert_eq!(meshes[0].element_count(), 1);
    assert_eq!(meshes[0].points[2].z, 0.0);
    assert_eq!(meshes[0].topology[0], vec![0, 2, 3, 1]);
}

#[test]
fn grid_raw_point_grid_preserves_holes() {
    let rep = grid_rep([1.0, 2.0, f64::NAN, 4.0]);
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_grid2d(&rep, &repo, &store, GridOutput::RawPointGrid).unwrap();
    assert_eq!(meshes[0].kind, MeshKind::GridedPointSet { slow: 2, fast: 2 });
    assert_eq!(meshes[0].point_count(), 4);
    assert!(meshes[0].points[2].z.is_nan());
    assert!(meshes[0].topology.is_empty());
}

#[test]
fn grid_compact_full_matrix_builds_one_quad() {
    let rep = grid_rep([1.0, 2.0, 3.0, 4.0]);
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_grid2d(&rep, &repo, &store, GridOutput::Compact).unwrap();
    assert_eq!(meshes[0].point_count(), 4);
    // Corner order (i,j), (i+1,j), (i+1,j+1), (i,j+1) in row-major ids.
    assert_eq!(meshes[0].topology, vec![vec![0, 2, 3, 1]]);
}

#[test]
fn grid_scan_failure_yields_completed_patches() {
    let rep: Value = titled("Grid2dRepresentation", "grid")
        .with(
            "Grid2dPatch",
            Value::List(vec![
                ObjectNode::new("Grid2dPatch")
                    .with("SlowestAxisCount", 1i64)
                    .with("FastestAxisCount", 2i64)
                    .with(
                        "Geometry",
                        geometry(explicit_points(&[[0.0, 0.0, 1.0], [1.0, 0.0, 2.0]])),
                    )
                    .into(),
                ObjectNode::new("Grid2dPatch")
                    .with("SlowestAxisCount", 1i64)
                    .with("FastestAxisCount", 1i64)
                    .with("Geometry", geometry(ObjectNode::new("MysteryArray9000").into()))
                    .into(),
            ]),
        )
        .into();
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_grid2d(&rep, &repo, &store, GridOutput::Compact).unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].point_count(), 2);
}

#[test]
fn triangulated_orders_patches_and_keeps_indices() {
    let patch = |index: Option<i64>, z: f64| -> Value {
        let mut node = ObjectNode::new("TrianglePatch")
            .with(
                "Geometry",
                geometry(explicit_points(&[
                    [0.0, 0.0, z],
                    [1.0, 0.0, z],
                    [0.0, 1.0, z],
                ])),
            )
            .with("Triangles", explicit_array(&[0.0, 1.0, 2.0]));
        if let Some(index) = index {
            node = node.with("PatchIndex", index);
        }
        node.into()
    };
    let rep: Value = titled("TriangulatedSetRepresentation", "tri")
        .with(
            "TrianglePatch",
            Value::List(vec![patch(Some(1), 10.0), patch(None, 30.0), patch(Some(0), 20.0)]),
        )
        .into();
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_triangulated(&rep, &repo, &store).unwrap();
    assert_eq!(meshes.len(), 3);
    // Unparsable index first, then 0, then 1.
    assert!(approx_eq(meshes[0].points[0].z, 30.0));
    assert!(approx_eq(meshes[1].points[0].z, 20.0));
    assert!(approx_eq(meshes[2].points[0].z, 10.0));
    assert_eq!(meshes[0].identifier, "tri_patch0");
    assert_eq!(meshes[2].identifier, "tri_patch2");
    // Triangle indices exactly as declared, never renumbered across patches.
    for mesh in &meshes {
        assert_eq!(mesh.kind, MeshKind::Surface);
        assert_eq!(mesh.topology, vec![vec![0, 1, 2]]);
    }
}

#[test]
fn z_flip_applies_patch_crs_exactly_once() {
    let rep: Value = titled("TriangulatedSetRepresentation", "tri")
        .with("LocalCrs", reference("crs-depth"))
        .with(
            "TrianglePatch",
            Value::List(vec![
                ObjectNode::new("TrianglePatch")
                    .with(
                        "Geometry",
                        geometry(explicit_points(&[
                            [0.0, 0.0, 100.0],
                            [1.0, 0.0, 100.0],
                            [0.0, 1.0, 100.0],
                        ])),
                    )
                    .with("Triangles", explicit_array(&[0.0, 1.0, 2.0]))
                    .into(),
            ]),
        )
        .into();
    let repo = repo_with_depth_crs("crs-depth");
    let store = MemoryDatasetStore::new();

    let meshes = read_triangulated(&rep, &repo, &store).unwrap();
    assert!(approx_eq(meshes[0].points[0].z, -100.0));
    assert!(approx_eq(meshes[0].points[0].x, 0.0));
}

#[test]
fn crs_on_geometry_node_drives_z_flip() {
    let rep: Value = titled("PointSetRepresentation", "pts")
        .with(
            "NodePatch",
            Value::List(vec![
                ObjectNode::new("NodePatch")
                    .with(
                        "Geometry",
                        ObjectNode::new("PointGeometry")
                            .with("LocalCrs", reference("crs-depth"))
                            .with("Points", explicit_points(&[[1.0, 2.0, 50.0]])),
                    )
                    .into(),
            ]),
        )
        .into();
    let repo = repo_with_depth_crs("crs-depth");
    let store = MemoryDatasetStore::new();

    let meshes = read_point_set(&rep, &repo, &store).unwrap();
    assert!(approx_eq(meshes[0].points[0].z, -50.0));
    assert!(approx_eq(meshes[0].points[0].y, 2.0));
}

#[test]
fn missing_crs_is_swallowed_and_not_reversed() {
    let rep: Value = titled("TriangulatedSetRepresentation", "tri")
        .with("LocalCrs", reference("crs-unresolvable"))
        .with(
            "TrianglePatch",
            Value::List(vec![
                ObjectNode::new("TrianglePatch")
                    .with("Geometry", geometry(explicit_points(&[[0.0, 0.0, 7.0]])))
                    .with("Triangles", explicit_array(&[]))
                    .into(),
            ]),
        )
        .into();
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_triangulated(&rep, &repo, &store).unwrap();
    assert!(approx_eq(meshes[0].points[0].z, 7.0));
}

#[test]
fn dispatcher_routes_by_type_name() {
    let rep = grid_rep([1.0, 2.0, 3.0, 4.0]);
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_representation(&rep, &repo, &store).unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].kind, MeshKind::Surface);

    let unknown: Value = ObjectNode::new("SeismicLineFeature").into();
    assert!(matches!(
        read_representation(&unknown, &repo, &store),
        Err(MeshError::NotSupported(_))
    ));
}

#[test]
fn grid_from_lattice_geometry_uses_decoded_dims() {
    let rep: Value = titled("Grid2dRepresentation", "grid")
        .with(
            "Grid2dPatch",
            ObjectNode::new("Grid2dPatch")
                .with("SlowestAxisCount", 3i64)
                .with("FastestAxisCount", 2i64)
                .with(
                    "Geometry",
                    geometry(lattice_array(
                        [0.0, 0.0, 0.0],
                        [0.0, 1.0, 0.0],
                        &[1.0, 1.0],
                        [1.0, 0.0, 0.0],
                        &[1.0],
                    )),
                ),
        )
        .into();
    let repo = MemoryRepository::new();
    let store = MemoryDatasetStore::new();

    let meshes = read_grid2d(&rep, &repo, &store, GridOutput::Compact).unwrap();
    assert_eq!(meshes[0].point_count(), 6);
    // 2x1 quads for a 3x2 matrix.
    assert_eq!(meshes[0].element_count(), 2);
}
