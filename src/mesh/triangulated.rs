//! Triangulated-surface representations: multi-patch triangle soups.

use crate::array::{DecodeContext, decode_counts, decode_points};
use crate::attr::Value;
use crate::dataset::DatasetStore;
use crate::errors::{MeshError, MeshResult};
use crate::repository::Repository;
use tracing::{debug, warn};

use super::{
    MeshKind, ReconstructedMesh, maybe_flip_z, owner_identifier, patch_entries, patch_z_reversed,
    points_node,
};

/// Read a triangulated-set representation, one `Surface` mesh per patch.
///
/// Patches are ordered by their declared integer `PatchIndex` (patches
/// without a parsable index sort first; ties keep discovery order). Triangle
/// indices are used exactly as declared per patch — they are never renumbered
/// across patches, even when a producer meant them patch-locally. Each patch
/// flips Z by its own CRS. A failure while scanning patches is logged and the
/// patches completed so far are returned.
pub fn read_triangulated(
    rep: &Value,
    repo: &dyn Repository,
    store: &dyn DatasetStore,
) -> MeshResult<Vec<ReconstructedMesh>> {
    let ctx = DecodeContext { root: rep, repo, store };
    let owner = owner_identifier(rep);

    let mut patches = patch_entries(rep, "TrianglePatch");
    patches.sort_by_key(|(_, patch)| {
        patch.get("PatchIndex").and_then(Value::as_i64).unwrap_or(i64::MIN)
    });

    let mut meshes = Vec::new();
    for (index, (patch_path, patch)) in patches.iter().enumerate() {
        match build_triangle_patch(patch, patch_path, &ctx, &owner, index) {
            Ok(mesh) => meshes.push(mesh),
            Err(error) => {
                warn!(
                    "triangle patch {patch_path} failed: {error}; yielding {} patch(es)",
                    meshes.len()
                );
                break;
            },
        }
    }

    debug!("triangulated set {owner}: {} patch(es)", meshes.len());
    Ok(meshes)
}

fn build_triangle_patch(
    patch: &Value,
    patch_path: &str,
    ctx: &DecodeContext,
    owner: &str,
    index: usize,
) -> MeshResult<ReconstructedMesh> {
    let (node, points_path) = points_node(patch, patch_path)?;
    let decoded = decode_points(node, &points_path, ctx)?;
    let reversed = patch_z_reversed(ctx, &points_path);
    let points = maybe_flip_z(decoded.points, reversed);

    let triangles = patch
        .get("Triangles")
        .ok_or_else(|| MeshError::not_found(format!("no Triangles under patch {patch_path}")))?;
    let indices = decode_counts(triangles, &format!("{patch_path}.Triangles"), ctx)?;

    // Index triples, declared order, no renumbering.
    let topology: Vec<Vec<usize>> =
        indices.chunks_exact(3).map(<[usize]>::to_vec).collect();

    Ok(ReconstructedMesh {
        identifier: format!("{owner}_patch{index}"),
        points,
        topology,
        kind: MeshKind::Surface,
    })
}
