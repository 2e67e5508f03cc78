//! Point-set representations: bare points, no topology.

use crate::array::{DecodeContext, decode_points};
use crate::attr::Value;
use crate::dataset::DatasetStore;
use crate::errors::MeshResult;
use crate::repository::Repository;
use tracing::debug;

use super::{
    MeshKind, ReconstructedMesh, maybe_flip_z, owner_identifier, patch_entries, patch_z_reversed,
    points_node,
};

/// Read a point-set representation.
///
/// Two source shapes are accepted: `NodePatch` lists and `NodePatchGeometry`
/// lists; both decode their Points array per patch (nested triples used as-is,
/// flat values re-chunked as x,y,z with any trailing remainder discarded).
/// Decode failures propagate to the caller.
pub fn read_point_set(
    rep: &Value,
    repo: &dyn Repository,
    store: &dyn DatasetStore,
) -> MeshResult<Vec<ReconstructedMesh>> {
    let ctx = DecodeContext { root: rep, repo, store };
    let owner = owner_identifier(rep);
    let mut meshes = Vec::new();

    for (role, label) in [("NodePatch", "nodes"), ("NodePatchGeometry", "geom")] {
        for (index, (patch_path, patch)) in patch_entries(rep, role).iter().enumerate() {
            let (node, points_path) = points_node(patch, patch_path)?;
            let decoded = decode_points(node, &points_path, &ctx)?;
            let reversed = patch_z_reversed(&ctx, &points_path);
            meshes.push(ReconstructedMesh {
                identifier: format!("{owner}_{label}{index}"),
                points: maybe_flip_z(decoded.points, reversed),
                topology: Vec::new(),
                kind: MeshKind::PointSet,
            });
        }
    }

    debug!("point set {owner}: {} patch(es)", meshes.len());
    Ok(meshes)
}
