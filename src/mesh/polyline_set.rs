//! Polyline-set representations: node-index runs, optionally closed.

use crate::array::{DecodeContext, decode_counts, decode_flags, decode_points};
use crate::attr::Value;
use crate::dataset::DatasetStore;
use crate::errors::MeshResult;
use crate::repository::Repository;
use tracing::{debug, warn};

use super::{
    MeshKind, ReconstructedMesh, maybe_flip_z, owner_identifier, patch_entries, patch_z_reversed,
    points_node,
};

/// Read a polyline-set representation.
///
/// Per `LinePatch`: the Points array, a boolean closed-flag per line, and a
/// node-count per line. Each line becomes one topology element, a contiguous
/// index run of the declared length at a running offset; closed lines repeat
/// their first index at the end. A node-count array that is absent or does
/// not cover the points exactly falls back to one run spanning all points.
/// Decode failures propagate to the caller.
pub fn read_polyline_set(
    rep: &Value,
    repo: &dyn Repository,
    store: &dyn DatasetStore,
) -> MeshResult<Vec<ReconstructedMesh>> {
    let ctx = DecodeContext { root: rep, repo, store };
    let owner = owner_identifier(rep);
    let mut meshes = Vec::new();

    for (index, (patch_path, patch)) in patch_entries(rep, "LinePatch").iter().enumerate() {
        let (node, points_path) = points_node(patch, patch_path)?;
        let decoded = decode_points(node, &points_path, &ctx)?;
        let reversed = patch_z_reversed(&ctx, &points_path);
        let points = maybe_flip_z(decoded.points, reversed);

        let closed = match patch.get("ClosedPolylines") {
            Some(flags) => decode_flags(flags, &format!("{patch_path}.ClosedPolylines"), &ctx)?,
            None => Vec::new(),
        };
        let counts = match patch.get("NodeCountPerPolyline") {
            Some(counts) => {
                Some(decode_counts(counts, &format!("{patch_path}.NodeCountPerPolyline"), &ctx)?)
            },
            None => None,
        };

        let topology = line_topology(points.len(), counts.as_deref(), &closed, patch_path);

        meshes.push(ReconstructedMesh {
            identifier: format!("{owner}_patch{index}"),
            points,
            topology,
            kind: MeshKind::PolylineSet,
        });
    }

    debug!("polyline set {owner}: {} patch(es)", meshes.len());
    Ok(meshes)
}

fn line_topology(
    point_count: usize,
    counts: Option<&[usize]>,
    closed: &[bool],
    patch_path: &str,
) -> Vec<Vec<usize>> {
    let covered = counts.map(|c| c.iter().sum::<usize>());
    match (counts, covered) {
        (Some(counts), Some(total)) if total == point_count => {
            let mut topology = Vec::with_capacity(counts.len());
            let mut offset = 0usize;
            for (line, &length) in counts.iter().enumerate() {
                let mut run: Vec<usize> = (offset..offset + length).collect();
                if closed.get(line).copied().unwrap_or(false) {
                    if let Some(&first) = run.first() {
                        run.push(first);
                    }
                }
                topology.push(run);
                offset += length;
            }
            topology
        },
        (Some(_), Some(total)) => {
            warn!(
                "polyline patch {patch_path}: node counts cover {total} of {point_count} \
                 points; falling back to a single run"
            );
            vec![(0..point_count).collect()]
        },
        _ => {
            debug!("polyline patch {patch_path}: no node counts, single run");
            vec![(0..point_count).collect()]
        },
    }
}
