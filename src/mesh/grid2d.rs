//! 2D-grid surface representations: lattice or stored point matrices, holes
//! marked by NaN z values.

use crate::array::{DecodeContext, decode_points, find_declared_counts};
use crate::attr::Value;
use crate::dataset::DatasetStore;
use crate::errors::{MeshError, MeshResult};
use crate::float_types::Real;
use crate::repository::Repository;
use nalgebra::Point3;
use tracing::{debug, warn};

use super::{
    MeshKind, ReconstructedMesh, maybe_flip_z, owner_identifier, patch_entries, patch_z_reversed,
    points_node,
};

/// How a grid patch is turned into a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridOutput {
    /// Holes and their quads are dropped, surviving points renumbered.
    #[default]
    Compact,
    /// Holes keep their grid slot with z substituted by 0; every quad is
    /// emitted. The substitution is deliberate, not an error mask.
    KeepHoles,
    /// The raw row-major point matrix, holes preserved, no topology.
    RawPointGrid,
}

/// Read a 2D-grid representation.
///
/// Each patch decodes into a `slow x fast` point matrix; a point whose z is
/// NaN is a hole. A failure while scanning patches is logged and the patches
/// completed so far are returned.
pub fn read_grid2d(
    rep: &Value,
    repo: &dyn Repository,
    store: &dyn DatasetStore,
    output: GridOutput,
) -> MeshResult<Vec<ReconstructedMesh>> {
    let ctx = DecodeContext { root: rep, repo, store };
    let owner = owner_identifier(rep);

    let mut patches = patch_entries(rep, "Grid2dPatch");
    if patches.is_empty() {
        // Single-patch producers attach the geometry to the representation
        // itself.
        patches.push((String::new(), rep));
    }

    let mut meshes = Vec::new();
    for (index, (patch_path, patch)) in patches.iter().enumerate() {
        match build_grid_patch(patch, patch_path, &ctx, output, &owner, index) {
            Ok(mesh) => meshes.push(mesh),
            Err(error) => {
                warn!("grid patch {patch_path} failed: {error}; yielding {} patch(es)", meshes.len());
                break;
            },
        }
    }

    debug!("grid2d {owner}: {} patch(es), {output:?}", meshes.len());
    Ok(meshes)
}

fn build_grid_patch(
    patch: &Value,
    patch_path: &str,
    ctx: &DecodeContext,
    output: GridOutput,
    owner: &str,
    index: usize,
) -> MeshResult<ReconstructedMesh> {
    let (node, points_path) = points_node(patch, patch_path)?;
    let decoded = decode_points(node, &points_path, ctx)?;

    let (slow, fast) = decoded
        .grid_dims
        .or_else(|| find_declared_counts(ctx.root, &points_path))
        .ok_or_else(|| {
            MeshError::malformed(format!("grid patch {patch_path} has no axis counts"))
        })?;
    if slow * fast != decoded.points.len() {
        return Err(MeshError::malformed(format!(
            "grid patch {patch_path}: {slow}x{fast} does not match {} points",
            decoded.points.len()
        )));
    }

    let reversed = patch_z_reversed(ctx, &points_path);
    let points = maybe_flip_z(decoded.points, reversed);
    let identifier = format!("{owner}_patch{index}");

    Ok(match output {
        GridOutput::Compact => compact(points, slow, fast, identifier),
        GridOutput::KeepHoles => keep_holes(points, slow, fast, identifier),
        GridOutput::RawPointGrid => ReconstructedMesh {
            identifier,
            points,
            topology: Vec::new(),
            kind: MeshKind::GridedPointSet { slow, fast },
        },
    })
}

/// Drop hole points, renumber survivors, and emit only quads whose four
/// corners all survived.
fn compact(
    points: Vec<Point3<Real>>,
    slow: usize,
    fast: usize,
    identifier: String,
) -> ReconstructedMesh {
    let mut remap: Vec<Option<usize>> = vec![None; points.len()];
    let mut kept = Vec::new();
    for (old, point) in points.into_iter().enumerate() {
        if !point.z.is_nan() {
            remap[old] = Some(kept.len());
            kept.push(point);
        }
    }

    let mut topology = Vec::new();
    for i in 0..slow.saturating_sub(1) {
        for j in 0..fast.saturating_sub(1) {
            let corners =
                [i * fast + j, (i + 1) * fast + j, (i + 1) * fast + j + 1, i * fast + j + 1];
            let quad: Vec<usize> = corners.iter().filter_map(|&c| remap[c]).collect();
            if quad.len() == 4 {
                topology.push(quad);
            }
        }
    }

    ReconstructedMesh { identifier, points: kept, topology, kind: MeshKind::Surface }
}

/// Retain hole points with z set to 0 and emit every quad.
fn keep_holes(
    points: Vec<Point3<Real>>,
    slow: usize,
    fast: usize,
    identifier: String,
) -> ReconstructedMesh {
    let points: Vec<Point3<Real>> = points
        .into_iter()
        .map(|p| if p.z.is_nan() { Point3::new(p.x, p.y, 0.0) } else { p })
        .collect();

    let mut topology = Vec::new();
    for i in 0..slow.saturating_sub(1) {
        for j in 0..fast.saturating_sub(1) {
            topology.push(vec![
                i * fast + j,
                (i + 1) * fast + j,
                (i + 1) * fast + j + 1,
                i * fast + j + 1,
            ]);
        }
    }

    ReconstructedMesh { identifier, points, topology, kind: MeshKind::Surface }
}
