//! Mesh reconstruction: representation shapes + decoded arrays → typed meshes.

use crate::array::DecodeContext;
use crate::attr::Value;
use crate::crs::{is_z_reversed, resolve_crs};
use crate::dataset::DatasetStore;
use crate::errors::{MeshError, MeshResult};
use crate::float_types::Real;
use crate::repository::Repository;
use nalgebra::Point3;
use tracing::debug;

pub mod point_set;
pub mod polyline_set;
pub mod grid2d;
pub mod triangulated;

pub use grid2d::GridOutput;
pub use point_set::read_point_set;
pub use polyline_set::read_polyline_set;
pub use triangulated::read_triangulated;

/// Which mesh variant a [`ReconstructedMesh`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    /// Points only, topology empty.
    PointSet,
    /// Each topology element is a node-index run, closed runs repeat their
    /// first index at the end.
    PolylineSet,
    /// Each topology element is a triangle or quad.
    Surface,
    /// Raw row-major point matrix, no decoded topology.
    GridedPointSet { slow: usize, fast: usize },
}

/// One reconstructed mesh patch.
///
/// The point list is append-only during construction and never reordered;
/// every topology index references a valid point-list position; the Z sign
/// flip, when the CRS calls for one, has been applied exactly once before the
/// mesh leaves its builder. Read-only afterwards.
#[derive(Debug, Clone)]
pub struct ReconstructedMesh {
    /// Unique within one export call.
    pub identifier: String,
    /// Index = 0-based vertex id.
    pub points: Vec<Point3<Real>>,
    /// Ordered elements, each an ordered run of point indices.
    pub topology: Vec<Vec<usize>>,
    pub kind: MeshKind,
}

impl ReconstructedMesh {
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn element_count(&self) -> usize {
        self.topology.len()
    }
}

/// Read any supported representation into its meshes.
///
/// Dispatches on the representation's type name; grids are read in
/// [`GridOutput::Compact`] mode. Unrecognized shapes are
/// [`MeshError::NotSupported`].
pub fn read_representation(
    rep: &Value,
    repo: &dyn Repository,
    store: &dyn DatasetStore,
) -> MeshResult<Vec<ReconstructedMesh>> {
    let type_name = rep
        .as_object()
        .map(|o| o.type_name.to_ascii_lowercase())
        .unwrap_or_default();

    if type_name.contains("polyline") {
        read_polyline_set(rep, repo, store)
    } else if type_name.contains("triangulated") {
        read_triangulated(rep, repo, store)
    } else if type_name.contains("grid") {
        grid2d::read_grid2d(rep, repo, store, GridOutput::Compact)
    } else if type_name.contains("pointset") {
        read_point_set(rep, repo, store)
    } else {
        Err(MeshError::NotSupported(format!("representation kind {type_name}")))
    }
}

/// A human-usable identifier for the representation, used to label its
/// patches.
pub(crate) fn owner_identifier(rep: &Value) -> String {
    rep.get("Citation.Title")
        .or_else(|| rep.get("Title"))
        .or_else(|| rep.get("Uuid"))
        .and_then(Value::as_str)
        .unwrap_or("representation")
        .to_string()
}

/// Resolve the CRS polarity at the patch's points path, swallowing
/// resolution failures. Resolving from the points array walks up through the
/// geometry node, so a `LocalCrs` hung there is found.
pub(crate) fn patch_z_reversed(ctx: &DecodeContext, path: &str) -> bool {
    match resolve_crs(ctx.root, path, ctx.repo) {
        Ok(crs) => is_z_reversed(Some(&crs)),
        Err(error) => {
            debug!("no CRS for patch at {path}: {error}; assuming not reversed");
            false
        },
    }
}

/// Negate every third coordinate iff the CRS is reversed. Applied exactly
/// once, before the mesh is handed to any consumer.
pub(crate) fn maybe_flip_z(points: Vec<Point3<Real>>, reversed: bool) -> Vec<Point3<Real>> {
    if !reversed {
        return points;
    }
    points.into_iter().map(|p| Point3::new(p.x, p.y, -p.z)).collect()
}

/// Enumerate patch sub-objects under the attribute `name`.
///
/// A patch attribute may hold a single object or a list of them; each entry
/// is returned with its full dot path from the representation root.
pub(crate) fn patch_entries<'a>(rep: &'a Value, name: &str) -> Vec<(String, &'a Value)> {
    let mut entries = Vec::new();
    for (path, value) in rep.find_named(name) {
        match value {
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    entries.push((format!("{path}.{index}"), item));
                }
            },
            _ => entries.push((path, value)),
        }
    }
    entries
}

/// The patch's Points array node and its dot path.
pub(crate) fn points_node<'a>(
    patch: &'a Value,
    patch_path: &str,
) -> MeshResult<(&'a Value, String)> {
    if let Some(node) = patch.get("Geometry.Points") {
        return Ok((node, format!("{patch_path}.Geometry.Points")));
    }
    if let Some(node) = patch.get("Points") {
        return Ok((node, format!("{patch_path}.Points")));
    }
    Err(MeshError::not_found(format!("no Points array under patch {patch_path}")))
}
