//! OBJ-style text export of reconstructed meshes.
//!
//! One `g` group per mesh; `v x y z` per point; one `l` record per polyline
//! element or `f` record per face element, 1-based, offset by the cumulative
//! point count of previously written meshes.

use crate::errors::MeshResult;
use crate::float_types::Real;
use crate::mesh::{MeshKind, ReconstructedMesh};
use std::io::Write;
use tracing::debug;

/// Serialize `meshes` in list order to `out`.
///
/// `scene_name` becomes an `o` record when given. `vertex_colors` is accepted
/// for signature stability but currently has no effect (reserved hook).
pub fn export_obj<W: Write>(
    meshes: &[ReconstructedMesh],
    out: &mut W,
    scene_name: Option<&str>,
    _vertex_colors: Option<&[[Real; 3]]>,
) -> MeshResult<()> {
    writeln!(out, "# exported by resmesh")?;
    if let Some(name) = scene_name {
        writeln!(out, "o {name}")?;
    }

    // OBJ indices are 1-based and global across groups.
    let mut offset = 1usize;
    for mesh in meshes {
        writeln!(out, "g {}", mesh.identifier)?;
        for point in &mesh.points {
            writeln!(out, "v {:.6} {:.6} {:.6}", point.x, point.y, point.z)?;
        }

        let record = match mesh.kind {
            MeshKind::PolylineSet => "l",
            _ => "f",
        };
        for element in &mesh.topology {
            write!(out, "{record}")?;
            for &index in element {
                write!(out, " {}", index + offset)?;
            }
            writeln!(out)?;
        }

        offset += mesh.points.len();
    }

    debug!("exported {} mesh(es), {} vertices", meshes.len(), offset - 1);
    Ok(())
}

/// [`export_obj`] into a `String`.
pub fn export_obj_to_string(
    meshes: &[ReconstructedMesh],
    scene_name: Option<&str>,
) -> MeshResult<String> {
    let mut buffer = Vec::new();
    export_obj(meshes, &mut buffer, scene_name, None)?;
    // The writer only ever emits ASCII.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
