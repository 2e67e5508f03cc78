//! Coordinate-reference-system resolution and vertical-axis polarity.
//!
//! Producers hang a CRS reference (any attribute whose name ends in `Crs`)
//! somewhere on the path between a representation root and its point arrays.
//! [`resolve_crs`] finds the nearest enclosing one; [`is_z_reversed`] turns
//! the resolved object into a single "does depth increase downward" bit.

use crate::attr::{Value, parent_path};
use crate::errors::{MeshError, MeshResult};
use crate::repository::Repository;

/// The vertical-polarity fields of a resolved CRS object. Everything else a
/// CRS carries (units, projection) is irrelevant to mesh reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Crs {
    pub z_increasing_downward: Option<bool>,
    pub vertical_axis_direction: Option<String>,
    pub direction: Option<String>,
}

impl Crs {
    /// Read the polarity fields off a resolved CRS object node.
    pub fn from_node(node: &Value) -> Self {
        Crs {
            z_increasing_downward: node.get("ZIncreasingDownward").and_then(Value::as_bool),
            vertical_axis_direction: node
                .get("VerticalAxisDirection")
                .and_then(Value::as_str)
                .map(str::to_string),
            direction: node
                .get("Direction")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Whether the CRS declares depth to increase downward.
///
/// Any of the three polarity fields can assert a downward axis:
/// `z_increasing_downward == true`, or `vertical_axis_direction` /
/// `direction` equal to `"down"` case-insensitively. A `false` flag does not
/// override a downward axis declaration; producers that emit both mean the
/// axis. No CRS at all means not reversed.
pub fn is_z_reversed(crs: Option<&Crs>) -> bool {
    let Some(crs) = crs else {
        return false;
    };
    let says_down = |field: &Option<String>| {
        field.as_deref().is_some_and(|v| v.eq_ignore_ascii_case("down"))
    };
    crs.z_increasing_downward == Some(true)
        || says_down(&crs.vertical_axis_direction)
        || says_down(&crs.direction)
}

/// Locate the nearest enclosing CRS for the node at `path` under `root`.
///
/// Searches the context node's immediate attributes for a case-insensitive
/// `...Crs` name; on a hit the reference is resolved through `repo` by
/// identifier, falling back to UUID. An unresolvable reference is a
/// [`MeshError::NotFound`]. With no local match the search retries one path
/// segment up, until the root itself has been searched; no match anywhere is
/// also `NotFound`, which callers treat as "no CRS" (not reversed).
pub fn resolve_crs(root: &Value, path: &str, repo: &dyn Repository) -> MeshResult<Crs> {
    let mut context = path;
    loop {
        if let Some(obj) = root.get(context).and_then(Value::as_object) {
            let hit = obj
                .attrs
                .iter()
                .find(|(name, _)| name.to_ascii_lowercase().ends_with("crs"));
            if let Some((name, reference)) = hit {
                return resolve_reference(reference, repo).map(Crs::from_node).ok_or_else(
                    || MeshError::not_found(format!("CRS referenced by {name} at {context}")),
                );
            }
        }
        match parent_path(context) {
            Some(parent) => context = parent,
            None => return Err(MeshError::not_found(format!("no CRS on path {path}"))),
        }
    }
}

/// Follow a DOR to its target: identifier lookup first, then UUID.
///
/// The reference may be a bare text identifier or an object carrying
/// `Identifier` and/or `Uuid` attributes.
fn resolve_reference<'a>(reference: &Value, repo: &'a dyn Repository) -> Option<&'a Value> {
    let identifier = reference
        .get("Identifier")
        .and_then(Value::as_str)
        .or_else(|| reference.as_str());
    let uuid = reference
        .get("Uuid")
        .and_then(Value::as_str)
        .or(identifier);

    identifier
        .and_then(|id| repo.object_by_identifier(id))
        .or_else(|| uuid.and_then(|uuid| repo.object_by_uuid(uuid)))
}
