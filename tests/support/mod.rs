//! Test support library
//! Fixture constructors for attribute graphs, arrays, and collaborators.
#![allow(dead_code)]

use resmesh::attr::{ObjectNode, Value};
use resmesh::float_types::{EPSILON, Real};
use resmesh::repository::MemoryRepository;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real) -> bool {
    (a - b).abs() < EPSILON
}

pub fn double_list(values: &[f64]) -> Value {
    Value::List(values.iter().map(|&v| Value::from(v)).collect())
}

/// Inline explicit array of doubles.
pub fn explicit_array(values: &[f64]) -> Value {
    ObjectNode::new("DoubleArray")
        .with("Values", double_list(values))
        .into()
}

/// Explicit point array as nested x,y,z triples.
pub fn explicit_points(triples: &[[f64; 3]]) -> Value {
    let values: Vec<Value> = triples.iter().map(|t| double_list(t)).collect();
    ObjectNode::new("Point3dArray")
        .with("Values", Value::List(values))
        .into()
}

pub fn constant_array(value: f64, count: i64) -> Value {
    ObjectNode::new("DoubleConstantArray")
        .with("Value", value)
        .with("Count", count)
        .into()
}

pub fn jagged_array(elements: Value, cumulative_lengths: Value) -> Value {
    ObjectNode::new("ResqmlJaggedArray")
        .with("Elements", elements)
        .with("CumulativeLength", cumulative_lengths)
        .into()
}

/// External array referencing `path` in a backing dataset.
pub fn hdf5_array(path: &str) -> Value {
    ObjectNode::new("DoubleHdf5Array")
        .with(
            "Values",
            ObjectNode::new("Hdf5Dataset").with("PathInHdfFile", path),
        )
        .into()
}

pub fn point3d(x: f64, y: f64, z: f64) -> Value {
    ObjectNode::new("Point3d")
        .with("Coordinate1", x)
        .with("Coordinate2", y)
        .with("Coordinate3", z)
        .into()
}

fn lattice_axis(offset: [f64; 3], spacing: &[f64]) -> Value {
    ObjectNode::new("Point3dOffset")
        .with("Offset", point3d(offset[0], offset[1], offset[2]))
        .with("Spacing", explicit_array(spacing))
        .into()
}

/// Lattice array stepping `slow_offset` by `slow_spacing` and `fast_offset`
/// by `fast_spacing` from `origin`.
pub fn lattice_array(
    origin: [f64; 3],
    slow_offset: [f64; 3],
    slow_spacing: &[f64],
    fast_offset: [f64; 3],
    fast_spacing: &[f64],
) -> Value {
    ObjectNode::new("Point3dLatticeArray")
        .with("Origin", point3d(origin[0], origin[1], origin[2]))
        .with(
            "Offset",
            Value::List(vec![
                lattice_axis(slow_offset, slow_spacing),
                lattice_axis(fast_offset, fast_spacing),
            ]),
        )
        .into()
}

/// Overlay array substituting `z_values` over `supporting`.
pub fn z_value_array(supporting: Value, z_values: Value) -> Value {
    ObjectNode::new("Point3dZValueArray")
        .with("SupportingGeometry", supporting)
        .with("ZValues", z_values)
        .into()
}

/// A DOR pointing at `id`, resolvable by identifier or UUID.
pub fn reference(id: &str) -> Value {
    ObjectNode::new("DataObjectReference")
        .with("Identifier", id)
        .with("Uuid", id)
        .into()
}

/// A depth-oriented CRS object (z increases downward).
pub fn depth_crs() -> Value {
    ObjectNode::new("LocalDepth3dCrs")
        .with("ZIncreasingDownward", true)
        .into()
}

/// Repository holding a single depth-oriented CRS under `id`.
pub fn repo_with_depth_crs(id: &str) -> MemoryRepository {
    let mut repo = MemoryRepository::new();
    repo.insert(Some(id), Some(id), depth_crs());
    repo
}
