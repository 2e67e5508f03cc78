//! The array-decoding engine.
//!
//! Interchange arrays arrive as tagged descriptions: a constant replicated N
//! times, explicit inline values, a jagged array sliced by cumulative lengths,
//! a lattice whose points are implied by an affine stepping rule, an external
//! reference into a backing dataset, or a z-value overlay over a supporting
//! geometry. The kind tag is folded to a canonical [`ArrayKind`] once, then
//! dispatch is a closed match — an unrecognized kind is a
//! [`MeshError::NotSupported`], never a silent fallthrough.

use crate::attr::{Value, parent_path};
use crate::crs::{is_z_reversed, resolve_crs};
use crate::dataset::DatasetStore;
use crate::errors::{MeshError, MeshResult};
use crate::float_types::Real;
use crate::repository::Repository;
use nalgebra::{Point3, Vector3};

/// Collaborators every decode call threads through.
///
/// `root` is the representation object the array lives under; array dot paths
/// are relative to it. Decoding is a pure function of the array node plus
/// these three, so independent calls may run concurrently when the
/// collaborators allow concurrent reads.
pub struct DecodeContext<'a> {
    pub root: &'a Value,
    pub repo: &'a dyn Repository,
    pub store: &'a dyn DatasetStore,
}

/// Canonical array kinds, after case folding and axis-size suffix stripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    Constant,
    Explicit,
    Jagged,
    Lattice,
    External,
    ZValueOverlay,
}

/// Fold a schema type name down to its canonical kind.
///
/// Word casing is ignored and axis-size suffix tokens (`2d`, `3d`) are
/// stripped, so `Point3dLatticeArray` and `DoubleLatticeArray` land on the
/// same tag. Names that still look like an array but match no specific kind
/// are explicit inline arrays.
pub fn canonical_kind(type_name: &str) -> Option<ArrayKind> {
    let folded = type_name.to_ascii_lowercase().replace("3d", "").replace("2d", "");
    if folded.contains("constant") {
        Some(ArrayKind::Constant)
    } else if folded.contains("jagged") {
        Some(ArrayKind::Jagged)
    } else if folded.contains("lattice") {
        Some(ArrayKind::Lattice)
    } else if folded.contains("zvalue") {
        Some(ArrayKind::ZValueOverlay)
    } else if folded.contains("hdf5") || folded.contains("external") {
        Some(ArrayKind::External)
    } else if folded.ends_with("array") || folded.ends_with("arrayofvalues") {
        Some(ArrayKind::Explicit)
    } else {
        None
    }
}

/// A parsed array description, borrowing its sub-arrays from the graph.
pub enum ArrayDescriptor<'a> {
    Constant { value: Real, count: usize },
    Explicit { values: &'a Value },
    Jagged { elements: &'a Value, cumulative_lengths: &'a Value },
    Lattice(LatticeArray<'a>),
    External { reference: &'a Value },
    ZValueOverlay { supporting: &'a Value, z_values: &'a Value },
}

pub struct LatticeArray<'a> {
    pub origin: Point3<Real>,
    pub slow: LatticeAxis<'a>,
    pub fast: LatticeAxis<'a>,
}

/// One lattice axis: the step direction and the (still-encoded) spacings.
pub struct LatticeAxis<'a> {
    pub offset: Vector3<Real>,
    pub spacing: &'a Value,
}

impl<'a> ArrayDescriptor<'a> {
    /// Parse an array node into its tagged description.
    pub fn parse(node: &'a Value) -> MeshResult<Self> {
        let obj = node
            .as_object()
            .ok_or_else(|| MeshError::malformed("array node is not an object"))?;
        let kind = canonical_kind(&obj.type_name)
            .ok_or_else(|| MeshError::NotSupported(format!("array kind {}", obj.type_name)))?;

        match kind {
            ArrayKind::Constant => {
                let value = obj
                    .attr("Value")
                    .and_then(value_to_real)
                    .ok_or_else(|| MeshError::malformed("constant array without Value"))?;
                let count = obj
                    .attr("Count")
                    .and_then(Value::as_i64)
                    .filter(|&c| c >= 0)
                    .ok_or_else(|| MeshError::malformed("constant array without Count"))?;
                Ok(ArrayDescriptor::Constant { value, count: count as usize })
            },
            ArrayKind::Explicit => {
                let values = obj
                    .attr("Values")
                    .ok_or_else(|| MeshError::malformed("explicit array without Values"))?;
                Ok(ArrayDescriptor::Explicit { values })
            },
            ArrayKind::Jagged => {
                let elements = obj
                    .attr("Elements")
                    .ok_or_else(|| MeshError::malformed("jagged array without Elements"))?;
                let cumulative_lengths = obj
                    .attr("CumulativeLength")
                    .or_else(|| obj.attr("CumulativeLengths"))
                    .ok_or_else(|| MeshError::malformed("jagged array without CumulativeLength"))?;
                Ok(ArrayDescriptor::Jagged { elements, cumulative_lengths })
            },
            ArrayKind::Lattice => {
                let origin = obj
                    .attr("Origin")
                    .and_then(point3_from)
                    .ok_or_else(|| MeshError::malformed("lattice array without Origin"))?;
                let axes = obj
                    .attr("Offset")
                    .and_then(Value::as_list)
                    .ok_or_else(|| MeshError::malformed("lattice array without Offset axes"))?;
                if axes.len() < 2 {
                    return Err(MeshError::malformed("lattice array needs two offset axes"));
                }
                Ok(ArrayDescriptor::Lattice(LatticeArray {
                    origin,
                    slow: lattice_axis(&axes[0])?,
                    fast: lattice_axis(&axes[1])?,
                }))
            },
            ArrayKind::External => {
                // The reference stays opaque; the store interprets it.
                let reference = obj.attr("Values").unwrap_or(node);
                Ok(ArrayDescriptor::External { reference })
            },
            ArrayKind::ZValueOverlay => {
                let supporting = obj
                    .attr("SupportingGeometry")
                    .ok_or_else(|| MeshError::malformed("z-value array without SupportingGeometry"))?;
                let z_values = obj
                    .attr("ZValues")
                    .ok_or_else(|| MeshError::malformed("z-value array without ZValues"))?;
                Ok(ArrayDescriptor::ZValueOverlay { supporting, z_values })
            },
        }
    }
}

fn lattice_axis(node: &Value) -> MeshResult<LatticeAxis<'_>> {
    let offset = node
        .get("Offset")
        .and_then(point3_from)
        .map(|p| p.coords)
        .ok_or_else(|| MeshError::malformed("lattice axis without offset vector"))?;
    let spacing = node
        .get("Spacing")
        .ok_or_else(|| MeshError::malformed("lattice axis without spacing"))?;
    Ok(LatticeAxis { offset, spacing })
}

/// Decode an array node into a flat numeric sequence.
///
/// Jagged arrays flatten in run order; point-producing kinds flatten to
/// consecutive x,y,z triples.
pub fn decode_numeric(node: &Value, path: &str, ctx: &DecodeContext) -> MeshResult<Vec<Real>> {
    match ArrayDescriptor::parse(node)? {
        ArrayDescriptor::Constant { value, count } => Ok(vec![value; count]),
        ArrayDescriptor::Explicit { values } => {
            let mut out = Vec::new();
            flatten_numbers(values, path, &mut out)?;
            Ok(out)
        },
        ArrayDescriptor::Jagged { .. } => {
            Ok(decode_jagged(node, path, ctx)?.into_iter().flatten().collect())
        },
        ArrayDescriptor::External { reference } => {
            ctx.store.read_external_array(reference, ctx.root, path)
        },
        ArrayDescriptor::Lattice(_) | ArrayDescriptor::ZValueOverlay { .. } => {
            let decoded = decode_points(node, path, ctx)?;
            let mut out = Vec::with_capacity(decoded.points.len() * 3);
            for p in &decoded.points {
                out.extend_from_slice(&[p.x, p.y, p.z]);
            }
            Ok(out)
        },
    }
}

/// Decode an array node into nested runs.
///
/// A jagged array slices its elements by cumulative lengths; any other kind
/// decodes to a single run holding all of its values.
pub fn decode_jagged(node: &Value, path: &str, ctx: &DecodeContext) -> MeshResult<Vec<Vec<Real>>> {
    match ArrayDescriptor::parse(node)? {
        ArrayDescriptor::Jagged { elements, cumulative_lengths } => {
            let elements = decode_numeric(elements, &format!("{path}.Elements"), ctx)?;
            let boundaries =
                decode_numeric(cumulative_lengths, &format!("{path}.CumulativeLength"), ctx)?;

            let mut runs = Vec::with_capacity(boundaries.len());
            let mut previous = 0usize;
            for boundary in boundaries {
                let end = boundary as usize;
                if !boundary.is_finite() || boundary < 0.0 || end < previous || end > elements.len()
                {
                    return Err(MeshError::malformed(format!(
                        "jagged array at {path}: cumulative length {boundary} outside [{previous}, {}]",
                        elements.len()
                    )));
                }
                runs.push(elements[previous..end].to_vec());
                previous = end;
            }
            Ok(runs)
        },
        _ => Ok(vec![decode_numeric(node, path, ctx)?]),
    }
}

/// A decoded point sequence, with grid dimensions when the source was
/// lattice-shaped.
pub struct DecodedPoints {
    pub points: Vec<Point3<Real>>,
    /// `(slow, fast)` sizes for row-major gridded sources.
    pub grid_dims: Option<(usize, usize)>,
}

/// Decode an array node into 3D points.
///
/// Lattices are stepped out from their origin; z-value overlays substitute
/// into their supporting geometry; every other kind is read as consecutive
/// x,y,z triples (a trailing remainder shorter than 3 is discarded), except
/// explicit nested triples which are used directly.
pub fn decode_points(node: &Value, path: &str, ctx: &DecodeContext) -> MeshResult<DecodedPoints> {
    match ArrayDescriptor::parse(node)? {
        ArrayDescriptor::Lattice(lattice) => decode_lattice(&lattice, path, ctx),
        ArrayDescriptor::ZValueOverlay { supporting, z_values } => {
            decode_z_overlay(supporting, z_values, path, ctx)
        },
        ArrayDescriptor::Explicit { values } => {
            let items = values
                .as_list()
                .ok_or_else(|| MeshError::malformed(format!("point values at {path} are not a list")))?;
            if let Some(Value::List(_)) = items.first() {
                // Already nested triples.
                let mut points = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let triple: Vec<Real> = item
                        .as_list()
                        .map(|xs| xs.iter().filter_map(value_to_real).collect())
                        .unwrap_or_default();
                    if triple.len() < 3 {
                        return Err(MeshError::malformed(format!(
                            "point {index} at {path} has fewer than 3 coordinates"
                        )));
                    }
                    points.push(Point3::new(triple[0], triple[1], triple[2]));
                }
                Ok(DecodedPoints { points, grid_dims: None })
            } else {
                let flat = decode_numeric(node, path, ctx)?;
                Ok(DecodedPoints { points: triples(&flat), grid_dims: None })
            }
        },
        _ => {
            let flat = decode_numeric(node, path, ctx)?;
            Ok(DecodedPoints { points: triples(&flat), grid_dims: None })
        },
    }
}

/// Decode an array of per-line flags.
pub fn decode_flags(node: &Value, path: &str, ctx: &DecodeContext) -> MeshResult<Vec<bool>> {
    Ok(decode_numeric(node, path, ctx)?.iter().map(|&v| v != 0.0).collect())
}

/// Decode an array of non-negative counts or indices.
pub fn decode_counts(node: &Value, path: &str, ctx: &DecodeContext) -> MeshResult<Vec<usize>> {
    decode_numeric(node, path, ctx)?
        .iter()
        .map(|&v| {
            if v < 0.0 {
                Err(MeshError::malformed(format!("negative count {v} at {path}")))
            } else {
                Ok(v as usize)
            }
        })
        .collect()
}

fn decode_lattice(
    lattice: &LatticeArray,
    path: &str,
    ctx: &DecodeContext,
) -> MeshResult<DecodedPoints> {
    // Some producers invert the axis roles when depth increases downward;
    // the spacing values compensate, the offset vectors do not.
    let reversed = match resolve_crs(ctx.root, path, ctx.repo) {
        Ok(crs) => is_z_reversed(Some(&crs)),
        Err(_) => false,
    };

    let mut slow_spacing = decode_numeric(lattice.slow.spacing, &format!("{path}.Offset.0.Spacing"), ctx)?;
    let mut fast_spacing = decode_numeric(lattice.fast.spacing, &format!("{path}.Offset.1.Spacing"), ctx)?;
    if reversed {
        std::mem::swap(&mut slow_spacing, &mut fast_spacing);
    }

    let mut slow_table: Vec<Vector3<Real>> =
        slow_spacing.iter().map(|&s| lattice.slow.offset * s).collect();
    let mut fast_table: Vec<Vector3<Real>> =
        fast_spacing.iter().map(|&s| lattice.fast.offset * s).collect();

    let (slow_size, fast_size) = match find_declared_counts(ctx.root, path) {
        Some((declared_slow, declared_fast)) => {
            // Fencepost tolerance: a declared count "matches" a table when it
            // equals the table length or the table length - 1.
            let matches = |declared: usize, len: usize| declared == len || declared + 1 == len;
            if matches(declared_fast, slow_table.len()) && matches(declared_slow, fast_table.len()) {
                std::mem::swap(&mut slow_table, &mut fast_table);
            }
            (declared_slow, declared_fast)
        },
        None => (slow_table.len() + 1, fast_table.len() + 1),
    };

    if slow_size > slow_table.len() + 1 || fast_size > fast_table.len() + 1 {
        return Err(MeshError::malformed(format!(
            "lattice at {path}: declared {slow_size}x{fast_size} exceeds spacing tables \
             of {} and {} entries",
            slow_table.len(),
            fast_table.len()
        )));
    }

    // Row-major, flat index i*fast_size + j, each point accumulated from its
    // previously computed neighbor.
    let mut points = Vec::with_capacity(slow_size * fast_size);
    let mut row_origin = lattice.origin;
    for i in 0..slow_size {
        if i > 0 {
            row_origin += slow_table[i - 1];
        }
        let mut point = row_origin;
        for j in 0..fast_size {
            if j > 0 {
                point += fast_table[j - 1];
            }
            points.push(point);
        }
    }

    Ok(DecodedPoints { points, grid_dims: Some((slow_size, fast_size)) })
}

fn decode_z_overlay(
    supporting: &Value,
    z_values: &Value,
    path: &str,
    ctx: &DecodeContext,
) -> MeshResult<DecodedPoints> {
    let support = decode_points(supporting, &format!("{path}.SupportingGeometry"), ctx)?;
    let z_path = format!("{path}.ZValues");

    let rows: Vec<Vec<Real>> =
        if matches!(ArrayDescriptor::parse(z_values)?, ArrayDescriptor::Jagged { .. }) {
            decode_jagged(z_values, &z_path, ctx)?
        } else {
            let flat = decode_numeric(z_values, &z_path, ctx)?;
            let cols = support.grid_dims.map(|(_, fast)| fast).filter(|&fast| fast > 0).ok_or_else(
                || {
                    MeshError::malformed(format!(
                        "z-value array at {path}: flat z values over a non-gridded support"
                    ))
                },
            )?;
            flat.chunks(cols).map(<[Real]>::to_vec).collect()
        };

    let cols = support
        .grid_dims
        .map(|(_, fast)| fast)
        .or_else(|| rows.first().map(Vec::len))
        .ok_or_else(|| MeshError::malformed(format!("z-value array at {path} has no columns")))?;

    // A new sequence, not an in-place mutation of the decoded support.
    let mut points = support.points;
    for (li, row) in rows.iter().enumerate() {
        for (ci, &z) in row.iter().enumerate() {
            let index = li * cols + ci;
            match points.get_mut(index) {
                Some(point) => point.z = z,
                None => {
                    return Err(MeshError::malformed(format!(
                        "z-value array at {path}: z[{li}][{ci}] has no supporting point"
                    )));
                },
            }
        }
    }

    Ok(DecodedPoints { points, grid_dims: support.grid_dims })
}

/// Walk the path upward looking for declared `SlowestAxisCount` /
/// `FastestAxisCount` attributes on an enclosing node.
pub(crate) fn find_declared_counts(root: &Value, path: &str) -> Option<(usize, usize)> {
    let mut context = path;
    loop {
        if let Some(obj) = root.get(context).and_then(Value::as_object) {
            let slow = obj.attr("SlowestAxisCount").and_then(Value::as_i64);
            let fast = obj.attr("FastestAxisCount").and_then(Value::as_i64);
            if let (Some(slow), Some(fast)) = (slow, fast) {
                if slow >= 0 && fast >= 0 {
                    return Some((slow as usize, fast as usize));
                }
            }
        }
        context = parent_path(context)?;
    }
}

/// Reinterpret a flat sequence as consecutive x,y,z triples.
/// A trailing remainder shorter than 3 is discarded.
fn triples(flat: &[Real]) -> Vec<Point3<Real>> {
    flat.chunks_exact(3).map(|c| Point3::new(c[0], c[1], c[2])).collect()
}

/// A 3D point from either a `Coordinate1`/`Coordinate2`/`Coordinate3` object
/// or a flat list of at least three numbers.
fn point3_from(value: &Value) -> Option<Point3<Real>> {
    if let Some(obj) = value.as_object() {
        let x = obj.attr("Coordinate1").and_then(Value::as_f64)?;
        let y = obj.attr("Coordinate2").and_then(Value::as_f64)?;
        let z = obj.attr("Coordinate3").and_then(Value::as_f64)?;
        return Some(Point3::new(x, y, z));
    }
    let coords: Vec<Real> = value.as_list()?.iter().filter_map(value_to_real).collect();
    if coords.len() < 3 {
        return None;
    }
    Some(Point3::new(coords[0], coords[1], coords[2]))
}

fn value_to_real(value: &Value) -> Option<Real> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => value.as_f64(),
    }
}

fn flatten_numbers(value: &Value, path: &str, out: &mut Vec<Real>) -> MeshResult<()> {
    match value {
        Value::List(items) => {
            for item in items {
                flatten_numbers(item, path, out)?;
            }
            Ok(())
        },
        _ => match value_to_real(value) {
            Some(v) => {
                out.push(v);
                Ok(())
            },
            None => Err(MeshError::malformed(format!("non-numeric value at {path}"))),
        },
    }
}
