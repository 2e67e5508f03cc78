//! Reconstructs typed 3D mesh geometry (point sets, polyline sets, triangulated
//! surfaces, 2D grids) from the heterogeneous numeric-array encodings found in
//! subsurface-earth-model interchange packages.
//!
//! The pipeline: a representation object (a [`attr::Value`] graph) is walked for
//! its patches, each patch's point/topology arrays are decoded by the
//! [array decoder](array) (constant, explicit, jagged, lattice-computed, or
//! externally stored), vertical-axis polarity is derived from the nearest
//! enclosing [CRS](crs), and the result is assembled into read-only
//! [`mesh::ReconstructedMesh`] values that the [OBJ exporter](io) can serialize.
//!
//! # Features
//! - **f64**: use f64 as Real (default)
//! - **f32**: use f32 as Real, conflicts with f64

#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod attr;
pub mod repository;
pub mod dataset;
pub mod crs;
pub mod array;
pub mod mesh;
pub mod io;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use attr::{ObjectNode, Value};
pub use errors::{MeshError, MeshResult};
pub use mesh::{MeshKind, ReconstructedMesh, read_representation};
