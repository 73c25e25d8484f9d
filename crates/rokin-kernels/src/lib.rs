#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
#![allow(clippy::too_many_arguments)]
//!
//! All routines operate on row-major `f32` buffers owned by the caller.
//! Vectors are addressed with an explicit increment and matrices with a
//! leading dimension, so sub-blocks and columns can be passed without
//! copying.

/// Error types for the kernels module.
pub mod error;

/// BLAS level 1: vector-vector operations.
pub mod level1;

/// BLAS level 2: matrix-vector operations.
pub mod level2;

/// BLAS level 3: matrix-matrix operations.
pub mod level3;

/// LAPACK style factorizations and solvers.
pub mod lapack;

pub use error::KernelError;
