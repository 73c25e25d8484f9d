#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the linear algebra module.
pub mod error;

/// Three dimensional vectors.
pub mod vector;

/// Unit quaternions and rotation conversions.
pub mod quaternion;

/// Stack allocated fixed-size matrices and homogeneous transforms.
pub mod fixed;

/// Row-major dense matrix of runtime size.
pub mod matrix;

/// LU, QR, SVD and Cholesky decompositions of [`Matrix`].
pub mod decomposition;

/// Contiguity checks over row-slice layouts.
pub mod rows;

/// Reusable scratch memory for allocation-free solves.
pub mod workspace;

/// Non-negative least squares and least distance programming.
pub mod nnls;

pub use error::LinalgError;
pub use fixed::{FixedMat, Matrix2x2, Matrix3x3, Matrix3x4, Matrix4x3, Matrix4x4};
pub use matrix::Matrix;
pub use quaternion::Quaternion;
pub use vector::Vector3;
pub use workspace::Workspace;
