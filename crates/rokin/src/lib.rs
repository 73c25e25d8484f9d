#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use rokin_kernels as kernels;

#[doc(inline)]
pub use rokin_linalg as linalg;

#[doc(inline)]
pub use rokin_kinematics as kinematics;
