//! Models of the build plugins the backends drive.

pub mod android;
pub mod cmake;

pub use android::{AndroidExtension, AndroidSettings};
pub use cmake::CMakeExtension;
