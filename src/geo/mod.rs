//! Geodetic geometry: UTM conversion, fault/profile projection, velocity projection.

pub mod projection;
pub mod utm;
pub mod velocity;

pub use projection::*;
pub use utm::*;
pub use velocity::*;
