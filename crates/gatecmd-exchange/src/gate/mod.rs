//! Gate.io spot API v4 adapter.

mod rest;
pub mod sign;
pub mod symbol;
pub mod wire;

pub use rest::GateSpotV4;
