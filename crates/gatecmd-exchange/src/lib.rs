pub mod client;
pub mod error;
pub mod gate;

pub use client::ExchangeClient;
pub use error::ExchangeError;
pub use gate::GateSpotV4;
