pub mod agent;
pub mod dispatcher;
pub mod display;
pub mod error;
pub mod logging;
pub mod valuator;

pub mod test_support;

pub use agent::Agent;
pub use dispatcher::{OrderDispatcher, OrderIntent};
pub use error::AgentError;
pub use logging::Logger;
pub use valuator::{valuate, ClientPriceLookup, PriceLookup};
