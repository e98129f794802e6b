pub mod actor;
pub mod errors;
pub mod events;
pub mod fulfillment;
pub mod order;
pub mod ownership;
pub mod ports;
pub mod vendor;
