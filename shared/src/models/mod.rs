//! Domain models for the Landed Cost Dashboard
//!
//! Field names follow the column names of the remote store.

mod cost_type;
mod lot;
mod product;
mod shipment;
mod user;

pub use cost_type::*;
pub use lot::*;
pub use product::*;
pub use shipment::*;
pub use user::*;
