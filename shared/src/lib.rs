//! Shared types and models for the Landed Cost Dashboard
//!
//! This crate contains the pure domain shared between the backend, the
//! browser helpers (via WASM) and the tests: record models, the cost
//! aggregator, form schemas, the local search filter and list rendering.

pub mod costs;
pub mod dashboard;
pub mod effects;
pub mod forms;
pub mod models;
pub mod search;
pub mod session;
pub mod types;
pub mod validation;
pub mod view;

pub use costs::*;
pub use effects::*;
pub use forms::*;
pub use models::*;
pub use search::*;
pub use session::*;
pub use types::*;
pub use validation::*;
pub use view::*;
