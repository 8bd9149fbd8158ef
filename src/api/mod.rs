//! Settlement API Service
//!
//! HTTP surface for the wager-settlement core: the spin endpoint, read-only
//! player projections, and the internal provisioning hooks used by the
//! surrounding platform.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use server::ApiServer;
