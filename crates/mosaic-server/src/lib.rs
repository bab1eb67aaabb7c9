//! Mosaic server: HTTP/JSON transport for the `NetworkOrchestrator` RPCs.

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
