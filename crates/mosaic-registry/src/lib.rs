//! Mosaic Registry: the fractal node tree and the coordinator that grows it.
//!
//! `NodeRegistry` is the single source of truth for live nodes and their
//! lineage. `SpawnCoordinator` turns spawn requests into registrations and
//! reports failures in-band, the way the RPC contract expects.

pub mod registry;
pub mod spawn;
pub mod validate;

pub use registry::{NodeRegistry, NodeView};
pub use spawn::{SpawnCoordinator, SpawnResponse};
pub use validate::validate_node_id;
