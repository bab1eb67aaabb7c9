//! Mosaic Runtime: dispatch, strategies, and the orchestrator context.
//!
//! `NetworkOrchestrator` bundles the registry, spawn coordinator, dispatcher,
//! and metrics aggregator of one service instance and exposes the three RPC
//! operations (`SpawnNode`, `ProcessFractal`, `GetMetrics`). Nothing here is
//! global; tests build as many independent orchestrators as they like.

pub mod demo;
pub mod dispatcher;
pub mod orchestrator;
pub mod strategy;
pub mod types;

pub use demo::{run_demo, DemoOptions, DemoReport};
pub use dispatcher::FractalDispatcher;
pub use orchestrator::NetworkOrchestrator;
pub use strategy::{EchoStrategy, FractalStrategy, FractalTask, SimulatedStrategy, StrategyRegistry};
pub use types::*;
