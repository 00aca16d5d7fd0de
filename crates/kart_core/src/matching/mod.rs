//! Randomized maximum bipartite matching between pilots and cars

pub mod engine;
pub mod graph;
pub(crate) mod layers;

#[cfg(test)]
pub(crate) mod proptest_gen;

pub use engine::{fallback_pairing, MatchingEngine};
pub use graph::{BipartiteGraph, CarAssignment, CarNumber, CarSet, MatchingOutcome, PilotId};
