// Intent-routing dialogue core.
// Classifies each turn, dispatches to a response strategy, and keeps per-session history.
// All model traffic goes through llm_client::ModelGateway.

pub mod classifier;
pub mod context;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod orchestrator;
pub mod prompts;
pub mod sessions;

#[cfg(test)]
pub(crate) mod testing;
