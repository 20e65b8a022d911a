// Study guide generation.
// All LLM calls go through llm_client, never directly to the provider.

pub mod generator;
pub mod handlers;
pub mod mock;
pub mod models;
pub mod prompts;
