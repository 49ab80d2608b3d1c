// Palette generation: the model-fallback gateway and its HTTP surface.
// All model calls go through llm_client; nothing here talks to the provider directly.

pub mod gateway;
pub mod handlers;
pub mod prompts;
