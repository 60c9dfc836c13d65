pub mod base;
pub mod factory;
pub mod openai_compat;

pub use base::LLMProvider;
pub use factory::create_provider;
