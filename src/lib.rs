pub mod agent;
pub mod apply;
pub mod cli;
pub mod config;
pub mod errors;
pub mod extract;
pub mod log;
pub mod memory;
pub mod prd;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod ux;
pub mod wire;

pub use agent::{Orchestrator, Pipeline, StructuredCompletion};
pub use errors::{Disposition, ServiceError, UiAgentError};
pub use memory::MemoryCache;
pub use wire::{CodeBundle, GenerateResponse, GenerationResult};
