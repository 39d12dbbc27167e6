pub mod analyzer;
pub mod assistant;
pub mod client;
pub mod prompts;
pub mod types;
pub mod utils;

pub use analyzer::*;
pub use assistant::*;
pub use client::*;
pub use types::*;
