//! Answer generation

pub mod client;

pub use client::OpenAIChatClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::TokenUsage;

/// Text produced by one generation call plus its token accounting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
}

/// Invokes a language model with a fully rendered prompt
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation>;
}
