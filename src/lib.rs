//! Ollamo
//!
//! Client core for a local Ollama-compatible model server: typed API client
//! with streaming chat, plus settings and conversation persistence.

pub mod client;
pub mod storage;
pub mod types;

pub use client::{ChatStream, ClientConfig, ClientError, ServerClient};
