//! # Gemini Relay
//!
//! A protocol-translation gateway that exposes a Gemini-style generation API
//! on top of OpenAI-compatible multimodal chat-completion backends.
//!
//! ## Overview
//!
//! This library provides the core functionality for translating between:
//! - **Gemini GenerateContent API** - Inbound request format
//! - **OpenAI Chat Completions API** - Upstream backend format
//!
//! The relay handles:
//! - Conversation window extraction from full message histories
//! - Bidirectional content-part conversion (text and inline media)
//! - Tiered model dispatch with a single quota-triggered fallback retry
//! - Simulated SSE streaming over a single synchronous upstream reply
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemini_relay::config::RelayConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from environment variables
//! let config = RelayConfig::from_env()?;
//! config.validate()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and HTTP error mapping
//! - [`models`] - Data structures for the Gemini and OpenAI wire formats
//! - [`transform`] - Window extraction, part codec, request/response shaping
//! - [`dispatch`] - Tiered upstream dispatch with quota fallback
//! - [`streaming`] - SSE frame synthesis and paced delivery

pub mod backend;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod models;
pub mod streaming;
pub mod transform;
pub mod validation;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
