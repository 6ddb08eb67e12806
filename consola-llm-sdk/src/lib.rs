//! # Consola LLM SDK
//!
//! Thin client for the upstream LLM provider, currently the parts of the
//! OpenAI API needed to check whether an API key is usable.
//!
//! ## Example
//!
//! ```rust,no_run
//! use consola_llm_sdk::key_check::{KeyValidator, OpenAIKeyValidator};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let validator = OpenAIKeyValidator::new(Duration::from_secs(10))?;
//!     let ok = validator.validate("sk-...").await?;
//!     println!("key valid: {}", ok);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod key_check;
pub mod openai;

pub use error::LlmError;
pub use key_check::{KeyValidator, OpenAIKeyValidator};
