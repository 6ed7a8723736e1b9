//! Miki: a weather assistant agent behind a small HTTP API.
//!
//! An [`agent::Agent`] keeps per-conversation memory and hands each turn to a
//! [`engine::ReasoningEngine`]. The shipped engine drives an OpenAI-compatible
//! chat-completions endpoint through a tool loop with two stub tools, and asks
//! for a `{msg}` structured answer.
//!
//! ```no_run
//! use miki::prelude::*;
//!
//! # async fn example() -> miki::error::Result<()> {
//! let config = AppConfig::load(None)?;
//! let agent = Agent::from_config(&config.model)?;
//! let outcome = agent
//!     .invoke("req_1", "What's the weather like today?", &Context::new("req_1"))
//!     .await?;
//! println!("{:?}", outcome.answer_text());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod schema;
pub mod server;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
