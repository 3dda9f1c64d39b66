//! gamescout — board-game collection retrieval with LLM-backed
//! recommendations.
//!
//! The core is a single cooperative pipeline: fetch a user's collection
//! from the remote XML endpoint (with busy-retry and a shared key-value
//! cache), build a two-message prompt, request recommendations from an
//! OpenAI-compatible completion endpoint, and render the results with
//! cache-resolved images.

pub mod cache;
pub mod collection;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod recommend;
pub mod render;

pub use error::{Result, ScoutError};
