//! LLM wrapper for drug-name extraction and lifestyle advice.
//!
//! This crate talks to an OpenAI-compatible chat-completions endpoint and turns
//! the free-form answers into typed results. Every lenient parsing rule lives in
//! one adapter function per response kind; callers only ever see `DrugList` or
//! `RawLifestyleWarning` values, or an `ExtractionError`.

pub mod client;
pub mod extraction;
pub mod lifestyle;
pub mod prompts;

pub use client::*;
pub use extraction::*;
pub use lifestyle::*;
pub use prompts::*;
