//! # Text Insight
//!
//! Structured analysis of free-form text: a title, a short summary, up to
//! three topics, a sentiment, up to three keywords and a confidence score.
//!
//! An external LLM (OpenAI chat completions) is asked first. When it is not
//! configured, rejects the key, is rate limited, times out, or answers with
//! something that fails validation, a deterministic offline analyzer produces
//! the result instead, marked `analysis_method = "mock"`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐
//! │   CLI    │──▶│ Orchestrator │──▶│   Upstream   │ (OpenAI)
//! │ (insight)│   │              │   └──────────────┘
//! └──────────┘   │              │   ┌──────────────┐
//! ┌──────────┐   │              │──▶│   Fallback   │ (lexicon + tagger)
//! │   HTTP   │──▶│              │   └──────────────┘
//! │  (axum)  │   └──────┬───────┘
//! └──────────┘          ▼
//!                 ┌──────────┐
//!                 │  SQLite  │
//!                 └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! insight init
//! insight analyze "The stock market crashed and investors are worried."
//! insight search --topic business
//! insight serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Analysis and upstream error taxonomy |
//! | [`text`] | Tokenizing, sentence splitting, truncation |
//! | [`lexicon`] | Topic, sentiment and stop-word lists |
//! | [`tagger`] | Part-of-speech tagging |
//! | [`fallback`] | Deterministic offline analyzer |
//! | [`upstream`] | External provider abstraction |
//! | [`orchestrator`] | Upstream-first pipeline with fallback |
//! | [`store`] | Persistence of analyses |
//! | [`server`] | HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema setup |

pub mod analyze_cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fallback;
pub mod get;
pub mod lexicon;
pub mod migrate;
pub mod models;
pub mod orchestrator;
pub mod search;
pub mod server;
pub mod store;
pub mod tagger;
pub mod text;
pub mod upstream;
