//! Page Load Trace
//!
//! Page-load interactivity metrics from captured browser performance
//! traces: First Meaningful Paint anchoring, First CPU Idle and Time To
//! Interactive, bundled per navigation into a load expectation.
//!
//! This crate provides the core implementation for the
//! `page-trace` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! page-trace analyze --trace trace.json --summary
//! ```
//!
//! From code:
//!
//! ```ignore
//! use page_load_trace::loading::LoadExpectationEngine;
//! use page_load_trace::parser::parse_trace_file;
//! use page_load_trace::utils::AnalysisConfig;
//!
//! let model = parse_trace_file("trace.json")?;
//! let engine = LoadExpectationEngine::from_config(&AnalysisConfig::default());
//! for load in engine.collect(&model) {
//!     println!("{} interactive at {:?}", load.url, load.interactive_time);
//! }
//! ```

pub mod commands;
pub mod loading;
pub mod model;
pub mod output;
pub mod parser;
pub mod utils;
