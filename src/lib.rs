//! # ragtour
//!
//! An interactive, step-by-step RAG walkthrough for the terminal.
//!
//! ## Overview
//!
//! ragtour renders an ordered sequence of tutorial steps. Every step shows an
//! explanation and a read-only code sample; flipping the step's toggle runs
//! the same operation live against real collaborators (an LLM completion
//! endpoint, a cloud document parser, a local vector index persisted to disk)
//! and prints the raw result inline.
//!
//! ## Architecture
//!
//! - `tutorial` - the runner: steps, trigger state, display surfaces
//! - `steps` - the seven walkthrough steps and the collaborator toolbox
//! - `llm` - completion client and prompt templates
//! - `data` - document model, loaders, and chunking
//! - `index` - embedding and the persistable vector index
//! - `parse` - structured document parsing service client
//! - `cli` - non-interactive render passes
//! - `tui` - interactive ratatui front end

pub mod cli;
pub mod config;
pub mod data;
pub mod index;
pub mod llm;
pub mod parse;
pub mod steps;
pub mod tui;
pub mod tutorial;

// Re-export commonly used types
pub use anyhow::{Error, Result};
