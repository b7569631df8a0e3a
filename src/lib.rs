//! # Burn Highlighter
//!
//! Per-token syntax highlighting with learned sequence taggers, cross-validated over k folds.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Lexer token-type bindings and the highlighting taxonomy
pub mod oracle;

/// Model and oracle serving
pub mod service;

/// Utilities
pub mod utils;

/// CLI indexes and utilities
pub mod cli;

/// Error macros
#[macro_use]
extern crate anyhow;
