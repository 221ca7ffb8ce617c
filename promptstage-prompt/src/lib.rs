// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Promptstage Prompt
//!
//! The deterministic prompt compiler. Turns a base prompt plus
//! [`StructuredSettings`](promptstage_core::StructuredSettings) into a single
//! prose prompt tailored to one provider.
//!
//! Compilation is pure: no I/O, no clock, no randomness. The same inputs
//! always produce byte-identical output, and a settings field left at its
//! default contributes no text at all.
//!
//! ## Key Types
//!
//! - [`CompiledPrompt`] - The compiler's output: final text, the names of the
//!   clauses that fired, and an estimated token count
//! - [`ClauseRule`] - One (name, predicate, renderer) entry in the fixed-order
//!   rule table
//! - [`compile`] - The single entry point

pub mod compiler;
pub mod phrases;

pub use compiler::{ClauseContext, ClauseRule, CompiledPrompt, compile};
