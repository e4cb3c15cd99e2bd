//! OCR adapter for the medication scanner.
//!
//! This crate does not run OCR itself. It turns the output of an external
//! OCR engine into [`Detection`]s and assembles the recognized-text string
//! that the matcher consumes.

pub mod detection;
pub mod engine;

pub use detection::*;
pub use engine::*;
