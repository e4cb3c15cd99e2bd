//! Domain models for the medication scanner.

mod interaction;
mod matching;
mod medication;

pub use interaction::*;
pub use matching::*;
pub use medication::*;
