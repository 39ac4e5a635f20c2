//! Core of the gorepl interactive Go environment.
//!
//! Input lines are buffered by an [`Accumulator`] until they form a complete
//! fragment; a [`Session`] classifies each fragment, stores declarations, and
//! renders a whole Go program that a [`Runner`] builds and executes.

pub mod accumulator;
pub mod classify;
pub mod complete;
pub mod error;
pub mod imports;
pub mod render;
pub mod runner;
pub mod session;

pub use accumulator::{Accumulator, LineOutcome};
pub use classify::{classify, Category};
pub use complete::CompletenessRule;
pub use error::{RunnerError, SynthError};
pub use imports::ImportMode;
pub use runner::{Execution, Runner};
pub use session::{Session, Store, Submission};
