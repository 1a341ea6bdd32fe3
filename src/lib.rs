#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

pub mod command;
mod error;
pub mod logging;
pub mod options;
pub mod output;
pub mod script;
pub mod unit;

pub use error::Error;
pub use options::{DEFAULT_SEPARATOR, UnitOption, merge_options};
pub use output::Output;
pub use script::Script;
pub use unit::{Entry, Section, UnitFile, Value};
