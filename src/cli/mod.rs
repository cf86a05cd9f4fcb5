//! Command-line interface

mod args;
pub mod logging;

pub use args::{Args, SubCommand};
