#![deny(unused_must_use)]

pub mod app;
pub mod errors;
pub mod generate;
pub mod meta;
pub mod model;
pub mod parse;

pub use errors::{Error, Result};
