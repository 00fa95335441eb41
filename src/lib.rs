//! Combiner Library
//!
//! Moves finished 4K downloads into the main movie library, adding
//! Plex-style quality suffixes so both versions group under one title.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod server;
pub mod services;
pub mod utils;

pub use error::{Error, ErrorKind, Result};
