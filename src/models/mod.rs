//! Data models.

pub mod config;
pub mod quality;
pub mod relocation;
pub mod webhook;
