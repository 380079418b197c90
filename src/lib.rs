//! Restage library
//!
//! Fetches a client's deployment history, stages the packages of a chosen
//! build and mirrors the staged tree over local installations.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;
