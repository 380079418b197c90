pub mod archive;
pub mod catalog;
pub mod config;
pub mod download;
pub mod feed;
pub mod mirror;
pub mod packages;
pub mod pool;
pub mod report;
pub mod settings;
