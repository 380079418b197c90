pub mod config;
pub mod deployments;
pub mod fetch;
pub mod mirror;
pub mod run;
pub mod stage;
