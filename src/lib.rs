pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod fmt;
pub mod integration;
pub mod labeller;
pub mod version;
