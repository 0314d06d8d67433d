pub mod api;
pub mod build;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod inputs;
pub mod locate;
pub mod report;
pub mod runner;
pub mod testrun;
