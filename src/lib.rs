pub mod cli;
pub mod config;
pub mod detect;
pub mod engine;
pub mod pipeline;
pub mod report;
pub mod util;
