pub mod cli;
pub mod config;
pub mod error;
pub mod google;
pub mod lookup;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod scanner;
