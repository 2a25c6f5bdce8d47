pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod proxy;
pub mod scanner;
pub mod session;
pub mod workflow;
