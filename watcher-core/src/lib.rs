pub mod balance;
pub mod classifier;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod orchestrator;
pub mod rpc;
pub mod watch;
