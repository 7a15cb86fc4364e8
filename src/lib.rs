pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod login;
pub mod routing;
pub mod session;
