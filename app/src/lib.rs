pub mod app;
pub mod bootstrap;
pub mod config;
pub mod server;
pub mod services;

pub use bootstrap::{data_dir, init_foundation, init_tracing};
