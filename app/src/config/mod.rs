//! Runtime configuration: environment loading and value validation.

pub mod app_config;
pub mod validation;

pub use app_config::AppConfig;
