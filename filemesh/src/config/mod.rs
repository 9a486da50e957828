//! Mesh configuration

pub mod logging_config;
pub mod mesh_config;
pub mod transfer_config;

pub use logging_config::LoggingConfig;
pub use mesh_config::{CONFIG_ENV_VAR, CONFIG_FILE_NAME, MeshConfig};
pub use transfer_config::TransferConfig;
