//! Configuration loading

mod settings;

pub use settings::{ENV_CONFIG_PATH, SYSTEM_CONFIG, Settings, USER_CONFIG};
