pub mod api;
pub mod core;
pub mod error;
pub mod models;
pub mod settings;
pub mod storage;

pub use crate::core::provider::{config_value, ConfigProvider};
pub use crate::core::{CacheState, RefreshOutcome, UiConfigCache};
pub use crate::error::{Result, UiConfigError};
