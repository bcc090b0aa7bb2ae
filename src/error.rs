#[derive(Debug, thiserror::Error)]
pub enum UiConfigError {
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("config not available")]
    ConfigUnavailable,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("settings error: {0}")]
    SettingsError(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UiConfigError>;
