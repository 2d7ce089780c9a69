//! Error types for persistence, texture loading, and settings files.

/// Failures talking to the configuration store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The request never produced an HTTP response.
    #[error("store request failed: {0}")]
    Transport(String),

    /// The store answered with a non-success status.
    #[error("store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The store answered, but the payload was not a document we understand.
    #[error("malformed store response: {0}")]
    Malformed(String),
}

impl From<ureq::Error> for StorageError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|e| format!("unreadable body: {e}"));
                StorageError::Status { status, message }
            }
            ureq::Error::Transport(t) => StorageError::Transport(t.to_string()),
        }
    }
}

/// Failures fetching or decoding a surface texture. Never shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("texture cache I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when loading, saving, or parsing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),
}
