use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Store-level miss for a single fullpath. Absorbed during candidate
    /// search; callers only see it from direct store access.
    #[error("no parameter at {0}")]
    NotFound(String),

    /// Core-level miss: every candidate in the search path was exhausted.
    #[error("parameter not found: {key} (searched: {searched:?})")]
    ParameterNotFound { key: String, searched: Vec<String> },

    #[error("invalid integer value: {0}")]
    InvalidInt(#[from] std::num::ParseIntError),

    #[error("invalid float value: {0}")]
    InvalidFloat(#[from] std::num::ParseFloatError),

    #[error("invalid json value: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Transport or backend failure. Never retried here.
    #[error("store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("no config file found: create .backstop.toml or pass --project")]
    NoConfig,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
