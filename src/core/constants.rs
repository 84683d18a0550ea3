//! Constants used throughout backstop.
//!
//! Centralizes magic strings and store limits.

/// Configuration file name (.backstop.toml).
pub const CONFIG_FILE: &str = ".backstop.toml";

/// Wildcard scope component meaning "global / any".
pub const WILDCARD: &str = "All";

/// Maximum number of fullpaths per batch get call.
///
/// Store-imposed limit; decrypt requests are chunked to this size.
pub const MAX_BATCH_GET: usize = 10;

/// Environment variable overriding the project name.
pub const PROJECT_VAR: &str = "BACKSTOP_PROJECT";

/// Environment variable selecting the environment scope.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Environment variable pointing at the file store document.
pub const STORE_VAR: &str = "BACKSTOP_STORE";

/// Environment scope used when nothing else is configured.
pub const DEFAULT_ENVIRONMENT: &str = "dev";
