//! Backstop - typed, cached parameter resolution with scope fallback.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── commands      # show / get / set / delete / path / completions
//! │   └── output        # colored terminal output helpers
//! └── core/             # Core library components
//!     ├── scope         # (project, environment) scopes and search paths
//!     ├── cache         # scope-wide cache: fullpath and short-name views
//!     ├── resolver      # the typed get_parameter engine
//!     ├── convert       # Cast/Value: bool, int, float, json, list
//!     ├── crypto        # age sealing for the file store
//!     ├── config        # .backstop.toml discovery
//!     └── store/        # Parameter store backends
//!         ├── mod       # Store trait
//!         ├── fs        # JSON-document file store
//!         └── memory    # in-memory store for tests and embedding
//! ```
//!
//! # Features
//!
//! - Project/environment scoping with `All` wildcard fallback
//! - Lazy scope-wide cache, rebuilt on demand
//! - Batched on-demand decryption of secret parameters
//! - Typed reads: string, bool, int, float, json, comma-separated list
//! - Extensible storage backends behind a small `Store` trait

pub mod cli;
pub mod core;
pub mod error;
