//! Parameter store abstraction.
//!
//! The resolver never talks to a concrete backend directly; it consumes
//! this trait. Listing is paginated through continuation tokens, batch
//! reads carry the store's own size limit (callers chunk to
//! [`MAX_BATCH_GET`](crate::core::constants::MAX_BATCH_GET)).
//!
//! ## Adding a new backend
//!
//! 1. Implement the `Store` trait
//! 2. Add the implementation in a new file (e.g., `ssm.rs`, `etcd.rs`)
//! 3. Re-export from this module
//!
//! All calls are blocking round trips; timeouts and retries belong to the
//! backend, not to this layer.

use crate::core::parameter::{Parameter, ParameterKind};
use crate::error::Result;

mod fs;
mod memory;

pub use fs::FileStore;
pub use memory::MemoryStore;

/// One page of a prefix listing.
#[derive(Debug, Default)]
pub struct Page {
    pub parameters: Vec<Parameter>,
    /// Opaque continuation token; `None` means the listing is exhausted.
    pub next_token: Option<String>,
}

/// Abstract parameter store capability.
pub trait Store {
    /// Fetch a single parameter by fullpath.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::error::Error::NotFound) if no
    /// parameter exists at `fullpath`.
    fn get(&self, fullpath: &str, with_decryption: bool) -> Result<Parameter>;

    /// Fetch one page of parameters under a scope prefix, recursively.
    fn get_by_path(
        &self,
        prefix: &str,
        with_decryption: bool,
        token: Option<&str>,
    ) -> Result<Page>;

    /// Batch fetch. Paths without a stored parameter are silently skipped;
    /// callers must respect the store's batch size limit.
    fn get_many(&self, fullpaths: &[String], with_decryption: bool) -> Result<Vec<Parameter>>;

    /// Create or overwrite a parameter.
    fn put(&self, fullpath: &str, value: &str, kind: ParameterKind) -> Result<()>;

    /// Delete a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::error::Error::NotFound) if no
    /// parameter exists at `fullpath`.
    fn delete(&self, fullpath: &str) -> Result<()>;
}
