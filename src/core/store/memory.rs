//! In-memory parameter store.
//!
//! Backs unit and integration tests, and doubles as a scratch store for
//! embedding. Handles are cheap clones sharing one underlying map, so a
//! test can keep one end while the resolver owns the other; call counters
//! make batching and idempotence observable.
//!
//! Secret values are held in plaintext and come back in a deterministic
//! sealed form unless decryption is requested, mirroring how a remote
//! store returns ciphertext without a decrypt flag.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{Page, Store};
use crate::core::parameter::{Parameter, ParameterKind};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    kind: ParameterKind,
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, Entry>,
    get_calls: usize,
    list_calls: usize,
    get_many_calls: usize,
    last_get_many: Option<(Vec<String>, bool)>,
}

/// Shared-handle in-memory store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
    page_size: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::default())),
            page_size: 10,
        }
    }

    /// Override the listing page size to exercise pagination.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        assert!(page_size > 0);
        self.page_size = page_size;
        self
    }

    /// Seed an entry directly, bypassing call counters.
    pub fn insert(&self, fullpath: &str, value: &str, kind: ParameterKind) {
        self.inner.borrow_mut().entries.insert(
            fullpath.to_string(),
            Entry {
                value: value.to_string(),
                kind,
            },
        );
    }

    /// Sealed form of a secret read without decryption.
    pub fn sealed_value(fullpath: &str) -> String {
        format!("!sealed:{}", fullpath)
    }

    pub fn get_calls(&self) -> usize {
        self.inner.borrow().get_calls
    }

    pub fn list_calls(&self) -> usize {
        self.inner.borrow().list_calls
    }

    pub fn get_many_calls(&self) -> usize {
        self.inner.borrow().get_many_calls
    }

    /// Paths and decryption flag of the most recent batch fetch.
    pub fn last_get_many(&self) -> Option<(Vec<String>, bool)> {
        self.inner.borrow().last_get_many.clone()
    }

    fn to_parameter(fullpath: &str, entry: &Entry, with_decryption: bool) -> Parameter {
        let sealed = entry.kind.is_secure() && !with_decryption;
        let value = if sealed {
            Self::sealed_value(fullpath)
        } else {
            entry.value.clone()
        };
        Parameter {
            name: fullpath.to_string(),
            value,
            kind: entry.kind,
            decrypted: entry.kind.is_secure() && with_decryption,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get(&self, fullpath: &str, with_decryption: bool) -> Result<Parameter> {
        let mut inner = self.inner.borrow_mut();
        inner.get_calls += 1;
        let entry = inner
            .entries
            .get(fullpath)
            .ok_or_else(|| Error::NotFound(fullpath.to_string()))?;
        Ok(Self::to_parameter(fullpath, entry, with_decryption))
    }

    fn get_by_path(
        &self,
        prefix: &str,
        with_decryption: bool,
        token: Option<&str>,
    ) -> Result<Page> {
        let mut inner = self.inner.borrow_mut();
        inner.list_calls += 1;

        let start: usize = match token {
            Some(t) => t
                .parse()
                .map_err(|_| Error::Store(format!("bad continuation token: {}", t)))?,
            None => 0,
        };

        let matching: Vec<Parameter> = inner
            .entries
            .iter()
            .filter(|(path, _)| path.starts_with(prefix))
            .map(|(path, entry)| Self::to_parameter(path, entry, with_decryption))
            .collect();

        let page: Vec<Parameter> = matching
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        let next = start + page.len();
        let next_token = (next < matching.len()).then(|| next.to_string());

        Ok(Page {
            parameters: page,
            next_token,
        })
    }

    fn get_many(&self, fullpaths: &[String], with_decryption: bool) -> Result<Vec<Parameter>> {
        let mut inner = self.inner.borrow_mut();
        inner.get_many_calls += 1;
        inner.last_get_many = Some((fullpaths.to_vec(), with_decryption));

        Ok(fullpaths
            .iter()
            .filter_map(|path| {
                inner
                    .entries
                    .get(path)
                    .map(|entry| Self::to_parameter(path, entry, with_decryption))
            })
            .collect())
    }

    fn put(&self, fullpath: &str, value: &str, kind: ParameterKind) -> Result<()> {
        self.insert(fullpath, value, kind);
        Ok(())
    }

    fn delete(&self, fullpath: &str) -> Result<()> {
        self.inner
            .borrow_mut()
            .entries
            .remove(fullpath)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(fullpath.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert("/PJT/ENV/K1", "V1", ParameterKind::SecureString);
        store.insert("/PJT/ENV/K2", "V2", ParameterKind::String);
        store.insert("/OTHER/ENV/K3", "V3", ParameterKind::String);
        store
    }

    #[test]
    fn test_get_seals_secrets() {
        let store = seeded();
        let sealed = store.get("/PJT/ENV/K1", false).unwrap();
        assert_eq!(sealed.value, MemoryStore::sealed_value("/PJT/ENV/K1"));
        assert!(!sealed.decrypted);

        let plain = store.get("/PJT/ENV/K1", true).unwrap();
        assert_eq!(plain.value, "V1");
        assert!(plain.decrypted);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = seeded();
        assert!(matches!(
            store.get("/PJT/ENV/NOPE", false),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_listing_respects_prefix_and_paginates() {
        let store = MemoryStore::new().with_page_size(2);
        for i in 0..5 {
            store.insert(&format!("/P/E/K{}", i), "v", ParameterKind::String);
        }
        store.insert("/Q/E/OTHER", "v", ParameterKind::String);

        let mut collected = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0;
        loop {
            let page = store.get_by_path("/P/E/", false, token.as_deref()).unwrap();
            pages += 1;
            collected.extend(page.parameters.into_iter().map(|p| p.name));
            match page.next_token {
                Some(t) => token = Some(t),
                None => break,
            }
        }
        assert_eq!(pages, 3);
        assert_eq!(collected.len(), 5);
        assert!(collected.iter().all(|name| name.starts_with("/P/E/")));
    }

    #[test]
    fn test_get_many_skips_missing_and_records_request() {
        let store = seeded();
        let request = vec!["/PJT/ENV/K1".to_string(), "/PJT/ENV/GONE".to_string()];
        let found = store.get_many(&request, true).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "V1");
        assert_eq!(store.last_get_many(), Some((request, true)));
        assert_eq!(store.get_many_calls(), 1);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = seeded();
        store.delete("/PJT/ENV/K2").unwrap();
        assert!(matches!(
            store.delete("/PJT/ENV/K2"),
            Err(Error::NotFound(_))
        ));
    }
}
