//! JSON-file-backed parameter store.
//!
//! A single-document local backend for development and the CLI. The
//! document owns an age identity; `SecureString` values are stored as
//! armored ciphertext and that armor is exactly what an undecrypted read
//! returns. The key living next to the data mirrors a remote store that
//! holds its own KMS keys server-side; this backend is for local use, not
//! multi-process access.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use age::secrecy::ExposeSecret;
use age::x25519;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Page, Store};
use crate::core::crypto;
use crate::core::parameter::{Parameter, ParameterKind};
use crate::error::{Error, Result};

const LIST_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredParameter {
    value: String,
    kind: ParameterKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    identity: String,
    #[serde(default)]
    parameters: BTreeMap<String, StoredParameter>,
}

/// File-backed store; write-through on every mutation.
pub struct FileStore {
    path: PathBuf,
    identity: x25519::Identity,
    doc: RefCell<Document>,
}

impl FileStore {
    /// Open an existing store document, or create a fresh one (with a new
    /// identity) if `path` does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let doc = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)
                .map_err(|e| Error::Store(format!("malformed store document {}: {}", path.display(), e)))?
        } else {
            debug!(path = %path.display(), "creating store document");
            let identity = x25519::Identity::generate();
            let doc = Document {
                identity: identity.to_string().expose_secret().to_string(),
                parameters: BTreeMap::new(),
            };
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            write_document(&path, &doc)?;
            doc
        };

        let identity = crypto::parse_identity(&doc.identity)?;
        Ok(Self {
            path,
            identity,
            doc: RefCell::new(doc),
        })
    }

    fn save(&self) -> Result<()> {
        write_document(&self.path, &self.doc.borrow())
    }

    fn to_parameter(
        &self,
        fullpath: &str,
        stored: &StoredParameter,
        with_decryption: bool,
    ) -> Result<Parameter> {
        let decrypt = stored.kind.is_secure() && with_decryption;
        let value = if decrypt {
            crypto::unseal(&stored.value, &self.identity)?
        } else {
            stored.value.clone()
        };
        Ok(Parameter {
            name: fullpath.to_string(),
            value,
            kind: stored.kind,
            decrypted: decrypt,
        })
    }
}

fn write_document(path: &Path, doc: &Document) -> Result<()> {
    let contents = serde_json::to_string_pretty(doc)
        .map_err(|e| Error::Store(format!("serialize store document: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

impl Store for FileStore {
    fn get(&self, fullpath: &str, with_decryption: bool) -> Result<Parameter> {
        let doc = self.doc.borrow();
        let stored = doc
            .parameters
            .get(fullpath)
            .ok_or_else(|| Error::NotFound(fullpath.to_string()))?;
        self.to_parameter(fullpath, stored, with_decryption)
    }

    fn get_by_path(
        &self,
        prefix: &str,
        with_decryption: bool,
        token: Option<&str>,
    ) -> Result<Page> {
        let start: usize = match token {
            Some(t) => t
                .parse()
                .map_err(|_| Error::Store(format!("bad continuation token: {}", t)))?,
            None => 0,
        };

        let doc = self.doc.borrow();
        let matching: Vec<(&String, &StoredParameter)> = doc
            .parameters
            .iter()
            .filter(|(path, _)| path.starts_with(prefix))
            .collect();

        let parameters = matching
            .iter()
            .skip(start)
            .take(LIST_PAGE_SIZE)
            .map(|(path, stored)| self.to_parameter(path, stored, with_decryption))
            .collect::<Result<Vec<_>>>()?;
        let next = start + parameters.len();
        let next_token = (next < matching.len()).then(|| next.to_string());

        Ok(Page {
            parameters,
            next_token,
        })
    }

    fn get_many(&self, fullpaths: &[String], with_decryption: bool) -> Result<Vec<Parameter>> {
        let doc = self.doc.borrow();
        fullpaths
            .iter()
            .filter_map(|path| {
                doc.parameters
                    .get(path)
                    .map(|stored| self.to_parameter(path, stored, with_decryption))
            })
            .collect()
    }

    fn put(&self, fullpath: &str, value: &str, kind: ParameterKind) -> Result<()> {
        let value = if kind.is_secure() {
            crypto::seal(value, &self.identity.to_public())?
        } else {
            value.to_string()
        };
        self.doc.borrow_mut().parameters.insert(
            fullpath.to_string(),
            StoredParameter {
                value,
                kind,
            },
        );
        self.save()
    }

    fn delete(&self, fullpath: &str) -> Result<()> {
        self.doc
            .borrow_mut()
            .parameters
            .remove(fullpath)
            .ok_or_else(|| Error::NotFound(fullpath.to_string()))?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, FileStore) {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path().join("store.json")).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_put_get_plain() {
        let (_tmp, store) = open_temp();
        store.put("/P/E/K", "value", ParameterKind::String).unwrap();
        let param = store.get("/P/E/K", false).unwrap();
        assert_eq!(param.value, "value");
        assert!(!param.decrypted);
    }

    #[test]
    fn test_secret_sealed_at_rest() {
        let (_tmp, store) = open_temp();
        store
            .put("/P/E/SECRET", "hunter2", ParameterKind::SecureString)
            .unwrap();

        let sealed = store.get("/P/E/SECRET", false).unwrap();
        assert!(sealed.value.contains("BEGIN AGE ENCRYPTED FILE"));
        assert!(!sealed.decrypted);

        let plain = store.get("/P/E/SECRET", true).unwrap();
        assert_eq!(plain.value, "hunter2");
        assert!(plain.decrypted);
    }

    #[test]
    fn test_reopen_preserves_identity_and_data() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        {
            let store = FileStore::open(&path).unwrap();
            store
                .put("/P/E/SECRET", "hunter2", ParameterKind::SecureString)
                .unwrap();
        }
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("/P/E/SECRET", true).unwrap().value, "hunter2");
    }

    #[test]
    fn test_listing_paginates() {
        let (_tmp, store) = open_temp();
        for i in 0..25 {
            store
                .put(&format!("/P/E/K{:02}", i), "v", ParameterKind::String)
                .unwrap();
        }

        let first = store.get_by_path("/P/E/", false, None).unwrap();
        assert_eq!(first.parameters.len(), LIST_PAGE_SIZE);
        let token = first.next_token.unwrap();

        let mut total = first.parameters.len();
        let mut token = Some(token);
        while let Some(t) = token {
            let page = store.get_by_path("/P/E/", false, Some(&t)).unwrap();
            total += page.parameters.len();
            token = page.next_token;
        }
        assert_eq!(total, 25);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let (_tmp, store) = open_temp();
        assert!(matches!(
            store.delete("/P/E/NOPE"),
            Err(Error::NotFound(_))
        ));
    }
}
