//! Parameter resolution engine.
//!
//! Combines the scope search path, the lazily-built cache, batched
//! on-demand decryption and the cast layer behind one typed `get` surface.
//! Single-threaded by construction: the resolver owns its cache and every
//! cache-touching method takes `&mut self`, so there is no locking and no
//! background refresh.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::core::cache::ScopeCache;
use crate::core::constants::MAX_BATCH_GET;
use crate::core::convert::{parse_bool, parse_list, Cast, Value};
use crate::core::parameter::{Parameter, ParameterKind};
use crate::core::scope::Scope;
use crate::core::store::Store;
use crate::error::{Error, Result};

/// One `{name, value}` row of a bulk listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamEntry {
    pub name: String,
    pub value: String,
}

/// Typed, cached resolution over an abstract parameter store.
pub struct Resolver {
    scope: Scope,
    store: Box<dyn Store>,
    cache: Option<ScopeCache>,
}

impl Resolver {
    pub fn new(
        project: impl Into<String>,
        environment: impl Into<String>,
        store: Box<dyn Store>,
    ) -> Self {
        Self {
            scope: Scope::new(project, environment),
            store,
            cache: None,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Normalize a possibly-partial key against this resolver's scope.
    pub fn full_path(&self, key: &str) -> String {
        self.scope.full_path(key)
    }

    /// Candidate fullpaths for a key, most specific first.
    pub fn parameter_search_path(&self, key: &str) -> Vec<String> {
        self.scope.parameter_search_path(key)
    }

    /// Listing prefixes for this scope, least specific first.
    pub fn search_path(&self) -> Vec<String> {
        self.scope.search_path()
    }

    /// Force a cache rebuild from the store.
    pub fn refresh(&mut self) -> Result<()> {
        let parameters = fetch_all(self.store.as_ref(), &self.scope)?;
        self.cache = Some(ScopeCache::build(parameters));
        Ok(())
    }

    /// Populate-on-first-access cache accessor.
    fn cache_mut(&mut self) -> Result<&mut ScopeCache> {
        if self.cache.is_none() {
            self.refresh()?;
        }
        match self.cache.as_mut() {
            Some(cache) => Ok(cache),
            None => Err(Error::Store("cache initialization failed".into())),
        }
    }

    /// Short name → fullpath for every known parameter, most specific
    /// scope winning collisions.
    pub fn names(&mut self) -> Result<BTreeMap<String, String>> {
        Ok(self.cache_mut()?.names().clone())
    }

    /// Short name → fullpath for every secret not yet decrypted.
    pub fn still_encrypted(&mut self) -> Result<BTreeMap<String, String>> {
        Ok(self.cache_mut()?.still_encrypted())
    }

    /// Whether a parameter's kind is secret.
    ///
    /// `key` may be a short name or a fullpath.
    pub fn is_encrypted(&mut self, key: &str) -> Result<bool> {
        let cache = self.cache_mut()?;
        let fullpath = match cache.resolve(key) {
            Some(fullpath) => fullpath.clone(),
            None => key.to_string(),
        };
        let parameter = cache
            .get(&fullpath)
            .ok_or_else(|| Error::NotFound(fullpath.clone()))?;
        Ok(parameter.kind.is_secure())
    }

    /// Decrypt a selection of parameters, by short name or fullpath.
    ///
    /// Returns the number of entries actually decrypted. Already-decrypted
    /// entries are excluded from the pending set, so repeating the call is
    /// a no-op that issues no store traffic.
    pub fn decrypt(&mut self, keys: &[&str]) -> Result<usize> {
        let targets: Vec<String> = {
            let cache = self.cache_mut()?;
            keys.iter()
                .map(|key| match cache.resolve(key) {
                    Some(fullpath) => fullpath.clone(),
                    None => key.to_string(),
                })
                .collect()
        };
        self.decrypt_paths(&targets)
    }

    /// Decrypt every pending secret in the cache.
    pub fn decrypt_all(&mut self) -> Result<usize> {
        let targets: Vec<String> = self
            .cache_mut()?
            .names()
            .values()
            .cloned()
            .collect();
        self.decrypt_paths(&targets)
    }

    /// Batched in-place decryption of still-encrypted cache entries.
    fn decrypt_paths(&mut self, targets: &[String]) -> Result<usize> {
        let mut pending: Vec<String> = Vec::new();
        {
            let cache = self.cache_mut()?;
            for fullpath in targets {
                if pending.contains(fullpath) {
                    continue;
                }
                if cache.get(fullpath).is_some_and(Parameter::still_encrypted) {
                    pending.push(fullpath.clone());
                }
            }
        }

        if pending.is_empty() {
            return Ok(0);
        }
        debug!(count = pending.len(), "decrypting parameters");

        for chunk in pending.chunks(MAX_BATCH_GET) {
            let fetched = self.store.get_many(chunk, true)?;
            let cache = match self.cache.as_mut() {
                Some(cache) => cache,
                None => return Err(Error::Store("cache initialization failed".into())),
            };
            for parameter in fetched {
                if let Some(entry) = cache.get_mut(&parameter.name) {
                    entry.value = parameter.value;
                    entry.decrypted = true;
                }
            }
        }

        Ok(pending.len())
    }

    /// Candidate fullpaths for a lookup: a known short name pins its
    /// mapped fullpath, a known fullpath pins itself, anything else walks
    /// the scope search path.
    fn candidates(&mut self, key: &str) -> Result<Vec<String>> {
        let cache = self.cache_mut()?;
        if let Some(fullpath) = cache.resolve(key) {
            return Ok(vec![fullpath.clone()]);
        }
        if cache.contains(key) {
            return Ok(vec![key.to_string()]);
        }
        Ok(self.scope.parameter_search_path(key))
    }

    /// Resolve a key to its `(fullpath, raw value)` pair.
    ///
    /// First cache hit wins; only when no candidate is cached does the
    /// store get probed, one candidate at a time, the first success being
    /// appended to the cache for future lookups.
    ///
    /// # Errors
    ///
    /// [`Error::ParameterNotFound`] with the attempted search path once
    /// every candidate is exhausted. Transport errors propagate as-is.
    pub fn get_entry(&mut self, key: &str, decrypt: bool) -> Result<(String, String)> {
        let candidates = self.candidates(key)?;

        for fullpath in &candidates {
            let cached = self.cache_mut()?.get(fullpath).is_some();
            if cached {
                if decrypt {
                    self.decrypt_paths(std::slice::from_ref(fullpath))?;
                }
                let cache = self.cache_mut()?;
                if let Some(parameter) = cache.get(fullpath) {
                    return Ok((fullpath.clone(), parameter.value.clone()));
                }
            }
        }

        for fullpath in &candidates {
            debug!(path = %fullpath, "cache miss, probing store");
            match self.store.get(fullpath, decrypt) {
                Ok(parameter) => {
                    let value = parameter.value.clone();
                    self.cache_mut()?.insert(parameter);
                    return Ok((fullpath.clone(), value));
                }
                Err(Error::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(Error::ParameterNotFound {
            key: key.to_string(),
            searched: candidates,
        })
    }

    /// Resolve and convert a parameter value.
    pub fn get(&mut self, key: &str, cast: Cast, decrypt: bool) -> Result<Value> {
        let (_, raw) = self.get_entry(key, decrypt)?;
        cast.apply(&raw)
    }

    /// Like [`get`](Self::get), returning `None` instead of failing when
    /// no candidate resolves. Conversion and transport errors still
    /// propagate.
    pub fn get_opt(&mut self, key: &str, cast: Cast, decrypt: bool) -> Result<Option<Value>> {
        match self.get_entry(key, decrypt) {
            Ok((_, raw)) => cast.apply(&raw).map(Some),
            Err(Error::ParameterNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Like [`get`](Self::get), substituting `default` when no candidate
    /// resolves.
    pub fn get_or(&mut self, key: &str, cast: Cast, decrypt: bool, default: Value) -> Result<Value> {
        Ok(self.get_opt(key, cast, decrypt)?.unwrap_or(default))
    }

    /// Escape hatch: resolve a raw value and hand it to a caller-supplied
    /// converter.
    pub fn get_with<T>(
        &mut self,
        key: &str,
        decrypt: bool,
        convert: impl FnOnce(&str) -> Result<T>,
    ) -> Result<T> {
        let (_, raw) = self.get_entry(key, decrypt)?;
        convert(&raw)
    }

    pub fn get_string(&mut self, key: &str, decrypt: bool) -> Result<String> {
        let (_, raw) = self.get_entry(key, decrypt)?;
        Ok(raw)
    }

    pub fn get_bool(&mut self, key: &str, decrypt: bool) -> Result<bool> {
        let (_, raw) = self.get_entry(key, decrypt)?;
        Ok(parse_bool(&raw))
    }

    pub fn get_int(&mut self, key: &str, decrypt: bool) -> Result<i64> {
        let (_, raw) = self.get_entry(key, decrypt)?;
        Ok(raw.parse::<i64>()?)
    }

    pub fn get_float(&mut self, key: &str, decrypt: bool) -> Result<f64> {
        let (_, raw) = self.get_entry(key, decrypt)?;
        Ok(raw.parse::<f64>()?)
    }

    pub fn get_json(&mut self, key: &str, decrypt: bool) -> Result<serde_json::Value> {
        let (_, raw) = self.get_entry(key, decrypt)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn get_list(&mut self, key: &str, decrypt: bool) -> Result<Vec<String>> {
        let (_, raw) = self.get_entry(key, decrypt)?;
        Ok(parse_list(&raw))
    }

    /// Every `{name, value}` pair known to the deduplicated short-name
    /// view, optionally decrypting pending secrets first.
    ///
    /// Sorted order puts entries of this resolver's own scope before more
    /// global ones (own project, then own environment), alphabetically by
    /// trailing path within a tier.
    pub fn get_all_parameters(&mut self, decrypt: bool, sorted: bool) -> Result<Vec<ParamEntry>> {
        if decrypt {
            self.decrypt_all()?;
        }
        let project = self.scope.project.clone();
        let environment = self.scope.environment.clone();

        let cache = self.cache_mut()?;
        let mut entries: Vec<ParamEntry> = cache
            .names()
            .values()
            .filter_map(|fullpath| cache.get(fullpath))
            .map(|parameter| ParamEntry {
                name: parameter.name.clone(),
                value: parameter.value.clone(),
            })
            .collect();

        if sorted {
            entries.sort_by_cached_key(|entry| specificity_key(&entry.name, &project, &environment));
        }
        Ok(entries)
    }

    /// Write a parameter through to the store and update the local view.
    pub fn set_parameter(&mut self, key: &str, value: &str, kind: ParameterKind) -> Result<()> {
        let fullpath = self.full_path(key);
        debug!(path = %fullpath, kind = %kind, "putting parameter");
        self.store.put(&fullpath, value, kind)?;

        if let Some(cache) = self.cache.as_mut() {
            cache.insert(Parameter {
                name: fullpath,
                value: value.to_string(),
                kind,
                decrypted: kind.is_secure(),
            });
        }
        Ok(())
    }

    /// Delete a parameter from the store and drop it from the local view.
    pub fn delete_parameter(&mut self, key: &str) -> Result<()> {
        let fullpath = self.full_path(key);
        debug!(path = %fullpath, "deleting parameter");
        self.store.delete(&fullpath)?;

        if let Some(cache) = self.cache.as_mut() {
            cache.remove(&fullpath);
        }
        Ok(())
    }
}

/// Sort key for bulk listings: own scope sorts first on both axes, then
/// the trailing path decides within a tier.
fn specificity_key(fullpath: &str, project: &str, environment: &str) -> (bool, bool, String) {
    let trimmed = fullpath.strip_prefix('/').unwrap_or(fullpath);
    let parts: Vec<&str> = trimmed.split('/').collect();
    let (entry_project, entry_environment, rest) = if parts.len() >= 3 {
        (parts[0], parts[1], parts[2..].join("/"))
    } else {
        ("", "", trimmed.to_string())
    };
    (
        entry_project != project,
        entry_environment != environment,
        rest,
    )
}

/// Walk every scope in the search path, least specific first, following
/// continuation tokens until each listing is exhausted. The single
/// aggregation point for listing traffic.
fn fetch_all(store: &dyn Store, scope: &Scope) -> Result<Vec<Parameter>> {
    debug!(project = %scope.project, environment = %scope.environment, "refreshing scope cache");
    let mut parameters = Vec::new();
    for prefix in scope.search_path() {
        let mut token: Option<String> = None;
        loop {
            let page = store.get_by_path(&prefix, false, token.as_deref())?;
            parameters.extend(page.parameters);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
    }
    debug!(count = parameters.len(), "scope cache fetched");
    Ok(parameters)
}
