//! Scope-wide parameter cache.
//!
//! Built in one pass from a raw listing walked least-specific scope first.
//! Two derived views share the pass: `lookup` owns every entry keyed by
//! fullpath, `names` maps each short logical name to the fullpath that won
//! it. Because more specific scopes are listed later, a later entry simply
//! overwrites an earlier short-name claim.

use std::collections::BTreeMap;

use crate::core::parameter::Parameter;
use crate::core::scope::short_name;

/// All parameters visible to one (project, environment) scope.
///
/// Invariants: every `names` target is a `lookup` key, and
/// `lookup[p].name == p`. An entry's `decrypted` flag is only ever set,
/// never cleared, for the lifetime of the cache.
#[derive(Debug, Default)]
pub struct ScopeCache {
    lookup: BTreeMap<String, Parameter>,
    names: BTreeMap<String, String>,
}

impl ScopeCache {
    /// Build both views from a raw listing, in listing order.
    pub fn build(parameters: Vec<Parameter>) -> Self {
        let mut cache = Self::default();
        for parameter in parameters {
            cache.insert(parameter);
        }
        cache
    }

    /// Fullpath → parameter view.
    pub fn lookup(&self) -> &BTreeMap<String, Parameter> {
        &self.lookup
    }

    /// Short name → fullpath view (most specific scope wins).
    pub fn names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    pub fn get(&self, fullpath: &str) -> Option<&Parameter> {
        self.lookup.get(fullpath)
    }

    pub fn get_mut(&mut self, fullpath: &str) -> Option<&mut Parameter> {
        self.lookup.get_mut(fullpath)
    }

    /// Fullpath a short name resolves to, if known.
    pub fn resolve(&self, name: &str) -> Option<&String> {
        self.names.get(name)
    }

    pub fn contains(&self, fullpath: &str) -> bool {
        self.lookup.contains_key(fullpath)
    }

    /// Add an entry to both views; the short name now points here.
    pub fn insert(&mut self, parameter: Parameter) {
        self.names
            .insert(short_name(&parameter.name), parameter.name.clone());
        self.lookup.insert(parameter.name.clone(), parameter);
    }

    /// Drop an entry from both views.
    ///
    /// The short name is removed only if it still targets this fullpath; a
    /// shadowed more-global entry reappears on the next refresh rather
    /// than being guessed at here.
    pub fn remove(&mut self, fullpath: &str) {
        self.lookup.remove(fullpath);
        let name = short_name(fullpath);
        if self.names.get(&name).is_some_and(|target| target == fullpath) {
            self.names.remove(&name);
        }
    }

    /// Short name → fullpath for every secret entry not yet decrypted.
    pub fn still_encrypted(&self) -> BTreeMap<String, String> {
        self.names
            .iter()
            .filter(|(_, fullpath)| {
                self.lookup
                    .get(*fullpath)
                    .is_some_and(Parameter::still_encrypted)
            })
            .map(|(name, fullpath)| (name.clone(), fullpath.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parameter::ParameterKind;

    fn listing() -> Vec<Parameter> {
        vec![
            Parameter::new("/All/All/K3", "V3", ParameterKind::String),
            Parameter::new("/All/ENV/K1", "global", ParameterKind::String),
            Parameter::new("/PJT/All/K2", "V2", ParameterKind::String),
            Parameter::new("/PJT/ENV/K1", "sealed", ParameterKind::SecureString),
        ]
    }

    #[test]
    fn test_more_specific_scope_wins_short_name() {
        let cache = ScopeCache::build(listing());
        assert_eq!(cache.resolve("K1").unwrap(), "/PJT/ENV/K1");
        assert_eq!(cache.resolve("K2").unwrap(), "/PJT/All/K2");
        assert_eq!(cache.resolve("K3").unwrap(), "/All/All/K3");
        // Both fullpaths stay addressable.
        assert!(cache.contains("/All/ENV/K1"));
        assert!(cache.contains("/PJT/ENV/K1"));
    }

    #[test]
    fn test_names_targets_exist_in_lookup() {
        let cache = ScopeCache::build(listing());
        for (name, fullpath) in cache.names() {
            let parameter = cache.get(fullpath).unwrap();
            assert_eq!(&parameter.name, fullpath, "{}", name);
        }
    }

    #[test]
    fn test_still_encrypted() {
        let cache = ScopeCache::build(listing());
        let pending = cache.still_encrypted();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.get("K1").unwrap(), "/PJT/ENV/K1");
    }

    #[test]
    fn test_collision_across_depths_resolved_by_listing_order() {
        // Two fullpaths of different depth sharing a trailing segment:
        // listing order alone decides the winner.
        let cache = ScopeCache::build(vec![
            Parameter::new("/All/All/db/host", "global", ParameterKind::String),
            Parameter::new("/PJT/ENV/db/host", "specific", ParameterKind::String),
        ]);
        assert_eq!(cache.resolve("db/host").unwrap(), "/PJT/ENV/db/host");
    }

    #[test]
    fn test_remove_only_drops_owning_short_name() {
        let mut cache = ScopeCache::build(listing());
        cache.remove("/All/ENV/K1");
        // K1 still points at the specific entry.
        assert_eq!(cache.resolve("K1").unwrap(), "/PJT/ENV/K1");

        cache.remove("/PJT/ENV/K1");
        assert!(cache.resolve("K1").is_none());
        assert!(!cache.contains("/PJT/ENV/K1"));
    }
}
