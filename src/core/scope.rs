//! Scope and search-path resolution.
//!
//! A scope is a (project, environment) pair; the literal `All` is a
//! wildcard for either component. Two orderings matter and they are
//! opposites: bulk listing walks scopes least-specific first so that more
//! specific entries overwrite short-name collisions during the cache build,
//! while single-key lookup probes candidates most-specific first and stops
//! at the first hit.

use crate::core::constants::WILDCARD;

/// A (project, environment) parameter namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub project: String,
    pub environment: String,
}

impl Scope {
    pub fn new(project: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            environment: environment.into(),
        }
    }

    /// Candidates for one scope component, most specific first.
    ///
    /// `[component, All]`, collapsing to `[All]` when the component is
    /// itself the wildcard.
    fn candidates(component: &str) -> Vec<&str> {
        if component == WILDCARD {
            vec![WILDCARD]
        } else {
            vec![component, WILDCARD]
        }
    }

    /// Listing prefixes for the bulk fetch, least-specific first.
    ///
    /// For (P, E) both concrete: `/All/All/`, `/All/E/`, `/P/All/`,
    /// `/P/E/`. Wildcard components collapse the corresponding axis.
    pub fn search_path(&self) -> Vec<String> {
        let mut prefixes = Vec::new();
        for project in Self::candidates(&self.project).iter().rev() {
            for environment in Self::candidates(&self.environment).iter().rev() {
                prefixes.push(format!("/{}/{}/", project, environment));
            }
        }
        prefixes
    }

    /// Candidate fullpaths for a single key, most specific first.
    ///
    /// The supplied key may already carry scope segments (split on `/`,
    /// at most three parts, the rightmost part is the key's own sub-path):
    /// three segments pin the exact path, two fix the environment and vary
    /// the project, one varies both axes.
    pub fn parameter_search_path(&self, key: &str) -> Vec<String> {
        let trimmed = key.strip_prefix('/').unwrap_or(key);
        let parts: Vec<&str> = trimmed.splitn(3, '/').collect();

        match parts.as_slice() {
            [project, environment, key] => {
                vec![format!("/{}/{}/{}", project, environment, key)]
            }
            [environment, key] => Self::candidates(&self.project)
                .iter()
                .map(|project| format!("/{}/{}/{}", project, environment, key))
                .collect(),
            [key] => {
                let mut paths = Vec::new();
                for project in Self::candidates(&self.project) {
                    for environment in Self::candidates(&self.environment) {
                        paths.push(format!("/{}/{}/{}", project, environment, key));
                    }
                }
                paths
            }
            _ => Vec::new(),
        }
    }

    /// Normalize a possibly-partial key against this scope.
    ///
    /// The result is the most specific candidate of
    /// [`parameter_search_path`](Self::parameter_search_path).
    pub fn full_path(&self, key: &str) -> String {
        self.parameter_search_path(key)
            .into_iter()
            .next()
            .unwrap_or_else(|| format!("/{}/{}/", self.project, self.environment))
    }

    /// Prefix of this scope's own namespace, e.g. `/P/E/`.
    pub fn prefix(&self) -> String {
        format!("/{}/{}/", self.project, self.environment)
    }
}

/// Short logical name of a fullpath: everything after the project and
/// environment segments. Paths with fewer than three segments degrade to
/// their last segment.
pub fn short_name(fullpath: &str) -> String {
    let trimmed = fullpath.strip_prefix('/').unwrap_or(fullpath);
    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.len() >= 3 {
        parts[2..].join("/")
    } else {
        parts.last().copied().unwrap_or_default().to_string()
    }
}
