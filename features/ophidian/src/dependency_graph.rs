use std::{
    collections::{BTreeMap, HashSet},
    fmt,
};

use thiserror::Error;

use crate::{
    errors::format_chain,
    registration::Provider,
    types::{DependencyInfo, Key, TypeInfo},
};

/// Graph of all registrations
///
/// Used to check missing and circular dependencies up front and enables visualization of the container
pub struct DependencyGraph {
    map: BTreeMap<Key, DependencyGraphEntry>,
}
impl DependencyGraph {
    pub(crate) fn from_providers<'a>(providers: impl Iterator<Item = (&'a Key, &'a Provider)>) -> Self {
        let map = providers
            .map(|(key, provider)| {
                let entry = DependencyGraphEntry {
                    supplies: provider.supplies(),
                    dependencies: provider.dependencies(),
                };
                (key.clone(), entry)
            })
            .collect();

        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Declared dependencies of `key`, if registered
    pub fn dependencies_of(&self, key: &Key) -> Option<&[DependencyInfo]> {
        self.map.get(key).map(|entry| entry.dependencies.as_slice())
    }

    /// Keys depending directly on `key`
    pub fn dependents_of(&self, key: &Key) -> Vec<&Key> {
        self.map
            .iter()
            .filter(|(_, entry)| entry.dependencies.iter().any(|dep| &dep.key == key))
            .map(|(dependent, _)| dependent)
            .collect()
    }

    /// Validate the graph
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();
        for key in self.map.keys() {
            let mut dependency_chain = Vec::new();
            check_recurse(self, &mut checked, &mut errors, &mut dependency_chain, key);
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        return Ok(());

        fn check_recurse<'g>(
            graph: &'g DependencyGraph,
            checked: &mut HashSet<&'g Key>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<&'g Key>,
            key: &'g Key,
        ) {
            // Circular Dependency Check
            if let Some(start) = dependency_chain.iter().position(|k| *k == key) {
                let mut chain: Vec<Key> = dependency_chain[start..]
                    .iter()
                    .map(|k| (*k).clone())
                    .collect();
                let to = chain.last().cloned().unwrap_or_else(|| key.clone());
                chain.push(key.clone()); // Add current so chain is complete

                errors.push(DependencyGraphError::CircularDependency {
                    from: key.clone(),
                    to,
                    chain,
                });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(key) {
                return;
            };

            let Some(entry) = graph.map.get(key) else {
                return;
            };

            dependency_chain.push(key);

            for dependency in &entry.dependencies {
                if !graph.map.contains_key(&dependency.key) {
                    if !dependency.optional {
                        errors.push(DependencyGraphError::MissingDependency {
                            dependency: dependency.key.clone(),
                            required_by: key.clone(),
                        });
                    }

                    continue;
                }

                if dependency.lazy {
                    // Don't recurse, resolved after construction
                    continue;
                }

                check_recurse(graph, checked, errors, dependency_chain, &dependency.key);
            }

            dependency_chain.pop();
        }
    }
}
impl fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, entry) in &self.map {
            write!(f, "{key}")?;
            if entry.supplies.type_id != key.type_info.type_id {
                write!(f, " (supplied by {})", entry.supplies)?;
            }

            let dependencies: Vec<_> = entry
                .dependencies
                .iter()
                .map(|dependency| {
                    let mut label = dependency.key.to_string();
                    if dependency.lazy {
                        label.push_str(" [lazy]");
                    }
                    if dependency.optional {
                        label.push_str(" [optional]");
                    }
                    label
                })
                .collect();

            match dependencies.is_empty() {
                true => writeln!(f)?,
                false => writeln!(f, " -> {}", dependencies.join(", "))?,
            }
        }
        Ok(())
    }
}

struct DependencyGraphEntry {
    supplies: TypeInfo,
    dependencies: Vec<DependencyInfo>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency { dependency: Key, required_by: Key },
    #[error("A Circular Dependency exists between '{from}' and '{to}' through [{}] - Consider using `Lazy`", format_chain(.chain))]
    CircularDependency { from: Key, to: Key, chain: Vec<Key> },
}
impl fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}
