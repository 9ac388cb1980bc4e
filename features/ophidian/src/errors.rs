use std::sync::Arc;

use thiserror::Error;

use crate::{
    dependency_graph::DependencyGraphErrors,
    types::{DynError, Key, TypeInfo},
};

/// A key could not be resolved into an instance
///
/// Aborts the whole resolution; no partial instance is returned.
#[derive(Error, Debug, Clone)]
pub enum UnresolvableDependencyError {
    /// Nothing is registered for the key
    #[error("Failed to resolve unregistered '{key}'{}", required_by_suffix(.required_by))]
    NotFound {
        key: Key,
        required_by: Option<Key>,
    },
    /// The key is already being resolved further up the chain
    #[error("A Circular Dependency on '{key}' exists through [{}] - Consider using `Lazy`", format_chain(.chain))]
    Cyclic { key: Key, chain: Vec<Key> },
    /// The provider itself returned an error
    #[error("Provider for '{key}' failed - error: {error}")]
    ConstructionFailed { key: Key, error: Arc<DynError> },

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// A [crate::Lazy] was accessed after its container was dropped
    #[error("Container was dropped before '{0}' was resolved")]
    ContainerDropped(Key),
}

/// Cause of an [UnresolvableDependencyError], for callers branching on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvableReason {
    NotFound,
    Cyclic,
    ConstructionFailed,
    DowncastFailed,
    ContainerDropped,
}

impl UnresolvableDependencyError {
    pub fn reason(&self) -> UnresolvableReason {
        match self {
            Self::NotFound { .. } => UnresolvableReason::NotFound,
            Self::Cyclic { .. } => UnresolvableReason::Cyclic,
            Self::ConstructionFailed { .. } => UnresolvableReason::ConstructionFailed,
            Self::DowncastFailed { .. } => UnresolvableReason::DowncastFailed,
            Self::ContainerDropped(_) => UnresolvableReason::ContainerDropped,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.reason() == UnresolvableReason::NotFound
    }

    pub fn is_cyclic(&self) -> bool {
        self.reason() == UnresolvableReason::Cyclic
    }

    /// The key that failed, if the error concerns a single key
    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::NotFound { key, .. }
            | Self::Cyclic { key, .. }
            | Self::ConstructionFailed { key, .. }
            | Self::ContainerDropped(key) => Some(key),
            Self::DowncastFailed { .. } => None,
        }
    }

    /// Maps an error returned by a provider
    ///
    /// Resolution errors bubbling up through a factory are passed on unchanged,
    /// anything else means the factory itself failed.
    pub(crate) fn from_provider(key: &Key, error: DynError) -> Self {
        match error.downcast::<UnresolvableDependencyError>() {
            Ok(inner) => *inner,
            Err(error) => Self::ConstructionFailed {
                key: key.clone(),
                error: Arc::new(error),
            },
        }
    }
}

fn required_by_suffix(required_by: &Option<Key>) -> String {
    match required_by {
        Some(parent) => format!(" required by '{parent}'"),
        None => String::new(),
    }
}

pub(crate) fn format_chain(chain: &[Key]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors when trying to register a provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The key is already registered and the container rejects duplicates
    #[error("'{0}' is already registered")]
    AlreadyRegistered(Key),
    /// The provider does not supply the type of the key
    #[error("Provider for '{provided}' can not be registered as '{key}'")]
    TypeMismatch { key: Key, provided: TypeInfo },
}

/// Errors while building a container
#[derive(Error, Debug, Clone)]
pub enum BuildError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    /// There are issues with the dependency graph
    #[error(transparent)]
    Graph(#[from] DependencyGraphErrors),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("database offline")]
    struct Offline;

    #[test]
    fn provider_errors_are_wrapped() {
        let key = Key::of::<u8>();
        let err = UnresolvableDependencyError::from_provider(&key, Box::new(Offline));

        assert_eq!(err.reason(), UnresolvableReason::ConstructionFailed);
        assert_eq!(err.to_string(), "Provider for 'u8' failed - error: database offline");
    }

    #[test]
    fn resolution_errors_pass_through_providers() {
        let missing = UnresolvableDependencyError::NotFound {
            key: Key::of::<u16>(),
            required_by: Some(Key::of::<u8>()),
        };
        let err = UnresolvableDependencyError::from_provider(&Key::of::<u8>(), Box::new(missing));

        assert!(err.is_not_found());
        assert_eq!(err.key(), Some(&Key::of::<u16>()));
        assert_eq!(err.to_string(), "Failed to resolve unregistered 'u16' required by 'u8'");
    }

    #[test]
    fn cyclic_message_lists_chain() {
        let err = UnresolvableDependencyError::Cyclic {
            key: Key::of::<u8>(),
            chain: vec![Key::of::<u8>(), Key::named::<u16>("b"), Key::of::<u8>()],
        };
        assert!(err.is_cyclic());
        assert!(err.to_string().contains("[u8 -> b: u16 -> u8]"));
    }
}
