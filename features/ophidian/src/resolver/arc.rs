use std::sync::Arc;

use crate::{
    context::ResolutionContext,
    errors::UnresolvableDependencyError,
    resolver::Resolver,
    types::{DependencyInfo, Injectable, Key},
};

impl<T: ?Sized + Injectable> Resolver for Arc<T> {
    fn resolve(ctx: &mut ResolutionContext<'_>) -> Result<Self, UnresolvableDependencyError> {
        ctx.require::<T>()
    }

    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo::required(Key::of::<T>())]
    }
}

/// Optional dependency
///
/// `None` if anything `Resolvable` asks for directly is not registered.
/// Errors further down the graph, e.g. a cycle or a failing factory, are still returned.
impl<Resolvable: Resolver> Resolver for Option<Resolvable> {
    fn resolve(ctx: &mut ResolutionContext<'_>) -> Result<Self, UnresolvableDependencyError> {
        let missing = Resolvable::dependencies()
            .into_iter()
            .find(|dependency| !dependency.optional && !ctx.is_registered(&dependency.key));

        if let Some(dependency) = missing {
            tracing::debug!("Optional dependency {} is not registered", dependency.key);
            return Ok(None);
        }

        Resolvable::resolve(ctx).map(Some)
    }

    fn dependencies() -> Vec<DependencyInfo> {
        Resolvable::dependencies()
            .into_iter()
            .map(|original| DependencyInfo {
                optional: true,
                ..original
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Container, Lifetime};

    #[derive(Debug)]
    struct Database;
    #[derive(Debug)]
    struct Cache {
        _database: Arc<Database>,
    }

    #[test_log::test]
    fn option_is_none_when_unregistered() {
        let container = Container::new();
        let cache = container.resolve::<Option<Arc<Cache>>>().unwrap();
        assert!(cache.is_none());
    }

    #[test_log::test]
    fn option_falls_back_to_a_default_value() {
        struct Server {
            port: u16,
        }

        let container = Container::new();
        container
            .register_factory(Lifetime::Transient, |port: Option<Arc<u16>>| Server {
                port: port.map_or(8080, |port| *port),
            })
            .unwrap();
        assert_eq!(container.require::<Server>().unwrap().port, 8080);

        container.register_instance(9000_u16).unwrap();
        assert_eq!(container.require::<Server>().unwrap().port, 9000);
    }

    #[test_log::test]
    fn option_keeps_errors_below_the_requested_key() {
        let container = Container::new();
        container
            .register_factory(Lifetime::Transient, |database: Arc<Database>| Cache {
                _database: database,
            })
            .unwrap();

        let err = container.resolve::<Option<Arc<Cache>>>().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.key(), Some(&Key::of::<Database>()));
    }

    #[test_log::test]
    fn option_is_some_when_registered() {
        let container = Container::new();
        container.register_instance(Database).unwrap();
        assert!(container.resolve::<Option<Arc<Database>>>().unwrap().is_some());
    }

    #[test]
    fn option_marks_dependencies_optional() {
        let dependencies = <Option<(Arc<Database>, Arc<Cache>)>>::dependencies();
        assert_eq!(dependencies.len(), 2);
        assert!(dependencies.iter().all(|dependency| dependency.optional));
    }
}
