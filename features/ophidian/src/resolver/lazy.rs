use std::{
    fmt::Debug,
    ops::Deref,
    sync::{Arc, OnceLock},
};

use crate::{
    container::WeakContainer,
    context::ResolutionContext,
    errors::UnresolvableDependencyError,
    resolver::Resolver,
    types::{DependencyInfo, Injectable, Key},
};

/// Lazily resolved dependency
///
/// The registration is checked when the owner is constructed, the instance itself is resolved on first access.
/// A dependency cycle can be broken by making one of its edges lazy.
///
/// The container is held weakly - a `Lazy` never keeps it alive.
///
/// Accessed while its owner is still being constructed, e.g. inside the owner's factory, it continues the owner's
/// resolution: a target depending on the owner fails with [UnresolvableDependencyError::Cyclic], and that failure is kept.
pub struct Lazy<T: ?Sized + Injectable>(Arc<LazyInner<T>>);
impl<T: ?Sized + Injectable + Debug> Debug for Lazy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.once.get() {
            Some(Ok(instance)) => f.debug_tuple("Lazy").field(instance).finish(),
            Some(Err(err)) => f.debug_tuple("Lazy").field(err).finish(),
            None => f.debug_tuple("Lazy").field(&"<unresolved>").finish(),
        }
    }
}
impl<T: ?Sized + Injectable> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
struct LazyInner<T: ?Sized + Injectable> {
    container: WeakContainer,
    key: Key,
    once: OnceLock<Result<Arc<T>, UnresolvableDependencyError>>,
}
impl<T: ?Sized + Injectable> Deref for Lazy<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Self::Target {
        self.get()
    }
}
impl<T: ?Sized + Injectable> Resolver for Lazy<T> {
    fn resolve(ctx: &mut ResolutionContext<'_>) -> Result<Self, UnresolvableDependencyError> {
        let key = Key::of::<T>();

        // Fail early if it can never be resolved
        if !ctx.is_registered(&key) {
            return Err(UnresolvableDependencyError::NotFound {
                key,
                required_by: ctx.chain().last().cloned(),
            });
        }

        Ok(Lazy(Arc::new(LazyInner {
            container: ctx.container().downgrade(),
            key,
            once: OnceLock::new(),
        })))
    }

    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo {
            key: Key::of::<T>(),
            optional: false,
            lazy: true,
        }]
    }
}
impl<T: ?Sized + Injectable> Lazy<T> {
    /// Accesses the Lazy Dependency
    ///
    /// # Panics
    /// - When the dependency can not be resolved, see [Lazy::try_get]
    pub fn get(&self) -> &Arc<T> {
        match self.try_get() {
            Ok(instance) => instance,
            Err(err) => panic!("Lazy dependency could not be resolved: {err}"),
        }
    }

    /// Try to access the lazy dependency
    ///
    /// The first access resolves it, the result (success or failure) is kept for all clones.
    pub fn try_get(&self) -> Result<&Arc<T>, &UnresolvableDependencyError> {
        self.0
            .once
            .get_or_init(|| {
                let inner = &self.0;
                match inner.container.upgrade() {
                    Some(container) => {
                        tracing::debug!("Resolving lazy dependency {}", inner.key);
                        container.require::<T>()
                    }
                    None => Err(UnresolvableDependencyError::ContainerDropped(
                        inner.key.clone(),
                    )),
                }
            })
            .as_ref()
    }

    /// True once the dependency was accessed
    pub fn is_resolved(&self) -> bool {
        self.0.once.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Container, Lifetime};

    #[derive(Debug)]
    struct Parent {
        child: Arc<Child>,
    }
    #[derive(Debug)]
    struct Child {
        parent: Lazy<Parent>,
    }

    #[test_log::test]
    fn lazy_breaks_cycle() {
        let container = Container::new();
        container
            .register_factory(Lifetime::Singleton, |child: Arc<Child>| Parent { child })
            .unwrap()
            .register_factory(Lifetime::Singleton, |parent: Lazy<Parent>| Child { parent })
            .unwrap();

        let parent = container.require::<Parent>().unwrap();
        assert!(!parent.child.parent.is_resolved());
        assert!(Arc::ptr_eq(parent.child.parent.get(), &parent));
    }

    #[test_log::test]
    fn lazy_requires_registration() {
        let container = Container::new();
        container
            .register_factory(Lifetime::Transient, |parent: Lazy<Parent>| Child { parent })
            .unwrap();

        let err = container.require::<Child>().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.key(), Some(&Key::of::<Parent>()));
    }

    #[test_log::test]
    fn lazy_after_container_dropped() {
        let container = Container::new();
        container.register_instance(5_u32).unwrap();
        let lazy = container.resolve::<Lazy<u32>>().unwrap();
        drop(container);

        let err = lazy.try_get().unwrap_err();
        assert_eq!(err.key(), Some(&Key::of::<u32>()));
        assert!(matches!(err, UnresolvableDependencyError::ContainerDropped(_)));
    }

    #[test_log::test]
    fn clones_share_result() {
        let container = Container::new();
        container.register_instance(5_u32).unwrap();
        let lazy = container.resolve::<Lazy<u32>>().unwrap();
        let clone = lazy.clone();

        assert_eq!(**lazy, 5);
        assert!(clone.is_resolved());
    }
}
