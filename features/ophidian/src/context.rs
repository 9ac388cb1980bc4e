use std::{any::type_name, borrow::Cow, cell::RefCell, sync::Arc};

use crate::{
    container::Container,
    errors::UnresolvableDependencyError,
    resolver::Resolver,
    types::{Injectable, Instance, Key},
};

thread_local! {
    /// Keys being resolved on this thread, with the id of their container
    static ACTIVE: RefCell<Vec<(usize, Key)>> = RefCell::new(Vec::new());
}

/// State of a single top level resolution
///
/// Tracks the chain of keys currently being resolved, a key showing up twice in the chain is a cycle.
/// Factories receive the context to resolve their own dependencies.
///
/// A resolution started while another one of the same container is running on this thread,
/// e.g. by accessing a [crate::Lazy] inside a factory, continues that chain.
pub struct ResolutionContext<'c> {
    container: &'c Container,
    chain: Vec<Key>,
}

impl<'c> ResolutionContext<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        let id = container.id();
        let chain = ACTIVE.with(|active| {
            active
                .borrow()
                .iter()
                .filter(|(owner, _)| *owner == id)
                .map(|(_, key)| key.clone())
                .collect()
        });

        Self { container, chain }
    }

    /// Resolves anything implementing [Resolver], e.g. `Arc<T>`, `Option<Arc<T>>` or a tuple
    pub fn resolve<R: Resolver>(&mut self) -> Result<R, UnresolvableDependencyError> {
        R::resolve(self)
    }

    /// Resolves the instance registered for `T`
    pub fn require<T: ?Sized + Injectable>(&mut self) -> Result<Arc<T>, UnresolvableDependencyError> {
        self.require_key(Key::of::<T>())
    }

    /// Resolves the instance registered for `T` under `name`
    pub fn require_named<T: ?Sized + Injectable>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<Arc<T>, UnresolvableDependencyError> {
        self.require_key(Key::named::<T>(name))
    }

    /// Keys currently being resolved, outermost first
    pub fn chain(&self) -> &[Key] {
        &self.chain
    }

    pub fn container(&self) -> &'c Container {
        self.container
    }

    pub fn is_registered(&self, key: &Key) -> bool {
        self.container.is_registered(key)
    }

    pub(crate) fn require_key<T: ?Sized + Injectable>(
        &mut self,
        key: Key,
    ) -> Result<Arc<T>, UnresolvableDependencyError> {
        self.produce(key)?
            .downcast::<T>()
            .map_err(|actual_type| UnresolvableDependencyError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    /// Produces the instance for `key`, depth first
    pub(crate) fn produce(&mut self, key: Key) -> Result<Instance, UnresolvableDependencyError> {
        // Circular Dependency Check - only the active path counts
        if self.chain.contains(&key) {
            let mut chain = self.chain.clone();
            chain.push(key.clone());

            let err = UnresolvableDependencyError::Cyclic { key, chain };
            tracing::warn!("{err}");
            return Err(err);
        }

        let Some(registration) = self.container.registration(&key) else {
            let required_by = self.chain.last().cloned();
            match &required_by {
                Some(parent) => {
                    tracing::error!("'{parent}' tried to require an unregistered type: {key}")
                }
                None => tracing::error!("Tried to require an unregistered type: {key}"),
            }
            return Err(UnresolvableDependencyError::NotFound { key, required_by });
        };

        let _active = ActiveKey::enter(self.container.id(), key.clone());
        self.chain.push(key);
        let result = registration.produce(self);
        self.chain.pop();

        result
    }
}

/// Entry in [ACTIVE], removed again when dropped
struct ActiveKey;
impl ActiveKey {
    fn enter(container: usize, key: Key) -> Self {
        ACTIVE.with(|active| active.borrow_mut().push((container, key)));
        ActiveKey
    }
}
impl Drop for ActiveKey {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().pop();
        });
    }
}
