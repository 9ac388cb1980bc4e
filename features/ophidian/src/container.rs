use std::{
    borrow::Cow,
    collections::{hash_map::Entry, BTreeMap, HashMap},
    fmt::Debug,
    sync::{Arc, Weak},
};

use parking_lot::RwLock;

use crate::{
    builder::ContainerBuilder,
    config::{ContainerConfig, DuplicatePolicy},
    context::ResolutionContext,
    dependency_graph::{DependencyGraph, DependencyGraphErrors},
    errors::{RegistrationError, UnresolvableDependencyError},
    factories::{Construct, FactoryFn, InstanceFactory},
    registration::{Provider, Registration},
    resolver::Resolver,
    types::{DynError, Injectable, Instance, Key, Lifetime},
    wait_graph::WaitGraph,
};

/// Registry of providers, resolving keys into instances
///
/// Cloning is cheap, all clones share the same registry and singletons.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use ophidian::{Container, Lifetime};
///
/// struct Logger;
/// struct Service {
///     logger: Arc<Logger>,
/// }
///
/// let container = Container::new();
/// container
///     .register_factory(Lifetime::Singleton, || Logger)
///     .unwrap()
///     .register_factory(Lifetime::Transient, |logger: Arc<Logger>| Service { logger })
///     .unwrap();
///
/// let a = container.require::<Service>().unwrap();
/// let b = container.require::<Service>().unwrap();
/// assert!(!Arc::ptr_eq(&a, &b));
/// assert!(Arc::ptr_eq(&a.logger, &b.logger));
/// ```
#[derive(Clone)]
pub struct Container(Arc<ContainerInner>);
pub(crate) struct ContainerInner {
    registry: RwLock<HashMap<Key, Arc<Registration>>>,
    waits: WaitGraph,
    config: ContainerConfig,
}
impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.0.registry.read();
        let sorted: BTreeMap<_, _> = registry.iter().collect();

        let mut map = f.debug_struct("Container");
        for (key, registration) in sorted {
            map.field(&key.to_string(), registration);
        }
        map.finish()
    }
}
impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self(Arc::new(ContainerInner {
            registry: RwLock::new(HashMap::new()),
            waits: WaitGraph::default(),
            config,
        }))
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.0.config
    }

    pub(crate) fn downgrade(&self) -> WeakContainer {
        WeakContainer(Arc::downgrade(&self.0))
    }

    /// Identifies the shared registry, equal for all clones
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub(crate) fn waits(&self) -> &WaitGraph {
        &self.0.waits
    }

    pub(crate) fn registration(&self, key: &Key) -> Option<Arc<Registration>> {
        self.0.registry.read().get(key).cloned()
    }
}

// Registration
impl Container {
    /// Binds `provider` to `key`
    ///
    /// An existing registration is replaced or rejected depending on [ContainerConfig::duplicate_policy].
    /// Instance providers are always singletons, `lifetime` is ignored for them.
    pub fn register(
        &self,
        key: Key,
        provider: Provider,
        lifetime: Lifetime,
    ) -> Result<&Self, RegistrationError> {
        let provided = provider.supplies();
        if provided.type_id != key.type_info.type_id {
            return Err(RegistrationError::TypeMismatch { key, provided });
        }

        let registration = Arc::new(Registration::new(key.clone(), provider, lifetime));
        let mut registry = self.0.registry.write();
        match registry.entry(key) {
            Entry::Occupied(mut entry) => match self.0.config.duplicate_policy {
                DuplicatePolicy::Reject => {
                    return Err(RegistrationError::AlreadyRegistered(entry.key().clone()))
                }
                DuplicatePolicy::Replace => {
                    tracing::warn!("Replacing registration for {}", entry.key());
                    entry.insert(registration);
                }
            },
            Entry::Vacant(entry) => {
                tracing::debug!("Registered {} as {:?}", entry.key(), registration);
                entry.insert(registration);
            }
        }

        Ok(self)
    }

    /// Registers an existing value
    pub fn register_instance<T: Injectable>(&self, instance: T) -> Result<&Self, RegistrationError> {
        self.register(Key::of::<T>(), Provider::instance(instance), Lifetime::Singleton)
    }

    /// Registers an existing shared value - use this to bind an `Arc<dyn Trait>`
    pub fn register_shared_instance<I: ?Sized + Injectable>(
        &self,
        instance: Arc<I>,
    ) -> Result<&Self, RegistrationError> {
        self.register(
            Key::of::<I>(),
            Provider::shared_instance(instance),
            Lifetime::Singleton,
        )
    }

    /// Registers a value under a name
    ///
    /// Named values act as conventions, e.g. a `String` called "hostname".
    /// Dependents ask for them with [crate::Named] or [ResolutionContext::require_named].
    pub fn register_named_instance<T: Injectable>(
        &self,
        name: impl Into<Cow<'static, str>>,
        instance: T,
    ) -> Result<&Self, RegistrationError> {
        self.register(
            Key::named::<T>(name),
            Provider::instance(instance),
            Lifetime::Singleton,
        )
    }

    /// Registers a function producing `T` from resolved arguments
    pub fn register_factory<Args, T, F>(
        &self,
        lifetime: Lifetime,
        factory: F,
    ) -> Result<&Self, RegistrationError>
    where
        F: FactoryFn<Args, T>,
        Args: 'static,
        T: Injectable,
    {
        self.register(Key::of::<T>(), Provider::factory(factory), lifetime)
    }

    /// Registers a function producing `T` under a name
    pub fn register_named_factory<Args, T, F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        lifetime: Lifetime,
        factory: F,
    ) -> Result<&Self, RegistrationError>
    where
        F: FactoryFn<Args, T>,
        Args: 'static,
        T: Injectable,
    {
        self.register(Key::named::<T>(name), Provider::factory(factory), lifetime)
    }

    /// Registers a function that may fail producing `T`
    pub fn register_try_factory<Args, T, E, F>(
        &self,
        lifetime: Lifetime,
        factory: F,
    ) -> Result<&Self, RegistrationError>
    where
        F: FactoryFn<Args, Result<T, E>>,
        Args: 'static,
        T: Injectable,
        E: Into<DynError> + 'static,
    {
        self.register(Key::of::<T>(), Provider::try_factory(factory), lifetime)
    }

    /// Binds the interface `I` to a function returning `Arc<I>`
    pub fn register_shared_factory<Args, I, F>(
        &self,
        lifetime: Lifetime,
        factory: F,
    ) -> Result<&Self, RegistrationError>
    where
        F: FactoryFn<Args, Arc<I>>,
        Args: 'static,
        I: ?Sized + Injectable,
    {
        self.register(Key::of::<I>(), Provider::shared_factory(factory), lifetime)
    }

    /// Registers `C`, constructed from its declared dependencies
    pub fn register_constructor<C: Construct>(
        &self,
        lifetime: Lifetime,
    ) -> Result<&Self, RegistrationError> {
        self.register(Key::of::<C>(), Provider::constructor::<C>(), lifetime)
    }

    /// Registers a custom [InstanceFactory]
    pub fn register_instance_factory<Factory: InstanceFactory>(
        &self,
        lifetime: Lifetime,
        factory: Factory,
    ) -> Result<&Self, RegistrationError> {
        self.register(
            Key::of::<Factory::Provides>(),
            Provider::custom(factory),
            lifetime,
        )
    }

    /// Removes the registration for `key`
    ///
    /// Returns true if something was registered.
    pub fn release(&self, key: &Key) -> bool {
        let released = self.0.registry.write().remove(key).is_some();
        if released {
            tracing::debug!("Released {key}");
        }
        released
    }

    pub fn release_type<T: ?Sized + 'static>(&self) -> bool {
        self.release(&Key::of::<T>())
    }

    pub fn release_named<T: ?Sized + 'static>(&self, name: impl Into<Cow<'static, str>>) -> bool {
        self.release(&Key::named::<T>(name))
    }

    pub fn is_registered(&self, key: &Key) -> bool {
        self.0.registry.read().contains_key(key)
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.is_registered(&Key::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.0.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.registry.read().is_empty()
    }

    /// All registered keys, sorted
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<_> = self.0.registry.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

// Resolution
impl Container {
    /// Resolves the instance for `key`
    pub fn resolve_key(&self, key: &Key) -> Result<Instance, UnresolvableDependencyError> {
        ResolutionContext::new(self).produce(key.clone())
    }

    /// Resolves anything implementing [Resolver]
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use ophidian::Container;
    /// let container = Container::new();
    /// container.register_instance(42_u32).unwrap();
    ///
    /// let (number, missing) = container.resolve::<(Arc<u32>, Option<Arc<String>>)>().unwrap();
    /// assert_eq!(*number, 42);
    /// assert!(missing.is_none());
    /// ```
    pub fn resolve<R: Resolver>(&self) -> Result<R, UnresolvableDependencyError> {
        ResolutionContext::new(self).resolve::<R>()
    }

    /// Attempts to get the requested type
    pub fn require<T: ?Sized + Injectable>(&self) -> Result<Arc<T>, UnresolvableDependencyError> {
        ResolutionContext::new(self).require::<T>()
    }

    /// Attempts to get the requested type registered under `name`
    pub fn require_named<T: ?Sized + Injectable>(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<Arc<T>, UnresolvableDependencyError> {
        ResolutionContext::new(self).require_named::<T>(name)
    }

    /// Builds `C` without registering it, injecting its dependencies
    ///
    /// The result is never cached.
    pub fn construct<C: Construct>(&self) -> Result<C, UnresolvableDependencyError> {
        let dependencies = self.resolve_dependencies::<C>()?;
        C::construct(dependencies)
            .map_err(|error| UnresolvableDependencyError::from_provider(&Key::of::<C>(), error))
    }

    /// Resolves the dependencies `C` would be constructed with
    pub fn resolve_dependencies<C: Construct>(
        &self,
    ) -> Result<C::Dependencies, UnresolvableDependencyError> {
        ResolutionContext::new(self).resolve::<C::Dependencies>()
    }

    /// Snapshot of the current dependency graph
    pub fn graph(&self) -> DependencyGraph {
        let registry = self.0.registry.read();
        DependencyGraph::from_providers(
            registry
                .values()
                .map(|registration| (&registration.key, &registration.provider)),
        )
    }

    /// Checks all registrations for missing and circular dependencies
    pub fn validate(&self) -> Result<(), DependencyGraphErrors> {
        self.graph().check()
    }
}

/// Handle not keeping the container alive
#[derive(Clone)]
pub(crate) struct WeakContainer(Weak<ContainerInner>);
impl WeakContainer {
    pub(crate) fn upgrade(&self) -> Option<Container> {
        self.0.upgrade().map(Container)
    }
}
