use std::{fmt, sync::Arc};

use parking_lot::{Condvar, Mutex};

use crate::{
    context::ResolutionContext,
    errors::UnresolvableDependencyError,
    factories::{
        Construct, ConstructorFactory, DynFactory, FactoryFn, FnFactory, InstanceFactory,
        SharedFnFactory, TryFnFactory,
    },
    types::{DependencyInfo, DynError, Injectable, Instance, Key, Lifetime, TypeInfo},
    wait_graph::WaitGraph,
};

/// A means of producing instances for a key
pub struct Provider {
    kind: ProviderKind,
}

enum ProviderKind {
    /// A pre built instance
    Instance(Instance),
    /// A function or custom [InstanceFactory]
    Factory(Box<dyn DynFactory>),
    /// A [Construct] type
    Constructor(Box<dyn DynFactory>),
}

impl Provider {
    /// Provides an existing value
    pub fn instance<T: Injectable>(instance: T) -> Self {
        Self {
            kind: ProviderKind::Instance(Instance::new(instance)),
        }
    }

    /// Provides an existing shared value, e.g. an `Arc<dyn Trait>`
    pub fn shared_instance<I: ?Sized + Injectable>(instance: Arc<I>) -> Self {
        Self {
            kind: ProviderKind::Instance(Instance::from_arc(instance)),
        }
    }

    /// Provides the return value of `factory`, whose arguments are resolved from the container
    pub fn factory<Args, T, F>(factory: F) -> Self
    where
        F: FactoryFn<Args, T>,
        Args: 'static,
        T: Injectable,
    {
        Self::custom(FnFactory::<F, Args, T>::new(factory))
    }

    /// Like [Provider::factory], for functions that can fail
    pub fn try_factory<Args, T, E, F>(factory: F) -> Self
    where
        F: FactoryFn<Args, Result<T, E>>,
        Args: 'static,
        T: Injectable,
        E: Into<DynError> + 'static,
    {
        Self::custom(TryFnFactory::<F, Args, T, E>::new(factory))
    }

    /// Provides an interface through a function returning `Arc<I>`
    pub fn shared_factory<Args, I, F>(factory: F) -> Self
    where
        F: FactoryFn<Args, Arc<I>>,
        Args: 'static,
        I: ?Sized + Injectable,
    {
        Self::custom(SharedFnFactory::<F, Args, I>::new(factory))
    }

    /// Provides `C` by resolving its declared dependencies
    pub fn constructor<C: Construct>() -> Self {
        Self {
            kind: ProviderKind::Constructor(Box::new(ConstructorFactory::<C>::new())),
        }
    }

    /// Provides instances through a user defined [InstanceFactory]
    pub fn custom<Factory: InstanceFactory>(factory: Factory) -> Self {
        Self {
            kind: ProviderKind::Factory(Box::new(factory)),
        }
    }

    /// The type this provider produces
    pub fn supplies(&self) -> TypeInfo {
        match &self.kind {
            ProviderKind::Instance(instance) => instance.info,
            ProviderKind::Factory(factory) | ProviderKind::Constructor(factory) => {
                factory.supplies()
            }
        }
    }

    pub fn dependencies(&self) -> Vec<DependencyInfo> {
        match &self.kind {
            ProviderKind::Instance(_) => Vec::new(),
            ProviderKind::Factory(factory) | ProviderKind::Constructor(factory) => {
                factory.dependencies()
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ProviderKind::Instance(_) => "instance",
            ProviderKind::Factory(_) => "factory",
            ProviderKind::Constructor(_) => "constructor",
        }
    }

    pub(crate) fn is_instance(&self) -> bool {
        matches!(self.kind, ProviderKind::Instance(_))
    }

    /// Produces an instance, resolving dependencies through `ctx`
    pub(crate) fn produce(
        &self,
        key: &Key,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<Instance, UnresolvableDependencyError> {
        match &self.kind {
            ProviderKind::Instance(instance) => Ok(instance.clone()),
            ProviderKind::Factory(factory) | ProviderKind::Constructor(factory) => {
                let instance = factory
                    .construct(ctx)
                    .map_err(|error| UnresolvableDependencyError::from_provider(key, error))?;
                tracing::debug!("Constructed instance of {key}");
                Ok(instance)
            }
        }
    }
}
impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("kind", &self.kind_name())
            .field("supplies", &self.supplies().type_name)
            .finish()
    }
}

/// A provider bound to a key
pub(crate) struct Registration {
    pub key: Key,
    pub provider: Provider,
    pub lifetime: Lifetime,
    /// Singleton cache
    slot: Mutex<Slot>,
    built: Condvar,
}

enum Slot {
    Empty,
    /// Some thread is constructing the singleton, others wait on `built`
    Building,
    Ready(Instance),
}

impl Registration {
    pub(crate) fn new(key: Key, provider: Provider, lifetime: Lifetime) -> Self {
        // An instance is always shared
        let lifetime = match provider.is_instance() {
            true => Lifetime::Singleton,
            false => lifetime,
        };

        Self {
            key,
            provider,
            lifetime,
            slot: Mutex::new(Slot::Empty),
            built: Condvar::new(),
        }
    }

    pub(crate) fn produce(
        &self,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<Instance, UnresolvableDependencyError> {
        if self.lifetime == Lifetime::Transient || self.provider.is_instance() {
            return self.provider.produce(&self.key, ctx);
        }

        let waits = ctx.container().waits();
        let mut slot = self.slot.lock();
        loop {
            match &*slot {
                Slot::Ready(instance) => {
                    tracing::trace!("Reusing singleton {}", self.key);
                    return Ok(instance.clone());
                }
                Slot::Empty => break,
                Slot::Building => {}
            }

            if let Err(waited) = waits.wait_for(&self.key) {
                // The chain already ends with this key, `waited` starts with it
                let mut chain = ctx.chain().to_vec();
                chain.extend(waited.into_iter().skip(1));

                let err = UnresolvableDependencyError::Cyclic {
                    key: self.key.clone(),
                    chain,
                };
                tracing::warn!("{err}");
                return Err(err);
            }
            tracing::trace!("Waiting for singleton {}", self.key);
            self.built.wait(&mut slot);
            waits.done_waiting();
        }

        *slot = Slot::Building;
        waits.building(&self.key);
        drop(slot);

        let mut build = SingletonBuild {
            registration: self,
            waits,
            built: None,
        };
        let result = self.provider.produce(&self.key, ctx);
        if let Ok(instance) = &result {
            tracing::debug!("Cached singleton {}", self.key);
            build.built = Some(instance.clone());
        }
        result
    }
}

/// Publishes the outcome of a singleton construction, also when the provider panics
struct SingletonBuild<'r> {
    registration: &'r Registration,
    waits: &'r WaitGraph,
    built: Option<Instance>,
}
impl Drop for SingletonBuild<'_> {
    fn drop(&mut self) {
        let mut slot = self.registration.slot.lock();
        *slot = match self.built.take() {
            Some(instance) => Slot::Ready(instance),
            None => Slot::Empty,
        };
        self.waits.finished(&self.registration.key);
        drop(slot);

        self.registration.built.notify_all();
    }
}
impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.provider.kind_name(), self.lifetime)
    }
}
