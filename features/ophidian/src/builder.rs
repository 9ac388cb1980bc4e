use std::{borrow::Cow, sync::Arc};

use crate::{
    config::ContainerConfig,
    container::Container,
    errors::BuildError,
    factories::{Construct, FactoryFn, InstanceFactory},
    registration::Provider,
    types::{DynError, Injectable, Key, Lifetime},
};

/// Collects registrations during setup and builds a [Container]
///
/// Registrations are applied in order with the configured [crate::DuplicatePolicy].
///
/// ```rust
/// use std::sync::Arc;
/// use ophidian::{ContainerBuilder, ContainerConfig, Lifetime};
///
/// struct Logger;
/// struct Service {
///     logger: Arc<Logger>,
/// }
///
/// let container = ContainerBuilder::new()
///     .with_config(ContainerConfig::strict())
///     .add_factory(Lifetime::Singleton, || Logger)
///     .add_factory(Lifetime::Transient, |logger: Arc<Logger>| Service { logger })
///     .build()
///     .unwrap();
///
/// assert!(container.require::<Service>().is_ok());
/// ```
pub struct ContainerBuilder {
    config: ContainerConfig,
    /// Registrations in the order they were added
    pub(crate) registrations: Vec<(Key, Provider, Lifetime)>,
}
impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    pub fn new() -> Self {
        ContainerBuilder {
            config: ContainerConfig::default(),
            registrations: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }
}
impl ContainerBuilder {
    /// Adds any provider under `key`
    pub fn add(mut self, key: Key, provider: Provider, lifetime: Lifetime) -> Self {
        self.registrations.push((key, provider, lifetime));
        self
    }

    pub fn add_instance<T: Injectable>(self, instance: T) -> Self {
        self.add(Key::of::<T>(), Provider::instance(instance), Lifetime::Singleton)
    }

    pub fn add_shared_instance<I: ?Sized + Injectable>(self, instance: Arc<I>) -> Self {
        self.add(
            Key::of::<I>(),
            Provider::shared_instance(instance),
            Lifetime::Singleton,
        )
    }

    pub fn add_named_instance<T: Injectable>(
        self,
        name: impl Into<Cow<'static, str>>,
        instance: T,
    ) -> Self {
        self.add(
            Key::named::<T>(name),
            Provider::instance(instance),
            Lifetime::Singleton,
        )
    }

    pub fn add_factory<Args, T, F>(self, lifetime: Lifetime, factory: F) -> Self
    where
        F: FactoryFn<Args, T>,
        Args: 'static,
        T: Injectable,
    {
        self.add(Key::of::<T>(), Provider::factory(factory), lifetime)
    }

    pub fn add_try_factory<Args, T, E, F>(self, lifetime: Lifetime, factory: F) -> Self
    where
        F: FactoryFn<Args, Result<T, E>>,
        Args: 'static,
        T: Injectable,
        E: Into<DynError> + 'static,
    {
        self.add(Key::of::<T>(), Provider::try_factory(factory), lifetime)
    }

    pub fn add_shared_factory<Args, I, F>(self, lifetime: Lifetime, factory: F) -> Self
    where
        F: FactoryFn<Args, Arc<I>>,
        Args: 'static,
        I: ?Sized + Injectable,
    {
        self.add(Key::of::<I>(), Provider::shared_factory(factory), lifetime)
    }

    pub fn add_constructor<C: Construct>(self, lifetime: Lifetime) -> Self {
        self.add(Key::of::<C>(), Provider::constructor::<C>(), lifetime)
    }

    pub fn add_instance_factory<Factory: InstanceFactory>(
        self,
        lifetime: Lifetime,
        factory: Factory,
    ) -> Self {
        self.add(
            Key::of::<Factory::Provides>(),
            Provider::custom(factory),
            lifetime,
        )
    }

    /// Builds the container
    ///
    /// Fails on a rejected registration, or - with [ContainerConfig::validate_on_build] - on graph errors.
    pub fn build(self) -> Result<Container, BuildError> {
        let ContainerBuilder {
            config,
            registrations,
        } = self;

        tracing::debug!(
            "Building container with {} registrations",
            registrations.len()
        );

        let validate = config.validate_on_build;
        let container = Container::with_config(config);
        for (key, provider, lifetime) in registrations {
            container.register(key, provider, lifetime)?;
        }

        if validate {
            container.validate()?;
            tracing::debug!("Dependency graph of {} keys is valid", container.len());
        }

        Ok(container)
    }
}
