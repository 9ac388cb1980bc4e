use std::{marker::PhantomData, sync::Arc};

use crate::{
    context::ResolutionContext,
    errors::UnresolvableDependencyError,
    resolver::Resolver,
    types::{DependencyInfo, DynError, Injectable, Instance, TypeInfo},
};

/// A Factory providing instances of a given type
///
/// Closures and [Construct] types are adapted to this trait by the container,
/// implement it directly for factories that carry state.
pub trait InstanceFactory: Send + Sync + 'static {
    type Provides: ?Sized + Injectable;

    /// Returns the typeinfo about the factory's provided type
    fn supplies() -> TypeInfo {
        TypeInfo::of::<Self::Provides>()
    }

    /// Returns a list of dependencies the factory requires to supply it's type
    fn get_dependencies() -> Vec<DependencyInfo>;

    /// Constructs a new instance of the factory's provided type
    ///
    /// Dependencies are resolved through `ctx`. Returning a resolution error with `?` keeps its cause,
    /// any other error is reported as [UnresolvableDependencyError::ConstructionFailed].
    fn construct(&self, ctx: &mut ResolutionContext<'_>) -> Result<Arc<Self::Provides>, DynError>;
}

/// Wrapper Trait for factories, providing instances of Any
pub(crate) trait DynFactory: Send + Sync {
    fn supplies(&self) -> TypeInfo;

    /// Returns a list of dependencies for the factory
    fn dependencies(&self) -> Vec<DependencyInfo>;

    /// Constructs a new instance of the factory's provided type, fulfilling all its dependencies
    fn construct(&self, ctx: &mut ResolutionContext<'_>) -> Result<Instance, DynError>;
}
// Impl DynFactory for any InstanceFactory
impl<SpecificFactory: InstanceFactory> DynFactory for SpecificFactory {
    fn supplies(&self) -> TypeInfo {
        SpecificFactory::supplies()
    }

    fn dependencies(&self) -> Vec<DependencyInfo> {
        SpecificFactory::get_dependencies()
    }

    fn construct(&self, ctx: &mut ResolutionContext<'_>) -> Result<Instance, DynError> {
        // Forward the call to the specific implementation
        SpecificFactory::construct(self, ctx).map(Instance::from_arc)
    }
}

/// Functions whose arguments can all be resolved from the container
///
/// Implemented for `Fn(A1, .., An) -> Out` with up to 8 [Resolver] arguments.
pub trait FactoryFn<Args, Out>: Send + Sync + 'static {
    fn dependencies() -> Vec<DependencyInfo>;

    fn call(&self, ctx: &mut ResolutionContext<'_>) -> Result<Out, UnresolvableDependencyError>;
}

macro_rules! impl_factory_fn {
    ($($arg:ident),*) => {
        impl<F, Out, $($arg,)*> FactoryFn<($($arg,)*), Out> for F
        where
            F: Fn($($arg),*) -> Out + Send + Sync + 'static,
            $($arg: Resolver,)*
        {
            fn dependencies() -> Vec<DependencyInfo> {
                #[allow(unused_mut)]
                let mut dependencies = Vec::new();
                $(dependencies.extend(<$arg as Resolver>::dependencies());)*
                dependencies
            }

            #[allow(non_snake_case, unused_variables)]
            fn call(&self, ctx: &mut ResolutionContext<'_>) -> Result<Out, UnresolvableDependencyError> {
                $(let $arg = <$arg as Resolver>::resolve(ctx)?;)*
                Ok((self)($($arg),*))
            }
        }
    };
}

impl_factory_fn!();
impl_factory_fn!(A1);
impl_factory_fn!(A1, A2);
impl_factory_fn!(A1, A2, A3);
impl_factory_fn!(A1, A2, A3, A4);
impl_factory_fn!(A1, A2, A3, A4, A5);
impl_factory_fn!(A1, A2, A3, A4, A5, A6);
impl_factory_fn!(A1, A2, A3, A4, A5, A6, A7);
impl_factory_fn!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Factory from a function returning the value
pub(crate) struct FnFactory<F, Args, T> {
    factory: F,
    _marker: PhantomData<fn(Args) -> T>,
}
impl<F, Args, T> FnFactory<F, Args, T> {
    pub(crate) fn new(factory: F) -> Self {
        Self {
            factory,
            _marker: PhantomData,
        }
    }
}
impl<F, Args, T> InstanceFactory for FnFactory<F, Args, T>
where
    F: FactoryFn<Args, T>,
    Args: 'static,
    T: Injectable,
{
    type Provides = T;

    fn get_dependencies() -> Vec<DependencyInfo> {
        F::dependencies()
    }

    fn construct(&self, ctx: &mut ResolutionContext<'_>) -> Result<Arc<T>, DynError> {
        Ok(Arc::new(self.factory.call(ctx)?))
    }
}

/// Factory from a function returning a `Result`
pub(crate) struct TryFnFactory<F, Args, T, E> {
    factory: F,
    _marker: PhantomData<fn(Args) -> Result<T, E>>,
}
impl<F, Args, T, E> TryFnFactory<F, Args, T, E> {
    pub(crate) fn new(factory: F) -> Self {
        Self {
            factory,
            _marker: PhantomData,
        }
    }
}
impl<F, Args, T, E> InstanceFactory for TryFnFactory<F, Args, T, E>
where
    F: FactoryFn<Args, Result<T, E>>,
    Args: 'static,
    T: Injectable,
    E: Into<DynError> + 'static,
{
    type Provides = T;

    fn get_dependencies() -> Vec<DependencyInfo> {
        F::dependencies()
    }

    fn construct(&self, ctx: &mut ResolutionContext<'_>) -> Result<Arc<T>, DynError> {
        let value = self.factory.call(ctx)?.map_err(Into::<DynError>::into)?;
        Ok(Arc::new(value))
    }
}

/// Factory from a function returning an already shared value
///
/// Used to bind an interface (`dyn Trait`) to an implementation.
pub(crate) struct SharedFnFactory<F, Args, I: ?Sized> {
    factory: F,
    _marker: PhantomData<fn(Args) -> Arc<I>>,
}
impl<F, Args, I: ?Sized> SharedFnFactory<F, Args, I> {
    pub(crate) fn new(factory: F) -> Self {
        Self {
            factory,
            _marker: PhantomData,
        }
    }
}
impl<F, Args, I> InstanceFactory for SharedFnFactory<F, Args, I>
where
    F: FactoryFn<Args, Arc<I>>,
    Args: 'static,
    I: ?Sized + Injectable,
{
    type Provides = I;

    fn get_dependencies() -> Vec<DependencyInfo> {
        F::dependencies()
    }

    fn construct(&self, ctx: &mut ResolutionContext<'_>) -> Result<Arc<I>, DynError> {
        Ok(self.factory.call(ctx)?)
    }
}

/// A type that knows how to build itself from its dependencies
///
/// ```ignore
/// struct Service {
///     logger: Arc<Logger>,
/// }
/// impl Construct for Service {
///     type Dependencies = (Arc<Logger>,);
///
///     fn construct((logger,): Self::Dependencies) -> Result<Self, DynError> {
///         Ok(Service { logger })
///     }
/// }
/// ```
pub trait Construct: Injectable + Sized {
    type Dependencies: Resolver;

    fn construct(dependencies: Self::Dependencies) -> Result<Self, DynError>;
}

pub(crate) struct ConstructorFactory<C>(PhantomData<fn() -> C>);
impl<C> ConstructorFactory<C> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}
impl<C: Construct> InstanceFactory for ConstructorFactory<C> {
    type Provides = C;

    fn get_dependencies() -> Vec<DependencyInfo> {
        C::Dependencies::dependencies()
    }

    fn construct(&self, ctx: &mut ResolutionContext<'_>) -> Result<Arc<C>, DynError> {
        let dependencies = C::Dependencies::resolve(ctx)?;
        C::construct(dependencies).map(Arc::new)
    }
}
