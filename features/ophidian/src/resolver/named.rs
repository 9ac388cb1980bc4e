use std::{fmt::Debug, marker::PhantomData, ops::Deref, sync::Arc};

use crate::{
    context::ResolutionContext,
    errors::UnresolvableDependencyError,
    resolver::Resolver,
    types::{DependencyInfo, Injectable, Key},
};

/// Names a dependency token, see [Named]
///
/// Usually declared with [crate::name!].
pub trait Name: 'static {
    const NAME: &'static str;
}

/// Declares a zero sized type implementing [Name]
///
/// ```rust
/// ophidian::name!(pub Hostname = "hostname");
///
/// use ophidian::Name;
/// assert_eq!(Hostname::NAME, "hostname");
/// ```
#[macro_export]
macro_rules! name {
    ($(#[$meta:meta])* $vis:vis $ident:ident = $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        $vis struct $ident;
        impl $crate::Name for $ident {
            const NAME: &'static str = $name;
        }
    };
}

/// A dependency registered under a name
///
/// Resolves `Key::named::<T>(N::NAME)`. This is how conventions are injected,
/// e.g. a `String` named "hostname".
///
/// # Example
/// ```rust
/// use ophidian::{name, Container, Lifetime, Named};
///
/// name!(Hostname = "hostname");
///
/// struct Server {
///     hostname: Named<String, Hostname>,
/// }
///
/// let container = Container::new();
/// container
///     .register_named_instance("hostname", "my_hostname.domain".to_string())
///     .unwrap()
///     .register_factory(Lifetime::Transient, |hostname: Named<String, Hostname>| Server { hostname })
///     .unwrap();
///
/// let server = container.require::<Server>().unwrap();
/// assert_eq!(server.hostname.as_str(), "my_hostname.domain");
/// ```
pub struct Named<T: ?Sized + Injectable, N> {
    inner: Arc<T>,
    _name: PhantomData<fn() -> N>,
}
impl<T: ?Sized + Injectable, N: Name> Named<T, N> {
    pub fn name(&self) -> &'static str {
        N::NAME
    }

    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}
impl<T: ?Sized + Injectable, N> Deref for Named<T, N> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T: ?Sized + Injectable, N> Clone for Named<T, N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _name: PhantomData,
        }
    }
}
impl<T: ?Sized + Injectable + Debug, N: Name> Debug for Named<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Named")
            .field("name", &N::NAME)
            .field("value", &self.inner)
            .finish()
    }
}
impl<T: ?Sized + Injectable, N: Name> Resolver for Named<T, N> {
    fn resolve(ctx: &mut ResolutionContext<'_>) -> Result<Self, UnresolvableDependencyError> {
        Ok(Named {
            inner: ctx.require_named::<T>(N::NAME)?,
            _name: PhantomData,
        })
    }

    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo::required(Key::named::<T>(N::NAME))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Container, Lifetime};

    crate::name!(First = "first");
    crate::name!(Second = "second");

    struct Greeting {
        first: Named<String, First>,
        second: Named<String, Second>,
    }

    #[test_log::test]
    fn same_type_different_names() {
        let container = Container::new();
        container
            .register_named_instance("second", "s2".to_string())
            .unwrap()
            .register_named_instance("first", "s1".to_string())
            .unwrap()
            .register_factory(
                Lifetime::Transient,
                |first: Named<String, First>, second: Named<String, Second>| Greeting { first, second },
            )
            .unwrap();

        let greeting = container.require::<Greeting>().unwrap();
        assert_eq!(greeting.first.as_str(), "s1");
        assert_eq!(greeting.second.as_str(), "s2");
        assert_eq!(greeting.first.name(), "first");
    }

    #[test_log::test]
    fn named_does_not_fall_back_to_unnamed() {
        let container = Container::new();
        container.register_instance("plain".to_string()).unwrap();

        let err = container.resolve::<Named<String, First>>().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.key(), Some(&Key::named::<String>("first")));
    }

    #[test_log::test]
    fn named_and_typed_dependencies_mix() {
        let container = Container::new();
        container
            .register_instance(42_u64)
            .unwrap()
            .register_named_instance("first", "name".to_string())
            .unwrap();

        let (number, name) = container
            .resolve::<(Arc<u64>, Named<String, First>)>()
            .unwrap();
        assert_eq!(*number, 42);
        assert_eq!(&*name, "name");
    }
}
