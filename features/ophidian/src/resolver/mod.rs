use crate::{context::ResolutionContext, errors::UnresolvableDependencyError, types::DependencyInfo};

pub mod arc;
pub mod lazy;
pub mod named;

/// Something a provider can ask for as a dependency
pub trait Resolver: Sized + 'static {
    fn resolve(ctx: &mut ResolutionContext<'_>) -> Result<Self, UnresolvableDependencyError>;

    /// Keys this resolver needs, used for graph validation
    fn dependencies() -> Vec<DependencyInfo>;
}

macro_rules! impl_resolver_tuple {
    ($($member:ident),*) => {
        impl<$($member: Resolver,)*> Resolver for ($($member,)*) {
            #[allow(unused_variables)]
            fn resolve(ctx: &mut ResolutionContext<'_>) -> Result<Self, UnresolvableDependencyError> {
                Ok(($($member::resolve(ctx)?,)*))
            }

            fn dependencies() -> Vec<DependencyInfo> {
                #[allow(unused_mut)]
                let mut dependencies = Vec::new();
                $(dependencies.extend($member::dependencies());)*
                dependencies
            }
        }
    };
}

impl_resolver_tuple!();
impl_resolver_tuple!(A1);
impl_resolver_tuple!(A1, A2);
impl_resolver_tuple!(A1, A2, A3);
impl_resolver_tuple!(A1, A2, A3, A4);
impl_resolver_tuple!(A1, A2, A3, A4, A5);
impl_resolver_tuple!(A1, A2, A3, A4, A5, A6);
impl_resolver_tuple!(A1, A2, A3, A4, A5, A6, A7);
impl_resolver_tuple!(A1, A2, A3, A4, A5, A6, A7, A8);
