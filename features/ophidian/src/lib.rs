//! Ophidian is a small dependency injection container keyed by type.
//!
//! Providers are registered for a [Key] - a type, an interface (`dyn Trait`) or a named token -
//! with a [Lifetime]. Resolving a key runs its provider, resolving the provider's own dependencies first.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use ophidian::{Container, Lifetime};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .register_shared_factory(Lifetime::Singleton, || Arc::new(English) as Arc<dyn Greeter>)
//!     .unwrap();
//!
//! let greeter = container.require::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```
//!
//! Ophidian consists of the following components:
//!
//! 1. Container - the registry, resolving keys into instances
//! 2. Builder - for registering everything during setup
//! 3. Resolvers - what a provider can depend on: `Arc<T>`, `Option<_>`, [Lazy], [Named] and tuples
//! 4. Dependency Graph - for validating all registrations at once
//! 5. Errors - [UnresolvableDependencyError] tells a missing registration apart from a cycle

pub mod builder;
pub mod config;
pub mod container;
pub mod context;
pub mod dependency_graph;
pub mod errors;
pub mod factories;
pub mod registration;
pub mod resolver;
pub mod types;
mod wait_graph;

pub use builder::ContainerBuilder;
pub use config::{ContainerConfig, DuplicatePolicy};
pub use container::Container;
pub use context::ResolutionContext;
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DependencyGraphErrors};
pub use errors::{BuildError, RegistrationError, UnresolvableDependencyError, UnresolvableReason};
pub use factories::{Construct, FactoryFn, InstanceFactory};
pub use registration::Provider;
pub use resolver::{
    lazy::Lazy,
    named::{Name, Named},
    Resolver,
};
pub use types::{DependencyInfo, DynError, Injectable, Instance, Key, Lifetime, TypeInfo};
