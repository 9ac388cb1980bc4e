use std::{
    any::{Any, TypeId},
    borrow::Cow,
    fmt,
    sync::Arc,
};

/// Errors returned by user factories and constructors
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// A container is shared across threads
/// So anything injectable needs to be Send + Sync + 'static
///
/// Unsized types are allowed, so `dyn Trait` can be used as an interface key.
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Type erased, shared instance produced by a provider
///
/// Internally this always holds an `Arc<T>`, which allows unsized `T`.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<T: Injectable>(instance: T) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    pub(crate) fn from_arc<T: ?Sized + Injectable>(shared: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            instance: Arc::new(shared),
        }
    }

    /// Downcasts into the shared value
    ///
    /// Returns the actual type name on mismatch.
    pub fn downcast<T: ?Sized + Injectable>(&self) -> Result<Arc<T>, &'static str> {
        self.instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(self.info.type_name)
    }

    /// True if both handles point to the same value
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}
impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Information about a dependency of a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInfo {
    /// The required key
    pub key: Key,
    /// If it is optional or required
    pub optional: bool,
    /// If the dependency is resolved lazily
    pub lazy: bool,
}
impl DependencyInfo {
    pub fn required(key: Key) -> Self {
        DependencyInfo {
            key,
            optional: false,
            lazy: false,
        }
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Identifies a dependency contract
///
/// A key is the provided type, optionally qualified by a name.
/// `Key::of::<String>()` and `Key::named::<String>("hostname")` are different keys.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key {
    pub type_info: TypeInfo,
    pub name: Option<Cow<'static, str>>,
}
impl Key {
    pub fn of<T: ?Sized + 'static>() -> Key {
        Key {
            type_info: TypeInfo::of::<T>(),
            name: None,
        }
    }

    pub fn named<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Key {
        Key {
            type_info: TypeInfo::of::<T>(),
            name: Some(name.into()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_info.type_name
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.type_info),
            None => write!(f, "{}", self.type_info),
        }
    }
}

/// How often a provider is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// A new instance for every resolution
    Transient,
    /// One instance, cached for the lifetime of the container
    Singleton,
}
impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Transient => f.write_str("transient"),
            Lifetime::Singleton => f.write_str("singleton"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }
    struct English;
    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn named_and_unnamed_keys_differ() {
        assert_ne!(Key::of::<String>(), Key::named::<String>("hostname"));
        assert_eq!(
            Key::named::<String>("hostname"),
            Key::named::<String>(String::from("hostname"))
        );
    }

    #[test]
    fn key_display() {
        assert_eq!(Key::of::<u32>().to_string(), "u32");
        assert_eq!(Key::named::<u32>("port").to_string(), "port: u32");
    }

    #[test]
    fn instance_downcasts_unsized() {
        let shared: Arc<dyn Greeter> = Arc::new(English);
        let instance = Instance::from_arc(shared.clone());

        let greeter = instance.downcast::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet(), "hello");
        assert!(Arc::ptr_eq(&greeter, &shared));
        assert_eq!(instance.downcast::<English>().err(), Some(instance.info.type_name));
    }

    #[test]
    fn cloned_instances_share_value() {
        let instance = Instance::new(5_u8);
        let clone = instance.clone();
        assert!(instance.ptr_eq(&clone));
        assert!(!instance.ptr_eq(&Instance::new(5_u8)));
    }
}
