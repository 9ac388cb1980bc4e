/// What happens when a key is registered a second time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The new registration replaces the old one, including its cached singleton
    #[default]
    Replace,
    /// The second registration fails with [crate::RegistrationError::AlreadyRegistered]
    Reject,
}

/// Container settings
///
/// # Example
/// ```rust
/// use ophidian::{Container, ContainerConfig, DuplicatePolicy};
///
/// let container = Container::with_config(ContainerConfig {
///     duplicate_policy: DuplicatePolicy::Reject,
///     ..Default::default()
/// });
///
/// container.register_instance(8080_u16).unwrap();
/// assert!(container.register_instance(9090_u16).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerConfig {
    pub duplicate_policy: DuplicatePolicy,
    /// Check the whole dependency graph in [crate::ContainerBuilder::build]
    pub validate_on_build: bool,
}

impl ContainerConfig {
    /// Rejects duplicates and validates the graph on build
    pub fn strict() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            validate_on_build: true,
        }
    }
}
