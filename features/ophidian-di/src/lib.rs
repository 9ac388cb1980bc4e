//! Deprecated entry point of the container.
//!
//! This crate has moved to [ophidian]. The aliases below behave exactly like the types they point to.
//!
//! ```rust
//! #![allow(deprecated)]
//! use ophidian_di::{container, UnresolvableDependencyError};
//!
//! let container = container();
//! container.register_instance(42_u32).unwrap();
//! assert_eq!(*container.require::<u32>().unwrap(), 42);
//!
//! let err: UnresolvableDependencyError = container.require::<String>().unwrap_err();
//! assert!(err.is_not_found());
//! ```

use std::sync::Once;

pub const DEPRECATION_NOTICE: &str =
    "The `ophidian-di` package has been deprecated. Please use `ophidian` instead.";

#[deprecated(since = "0.2.0", note = "`ophidian-di` has moved, use `ophidian::Container`")]
pub type DIContainer = ophidian::Container;

#[deprecated(
    since = "0.2.0",
    note = "`ophidian-di` has moved, use `ophidian::UnresolvableDependencyError`"
)]
pub type UnresolvableDependencyError = ophidian::UnresolvableDependencyError;

static NOTICE: Once = Once::new();

/// Logs the deprecation notice, once per process
///
/// Returns true for the call that logged it.
pub fn notify_deprecated() -> bool {
    let mut logged = false;
    NOTICE.call_once(|| {
        tracing::warn!("{DEPRECATION_NOTICE}");
        logged = true;
    });
    logged
}

/// Creates an empty container through the legacy entry point
#[deprecated(since = "0.2.0", note = "`ophidian-di` has moved, use `ophidian::Container::new`")]
#[allow(deprecated)]
pub fn container() -> DIContainer {
    notify_deprecated();
    ophidian::Container::new()
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use std::sync::Arc;

    use ophidian::{Lifetime, UnresolvableReason};

    use super::*;

    #[derive(Debug)]
    struct Logger;
    struct Service {
        logger: Arc<Logger>,
    }

    #[test_log::test]
    fn legacy_container_behaves_like_container() {
        let container: DIContainer = container();
        container
            .register_factory(Lifetime::Singleton, || Logger)
            .unwrap()
            .register_factory(Lifetime::Transient, |logger: Arc<Logger>| Service { logger })
            .unwrap();

        let first = container.require::<Service>().unwrap();
        let second = container.require::<Service>().unwrap();
        assert!(Arc::ptr_eq(&first.logger, &second.logger));
    }

    #[test_log::test]
    fn legacy_error_keeps_reasons() {
        let err: UnresolvableDependencyError = container().require::<Logger>().unwrap_err();
        assert_eq!(err.reason(), UnresolvableReason::NotFound);
        assert!(matches!(err, UnresolvableDependencyError::NotFound { .. }));
    }

    #[test]
    fn notice_is_logged_once() {
        container();
        assert!(!notify_deprecated());
    }
}
