//! Behaviors decorate component adapters with instance-management policies.
//! [Cached] keeps one instance per container; whether a registration receives
//! it is decided by the container's [CachingPolicy] together with the
//! per-registration [CacheHint]. Thread-scoped behaviors live in
//! [thread_local](crate::thread_local).

use crate::adapter::{AdapterPtr, ComponentAdapter};
use crate::error::ResolutionError;
use crate::instance_provider::{ComponentInstancePtr, ContextPtr};
use crate::key::ComponentKey;
use once_cell::sync::OnceCell;

/// Per-registration caching request. The two explicit markers are mutually
/// exclusive by construction; [Inherit](CacheHint::Inherit) defers to the
/// container's [CachingPolicy].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CacheHint {
    #[default]
    Inherit,
    /// Wrap the registration in a [Cached] behavior.
    Cache,
    /// Never wrap the registration in a [Cached] behavior.
    NoCache,
}

/// Container-wide caching policy applied to registrations without an explicit
/// [CacheHint].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CachingPolicy {
    /// Cache every component unless its registration asks for
    /// [NoCache](CacheHint::NoCache).
    #[default]
    CacheByDefault,
    /// Cache only components explicitly registered with
    /// [Cache](CacheHint::Cache), reversing the default.
    OptIn,
}

impl CachingPolicy {
    /// Decides whether a registration with the given hint should be cached.
    pub fn should_cache(self, hint: CacheHint) -> bool {
        match (self, hint) {
            (_, CacheHint::Cache) => true,
            (_, CacheHint::NoCache) => false,
            (CachingPolicy::CacheByDefault, CacheHint::Inherit) => true,
            (CachingPolicy::OptIn, CacheHint::Inherit) => false,
        }
    }
}

/// Caches the first resolved instance and returns it to every caller on every
/// thread for the lifetime of the adapter. A failed construction is not
/// cached, so a later resolution retries.
pub struct Cached<T: ?Sized + Send + Sync + 'static> {
    delegate: AdapterPtr<T>,
    instance: OnceCell<ComponentInstancePtr<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Cached<T> {
    pub fn new(delegate: AdapterPtr<T>) -> Self {
        Self {
            delegate,
            instance: OnceCell::new(),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> ComponentAdapter<T> for Cached<T> {
    #[inline]
    fn key(&self) -> &ComponentKey {
        self.delegate.key()
    }

    #[inline]
    fn descriptor(&self) -> &'static str {
        "Cached"
    }

    fn instance(&self, context: &ContextPtr) -> Result<ComponentInstancePtr<T>, ResolutionError> {
        self.instance
            .get_or_try_init(|| self.delegate.instance(context))
            .map(Clone::clone)
    }
}

#[cfg(test)]
mod tests {
    use crate::adapter::{AdapterPtr, ComponentAdapter, FactoryAdapter};
    use crate::behavior::{CacheHint, Cached, CachingPolicy};
    use crate::error::ResolutionError;
    use crate::instance_provider::{
        AnyInstance, ComponentInstancePtr, ContextPtr, InstanceProvider,
    };
    use crate::key::ComponentKey;
    use std::fmt::{Display, Formatter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct EmptyProvider;

    impl InstanceProvider for EmptyProvider {
        fn instance_any(
            self: Arc<Self>,
            key: &ComponentKey,
        ) -> Result<AnyInstance, ResolutionError> {
            Err(ResolutionError::UnknownKey(key.clone()))
        }
    }

    #[derive(Debug)]
    struct TestError;

    impl Display for TestError {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("test error")
        }
    }

    impl std::error::Error for TestError {}

    fn counting_adapter(constructions: Arc<AtomicUsize>) -> AdapterPtr<usize> {
        Arc::new(FactoryAdapter::new(ComponentKey::of::<usize>(), move |_| {
            Ok(ComponentInstancePtr::new(
                constructions.fetch_add(1, Ordering::SeqCst),
            ))
        }))
    }

    #[test]
    fn should_resolve_explicit_hints_regardless_of_policy() {
        for policy in [CachingPolicy::CacheByDefault, CachingPolicy::OptIn] {
            assert!(policy.should_cache(CacheHint::Cache));
            assert!(!policy.should_cache(CacheHint::NoCache));
        }
    }

    #[test]
    fn should_reverse_default_when_opting_in() {
        assert!(CachingPolicy::CacheByDefault.should_cache(CacheHint::Inherit));
        assert!(!CachingPolicy::OptIn.should_cache(CacheHint::Inherit));
    }

    #[test]
    fn should_construct_once() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let cached = Cached::new(counting_adapter(constructions.clone()));

        let context: ContextPtr = Arc::new(EmptyProvider);
        let first = cached.instance(&context).unwrap();
        let second = cached.instance(&context).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_not_cache_failed_construction() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempt_counter = attempts.clone();
        let key = ComponentKey::of::<usize>();
        let flaky_key = key.clone();
        let cached = Cached::new(Arc::new(FactoryAdapter::new(key, move |_| {
            if attempt_counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ResolutionError::construction(flaky_key.clone(), TestError))
            } else {
                Ok(ComponentInstancePtr::new(0usize))
            }
        })) as AdapterPtr<usize>);

        let context: ContextPtr = Arc::new(EmptyProvider);
        assert!(matches!(
            cached.instance(&context),
            Err(ResolutionError::Construction { .. })
        ));
        assert!(cached.instance(&context).is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
