//! Forwarding-proxy support for thread-localized components.
//!
//! A proxied component is represented to callers by a single shared
//! placeholder object implementing the component's capability contract. The
//! placeholder holds no per-thread state; every operation invoked on it
//! resolves the calling thread's own instance through a [ProxyHandler] and
//! forwards to it. Forwarding is a plain method call, so `Result` errors and
//! panics raised by the real operation reach the caller unchanged - the proxy
//! adds no wrapping of its own.
//!
//! Placeholder types are generated at build time by the `#[contract]`
//! attribute, which implements [Proxiable] for the corresponding
//! `dyn Trait + Send + Sync` object type.

use crate::adapter::AdapterPtr;
use crate::error::ResolutionError;
use crate::instance_provider::{ComponentInstancePtr, InstanceProvider};
use crate::key::ComponentKey;
use std::sync::{Arc, Weak};

/// A facing type which can stand behind a generated forwarding proxy.
/// Normally implemented by the `#[contract]` attribute; manual
/// implementations must report a non-empty capability set, or proxy-mode
/// adapters will refuse to wrap the component.
pub trait Proxiable: Send + Sync + 'static {
    /// Names of the capability contracts the placeholder satisfies.
    fn contracts() -> &'static [&'static str];

    /// Builds the shared placeholder forwarding every operation through the
    /// given handler.
    fn proxy(handler: ProxyHandler<Self>) -> ComponentInstancePtr<Self>;
}

/// Resolves the calling thread's instance of a proxied component on behalf of
/// the generated forwarding code. The handler keeps only a weak reference to
/// the resolution context, so a placeholder stored in long-lived shared state
/// does not keep its container alive.
pub struct ProxyHandler<T: ?Sized + Send + Sync + 'static> {
    key: ComponentKey,
    delegate: AdapterPtr<T>,
    context: Weak<dyn InstanceProvider>,
}

impl<T: ?Sized + Send + Sync + 'static> ProxyHandler<T> {
    pub fn new(
        key: ComponentKey,
        delegate: AdapterPtr<T>,
        context: Weak<dyn InstanceProvider>,
    ) -> Self {
        Self {
            key,
            delegate,
            context,
        }
    }

    /// Key of the proxied component.
    #[inline]
    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    /// Resolves the calling thread's instance of the proxied component.
    pub fn instance(&self) -> Result<ComponentInstancePtr<T>, ResolutionError> {
        let context = self
            .context
            .upgrade()
            .ok_or_else(|| ResolutionError::ContextUnavailable(self.key.clone()))?;

        self.delegate.instance(&context)
    }

    /// Like [ProxyHandler::instance], but panics when resolution fails.
    /// Generated forwarding operations use this accessor, since an arbitrary
    /// contract operation has no channel for resolution errors. Operations
    /// with a `Result` return type still propagate the real instance's own
    /// errors unchanged.
    pub fn current_instance(&self) -> ComponentInstancePtr<T> {
        match self.instance() {
            Ok(instance) => instance,
            Err(error) => panic!(
                "cannot resolve thread-local component {}: {error}",
                self.key
            ),
        }
    }

    /// Compares a candidate against the calling thread's resolved instance.
    /// Identity follows the real instance, never the placeholder itself, so
    /// equality semantics stay consistent with the underlying component.
    pub fn is_current_instance(
        &self,
        candidate: &ComponentInstancePtr<T>,
    ) -> Result<bool, ResolutionError> {
        self.instance()
            .map(|instance| Arc::ptr_eq(&instance, candidate))
    }
}
