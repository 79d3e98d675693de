//! Component adapters implement the generic "given a resolution context,
//! return an instance" contract shared by all behaviors in the framework.
//! Base adapters construct or hand out instances directly; decorating
//! adapters (see [behavior](crate::behavior) and
//! [thread_local](crate::thread_local)) wrap a delegate and add a policy on
//! top of it.

use crate::error::ResolutionError;
use crate::instance_provider::{ComponentInstancePtr, ContextPtr};
use crate::key::ComponentKey;
use std::sync::Arc;

/// Shared pointer to a component adapter.
pub type AdapterPtr<T> = Arc<dyn ComponentAdapter<T>>;

/// Resolves instances of a single logical component.
pub trait ComponentAdapter<T: ?Sized + Send + Sync + 'static>: Send + Sync {
    /// Key of the component this adapter resolves.
    fn key(&self) -> &ComponentKey;

    /// Short tag identifying the adapter's behavior, used for monitoring and
    /// diagnostics.
    fn descriptor(&self) -> &'static str;

    /// Resolves an instance for the calling thread, using the given context
    /// for nested lookups.
    fn instance(&self, context: &ContextPtr) -> Result<ComponentInstancePtr<T>, ResolutionError>;
}

type Factory<T> =
    Box<dyn Fn(&ContextPtr) -> Result<ComponentInstancePtr<T>, ResolutionError> + Send + Sync>;

/// Adapter constructing a fresh instance on every resolution by invoking a
/// factory closure. The closure receives the resolution context and can look
/// up further components through
/// [TypedInstanceProvider](crate::instance_provider::TypedInstanceProvider).
pub struct FactoryAdapter<T: ?Sized + Send + Sync + 'static> {
    key: ComponentKey,
    factory: Factory<T>,
}

impl<T: ?Sized + Send + Sync + 'static> FactoryAdapter<T> {
    pub fn new(
        key: ComponentKey,
        factory: impl Fn(&ContextPtr) -> Result<ComponentInstancePtr<T>, ResolutionError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            key,
            factory: Box::new(factory),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> ComponentAdapter<T> for FactoryAdapter<T> {
    #[inline]
    fn key(&self) -> &ComponentKey {
        &self.key
    }

    #[inline]
    fn descriptor(&self) -> &'static str {
        "Factory"
    }

    fn instance(&self, context: &ContextPtr) -> Result<ComponentInstancePtr<T>, ResolutionError> {
        (self.factory)(context)
    }
}

/// Adapter handing out an instance supplied at registration time. All callers
/// on all threads share the one instance.
pub struct InstanceAdapter<T: ?Sized + Send + Sync + 'static> {
    key: ComponentKey,
    instance: ComponentInstancePtr<T>,
}

impl<T: ?Sized + Send + Sync + 'static> InstanceAdapter<T> {
    pub fn new(key: ComponentKey, instance: ComponentInstancePtr<T>) -> Self {
        Self { key, instance }
    }
}

impl<T: ?Sized + Send + Sync + 'static> ComponentAdapter<T> for InstanceAdapter<T> {
    #[inline]
    fn key(&self) -> &ComponentKey {
        &self.key
    }

    #[inline]
    fn descriptor(&self) -> &'static str {
        "Instance"
    }

    fn instance(&self, _context: &ContextPtr) -> Result<ComponentInstancePtr<T>, ResolutionError> {
        Ok(self.instance.clone())
    }
}
