use crate::error::ResolutionError;
use crate::key::ComponentKey;
use std::any::Any;
use std::sync::Arc;

/// Shared pointer to a component instance.
pub type ComponentInstancePtr<T> = Arc<T>;

/// Type-erased component instance as transported between a provider and typed
/// callers. The box holds a [ComponentInstancePtr] of the key's facing type
/// and is recovered by downcasting.
pub type AnyInstance = Box<dyn Any + Send + Sync>;

/// Shared handle to a resolution context, as passed to component adapters.
pub type ContextPtr = Arc<dyn InstanceProvider>;

/// Generic provider for component instances, keyed by [ComponentKey].
pub trait InstanceProvider: Send + Sync + 'static {
    /// Tries to return the instance registered for the given key.
    fn instance_any(self: Arc<Self>, key: &ComponentKey) -> Result<AnyInstance, ResolutionError>;
}

/// Helper trait for [InstanceProvider] providing strongly-typed access.
pub trait TypedInstanceProvider {
    /// Typesafe version of [InstanceProvider::instance_any].
    fn instance<T: ?Sized + Send + Sync + 'static>(
        &self,
        key: &ComponentKey,
    ) -> Result<ComponentInstancePtr<T>, ResolutionError>;

    /// Tries to get an instance like [TypedInstanceProvider::instance] does,
    /// but returns `None` for an unregistered key.
    fn instance_option<T: ?Sized + Send + Sync + 'static>(
        &self,
        key: &ComponentKey,
    ) -> Result<Option<ComponentInstancePtr<T>>, ResolutionError>;

    /// Resolves the unnamed component registered for type `T`.
    fn instance_typed<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<ComponentInstancePtr<T>, ResolutionError>;

    /// Resolves the component registered for type `T` under the given name.
    fn instance_by_name<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<ComponentInstancePtr<T>, ResolutionError>;
}

impl<P: InstanceProvider + ?Sized> TypedInstanceProvider for Arc<P> {
    fn instance<T: ?Sized + Send + Sync + 'static>(
        &self,
        key: &ComponentKey,
    ) -> Result<ComponentInstancePtr<T>, ResolutionError> {
        Arc::clone(self).instance_any(key).and_then(|instance| {
            instance
                .downcast::<ComponentInstancePtr<T>>()
                .map(|instance| *instance)
                .map_err(|_| ResolutionError::IncompatibleKey(key.clone()))
        })
    }

    fn instance_option<T: ?Sized + Send + Sync + 'static>(
        &self,
        key: &ComponentKey,
    ) -> Result<Option<ComponentInstancePtr<T>>, ResolutionError> {
        match self.instance::<T>(key) {
            Ok(instance) => Ok(Some(instance)),
            Err(ResolutionError::UnknownKey(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    #[inline]
    fn instance_typed<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<ComponentInstancePtr<T>, ResolutionError> {
        self.instance(&ComponentKey::of::<T>())
    }

    #[inline]
    fn instance_by_name<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<ComponentInstancePtr<T>, ResolutionError> {
        self.instance(&ComponentKey::named::<T>(name))
    }
}
