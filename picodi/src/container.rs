//! Container assembly and resolution. [ContainerBuilder] collects component
//! registrations, applying the configured [CachingPolicy] and the requested
//! thread-scoping behaviors as adapters are added; [Container] is the
//! resulting immutable registry. Instances are resolved through the
//! [TypedInstanceProvider](crate::instance_provider::TypedInstanceProvider)
//! facade on the built `Arc<Container>`, which also serves as the resolution
//! context handed to adapters.
//!
//! Registration-time wrapping decisions are reported to the configured
//! [BehaviorMonitor](crate::monitor::BehaviorMonitor), once per decision.

use crate::adapter::{AdapterPtr, ComponentAdapter, FactoryAdapter, InstanceAdapter};
use crate::behavior::{CacheHint, Cached, CachingPolicy};
use crate::error::{CompositionError, ResolutionError};
use crate::instance_provider::{
    AnyInstance, ComponentInstancePtr, ContextPtr, InstanceProvider,
};
use crate::key::ComponentKey;
use crate::monitor::{MonitorPtr, TracingMonitor};
use crate::proxy::Proxiable;
use crate::thread_local::{ThreadCached, ThreadLocalized};
use derivative::Derivative;
use fxhash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

type ResolveAnyFn = Box<dyn Fn(&ContextPtr) -> Result<AnyInstance, ResolutionError> + Send + Sync>;

#[derive(Derivative)]
#[derivative(Debug)]
struct Registration {
    descriptor: &'static str,

    #[derivative(Debug = "ignore")]
    resolve_any: ResolveAnyFn,
}

/// Builder for [Container] with sensible defaults, for easy assembly.
pub struct ContainerBuilder {
    registrations: FxHashMap<ComponentKey, Registration>,
    caching_policy: CachingPolicy,
    monitor: MonitorPtr,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    /// Creates a new builder with the default caching policy and a
    /// [TracingMonitor].
    pub fn new() -> Self {
        Self {
            registrations: Default::default(),
            caching_policy: Default::default(),
            monitor: Arc::new(TracingMonitor),
        }
    }

    /// Sets the container-wide caching policy.
    pub fn with_caching_policy(mut self, caching_policy: CachingPolicy) -> Self {
        self.caching_policy = caching_policy;
        self
    }

    /// Sets the monitor notified about behavior changes.
    pub fn with_monitor(mut self, monitor: MonitorPtr) -> Self {
        self.monitor = monitor;
        self
    }

    /// Registers an adapter under its own key, applying the container's
    /// caching policy.
    pub fn register<T: ?Sized + Send + Sync + 'static>(
        self,
        adapter: AdapterPtr<T>,
    ) -> Result<Self, CompositionError> {
        self.register_as(adapter, CacheHint::Inherit)
    }

    /// Registers an adapter with an explicit caching request overriding the
    /// container's policy.
    pub fn register_as<T: ?Sized + Send + Sync + 'static>(
        self,
        adapter: AdapterPtr<T>,
        hint: CacheHint,
    ) -> Result<Self, CompositionError> {
        let adapter = if self.caching_policy.should_cache(hint) {
            let cached: AdapterPtr<T> = Arc::new(Cached::new(adapter));
            self.monitor
                .behavior_changed(cached.key(), cached.descriptor());
            cached
        } else {
            adapter
        };

        self.insert(adapter)
    }

    /// Registers a factory closure for the given key, applying the
    /// container's caching policy.
    pub fn register_factory<T: ?Sized + Send + Sync + 'static>(
        self,
        key: ComponentKey,
        factory: impl Fn(&ContextPtr) -> Result<ComponentInstancePtr<T>, ResolutionError>
            + Send
            + Sync
            + 'static,
    ) -> Result<Self, CompositionError> {
        self.register(Arc::new(FactoryAdapter::new(key, factory)))
    }

    /// Registers a pre-built instance for the given key.
    pub fn register_instance<T: ?Sized + Send + Sync + 'static>(
        self,
        key: ComponentKey,
        instance: ComponentInstancePtr<T>,
    ) -> Result<Self, CompositionError> {
        self.register(Arc::new(InstanceAdapter::new(key, instance)))
    }

    /// Registers an adapter decorated for direct-mode thread locality: each
    /// thread constructs and keeps its own instance. Bypasses the caching
    /// policy, since a shared cache would defeat thread locality.
    pub fn register_thread_cached<T: ?Sized + Send + Sync + 'static>(
        self,
        adapter: AdapterPtr<T>,
    ) -> Result<Self, CompositionError> {
        let wrapped: AdapterPtr<T> = Arc::new(ThreadCached::new(adapter));
        self.monitor
            .behavior_changed(wrapped.key(), wrapped.descriptor());
        self.insert(wrapped)
    }

    /// Registers an adapter decorated for proxy-mode thread locality: all
    /// callers share one placeholder whose operations resolve the calling
    /// thread's own instance. Fails if `T` declares no capability contracts.
    /// Bypasses the caching policy, since a shared cache would defeat thread
    /// locality.
    pub fn register_thread_localized<T: ?Sized + Proxiable>(
        self,
        adapter: AdapterPtr<T>,
    ) -> Result<Self, CompositionError> {
        let wrapped: AdapterPtr<T> = Arc::new(ThreadLocalized::new(adapter)?);
        self.monitor
            .behavior_changed(wrapped.key(), wrapped.descriptor());
        self.insert(wrapped)
    }

    fn insert<T: ?Sized + Send + Sync + 'static>(
        mut self,
        adapter: AdapterPtr<T>,
    ) -> Result<Self, CompositionError> {
        let key = adapter.key().clone();
        if self.registrations.contains_key(&key) {
            return Err(CompositionError::DuplicateKey(key));
        }

        let registration = Registration {
            descriptor: adapter.descriptor(),
            resolve_any: Box::new(move |context| {
                adapter
                    .instance(context)
                    .map(|instance| Box::new(instance) as AnyInstance)
            }),
        };

        self.registrations.insert(key, registration);
        Ok(self)
    }

    /// Builds the resulting [Container].
    pub fn build(self) -> Arc<Container> {
        debug!(
            "Assembled container with {} component registrations.",
            self.registrations.len()
        );

        Arc::new(Container {
            registrations: self.registrations,
        })
    }
}

/// An immutable registry of component adapters, resolving instances by
/// [ComponentKey]. Containers are assembled through [ContainerBuilder] and
/// always live behind an [Arc], which doubles as the resolution context
/// handed to adapters; resolve instances through the
/// [TypedInstanceProvider](crate::instance_provider::TypedInstanceProvider)
/// facade.
#[derive(Debug)]
pub struct Container {
    registrations: FxHashMap<ComponentKey, Registration>,
}

impl Container {
    /// Descriptor of the adapter registered for the given key, if any.
    pub fn descriptor(&self, key: &ComponentKey) -> Option<&'static str> {
        self.registrations
            .get(key)
            .map(|registration| registration.descriptor)
    }
}

impl InstanceProvider for Container {
    fn instance_any(self: Arc<Self>, key: &ComponentKey) -> Result<AnyInstance, ResolutionError> {
        let registration = self
            .registrations
            .get(key)
            .ok_or_else(|| ResolutionError::UnknownKey(key.clone()))?;

        let context: ContextPtr = Arc::clone(&self) as ContextPtr;
        (registration.resolve_any)(&context)
    }
}
