//! Thread-scoped component behaviors. Both adapters in this module guarantee
//! that every thread works with its own instance of a component; they differ
//! in how far the guarantee reaches.
//!
//! [ThreadCached] relies on each thread resolving the component itself: the
//! resolving thread constructs and keeps its own instance. This is sufficient
//! when the architecture ensures that the thread creating a component is also
//! its only user, e.g. a worker resolving its collaborators at the start of
//! every job. It breaks down as soon as another, shared component stores the
//! resolved reference, since that reference may have been created on a
//! different thread.
//!
//! [ThreadLocalized] closes that gap. Resolution returns a single shared
//! placeholder implementing the component's capability contract, and every
//! operation invoked on the placeholder resolves the calling thread's own
//! instance before forwarding. Even a reference stored inside some long-lived
//! shared object therefore always operates on the caller's instance.
//!
//! ```
//! use picodi::adapter::{AdapterPtr, FactoryAdapter};
//! use picodi::container::ContainerBuilder;
//! use picodi::contract;
//! use picodi::instance_provider::{ComponentInstancePtr, TypedInstanceProvider};
//! use picodi::key::ComponentKey;
//! use std::sync::Arc;
//!
//! #[contract]
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! type SharedGreeter = dyn Greeter + Send + Sync;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let adapter: AdapterPtr<SharedGreeter> = Arc::new(FactoryAdapter::new(
//!     ComponentKey::of::<SharedGreeter>(),
//!     |_| Ok(ComponentInstancePtr::new(English) as ComponentInstancePtr<SharedGreeter>),
//! ));
//!
//! let container = ContainerBuilder::new()
//!     .register_thread_localized(adapter)?
//!     .build();
//!
//! let greeter = container.instance_typed::<SharedGreeter>()?;
//! assert_eq!(greeter.greet(), "hello");
//! # Ok(())
//! # }
//! ```

use crate::adapter::{AdapterPtr, ComponentAdapter};
use crate::error::{CompositionError, ResolutionError};
use crate::instance_provider::{ComponentInstancePtr, ContextPtr};
use crate::key::ComponentKey;
use crate::proxy::{Proxiable, ProxyHandler};
use fxhash::FxHashMap;
use itertools::Itertools;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    // all slots of the calling thread, keyed by slot id; released when the
    // thread exits
    static SLOTS: RefCell<FxHashMap<u64, Box<dyn Any>>> = RefCell::new(FxHashMap::default());
}

/// A per-thread storage cell holding at most one instance per thread. Storage
/// lives in the accessing threads themselves: a value stored from one thread
/// is invisible to every other thread and is released when its thread exits.
/// Dropping the slot releases the dropping thread's value immediately; values
/// held by other live threads remain until those threads exit.
pub struct ThreadLocalSlot<T: ?Sized> {
    id: u64,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> ThreadLocalSlot<T> {
    pub fn new() -> Self {
        Self {
            id: NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed),
            _marker: PhantomData,
        }
    }

    /// Returns the calling thread's stored instance, if any.
    pub fn get(&self) -> Option<ComponentInstancePtr<T>> {
        SLOTS.with(|slots| {
            slots
                .borrow()
                .get(&self.id)
                .and_then(|instance| instance.downcast_ref::<ComponentInstancePtr<T>>())
                .cloned()
        })
    }

    /// Stores an instance for the calling thread, replacing any previous one.
    pub fn set(&self, instance: ComponentInstancePtr<T>) {
        SLOTS.with(|slots| {
            slots.borrow_mut().insert(self.id, Box::new(instance));
        });
    }

    /// Removes the calling thread's stored instance. The next access from
    /// this thread constructs a fresh one.
    pub fn clear(&self) {
        SLOTS.with(|slots| {
            slots.borrow_mut().remove(&self.id);
        });
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for ThreadLocalSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Drop for ThreadLocalSlot<T> {
    fn drop(&mut self) {
        // try_with: the slot may be dropped during thread teardown, after the
        // thread's storage is already gone
        let _ = SLOTS.try_with(|slots| {
            slots.borrow_mut().remove(&self.id);
        });
    }
}

/// Caches the delegate's instances per calling thread. The first resolution
/// on a thread constructs and stores an instance; later resolutions on the
/// same thread return the identical instance; no thread ever observes another
/// thread's instance. A failed construction leaves the thread's slot empty,
/// so a later call retries.
pub struct ThreadCached<T: ?Sized + Send + Sync + 'static> {
    delegate: AdapterPtr<T>,
    slot: ThreadLocalSlot<T>,
}

impl<T: ?Sized + Send + Sync + 'static> ThreadCached<T> {
    pub fn new(delegate: AdapterPtr<T>) -> Self {
        Self {
            delegate,
            slot: ThreadLocalSlot::new(),
        }
    }

    /// Drops the calling thread's cached instance.
    pub fn clear_current_thread(&self) {
        self.slot.clear();
    }
}

impl<T: ?Sized + Send + Sync + 'static> ComponentAdapter<T> for ThreadCached<T> {
    #[inline]
    fn key(&self) -> &ComponentKey {
        self.delegate.key()
    }

    #[inline]
    fn descriptor(&self) -> &'static str {
        "ThreadCached"
    }

    fn instance(&self, context: &ContextPtr) -> Result<ComponentInstancePtr<T>, ResolutionError> {
        if let Some(instance) = self.slot.get() {
            return Ok(instance);
        }

        let instance = self.delegate.instance(context)?;
        self.slot.set(instance.clone());
        Ok(instance)
    }
}

/// Makes a component thread-local behind a shared forwarding placeholder.
///
/// Resolution lazily builds the placeholder once and then returns it to every
/// caller. The placeholder forwards each operation to the calling thread's
/// own instance, resolved through an internal [ThreadCached] around the
/// delegate, so thread locality holds even for references stored by other
/// components. Requires the facing type to declare at least one capability
/// contract; see [Proxiable].
pub struct ThreadLocalized<T: ?Sized + Proxiable> {
    delegate: Arc<ThreadCached<T>>,
    placeholder: OnceCell<ComponentInstancePtr<T>>,
}

impl<T: ?Sized + Proxiable> ThreadLocalized<T> {
    /// Wraps the delegate, failing if `T` declares no capability contracts.
    pub fn new(delegate: AdapterPtr<T>) -> Result<Self, CompositionError> {
        let contracts = T::contracts();
        if contracts.is_empty() {
            return Err(CompositionError::NoContracts {
                implementation: delegate.key().type_name(),
            });
        }

        debug!(
            "Proxying component {} behind contracts [{}].",
            delegate.key(),
            contracts.iter().join(", ")
        );

        Ok(Self {
            delegate: Arc::new(ThreadCached::new(delegate)),
            placeholder: OnceCell::new(),
        })
    }
}

impl<T: ?Sized + Proxiable> ComponentAdapter<T> for ThreadLocalized<T> {
    #[inline]
    fn key(&self) -> &ComponentKey {
        self.delegate.key()
    }

    #[inline]
    fn descriptor(&self) -> &'static str {
        "ThreadLocal"
    }

    fn instance(&self, context: &ContextPtr) -> Result<ComponentInstancePtr<T>, ResolutionError> {
        let placeholder = self.placeholder.get_or_init(|| {
            let handler = ProxyHandler::new(
                self.key().clone(),
                Arc::clone(&self.delegate) as AdapterPtr<T>,
                Arc::downgrade(context),
            );

            T::proxy(handler)
        });

        Ok(placeholder.clone())
    }
}
