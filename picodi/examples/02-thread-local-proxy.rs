use picodi::adapter::{AdapterPtr, FactoryAdapter};
use picodi::container::ContainerBuilder;
use picodi::contract;
use picodi::instance_provider::{ComponentInstancePtr, TypedInstanceProvider};
use picodi::key::ComponentKey;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;

// the capability contract the placeholder will implement
#[contract]
trait Incrementable: Send + Sync {
    fn increment(&self);
    fn value(&self) -> i64;
}

type SharedIncrementable = dyn Incrementable + Send + Sync;

#[derive(Default)]
struct Counter {
    count: AtomicI64,
}

impl Incrementable for Counter {
    fn increment(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn value(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let adapter: AdapterPtr<SharedIncrementable> = Arc::new(FactoryAdapter::new(
        ComponentKey::of::<SharedIncrementable>(),
        |_| {
            Ok(ComponentInstancePtr::new(Counter::default())
                as ComponentInstancePtr<SharedIncrementable>)
        },
    ));

    let container = ContainerBuilder::new()
        .register_thread_localized(adapter)
        .expect("error registering counter")
        .build();

    // every thread sees this one placeholder...
    let counter = container
        .instance_typed::<SharedIncrementable>()
        .expect("error resolving counter");
    counter.increment();
    counter.increment();

    let shared = counter.clone();
    let from_worker = thread::spawn(move || {
        // ...but each thread counts on its own instance
        shared.increment();
        shared.value()
    })
    .join()
    .expect("worker panicked");

    // prints "worker: 1, main: 2"
    println!("worker: {from_worker}, main: {}", counter.value());
}
