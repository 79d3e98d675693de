use picodi::adapter::{AdapterPtr, FactoryAdapter};
use picodi::behavior::{CacheHint, CachingPolicy};
use picodi::container::ContainerBuilder;
use picodi::instance_provider::{ComponentInstancePtr, TypedInstanceProvider};
use picodi::key::ComponentKey;
use std::sync::Arc;

struct Worker;

fn worker_adapter(name: &str) -> AdapterPtr<Worker> {
    Arc::new(FactoryAdapter::new(
        ComponentKey::named::<Worker>(name),
        |_| Ok(ComponentInstancePtr::new(Worker)),
    ))
}

//noinspection DuplicatedCode
// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // OptIn reverses the default-to-cached behavior: only registrations
    // explicitly marked with CacheHint::Cache receive a cache
    let container = ContainerBuilder::new()
        .with_caching_policy(CachingPolicy::OptIn)
        .register(worker_adapter("fresh"))
        .expect("error registering fresh worker")
        .register_as(worker_adapter("shared"), CacheHint::Cache)
        .expect("error registering shared worker")
        .build();

    let first = container
        .instance_by_name::<Worker>("fresh")
        .expect("error resolving worker");
    let second = container
        .instance_by_name::<Worker>("fresh")
        .expect("error resolving worker");

    // prints "fresh workers are distinct: true"
    println!("fresh workers are distinct: {}", !Arc::ptr_eq(&first, &second));

    let first = container
        .instance_by_name::<Worker>("shared")
        .expect("error resolving worker");
    let second = container
        .instance_by_name::<Worker>("shared")
        .expect("error resolving worker");

    // prints "shared workers are identical: true"
    println!("shared workers are identical: {}", Arc::ptr_eq(&first, &second));
}
