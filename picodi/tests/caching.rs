mod caching_test {
    use picodi::adapter::{AdapterPtr, FactoryAdapter};
    use picodi::behavior::{CacheHint, CachingPolicy};
    use picodi::container::{Container, ContainerBuilder};
    use picodi::instance_provider::{ComponentInstancePtr, TypedInstanceProvider};
    use picodi::key::ComponentKey;
    use picodi::monitor::BehaviorMonitor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Config {
        greeting: String,
    }

    struct Service {
        config: ComponentInstancePtr<Config>,
    }

    fn counting_factory(
        constructions: Arc<AtomicUsize>,
    ) -> impl Fn(
        &picodi::instance_provider::ContextPtr,
    ) -> Result<ComponentInstancePtr<usize>, picodi::error::ResolutionError>
           + Send
           + Sync
           + 'static {
        move |_| {
            Ok(ComponentInstancePtr::new(
                constructions.fetch_add(1, Ordering::SeqCst),
            ))
        }
    }

    fn build_with_policy(
        policy: CachingPolicy,
        constructions: Arc<AtomicUsize>,
    ) -> Arc<Container> {
        ContainerBuilder::new()
            .with_caching_policy(policy)
            .register_factory(ComponentKey::of::<usize>(), counting_factory(constructions))
            .unwrap()
            .build()
    }

    #[test]
    fn should_cache_everything_by_default() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let container = build_with_policy(CachingPolicy::CacheByDefault, constructions.clone());

        let first = container.instance_typed::<usize>().unwrap();
        let second = container.instance_typed::<usize>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_not_cache_without_explicit_request_when_opting_in() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let container = build_with_policy(CachingPolicy::OptIn, constructions.clone());

        let first = container.instance_typed::<usize>().unwrap();
        let second = container.instance_typed::<usize>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(constructions.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn should_cache_on_explicit_request_when_opting_in() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let container = ContainerBuilder::new()
            .with_caching_policy(CachingPolicy::OptIn)
            .register_as(
                Arc::new(FactoryAdapter::new(
                    ComponentKey::of::<usize>(),
                    counting_factory(constructions.clone()),
                )) as AdapterPtr<usize>,
                CacheHint::Cache,
            )
            .unwrap()
            .build();

        let first = container.instance_typed::<usize>().unwrap();
        let second = container.instance_typed::<usize>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_skip_caching_on_explicit_refusal() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let container = ContainerBuilder::new()
            .register_as(
                Arc::new(FactoryAdapter::new(
                    ComponentKey::of::<usize>(),
                    counting_factory(constructions.clone()),
                )) as AdapterPtr<usize>,
                CacheHint::NoCache,
            )
            .unwrap()
            .build();

        let first = container.instance_typed::<usize>().unwrap();
        let second = container.instance_typed::<usize>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(constructions.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn should_resolve_nested_dependencies_through_context() {
        let container = ContainerBuilder::new()
            .register_instance(
                ComponentKey::of::<Config>(),
                ComponentInstancePtr::new(Config {
                    greeting: "hello".to_string(),
                }),
            )
            .unwrap()
            .register_factory(ComponentKey::of::<Service>(), |context| {
                let config = context.instance::<Config>(&ComponentKey::of::<Config>())?;
                Ok(ComponentInstancePtr::new(Service { config }))
            })
            .unwrap()
            .build();

        let service = container.instance_typed::<Service>().unwrap();
        assert_eq!(service.config.greeting, "hello");
    }

    #[test]
    fn should_share_registered_instances() {
        let instance = ComponentInstancePtr::new(Config {
            greeting: "hello".to_string(),
        });

        let container = ContainerBuilder::new()
            .register_instance(ComponentKey::of::<Config>(), instance.clone())
            .unwrap()
            .build();

        assert!(Arc::ptr_eq(
            &container.instance_typed::<Config>().unwrap(),
            &instance
        ));
    }

    struct CountingMonitor {
        notifications: AtomicUsize,
    }

    impl BehaviorMonitor for CountingMonitor {
        fn behavior_changed(&self, _key: &ComponentKey, _descriptor: &'static str) {
            self.notifications.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn should_notify_monitor_once_per_wrapping_decision() {
        let monitor = Arc::new(CountingMonitor {
            notifications: AtomicUsize::new(0),
        });

        ContainerBuilder::new()
            .with_monitor(monitor.clone())
            .register_factory(ComponentKey::named::<usize>("cached"), |_| {
                Ok(ComponentInstancePtr::new(0usize))
            })
            .unwrap()
            .register_as(
                Arc::new(FactoryAdapter::new(
                    ComponentKey::named::<usize>("uncached"),
                    |_| Ok(ComponentInstancePtr::new(0usize)),
                )) as AdapterPtr<usize>,
                CacheHint::NoCache,
            )
            .unwrap()
            .build();

        // one wrap for the cached registration, none for the uncached one
        assert_eq!(monitor.notifications.load(Ordering::SeqCst), 1);
    }
}
