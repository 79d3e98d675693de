use picodi::container::ContainerBuilder;
use picodi::instance_provider::{ComponentInstancePtr, TypedInstanceProvider};
use picodi::key::ComponentKey;

struct Greeting(String);

// this component depends on Greeting, resolved through the container
struct GreetingService {
    greeting: ComponentInstancePtr<Greeting>,
}

impl GreetingService {
    fn greet(&self) {
        println!("{}", self.greeting.0);
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // components are registered against a builder; the default policy caches
    // every component within the container
    let container = ContainerBuilder::new()
        .register_instance(
            ComponentKey::of::<Greeting>(),
            ComponentInstancePtr::new(Greeting("Hello world!".to_string())),
        )
        .expect("error registering greeting")
        .register_factory(ComponentKey::of::<GreetingService>(), |context| {
            // factories can look up their own dependencies in the context
            let greeting = context.instance::<Greeting>(&ComponentKey::of::<Greeting>())?;
            Ok(ComponentInstancePtr::new(GreetingService { greeting }))
        })
        .expect("error registering service")
        .build();

    let service = container
        .instance_typed::<GreetingService>()
        .expect("error resolving service");

    // prints "Hello world!"
    service.greet();
}
