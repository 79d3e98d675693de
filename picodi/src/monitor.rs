use crate::key::ComponentKey;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use tracing::debug;

pub type MonitorPtr = Arc<dyn BehaviorMonitor>;

/// Observability callback notified when a component registration's runtime
/// behavior is changed by decorating its adapter. Invoked exactly once per
/// wrapping decision, with the key and the descriptor of the newly
/// constructed wrapper.
#[cfg_attr(test, automock)]
pub trait BehaviorMonitor: Send + Sync {
    fn behavior_changed(&self, key: &ComponentKey, descriptor: &'static str);
}

/// Reports behavior changes through [mod@tracing] at debug level.
#[derive(Copy, Clone, Default, Eq, PartialEq)]
pub struct TracingMonitor;

impl BehaviorMonitor for TracingMonitor {
    fn behavior_changed(&self, key: &ComponentKey, descriptor: &'static str) {
        debug!("Changed behavior of component {key}: {descriptor}.");
    }
}

/// Discards all notifications.
#[derive(Copy, Clone, Default, Eq, PartialEq)]
pub struct NullMonitor;

impl BehaviorMonitor for NullMonitor {
    fn behavior_changed(&self, _key: &ComponentKey, _descriptor: &'static str) {}
}
