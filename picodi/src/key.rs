use std::any::{type_name, TypeId};
use std::fmt::{Display, Formatter};

/// Identifies a logical component within a container. A key is built from the
/// facing type - the type instances are resolved as, which can be a concrete
/// type or a `dyn Contract + Send + Sync` object type - plus an optional
/// application-supplied name for distinguishing multiple components of the
/// same type. Keys are immutable once created.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ComponentKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<String>,
}

impl ComponentKey {
    /// Creates a key for the given facing type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: None,
        }
    }

    /// Creates a named key for the given facing type.
    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::of::<T>()
        }
    }

    /// Name of the facing type, captured when the key was created.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Application-supplied name, if any.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Display for ComponentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ('{}')", self.type_name, name),
            None => f.write_str(self.type_name),
        }
    }
}
