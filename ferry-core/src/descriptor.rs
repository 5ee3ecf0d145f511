use crate::{
    Model, Result, Value,
    model::{Accessor, MemberDescriptor, Schema},
};
use std::{
    any::{self, Any, TypeId},
    collections::HashMap,
    fmt,
    sync::{Arc, LazyLock, Mutex, OnceLock, PoisonError},
};

/// Registered shape of a model type: its members in declaration order and the
/// accessors used to read and assign them.
pub struct TypeDescriptor<M> {
    type_id: TypeId,
    type_name: &'static str,
    members: Box<[MemberDescriptor]>,
    accessors: Box<[Accessor<M>]>,
}

impl<M: Model> TypeDescriptor<M> {
    fn build() -> Self {
        log::debug!("Building the type descriptor of {}", any::type_name::<M>());
        let Schema { members, accessors } = M::schema(Schema::new());
        Self {
            type_id: TypeId::of::<M>(),
            type_name: any::type_name::<M>(),
            members: members.into_boxed_slice(),
            accessors: accessors.into_boxed_slice(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Every declared member, ignored ones included.
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Members taking part in mapping and staging, with their index.
    pub fn mapped_members(&self) -> impl Iterator<Item = (usize, &MemberDescriptor)> {
        self.members.iter().enumerate().filter(|(_, m)| !m.ignore)
    }

    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, model: &M, index: usize) -> Value {
        (self.accessors[index].get)(model)
    }

    pub fn set(&self, model: &mut M, index: usize, value: Value) -> Result<()> {
        (self.accessors[index].set)(model, value)
    }
}

impl<M> fmt::Debug for TypeDescriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("members", &self.members)
            .finish()
    }
}

type Slot = Arc<OnceLock<Arc<dyn Any + Send + Sync>>>;

static REGISTRY: LazyLock<Mutex<HashMap<TypeId, Slot>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Descriptor of `M`, built on first use.
///
/// Concurrent first calls for the same type wait on the same slot, so the
/// registration runs exactly once and nobody observes a partial descriptor.
pub fn describe<M: Model>() -> Arc<TypeDescriptor<M>> {
    let slot = REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(TypeId::of::<M>())
        .or_default()
        .clone();
    slot.get_or_init(|| Arc::new(TypeDescriptor::<M>::build()) as Arc<dyn Any + Send + Sync>)
        .clone()
        .downcast::<TypeDescriptor<M>>()
        .expect("The registry slot is keyed by the TypeId of its descriptor")
}
