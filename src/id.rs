//! Identifier value generation.

use serde_json::Value;

use crate::entity::{EntityDescriptor, EntityId};
use crate::fragment::Params;

/// Produces identifier values for entities whose id property is marked
/// `generated`.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Value;
}

/// Random UUID identifiers, the default strategy.
#[derive(Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Value {
        Value::from(uuid::Uuid::new_v4().to_string())
    }
}

/// Assigns a generated identifier into the insert parameters when the
/// entity asks for one and the caller has not supplied a value already.
/// Returns the assigned value, if any.
pub fn assign_generated_id(
    entity: &EntityDescriptor,
    params: &mut Params,
    generator: &dyn IdGenerator,
) -> Option<Value> {
    let EntityId::Simple(id) = &entity.id else {
        return None;
    };
    if !id.generated {
        return None;
    }
    if params.get(&id.name).is_some_and(|v| !v.is_null()) {
        return None;
    }
    let value = generator.generate();
    params.set_value(&id.name, value.clone());
    Some(value)
}
