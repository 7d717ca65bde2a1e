use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::entities::{Brand, Collection, Product, Review};
use crate::kind::EntityKind;

/// Emit the JSON Schema describing one generated entity.
pub fn entity_json_schema(kind: EntityKind) -> RootSchema {
    match kind {
        EntityKind::Brand => schema_for!(Brand),
        EntityKind::Collection => schema_for!(Collection),
        EntityKind::Product => schema_for!(Product),
        EntityKind::Review => schema_for!(Review),
    }
}
