//! Entity and property descriptors.
//!
//! Descriptors are constructed explicitly through [`EntityDescriptor::builder`]
//! (or deserialized from configuration) rather than discovered by reflection.
//! The generator only needs "map a domain type's fields to column metadata";
//! how the application produces that mapping is its own business.

use serde::{Deserialize, Serialize};

use crate::dialect::SqlType;

/// Semantic value kind of a property, independent of the column type tag.
///
/// Drives example-filter generation: string properties get the full
/// matcher × case grid, everything else gets null-check + exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    String,
    Numeric,
    Boolean,
    Date,
    Binary,
    Other,
}

/// One persistent property mapped to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub column_name: String,
    pub sql_type: SqlType,
    pub kind: ValueKind,
    /// Version columns are incremented server-side on update and guarded
    /// in the WHERE clause for optimistic locking.
    #[serde(default)]
    pub is_version: bool,
    /// Transient properties take part in nothing.
    #[serde(default)]
    pub is_transient: bool,
    /// Marks an identifier that requires generated-value assignment before
    /// insert (see [`crate::id::IdGenerator`]).
    #[serde(default)]
    pub generated: bool,
}

impl PropertyDescriptor {
    /// Creates a property whose column name is the snake-case form of the
    /// property name.
    pub fn new(name: &str, sql_type: SqlType, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            column_name: to_snake_case(name),
            sql_type,
            kind,
            is_version: false,
            is_transient: false,
            generated: false,
        }
    }

    /// Overrides the derived column name.
    #[must_use]
    pub fn column(mut self, column_name: &str) -> Self {
        self.column_name = column_name.to_string();
        self
    }

    #[must_use]
    pub fn version(mut self) -> Self {
        self.is_version = true;
        self
    }

    #[must_use]
    pub fn transient(mut self) -> Self {
        self.is_transient = true;
        self
    }

    #[must_use]
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }
}

/// Identifier shape of an entity.
///
/// Entities without an identifier are legal; id-dependent statements are
/// simply not generated for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityId {
    None,
    Simple(PropertyDescriptor),
    /// A nested identifier object. Each part is addressed in generated SQL
    /// as `name.partName`.
    Composite {
        name: String,
        parts: Vec<PropertyDescriptor>,
    },
}

impl EntityId {
    pub fn is_none(&self) -> bool {
        matches!(self, EntityId::None)
    }

    /// `(parameter_path, property)` pairs for every identifier column.
    pub fn columns(&self) -> Vec<(String, &PropertyDescriptor)> {
        match self {
            EntityId::None => Vec::new(),
            EntityId::Simple(p) => vec![(p.name.clone(), p)],
            EntityId::Composite { name, parts } => parts
                .iter()
                .map(|p| (format!("{name}.{}", p.name), p))
                .collect(),
        }
    }
}

/// An embedded sub-object whose columns are flattened into the owning
/// entity's table, addressed as `name.propertyName`, nested one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedAssociation {
    pub name: String,
    pub properties: Vec<PropertyDescriptor>,
}

/// Structural metadata for one entity type, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Entity name; doubles as the statement namespace and the table alias.
    pub name: String,
    pub table_name: String,
    pub id: EntityId,
    /// Ordered non-identifier scalar properties.
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub embedded: Vec<EmbeddedAssociation>,
}

impl EntityDescriptor {
    pub fn builder(name: &str, table_name: &str) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder {
            name: name.to_string(),
            table_name: table_name.to_string(),
            id: EntityId::None,
            properties: Vec::new(),
            embedded: Vec::new(),
        }
    }

    /// The optimistic-lock version property, if any.
    pub fn version_property(&self) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.is_version)
    }

    /// Non-transient properties, in declaration order.
    pub fn persistent_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| !p.is_transient)
    }
}

pub struct EntityDescriptorBuilder {
    name: String,
    table_name: String,
    id: EntityId,
    properties: Vec<PropertyDescriptor>,
    embedded: Vec<EmbeddedAssociation>,
}

impl EntityDescriptorBuilder {
    #[must_use]
    pub fn id(mut self, property: PropertyDescriptor) -> Self {
        self.id = EntityId::Simple(property);
        self
    }

    #[must_use]
    pub fn composite_id(mut self, name: &str, parts: Vec<PropertyDescriptor>) -> Self {
        self.id = EntityId::Composite {
            name: name.to_string(),
            parts,
        };
        self
    }

    #[must_use]
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn embedded(mut self, name: &str, properties: Vec<PropertyDescriptor>) -> Self {
        self.embedded.push(EmbeddedAssociation {
            name: name.to_string(),
            properties,
        });
        self
    }

    #[must_use]
    pub fn build(self) -> EntityDescriptor {
        EntityDescriptor {
            name: self.name,
            table_name: self.table_name,
            id: self.id,
            properties: self.properties,
            embedded: self.embedded,
        }
    }
}

/// Converts a camelCase or PascalCase property name to its default
/// snake_case column name.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
