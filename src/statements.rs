//! Statement assembly and the statement registry.
//!
//! The generator synthesizes a fixed vocabulary of statements per entity
//! from its descriptor and the active dialect. Generation is pure and
//! cached through [`StatementRegistry`], where a hand-authored statement
//! registered under a reserved name always wins over generation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::dialect::Dialect;
use crate::entity::{EntityDescriptor, EntityId, PropertyDescriptor};
use crate::errors::GenerationError;
use crate::example::entity_fragments;
use crate::fragment::{Fragment, Guard, Params, SortOrder, render};

/// The reserved statement vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementName {
    Insert,
    Update,
    UpdateIgnoreNull,
    FindById,
    FindAll,
    Count,
    DeleteById,
    DeleteAll,
    FindByPager,
    CountByExample,
    DeleteByExample,
}

impl StatementName {
    pub const ALL: [StatementName; 11] = [
        StatementName::Insert,
        StatementName::Update,
        StatementName::UpdateIgnoreNull,
        StatementName::FindById,
        StatementName::FindAll,
        StatementName::Count,
        StatementName::DeleteById,
        StatementName::DeleteAll,
        StatementName::FindByPager,
        StatementName::CountByExample,
        StatementName::DeleteByExample,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatementName::Insert => "_insert",
            StatementName::Update => "_update",
            StatementName::UpdateIgnoreNull => "_updateIgnoreNull",
            StatementName::FindById => "_findById",
            StatementName::FindAll => "_findAll",
            StatementName::Count => "_count",
            StatementName::DeleteById => "_deleteById",
            StatementName::DeleteAll => "_deleteAll",
            StatementName::FindByPager => "_findByPager",
            StatementName::CountByExample => "_countByExample",
            StatementName::DeleteByExample => "_deleteByExample",
        }
    }

    /// Whether the statement needs an identifier to exist on the entity.
    fn requires_id(self) -> bool {
        matches!(
            self,
            StatementName::Update
                | StatementName::UpdateIgnoreNull
                | StatementName::FindById
                | StatementName::DeleteById
        )
    }
}

/// One generated (or hand-authored) statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub id: String,
    pub fragments: Vec<Fragment>,
}

impl Statement {
    /// A hand-authored statement from raw SQL text.
    pub fn raw(id: &str, sql: &str) -> Self {
        Self {
            id: id.to_string(),
            fragments: vec![Fragment::stat(sql)],
        }
    }

    /// Renders the statement text for one call.
    #[must_use]
    pub fn render(&self, params: &Params) -> String {
        render(&self.fragments, params)
    }
}

/// The generated statements of one entity, keyed by [`StatementName`].
#[derive(Debug, Clone)]
pub struct StatementSet {
    pub entity: String,
    statements: Vec<(StatementName, Statement)>,
}

impl StatementSet {
    #[must_use]
    pub fn get(&self, name: StatementName) -> Option<&Statement> {
        self.statements
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatementName, &Statement)> {
        self.statements.iter().map(|(n, s)| (*n, s))
    }
}

/// Builds the statement set for entities under one dialect.
#[derive(Debug, Clone)]
pub struct StatementGenerator {
    dialect: Dialect,
}

impl StatementGenerator {
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    #[must_use]
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Generates the full statement set for an entity. Statements that
    /// need an identifier are skipped when the entity has none.
    #[must_use]
    pub fn generate(&self, entity: &EntityDescriptor) -> StatementSet {
        let mut statements = Vec::with_capacity(StatementName::ALL.len());
        for name in StatementName::ALL {
            if name.requires_id() && entity.id.is_none() {
                warn!(
                    entity = %entity.name,
                    statement = name.as_str(),
                    "entity has no identifier, skipping"
                );
                continue;
            }
            let fragments = match name {
                StatementName::Insert => self.insert(entity),
                StatementName::Update => self.update(entity, false),
                StatementName::UpdateIgnoreNull => self.update(entity, true),
                StatementName::FindById => self.find_by_id(entity),
                StatementName::FindAll => self.find_all(entity),
                StatementName::Count => self.count(entity),
                StatementName::DeleteById => self.delete_by_id(entity),
                StatementName::DeleteAll => self.delete_all(entity),
                StatementName::FindByPager => self.find_by_pager(entity),
                StatementName::CountByExample => self.count_by_example(entity),
                StatementName::DeleteByExample => self.delete_by_example(entity),
            };
            statements.push((
                name,
                Statement {
                    id: statement_id(&entity.name, name),
                    fragments,
                },
            ));
        }
        StatementSet {
            entity: entity.name.clone(),
            statements,
        }
    }

    /// `(parameter_path, property)` pairs for every writable column, in
    /// declaration order: identifier parts, scalar properties, embedded
    /// properties flattened one level.
    fn writable_columns<'e>(
        &self,
        entity: &'e EntityDescriptor,
    ) -> Vec<(String, &'e PropertyDescriptor)> {
        let mut columns = entity.id.columns();
        columns.extend(
            entity
                .persistent_properties()
                .map(|p| (p.name.clone(), p)),
        );
        for embedded in &entity.embedded {
            columns.extend(
                embedded
                    .properties
                    .iter()
                    .map(|p| (format!("{}.{}", embedded.name, p.name), p)),
            );
        }
        columns
    }

    /// The select column list and its property-to-expression alias map.
    /// Embedded associations do not contribute; they are materialized by
    /// the mapping layer, not the select list.
    fn select_columns(&self, entity: &EntityDescriptor) -> (String, Vec<(String, String)>) {
        let alias = self.dialect.quote_alias(&entity.name);
        let mut list = String::new();
        let mut columns = Vec::new();
        let mut paths = entity.id.columns();
        paths.extend(
            entity
                .persistent_properties()
                .map(|p| (p.name.clone(), p)),
        );
        for (index, (path, property)) in paths.iter().enumerate() {
            if index > 0 {
                list.push(',');
            }
            let expression = format!("{alias}.{}", self.dialect.quote(&property.column_name));
            list.push_str(&expression);
            list.push_str(" as ");
            list.push_str(&self.dialect.quote_alias(path));
            columns.push((path.clone(), expression));
        }
        (list, columns)
    }

    /// The property-path to column-expression map used for sort
    /// resolution, identical to the one captured in generated deferred
    /// order-by fragments.
    #[must_use]
    pub fn select_column_aliases(&self, entity: &EntityDescriptor) -> Vec<(String, String)> {
        self.select_columns(entity).1
    }

    fn from_clause(&self, entity: &EntityDescriptor) -> String {
        format!(
            "{} {}",
            self.dialect.quote(&entity.table_name),
            self.dialect.quote_alias(&entity.name)
        )
    }

    /// Identifier equality predicates, alias-qualified when requested.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::MissingIdentifier`] when the entity has
    /// no identifier.
    pub fn where_by_id(
        &self,
        entity: &EntityDescriptor,
        qualified: bool,
    ) -> Result<Vec<Fragment>, GenerationError> {
        let columns = entity.id.columns();
        if columns.is_empty() {
            return Err(GenerationError::MissingIdentifier {
                entity: entity.name.clone(),
            });
        }
        let alias = self.dialect.quote_alias(&entity.name);
        Ok(columns
            .into_iter()
            .map(|(path, property)| {
                let column = self.dialect.quote(&property.column_name);
                let column = if qualified {
                    format!("{alias}.{column}")
                } else {
                    column
                };
                Fragment::stat(format!(" and {column}=#{{{path}}}"))
            })
            .collect())
    }

    fn insert(&self, entity: &EntityDescriptor) -> Vec<Fragment> {
        let columns = self.writable_columns(entity);
        let mut names = String::new();
        let mut values = String::new();
        for (index, (path, property)) in columns.iter().enumerate() {
            if index > 0 {
                names.push(',');
                values.push(',');
            }
            names.push_str(&self.dialect.quote(&property.column_name));
            values.push_str(&format!("#{{{path}}}"));
        }
        vec![Fragment::stat(format!(
            "insert into {}({names}) values({values})",
            self.dialect.quote(&entity.table_name)
        ))]
    }

    fn update(&self, entity: &EntityDescriptor, ignore_null: bool) -> Vec<Fragment> {
        let id_paths: Vec<String> = entity.id.columns().into_iter().map(|(p, _)| p).collect();
        let mut set_body = Vec::new();
        for (path, property) in self.writable_columns(entity) {
            if id_paths.contains(&path) {
                continue;
            }
            let column = self.dialect.quote(&property.column_name);
            if property.is_version {
                // incremented server-side, guarded below against the
                // pre-update value
                set_body.push(Fragment::stat(format!("{column}={column}+1,")));
                continue;
            }
            let assignment = Fragment::stat(format!("{column}=#{{{path}}},"));
            if ignore_null {
                set_body.push(Fragment::Test {
                    guard: Guard::ParamNotNull(path),
                    body: vec![assignment],
                });
            } else {
                set_body.push(assignment);
            }
        }

        let mut where_body = self
            .where_by_id(entity, false)
            .unwrap_or_default();
        if let Some(version) = entity.version_property() {
            where_body.push(Fragment::stat(format!(
                " and {}=#{{{}}}",
                self.dialect.quote(&version.column_name),
                version.name
            )));
        }

        vec![
            Fragment::stat(format!(
                "update {}",
                self.dialect.quote(&entity.table_name)
            )),
            Fragment::Set(set_body),
            Fragment::Where(where_body),
        ]
    }

    fn find_by_id(&self, entity: &EntityDescriptor) -> Vec<Fragment> {
        let (columns, _) = self.select_columns(entity);
        let mut fragments = vec![Fragment::stat(format!(
            "select {columns} from {}",
            self.from_clause(entity)
        ))];
        fragments.push(Fragment::Where(
            self.where_by_id(entity, true).unwrap_or_default(),
        ));
        fragments
    }

    /// The ids-list filter over a simple identifier. Composite identifiers
    /// cannot be expressed as a flat `in (...)` and get no ids filter.
    fn ids_filter(&self, entity: &EntityDescriptor) -> Option<Fragment> {
        let EntityId::Simple(id) = &entity.id else {
            return None;
        };
        let column = format!(
            "{}.{}",
            self.dialect.quote_alias(&entity.name),
            self.dialect.quote(&id.column_name)
        );
        Some(Fragment::Test {
            guard: Guard::IdsPresent,
            body: vec![
                Fragment::stat(format!(" and {column} in ")),
                Fragment::ForEach {
                    collection: "_ids".to_string(),
                    open: "(".to_string(),
                    separator: ",".to_string(),
                    close: ")".to_string(),
                },
            ],
        })
    }

    /// Base select with the optional example, ids and order-by
    /// augmentations composed in one where clause.
    fn find_all_fragments(&self, entity: &EntityDescriptor) -> Vec<Fragment> {
        let (columns, alias_map) = self.select_columns(entity);
        let mut where_body = Vec::new();
        if let Some(ids) = self.ids_filter(entity) {
            where_body.push(ids);
        }
        where_body.extend(entity_fragments(&self.dialect, entity, true));
        vec![
            Fragment::stat(format!(
                "select {columns} from {}",
                self.from_clause(entity)
            )),
            Fragment::Where(where_body),
            Fragment::OrderBy { columns: alias_map },
        ]
    }

    fn find_all(&self, entity: &EntityDescriptor) -> Vec<Fragment> {
        self.find_all_fragments(entity)
    }

    fn find_by_pager(&self, entity: &EntityDescriptor) -> Vec<Fragment> {
        let handler = self.dialect.limit_handler();
        if !handler.supports_limit() {
            warn!(
                dialect = self.dialect.name(),
                entity = %entity.name,
                "dialect cannot window result sets; paged find returns all rows for client-side paging"
            );
        }
        handler.wrap(self.find_all_fragments(entity))
    }

    fn count(&self, entity: &EntityDescriptor) -> Vec<Fragment> {
        vec![Fragment::stat(format!(
            "select count(*) from {}",
            self.from_clause(entity)
        ))]
    }

    fn count_by_example(&self, entity: &EntityDescriptor) -> Vec<Fragment> {
        vec![
            Fragment::stat(format!(
                "select count(*) from {}",
                self.from_clause(entity)
            )),
            Fragment::Where(entity_fragments(&self.dialect, entity, true)),
        ]
    }

    fn delete_target(&self, entity: &EntityDescriptor) -> (String, bool) {
        let table = self.dialect.quote(&entity.table_name);
        if self.dialect.supports_delete_alias() {
            let alias = self.dialect.quote_alias(&entity.name);
            (format!("delete {alias} from {table} {alias}"), true)
        } else {
            (format!("delete from {table}"), false)
        }
    }

    fn delete_by_id(&self, entity: &EntityDescriptor) -> Vec<Fragment> {
        let (target, qualified) = self.delete_target(entity);
        vec![
            Fragment::stat(target),
            Fragment::Where(self.where_by_id(entity, qualified).unwrap_or_default()),
        ]
    }

    fn delete_by_example(&self, entity: &EntityDescriptor) -> Vec<Fragment> {
        let (target, qualified) = self.delete_target(entity);
        vec![
            Fragment::stat(target),
            Fragment::Where(entity_fragments(&self.dialect, entity, qualified)),
        ]
    }

    fn delete_all(&self, entity: &EntityDescriptor) -> Vec<Fragment> {
        vec![Fragment::stat(format!(
            "truncate table {}",
            self.dialect.quote(&entity.table_name)
        ))]
    }
}

/// A statically-resolved order-by clause for sorts known at generation
/// time, using the select-column alias map from [`StatementSet`]
/// generation. Call-time sorts go through the deferred
/// [`Fragment::OrderBy`] instead.
#[must_use]
pub fn static_order_by(columns: &[(String, String)], sorts: &[SortOrder]) -> String {
    if sorts.is_empty() {
        return String::new();
    }
    let mut out = String::from(" order by ");
    for (index, sort) in sorts.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        let column = columns
            .iter()
            .find(|(property, _)| *property == sort.property)
            .map_or(sort.property.as_str(), |(_, column)| column.as_str());
        if sort.ignore_case {
            out.push_str(&format!("lower({column})"));
        } else {
            out.push_str(column);
        }
        out.push(' ');
        out.push_str(sort.direction.as_str());
    }
    out
}

fn statement_id(entity: &str, name: StatementName) -> String {
    format!("{entity}.{}", name.as_str())
}

/// Shared statement store, keyed by `Entity._statementName`.
///
/// The check-then-generate-then-register sequence runs under one lock so
/// concurrent first use of the same entity cannot generate twice.
#[derive(Debug, Default)]
pub struct StatementRegistry {
    statements: Mutex<HashMap<String, Arc<Statement>>>,
}

impl StatementRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hand-authored statement. Reserved names registered here
    /// before generation take precedence over generated ones.
    pub fn register(&self, statement: Statement) {
        let mut statements = self.lock();
        statements.insert(statement.id.clone(), Arc::new(statement));
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Statement>> {
        self.lock().get(id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Generates and registers the statement set for an entity, skipping
    /// any statement already present. Returns the ids actually added.
    pub fn generate_for(
        &self,
        generator: &StatementGenerator,
        entity: &EntityDescriptor,
    ) -> Vec<String> {
        let set = generator.generate(entity);
        let mut statements = self.lock();
        let mut added = Vec::new();
        for (_, statement) in set.iter() {
            if statements.contains_key(&statement.id) {
                debug!(id = %statement.id, "statement already registered, generation yields");
                continue;
            }
            debug!(id = %statement.id, "registering generated statement");
            statements.insert(statement.id.clone(), Arc::new(statement.clone()));
            added.push(statement.id.clone());
        }
        added
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Statement>>> {
        self.statements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqlType;
    use crate::entity::ValueKind;

    fn user() -> EntityDescriptor {
        EntityDescriptor::builder("User", "ds_user")
            .id(PropertyDescriptor::new("id", SqlType::BigInt, ValueKind::Numeric))
            .property(PropertyDescriptor::new(
                "userName",
                SqlType::VarChar,
                ValueKind::String,
            ))
            .build()
    }

    #[test]
    fn statement_ids_use_the_entity_namespace() {
        let set = StatementGenerator::new(Dialect::h2()).generate(&user());
        let ids: Vec<&str> = set.iter().map(|(_, s)| s.id.as_str()).collect();
        assert!(ids.contains(&"User._insert"));
        assert!(ids.contains(&"User._findByPager"));
        assert_eq!(ids.len(), StatementName::ALL.len());
    }

    #[test]
    fn id_statements_are_skipped_without_an_identifier() {
        let entity = EntityDescriptor::builder("AuditLine", "audit_line")
            .property(PropertyDescriptor::new(
                "message",
                SqlType::VarChar,
                ValueKind::String,
            ))
            .build();
        let set = StatementGenerator::new(Dialect::h2()).generate(&entity);
        assert!(set.get(StatementName::FindById).is_none());
        assert!(set.get(StatementName::Update).is_none());
        assert!(set.get(StatementName::Insert).is_some());
        assert!(set.get(StatementName::FindAll).is_some());
    }

    #[test]
    fn missing_identifier_surfaces_when_asked_directly() {
        let entity = EntityDescriptor::builder("AuditLine", "audit_line").build();
        let err = StatementGenerator::new(Dialect::h2())
            .where_by_id(&entity, true)
            .unwrap_err();
        assert!(matches!(err, GenerationError::MissingIdentifier { .. }));
    }

    #[test]
    fn registry_generation_yields_to_registered_statements() {
        let registry = StatementRegistry::new();
        registry.register(Statement::raw(
            "User._count",
            "select count(1) from ds_user",
        ));

        let generator = StatementGenerator::new(Dialect::h2());
        let added = registry.generate_for(&generator, &user());
        assert!(!added.contains(&"User._count".to_string()));
        assert_eq!(added.len(), StatementName::ALL.len() - 1);

        let count = registry.get("User._count").unwrap();
        assert_eq!(count.render(&Params::new()), "select count(1) from ds_user");

        // a second pass adds nothing
        assert!(registry.generate_for(&generator, &user()).is_empty());
    }

    #[test]
    fn static_order_by_resolves_through_the_alias_map() {
        let columns = vec![("userName".to_string(), "\"User\".user_name".to_string())];
        let clause = static_order_by(
            &columns,
            &[SortOrder::desc("userName"), SortOrder::asc("other")],
        );
        assert_eq!(clause, " order by \"User\".user_name DESC,other ASC");
        assert_eq!(static_order_by(&columns, &[]), "");
    }
}
