//! Table and model registry.
//!
//! A `TableDescriptor` is the declarative schema of one table: its ordered
//! field descriptors, key declarations, and (under shard topology) its
//! role-to-shard assignments. Descriptors are built either directly with the
//! field builder API or from the compact tag grammar:
//!
//! ```text
//! pk;auto              primary key, serial
//! unique;notnull       constraints
//! index                plain index
//! name:uid             column name override
//! text | max:N | type:X   type overrides
//! default:EXPR         column default
//! fkey:users.id        hard foreign key (database-enforced)
//! skey:users.id        soft foreign key (join planner only)
//! ondelete:CASCADE     ON DELETE action for the fkey
//! ```
//!
//! Tags are semicolon-separated `k` or `k:v` tokens. A malformed `fkey`/`skey`
//! value or an unknown key is fatal. Fields carrying either relation tag are
//! implicitly indexed.
//!
//! Types registered through the `Model` trait additionally get a reverse
//! `TypeId -> table` mapping, so a model type resolves to its table without
//! naming it.

use indexmap::{IndexMap, IndexSet};
use std::any::TypeId;
use std::collections::HashMap;

use crate::query::helpers::validate_identifier_part;
use crate::{NormError, Result};

/// SQL column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    /// VARCHAR(n); the string default is VARCHAR(255)
    Varchar(u32),
    Text,
    SmallInt,
    Integer,
    BigInt,
    Real,
    DoublePrecision,
    Boolean,
    Timestamp,
    TimestampTz,
    Date,
    Uuid,
    Numeric,
    Jsonb,
    Bytea,
    /// Array flavor of a primitive element type
    Array(Box<SqlType>),
    /// Verbatim SQL type from a `type:` tag
    Custom(String),
}

impl SqlType {
    /// Renders the DDL type.
    pub fn to_sql(&self) -> String {
        match self {
            SqlType::Varchar(n) => format!("VARCHAR({})", n),
            SqlType::Text => "TEXT".to_string(),
            SqlType::SmallInt => "SMALLINT".to_string(),
            SqlType::Integer => "INTEGER".to_string(),
            SqlType::BigInt => "BIGINT".to_string(),
            SqlType::Real => "REAL".to_string(),
            SqlType::DoublePrecision => "DOUBLE PRECISION".to_string(),
            SqlType::Boolean => "BOOLEAN".to_string(),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
            SqlType::TimestampTz => "TIMESTAMPTZ".to_string(),
            SqlType::Date => "DATE".to_string(),
            SqlType::Uuid => "UUID".to_string(),
            SqlType::Numeric => "NUMERIC".to_string(),
            SqlType::Jsonb => "JSONB".to_string(),
            SqlType::Bytea => "BYTEA".to_string(),
            SqlType::Array(inner) => format!("{}[]", inner.to_sql()),
            SqlType::Custom(sql) => sql.clone(),
        }
    }

    /// The serial flavor used when the field is tagged `auto`.
    pub(crate) fn serial_sql(&self) -> Option<&'static str> {
        match self {
            SqlType::SmallInt => Some("SMALLSERIAL"),
            SqlType::Integer => Some("SERIAL"),
            SqlType::BigInt => Some("BIGSERIAL"),
            _ => None,
        }
    }
}

/// Relation kind declared on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `fkey:` - enforced by the database, requires co-location.
    Hard,
    /// `skey:` - known only to the join planner, always app-side.
    Soft,
}

/// A declared relation to another table's column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationKind,
    pub table: String,
    pub column: String,
    /// ON DELETE action; defaults to NO ACTION.
    pub on_delete: String,
}

/// One column of a registered table.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub sql_type: SqlType,
    pub primary_key: bool,
    /// serial / identity column
    pub auto: bool,
    pub unique: bool,
    pub not_null: bool,
    pub indexed: bool,
    pub default_expr: Option<String>,
    pub relation: Option<Relation>,
}

impl FieldDescriptor {
    /// Creates a field with a column name and type.
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            primary_key: false,
            auto: false,
            unique: false,
            not_null: false,
            indexed: false,
            default_expr: None,
            relation: None,
        }
    }

    /// Marks as primary key (implies NOT NULL).
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    /// Marks as serial / identity.
    pub fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Sets a column default expression.
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default_expr = Some(expr.into());
        self
    }

    /// Declares a hard foreign key to `table.column`. Implies an index.
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.relation = Some(Relation {
            kind: RelationKind::Hard,
            table: table.into(),
            column: column.into(),
            on_delete: "NO ACTION".to_string(),
        });
        self.indexed = true;
        self
    }

    /// Declares a soft foreign key to `table.column`. Implies an index.
    pub fn soft_references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.relation = Some(Relation {
            kind: RelationKind::Soft,
            table: table.into(),
            column: column.into(),
            on_delete: "NO ACTION".to_string(),
        });
        self.indexed = true;
        self
    }

    /// Sets the ON DELETE action of the declared relation.
    pub fn on_delete(mut self, action: impl Into<String>) -> Self {
        if let Some(relation) = self.relation.as_mut() {
            relation.on_delete = action.into();
        }
        self
    }

    /// Builds a field from the tag grammar.
    ///
    /// `base` is the type derived from the source field; `text`, `max:` and
    /// `type:` tokens override it.
    pub fn with_tag(name: impl Into<String>, base: SqlType, tag: &str) -> Result<Self> {
        let mut field = Self::new(name, base);
        let mut pending_on_delete: Option<String> = None;

        for token in tag.split(';') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let (key, value) = match token.split_once(':') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (token, None),
            };

            match (key, value) {
                ("pk", None) => field = field.primary_key(),
                ("auto", None) => field = field.auto(),
                ("unique", None) => field = field.unique(),
                ("notnull", None) => field = field.not_null(),
                ("index", None) => field = field.indexed(),
                ("text", None) => field.sql_type = SqlType::Text,
                ("name", Some(v)) => {
                    validate_identifier_part(v)?;
                    field.name = v.to_string();
                }
                ("type", Some(v)) => field.sql_type = SqlType::Custom(v.to_string()),
                ("max", Some(v)) => {
                    let n: u32 = v.parse().map_err(|_| {
                        NormError::Validation(format!("invalid max length '{}'", v))
                    })?;
                    field.sql_type = SqlType::Varchar(n);
                }
                ("default", Some(v)) => field.default_expr = Some(v.to_string()),
                ("fkey", Some(v)) => {
                    let (table, column) = parse_relation_target("fkey", v)?;
                    field = field.references(table, column);
                }
                ("skey", Some(v)) => {
                    let (table, column) = parse_relation_target("skey", v)?;
                    field = field.soft_references(table, column);
                }
                ("ondelete", Some(v)) => pending_on_delete = Some(v.to_string()),
                _ => {
                    return Err(NormError::Validation(format!(
                        "unknown field tag '{}'",
                        token
                    )))
                }
            }
        }

        if let Some(action) = pending_on_delete {
            if field.relation.is_none() {
                return Err(NormError::Validation(
                    "ondelete requires a fkey or skey tag".to_string(),
                ));
            }
            field = field.on_delete(action);
        }

        Ok(field)
    }

    /// True when the field declares a hard foreign key.
    pub fn has_hard_relation(&self) -> bool {
        matches!(
            self.relation,
            Some(Relation {
                kind: RelationKind::Hard,
                ..
            })
        )
    }
}

fn parse_relation_target(kind: &str, value: &str) -> Result<(String, String)> {
    let mut parts = value.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(table), Some(column), None) if !table.is_empty() && !column.is_empty() => {
            Ok((table.to_string(), column.to_string()))
        }
        _ => Err(NormError::Validation(format!(
            "malformed {} target '{}': expected table.column",
            kind, value
        ))),
    }
}

/// Role under which a table is assigned to a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Primary,
    Read,
    Write,
    Standalone,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Read => "read",
            Role::Write => "write",
            Role::Standalone => "standalone",
        }
    }
}

/// The registered schema of one table.
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    table: String,
    fields: Vec<FieldDescriptor>,
    assignments: IndexMap<Role, IndexSet<String>>,
}

impl TableDescriptor {
    /// Creates a descriptor for a table name.
    pub fn new(table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_identifier_part(&table)?;
        Ok(Self {
            table,
            fields: Vec::new(),
            assignments: IndexMap::new(),
        })
    }

    /// Appends a field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Ordered field descriptors.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by column name.
    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The primary key field, when declared.
    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// True when any field declares a hard foreign key.
    pub fn has_hard_relation(&self) -> bool {
        self.fields.iter().any(FieldDescriptor::has_hard_relation)
    }

    /// A descriptor with no shard assignments routes under global topology.
    pub fn is_global(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Shards assigned under a role.
    pub fn shards_for(&self, role: Role) -> Option<&IndexSet<String>> {
        self.assignments.get(&role)
    }

    /// Role-assignment map.
    pub fn assignments(&self) -> &IndexMap<Role, IndexSet<String>> {
        &self.assignments
    }

    /// Adds `shard` under `role`.
    ///
    /// A repeated `(Primary, shard)` pair is a duplicate; the other roles are
    /// idempotent.
    pub fn assign(&mut self, role: Role, shard: impl Into<String>) -> Result<()> {
        let shard = shard.into();
        let set = self.assignments.entry(role).or_default();
        if role == Role::Primary && set.contains(&shard) {
            return Err(NormError::Duplicate(format!(
                "table '{}' is already assigned primary on shard '{}'",
                self.table, shard
            )));
        }
        set.insert(shard);
        Ok(())
    }

    /// Fluent form of `assign(Role::Primary, shard)`.
    pub fn on_primary(mut self, shard: impl Into<String>) -> Result<Self> {
        self.assign(Role::Primary, shard)?;
        Ok(self)
    }

    /// Fluent form of `assign(Role::Read, shard)`.
    pub fn on_read(mut self, shard: impl Into<String>) -> Result<Self> {
        self.assign(Role::Read, shard)?;
        Ok(self)
    }

    /// Fluent form of `assign(Role::Write, shard)`.
    pub fn on_write(mut self, shard: impl Into<String>) -> Result<Self> {
        self.assign(Role::Write, shard)?;
        Ok(self)
    }

    /// Fluent form of `assign(Role::Standalone, shard)`.
    pub fn on_standalone(mut self, shard: impl Into<String>) -> Result<Self> {
        self.assign(Role::Standalone, shard)?;
        Ok(self)
    }
}

/// A type that declares its own table schema.
pub trait Model: 'static {
    /// Table name; defaults to the snake_cased, pluralized type name.
    fn table_name() -> String {
        derived_table_name(short_type_name::<Self>())
    }

    /// The declarative schema for this type.
    fn descriptor() -> Result<TableDescriptor>;
}

/// Registry of table descriptors, keyed by table name, with a reverse
/// type-identity index for types registered through [`Model`].
#[derive(Debug, Default)]
pub struct ModelRegistry {
    tables: IndexMap<String, TableDescriptor>,
    by_type: HashMap<TypeId, String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor. Re-registration under the same table name
    /// replaces the previous descriptor.
    pub fn register(&mut self, descriptor: TableDescriptor) {
        self.tables.insert(descriptor.table.clone(), descriptor);
    }

    /// Registers a model type under its own table name.
    pub fn register_model<T: Model>(&mut self) -> Result<()> {
        let descriptor = T::descriptor()?;
        let table = descriptor.table.clone();
        self.tables.insert(table.clone(), descriptor);
        self.by_type.insert(TypeId::of::<T>(), table);
        Ok(())
    }

    /// Registers a model type under an explicit table name.
    pub fn register_model_named<T: Model>(&mut self, table: &str) -> Result<()> {
        validate_identifier_part(table)?;
        let mut descriptor = T::descriptor()?;
        descriptor.table = table.to_string();
        self.tables.insert(table.to_string(), descriptor);
        self.by_type.insert(TypeId::of::<T>(), table.to_string());
        Ok(())
    }

    /// Looks up a descriptor by table name.
    pub fn get(&self, table: &str) -> Option<&TableDescriptor> {
        self.tables.get(table)
    }

    /// Mutable lookup, for late role assignment.
    pub fn get_mut(&mut self, table: &str) -> Option<&mut TableDescriptor> {
        self.tables.get_mut(table)
    }

    /// Reverse lookup: the table a model type registered under.
    pub fn table_for<T: Model>(&self) -> Option<&str> {
        self.by_type.get(&TypeId::of::<T>()).map(String::as_str)
    }

    /// Adds a role assignment to a registered table.
    pub fn assign(&mut self, table: &str, role: Role, shard: &str) -> Result<()> {
        let descriptor = self
            .tables
            .get_mut(table)
            .ok_or_else(|| NormError::UnregisteredTable(table.to_string()))?;
        descriptor.assign(role, shard)
    }

    /// All registered descriptors, in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.values()
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Clears all registrations.
    pub fn reset(&mut self) {
        self.tables.clear();
        self.by_type.clear();
    }
}

/// The unqualified, generics-free name of a type.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Derives a table name from a type name: snake_case, then pluralize.
///
/// `FooBar` becomes `foo_bars`; `Category` becomes `categories`.
pub fn derived_table_name(type_name: &str) -> String {
    pluralize(&snake_case(type_name))
}

/// Converts CamelCase (and acronym runs) to snake_case.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
            let next_lower = i + 1 < chars.len() && chars[i + 1].is_ascii_lowercase();
            let prev_upper = i > 0 && chars[i - 1].is_ascii_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Naive English pluralization, sufficient for table naming.
pub fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if let Some(c) = before {
            if !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') {
                return format!("{}ies", stem);
            }
        }
    }

    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{}es", word);
    }

    format!("{}s", word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("FooBar"), "foo_bar");
        assert_eq!(snake_case("User"), "user");
        assert_eq!(snake_case("HTTPServer"), "http_server");
        assert_eq!(snake_case("userAccount"), "user_account");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("batch"), "batches");
        assert_eq!(pluralize("status"), "statuses");
    }

    #[test]
    fn test_derived_table_name() {
        assert_eq!(derived_table_name("FooBar"), "foo_bars");
        assert_eq!(derived_table_name("Category"), "categories");
        assert_eq!(derived_table_name("User"), "users");
    }

    #[test]
    fn test_tag_parsing_basic_flags() {
        let field =
            FieldDescriptor::with_tag("id", SqlType::BigInt, "pk;auto").unwrap();
        assert!(field.primary_key);
        assert!(field.auto);
        assert!(field.not_null);
        assert!(!field.unique);
    }

    #[test]
    fn test_tag_parsing_overrides() {
        let field =
            FieldDescriptor::with_tag("email", SqlType::Varchar(255), "unique;notnull;max:128")
                .unwrap();
        assert_eq!(field.sql_type, SqlType::Varchar(128));
        assert!(field.unique);
        assert!(field.not_null);

        let field = FieldDescriptor::with_tag("bio", SqlType::Varchar(255), "text").unwrap();
        assert_eq!(field.sql_type, SqlType::Text);

        let field =
            FieldDescriptor::with_tag("location", SqlType::Varchar(255), "type:POINT").unwrap();
        assert_eq!(field.sql_type, SqlType::Custom("POINT".to_string()));

        let field =
            FieldDescriptor::with_tag("created_at", SqlType::Timestamp, "default:CURRENT_TIMESTAMP")
                .unwrap();
        assert_eq!(field.default_expr.as_deref(), Some("CURRENT_TIMESTAMP"));
    }

    #[test]
    fn test_tag_parsing_name_override() {
        let field =
            FieldDescriptor::with_tag("user_name", SqlType::Varchar(255), "name:username")
                .unwrap();
        assert_eq!(field.name, "username");
    }

    #[test]
    fn test_tag_parsing_fkey_implies_index() {
        let field =
            FieldDescriptor::with_tag("user_id", SqlType::BigInt, "fkey:users.id;ondelete:CASCADE")
                .unwrap();
        assert!(field.indexed);
        let relation = field.relation.unwrap();
        assert_eq!(relation.kind, RelationKind::Hard);
        assert_eq!(relation.table, "users");
        assert_eq!(relation.column, "id");
        assert_eq!(relation.on_delete, "CASCADE");
    }

    #[test]
    fn test_tag_parsing_ondelete_before_fkey() {
        let field =
            FieldDescriptor::with_tag("user_id", SqlType::BigInt, "ondelete:SET NULL;fkey:users.id")
                .unwrap();
        assert_eq!(field.relation.unwrap().on_delete, "SET NULL");
    }

    #[test]
    fn test_tag_parsing_skey() {
        let field =
            FieldDescriptor::with_tag("owner_id", SqlType::BigInt, "skey:users.id").unwrap();
        assert!(field.indexed);
        assert_eq!(field.relation.unwrap().kind, RelationKind::Soft);
    }

    #[test]
    fn test_tag_parsing_malformed_relation_is_fatal() {
        for tag in ["fkey:users", "fkey:users.id.extra", "skey:", "skey:users."] {
            let result = FieldDescriptor::with_tag("user_id", SqlType::BigInt, tag);
            assert!(
                matches!(result, Err(NormError::Validation(_))),
                "tag {:?} should be rejected",
                tag
            );
        }
    }

    #[test]
    fn test_tag_parsing_unknown_key_is_fatal() {
        let result = FieldDescriptor::with_tag("id", SqlType::BigInt, "pk;wibble");
        assert!(matches!(result, Err(NormError::Validation(_))));
    }

    #[test]
    fn test_default_on_delete_is_no_action() {
        let field = FieldDescriptor::with_tag("user_id", SqlType::BigInt, "fkey:users.id").unwrap();
        assert_eq!(field.relation.unwrap().on_delete, "NO ACTION");
    }

    fn users_descriptor() -> TableDescriptor {
        TableDescriptor::new("users")
            .unwrap()
            .field(FieldDescriptor::new("id", SqlType::BigInt).primary_key().auto())
            .field(FieldDescriptor::new("name", SqlType::Varchar(255)).not_null())
    }

    #[test]
    fn test_descriptor_global_vs_sharded() {
        let descriptor = users_descriptor();
        assert!(descriptor.is_global());

        let descriptor = users_descriptor().on_primary("s1").unwrap();
        assert!(!descriptor.is_global());
        assert!(descriptor
            .shards_for(Role::Primary)
            .unwrap()
            .contains("s1"));
    }

    #[test]
    fn test_assign_primary_duplicate_pair_rejected() {
        let mut descriptor = users_descriptor();
        descriptor.assign(Role::Primary, "s1").unwrap();
        let err = descriptor.assign(Role::Primary, "s1").unwrap_err();
        assert!(matches!(err, NormError::Duplicate(_)));
        // a different shard is fine
        descriptor.assign(Role::Primary, "s2").unwrap();
    }

    #[test]
    fn test_assign_other_roles_idempotent() {
        let mut descriptor = users_descriptor();
        descriptor.assign(Role::Read, "s1").unwrap();
        descriptor.assign(Role::Read, "s1").unwrap();
        descriptor.assign(Role::Standalone, "s1").unwrap();
        descriptor.assign(Role::Standalone, "s1").unwrap();
        assert_eq!(descriptor.shards_for(Role::Read).unwrap().len(), 1);
    }

    #[test]
    fn test_registry_replaces_on_reregistration() {
        let mut registry = ModelRegistry::new();
        registry.register(users_descriptor());
        assert_eq!(registry.get("users").unwrap().fields().len(), 2);

        let slim = TableDescriptor::new("users")
            .unwrap()
            .field(FieldDescriptor::new("id", SqlType::BigInt).primary_key());
        registry.register(slim);
        assert_eq!(registry.get("users").unwrap().fields().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    struct User;

    impl Model for User {
        fn descriptor() -> Result<TableDescriptor> {
            Ok(users_descriptor())
        }
    }

    #[test]
    fn test_model_trait_reverse_lookup() {
        let mut registry = ModelRegistry::new();
        registry.register_model::<User>().unwrap();

        assert_eq!(registry.table_for::<User>(), Some("users"));
        assert!(registry.get("users").is_some());
    }

    #[test]
    fn test_model_default_table_name_derivation() {
        assert_eq!(User::table_name(), "users");
    }

    #[test]
    fn test_register_model_named() {
        let mut registry = ModelRegistry::new();
        registry.register_model_named::<User>("accounts").unwrap();

        assert_eq!(registry.table_for::<User>(), Some("accounts"));
        assert!(registry.get("accounts").is_some());
        assert!(registry.get("users").is_none());
    }

    #[test]
    fn test_registry_assign_unregistered_table() {
        let mut registry = ModelRegistry::new();
        let err = registry.assign("ghosts", Role::Primary, "s1").unwrap_err();
        assert!(matches!(err, NormError::UnregisteredTable(_)));
    }
}
