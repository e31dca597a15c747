//! Schema document model
//!
//! The persisted JSON form of these types uses PascalCase field names written
//! in declaration order. Empty lists, absent optional values (except the
//! document `Version`) and a `false` array flag are left out so hand-edited
//! documents stay minimal.

use serde::{Deserialize, Serialize};

/// Version written into freshly created documents
pub const DEFAULT_DOCUMENT_VERSION: &str = "0.0.1";

/// Root of a schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SchemaDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always written; a missing key loads as the default version, an explicit null as `None`
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbms_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbms_version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schemata: Vec<SchemaGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<Table>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<View>,
}

impl Default for SchemaDocument {
    fn default() -> Self {
        Self {
            name: None,
            version: Some(DEFAULT_DOCUMENT_VERSION.to_string()),
            description: None,
            dbms_name: None,
            dbms_version: None,
            schemata: Vec::new(),
            tables: Vec::new(),
            views: Vec::new(),
        }
    }
}

impl SchemaDocument {
    /// Create an empty document carrying the default version
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the document holds no tables or views, directly or in any schema group
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.views.is_empty()
            && self.schemata.iter().all(SchemaGroup::is_empty)
    }

    /// Whether relations are organised in schema groups
    pub fn has_schemata(&self) -> bool {
        !self.schemata.is_empty()
    }

    /// Look up a schema group by name
    pub fn schema(&self, name: &str) -> Option<&SchemaGroup> {
        self.schemata.iter().find(|s| s.name == name)
    }
}

/// A named container of tables and views (a SQL schema / namespace)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SchemaGroup {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<Table>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<View>,
}

impl SchemaGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Table {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKey>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<Index>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct View {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,
    /// Defining SQL of the view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Column of a table or view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Column {
    pub name: String,
    /// Engine-native rendering of the type, e.g. `character varying(50)`
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `None` when the engine did not report nullability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nullable: Option<bool>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_array: bool,
    /// Default expression text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Human-curated enumeration of meaningful values; never introspected
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub valid_values: Vec<ValidValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ValidValue {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ValidValue {
    pub fn new(value: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            value: value.into(),
            description: description.map(str::to_string),
        }
    }
}

/// Sort order of a key column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A column participating in a key or index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ColumnReference {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorting: Option<SortOrder>,
}

impl ColumnReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sorting: None,
        }
    }

    pub fn sorted(name: impl Into<String>, sorting: SortOrder) -> Self {
        Self {
            name: name.into(),
            sorting: Some(sorting),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PrimaryKey {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnReference>,
}

/// Foreign key action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ForeignKeyAction {
    /// SQL spelling of the action, e.g. `SET NULL`
    pub fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyAction::NoAction => "NO ACTION",
            ForeignKeyAction::Restrict => "RESTRICT",
            ForeignKeyAction::Cascade => "CASCADE",
            ForeignKeyAction::SetNull => "SET NULL",
            ForeignKeyAction::SetDefault => "SET DEFAULT",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ForeignKey {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_table_schema: Option<String>,
    pub foreign_table_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub foreign_table_columns: Vec<ColumnReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_action: Option<ForeignKeyAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_action: Option<ForeignKeyAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Index {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_unique: Option<bool>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Shared view of tables and views: a named, described list of columns
pub trait Relation {
    fn name(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn columns(&self) -> &[Column];
    fn columns_mut(&mut self) -> &mut Vec<Column>;
}

/// Shared view of primary keys, foreign keys and indices
pub trait Key {
    fn name(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn columns(&self) -> &[ColumnReference];
    fn columns_mut(&mut self) -> &mut Vec<ColumnReference>;

    /// Comma separated column names in key order
    fn column_list(&self) -> String {
        self.columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Anything that directly holds tables and views
pub trait RelationContainer {
    fn tables(&self) -> &[Table];
    fn views(&self) -> &[View];

    fn is_empty(&self) -> bool {
        self.tables().is_empty() && self.views().is_empty()
    }
}

macro_rules! impl_relation {
    ($ty:ty) => {
        impl Relation for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn description(&self) -> Option<&str> {
                self.description.as_deref()
            }

            fn columns(&self) -> &[Column] {
                &self.columns
            }

            fn columns_mut(&mut self) -> &mut Vec<Column> {
                &mut self.columns
            }
        }
    };
}

impl_relation!(Table);
impl_relation!(View);

macro_rules! impl_key {
    ($ty:ty) => {
        impl Key for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn description(&self) -> Option<&str> {
                self.description.as_deref()
            }

            fn columns(&self) -> &[ColumnReference] {
                &self.columns
            }

            fn columns_mut(&mut self) -> &mut Vec<ColumnReference> {
                &mut self.columns
            }
        }
    };
}

impl_key!(PrimaryKey);
impl_key!(ForeignKey);
impl_key!(Index);

impl RelationContainer for SchemaGroup {
    fn tables(&self) -> &[Table] {
        &self.tables
    }

    fn views(&self) -> &[View] {
        &self.views
    }
}

impl SchemaGroup {
    pub fn is_empty(&self) -> bool {
        RelationContainer::is_empty(self)
    }
}

impl RelationContainer for SchemaDocument {
    fn tables(&self) -> &[Table] {
        &self.tables
    }

    fn views(&self) -> &[View] {
        &self.views
    }

    /// Unlike a schema group, a document also counts relations held in its groups
    fn is_empty(&self) -> bool {
        SchemaDocument::is_empty(self)
    }
}
