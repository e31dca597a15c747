//! Tests for document persistence

use indoc::indoc;
use tempfile::TempDir;

use super::*;
use crate::model::{
    Column, ColumnReference, ForeignKey, ForeignKeyAction, PrimaryKey, SchemaGroup, SortOrder,
    Table, ValidValue, View,
};

fn create_test_document() -> SchemaDocument {
    let mut users = Table::new("users");
    users.columns = vec![
        Column {
            is_nullable: Some(false),
            ..Column::new("id", "INTEGER")
        },
        Column {
            is_array: true,
            ..Column::new("tags", "text[]")
        },
    ];
    users.primary_key = Some(PrimaryKey {
        name: "pk_users".to_string(),
        description: None,
        columns: vec![ColumnReference::sorted("id", SortOrder::Descending)],
    });

    SchemaDocument {
        name: Some("orders_db".to_string()),
        tables: vec![users],
        ..SchemaDocument::new()
    }
}

fn create_test_full_document() -> SchemaDocument {
    let mut customers = Table::new("customers");
    customers.description = Some("Customer records, see @table:orders".to_string());
    customers.columns = vec![Column {
        description: Some("Lifecycle state".to_string()),
        is_nullable: Some(true),
        default: Some("1".to_string()),
        valid_values: vec![
            ValidValue::new("1", Some("Active")),
            ValidValue::new("2", None),
        ],
        ..Column::new("status", "smallint")
    }];

    let mut orders = Table::new("orders");
    orders.columns = vec![Column::new("customer_id", "integer")];
    orders.foreign_keys = vec![ForeignKey {
        name: "orders_customer_fk".to_string(),
        columns: vec![ColumnReference::new("customer_id")],
        foreign_table_schema: Some("sales".to_string()),
        foreign_table_name: "customers".to_string(),
        foreign_table_columns: vec![ColumnReference::new("id")],
        delete_action: Some(ForeignKeyAction::SetNull),
        update_action: Some(ForeignKeyAction::Cascade),
        ..Default::default()
    }];

    let mut sales = SchemaGroup::new("sales");
    sales.tables = vec![customers, orders];
    sales.views = vec![View {
        source: Some("SELECT 1".to_string()),
        ..View::new("ones")
    }];

    SchemaDocument {
        name: Some("shop".to_string()),
        description: Some("Shop database".to_string()),
        dbms_name: Some("PostgreSQL".to_string()),
        dbms_version: Some("16.2".to_string()),
        schemata: vec![sales],
        ..SchemaDocument::new()
    }
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fields_are_written_in_fixed_order_and_empty_ones_omitted() {
        let text = to_json_string(&create_test_document()).expect("serialize");

        let expected = indoc! {r#"
            {
              "Name": "orders_db",
              "Version": "0.0.1",
              "Tables": [
                {
                  "Name": "users",
                  "Columns": [
                    {
                      "Name": "id",
                      "DataType": "INTEGER",
                      "IsNullable": false
                    },
                    {
                      "Name": "tags",
                      "DataType": "text[]",
                      "IsArray": true
                    }
                  ],
                  "PrimaryKey": {
                    "Name": "pk_users",
                    "Columns": [
                      {
                        "Name": "id",
                        "Sorting": "Descending"
                      }
                    ]
                  }
                }
              ]
            }
        "#};
        assert_eq!(text, expected);
    }

    #[test]
    fn test_foreign_key_fields_order() {
        let text = to_json_string(&create_test_full_document()).expect("serialize");

        let positions: Vec<usize> = [
            "\"ForeignTableSchema\"",
            "\"ForeignTableName\"",
            "\"ForeignTableColumns\"",
            "\"DeleteAction\": \"SetNull\"",
            "\"UpdateAction\": \"Cascade\"",
        ]
        .iter()
        .map(|field| text.find(field).expect("field should be present"))
        .collect();

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_markup_and_non_ascii_are_not_escaped() {
        let mut document = SchemaDocument::new();
        document.description = Some("<b>Käse</b> & \"Brot\"".to_string());

        let text = to_json_string(&document).expect("serialize");

        assert!(text.contains(r#""Description": "<b>Käse</b> & \"Brot\"""#));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let document = from_json_str(r#"{ "Tables": [ { "Name": "users" } ] }"#).expect("parse");

        assert_eq!(document.version.as_deref(), Some("0.0.1"));
        assert_eq!(document.tables[0].name, "users");
        assert!(document.tables[0].columns.is_empty());
        assert!(document.schemata.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let document =
            from_json_str(r#"{ "Name": "db", "Owner": "someone" }"#).expect("parse");

        assert_eq!(document.name.as_deref(), Some("db"));
    }

    #[test]
    fn test_byte_order_mark_is_accepted() {
        let document = from_json_str("\u{feff}{ \"Name\": \"db\" }").expect("parse");

        assert_eq!(document.name.as_deref(), Some("db"));
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let first = to_json_string(&create_test_full_document()).expect("serialize");
        let reloaded = from_json_str(&first).expect("parse");
        let second = to_json_string(&reloaded).expect("serialize");

        assert_eq!(reloaded, create_test_full_document());
        assert_eq!(first, second);
    }

    #[test]
    fn test_null_version_survives_round_trip() {
        let document = from_json_str(r#"{ "Name": "shop", "Version": null }"#).expect("parse");
        assert_eq!(document.version, None);

        let first = to_json_string(&document).expect("serialize");
        let reloaded = from_json_str(&first).expect("parse");
        let second = to_json_string(&reloaded).expect("serialize");

        assert_eq!(reloaded.version, None);
        assert_eq!(first, second);
        assert!(first.contains(r#""Version": null"#));
    }

    #[test]
    fn test_is_empty_looks_into_schema_groups() {
        let mut document = SchemaDocument::new();
        document.schemata.push(SchemaGroup::new("public"));
        assert!(document.is_empty());

        let mut document = create_test_full_document();
        assert!(!document.is_empty());

        document.schemata[0].tables.clear();
        document.schemata[0].views.clear();
        assert!(document.is_empty());
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("schema.json");
        let document = create_test_full_document();

        save(&document, &path).expect("save");
        let first = std::fs::read(&path).expect("read");

        let loaded = load(&path).expect("load");
        save(&loaded, &path).expect("save again");
        let second = std::fs::read(&path).expect("read");

        assert_eq!(loaded, document);
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_creates_missing_directories() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("docs").join("meta").join("schema.json");

        save(&create_test_document(), &path).expect("save");

        assert!(path.exists());
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("schema.json");
        std::fs::write(&path, "stale content that is much longer than needed").expect("write");

        save(&create_test_document(), &path).expect("save");

        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text, to_json_string(&create_test_document()).expect("serialize"));
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("missing.json");

        let err = load(&path).expect_err("should fail");

        assert!(matches!(err, SqlDocsError::DocumentNotFound(p) if p == path));
        assert!(load_if_exists(&path).expect("no error").is_none());
    }

    #[test]
    fn test_load_unparsable_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"Name\": ").expect("write");

        let err = load_if_exists(&path).expect_err("should fail");

        assert!(matches!(err, SqlDocsError::DocumentParse { .. }));
    }

    #[test]
    fn test_load_and_merge_without_file_returns_source() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("schema.json");
        let source = create_test_full_document();

        let result = load_and_merge(&path, source.clone()).expect("merge");

        assert_eq!(result, source);
    }

    #[test]
    fn test_load_and_merge_keeps_annotations_from_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("schema.json");
        let annotated = create_test_full_document();
        save(&annotated, &path).expect("save");

        let mut source = create_test_full_document();
        source.description = Some("another".to_string());
        source.schemata[0].tables[0].description = None;
        source.schemata[0].tables[0].columns[0].description = None;
        source.schemata[0].tables[0].columns[0].valid_values.clear();

        let result = load_and_merge(&path, source).expect("merge");

        assert_eq!(result, annotated);
    }
}
