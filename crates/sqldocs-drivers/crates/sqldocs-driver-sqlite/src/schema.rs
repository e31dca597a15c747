//! SQLite schema introspection
//!
//! SQLite has no schema namespaces, so tables and views are attached to the
//! document directly. Primary and foreign keys are unnamed in the catalog;
//! they get stable synthetic names derived from the table and column names.

use rusqlite::Connection as RusqliteConnection;
use sqldocs_core::{
    Column, ColumnReference, DatabaseEngine, ForeignKey, ForeignKeyAction, Index, PrimaryKey,
    Result, SchemaDocument, SortOrder, Table, View,
};

use crate::connection::{SqliteConnection, introspection_error};

/// Read the complete structure of the database
#[tracing::instrument(skip(connection), fields(path = %connection.path().display()))]
pub(crate) fn read_schema(connection: &SqliteConnection) -> Result<SchemaDocument> {
    let conn = connection.inner();
    let database_name = connection
        .path()
        .file_stem()
        .map(|s| s.to_string_lossy().to_string());

    let mut document = SchemaDocument {
        name: database_name.clone(),
        description: database_name,
        dbms_name: Some(DatabaseEngine::Sqlite.display_name().to_string()),
        dbms_version: Some(connection.server_version()?),
        ..SchemaDocument::new()
    };

    for name in list_tables(conn)? {
        document.tables.push(read_table(conn, name)?);
    }

    for (name, source) in list_views(conn)? {
        let columns = read_columns(conn, &name)?;
        document.views.push(View {
            name,
            description: None,
            columns,
            source,
        });
    }

    tracing::debug!(
        tables = document.tables.len(),
        views = document.views.len(),
        "SQLite schema read"
    );
    Ok(document)
}

fn list_tables(conn: &RusqliteConnection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .map_err(introspection_error)?;

    stmt.query_map([], |row| row.get(0))
        .and_then(|rows| rows.collect())
        .map_err(introspection_error)
}

fn list_views(conn: &RusqliteConnection) -> Result<Vec<(String, Option<String>)>> {
    let mut stmt = conn
        .prepare("SELECT name, sql FROM sqlite_master WHERE type = 'view' ORDER BY name")
        .map_err(introspection_error)?;

    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .and_then(|rows| rows.collect())
        .map_err(introspection_error)
}

fn read_table(conn: &RusqliteConnection, name: String) -> Result<Table> {
    tracing::trace!(table = %name, "reading table");
    let columns = read_columns(conn, &name)?;
    let primary_key = read_primary_key(conn, &name)?;
    let foreign_keys = read_foreign_keys(conn, &name)?;
    let indices = read_indices(conn, &name)?;

    Ok(Table {
        name,
        description: None,
        columns,
        primary_key,
        foreign_keys,
        indices,
    })
}

fn read_columns(conn: &RusqliteConnection, relation: &str) -> Result<Vec<Column>> {
    let mut stmt = conn
        .prepare(
            r#"SELECT name, type, "notnull", dflt_value FROM pragma_table_info(?1) ORDER BY cid"#,
        )
        .map_err(introspection_error)?;

    stmt.query_map([relation], |row| {
        let not_null: i64 = row.get(2)?;
        Ok(Column {
            name: row.get(0)?,
            data_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            is_nullable: Some(not_null == 0),
            default: row.get(3)?,
            ..Default::default()
        })
    })
    .and_then(|rows| rows.collect())
    .map_err(introspection_error)
}

fn read_primary_key(conn: &RusqliteConnection, table: &str) -> Result<Option<PrimaryKey>> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk")
        .map_err(introspection_error)?;

    let columns: Vec<ColumnReference> = stmt
        .query_map([table], |row| Ok(ColumnReference::new(row.get::<_, String>(0)?)))
        .and_then(|rows| rows.collect())
        .map_err(introspection_error)?;

    if columns.is_empty() {
        return Ok(None);
    }

    Ok(Some(PrimaryKey {
        name: format!("pk_{}", table),
        description: None,
        columns,
    }))
}

struct ForeignKeyRow {
    id: i64,
    foreign_table: String,
    from: String,
    to: Option<String>,
    on_update: String,
    on_delete: String,
}

fn read_foreign_keys(conn: &RusqliteConnection, table: &str) -> Result<Vec<ForeignKey>> {
    let mut stmt = conn
        .prepare(
            r#"SELECT id, "table", "from", "to", on_update, on_delete
               FROM pragma_foreign_key_list(?1)
               ORDER BY id, seq"#,
        )
        .map_err(introspection_error)?;

    let rows: Vec<ForeignKeyRow> = stmt
        .query_map([table], |row| {
            Ok(ForeignKeyRow {
                id: row.get(0)?,
                foreign_table: row.get(1)?,
                from: row.get(2)?,
                to: row.get(3)?,
                on_update: row.get(4)?,
                on_delete: row.get(5)?,
            })
        })
        .and_then(|rows| rows.collect())
        .map_err(introspection_error)?;

    let mut foreign_keys: Vec<(i64, ForeignKey)> = Vec::new();
    let mut implicit_targets: Vec<usize> = Vec::new();

    for row in rows {
        let position = match foreign_keys.iter().position(|(id, _)| *id == row.id) {
            Some(position) => position,
            None => {
                foreign_keys.push((
                    row.id,
                    ForeignKey {
                        foreign_table_name: row.foreign_table.clone(),
                        update_action: Some(parse_fk_action(&row.on_update)),
                        delete_action: Some(parse_fk_action(&row.on_delete)),
                        ..Default::default()
                    },
                ));
                foreign_keys.len() - 1
            }
        };

        let fk = &mut foreign_keys[position].1;
        fk.columns.push(ColumnReference::new(row.from));
        match row.to {
            Some(to) => fk.foreign_table_columns.push(ColumnReference::new(to)),
            None if !implicit_targets.contains(&position) => implicit_targets.push(position),
            None => {}
        }
    }

    // `REFERENCES parent` without a column list points at the parent's primary key
    for position in implicit_targets {
        let fk = &mut foreign_keys[position].1;
        if let Some(pk) = read_primary_key(conn, &fk.foreign_table_name)? {
            fk.foreign_table_columns = pk.columns;
        }
    }

    assign_foreign_key_names(table, &mut foreign_keys);
    Ok(foreign_keys.into_iter().map(|(_, fk)| fk).collect())
}

fn foreign_key_name(table: &str, fk: &ForeignKey) -> String {
    let columns: Vec<&str> = fk.columns.iter().map(|c| c.name.as_str()).collect();
    format!("fk_{}_{}", table, columns.join("_"))
}

/// SQLite keeps no constraint names, so names are derived and must stay unique
/// within the table. Keys sharing their local columns get the parent table
/// appended, and the pragma id when even that collides.
fn assign_foreign_key_names(table: &str, foreign_keys: &mut [(i64, ForeignKey)]) {
    let base: Vec<String> = foreign_keys
        .iter()
        .map(|(_, fk)| foreign_key_name(table, fk))
        .collect();
    let qualified: Vec<String> = foreign_keys
        .iter()
        .zip(&base)
        .map(|((_, fk), name)| format!("{}_{}", name, fk.foreign_table_name))
        .collect();

    for (i, (id, fk)) in foreign_keys.iter_mut().enumerate() {
        fk.name = if base.iter().filter(|n| **n == base[i]).count() == 1 {
            base[i].clone()
        } else if qualified.iter().filter(|n| **n == qualified[i]).count() == 1 {
            qualified[i].clone()
        } else {
            format!("{}_{}", qualified[i], id)
        };
    }
}

fn read_indices(conn: &RusqliteConnection, table: &str) -> Result<Vec<Index>> {
    let mut stmt = conn
        .prepare(
            r#"SELECT name, "unique" FROM pragma_index_list(?1) WHERE origin <> 'pk' ORDER BY name"#,
        )
        .map_err(introspection_error)?;

    let entries: Vec<(String, bool)> = stmt
        .query_map([table], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? == 1)))
        .and_then(|rows| rows.collect())
        .map_err(introspection_error)?;

    let mut column_stmt = conn
        .prepare(
            r#"SELECT name, "desc" FROM pragma_index_xinfo(?1) WHERE key = 1 AND name IS NOT NULL ORDER BY seqno"#,
        )
        .map_err(introspection_error)?;

    let mut indices = Vec::with_capacity(entries.len());
    for (name, is_unique) in entries {
        let columns: Vec<ColumnReference> = column_stmt
            .query_map([name.as_str()], |row| {
                let column: String = row.get(0)?;
                let descending: i64 = row.get(1)?;
                Ok(if descending == 1 {
                    ColumnReference::sorted(column, SortOrder::Descending)
                } else {
                    ColumnReference::new(column)
                })
            })
            .and_then(|rows| rows.collect())
            .map_err(introspection_error)?;

        indices.push(Index {
            name,
            description: None,
            columns,
            is_unique: Some(is_unique),
        });
    }

    Ok(indices)
}

fn parse_fk_action(action: &str) -> ForeignKeyAction {
    match action.to_uppercase().as_str() {
        "CASCADE" => ForeignKeyAction::Cascade,
        "SET NULL" => ForeignKeyAction::SetNull,
        "SET DEFAULT" => ForeignKeyAction::SetDefault,
        "RESTRICT" => ForeignKeyAction::Restrict,
        _ => ForeignKeyAction::NoAction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fk_action() {
        assert_eq!(parse_fk_action("CASCADE"), ForeignKeyAction::Cascade);
        assert_eq!(parse_fk_action("set null"), ForeignKeyAction::SetNull);
        assert_eq!(parse_fk_action("SET DEFAULT"), ForeignKeyAction::SetDefault);
        assert_eq!(parse_fk_action("RESTRICT"), ForeignKeyAction::Restrict);
        assert_eq!(parse_fk_action("NO ACTION"), ForeignKeyAction::NoAction);
    }

    #[test]
    fn test_foreign_key_name_uses_local_columns() {
        let fk = ForeignKey {
            columns: vec![
                ColumnReference::new("customer_id"),
                ColumnReference::new("tenant_id"),
            ],
            foreign_table_name: "customers".to_string(),
            ..Default::default()
        };

        assert_eq!(
            foreign_key_name("orders", &fk),
            "fk_orders_customer_id_tenant_id"
        );
    }

    fn create_test_foreign_key(column: &str, parent: &str) -> ForeignKey {
        ForeignKey {
            columns: vec![ColumnReference::new(column)],
            foreign_table_name: parent.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_foreign_keys_sharing_columns_get_distinct_names() {
        let mut foreign_keys = vec![
            (0, create_test_foreign_key("x", "b")),
            (1, create_test_foreign_key("x", "a")),
            (2, create_test_foreign_key("y", "a")),
            (3, create_test_foreign_key("z", "a")),
            (4, create_test_foreign_key("z", "a")),
        ];

        assign_foreign_key_names("c", &mut foreign_keys);

        let names: Vec<&str> = foreign_keys.iter().map(|(_, fk)| fk.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "fk_c_x_b",
                "fk_c_x_a",
                "fk_c_y",
                "fk_c_z_a_3",
                "fk_c_z_a_4"
            ]
        );
    }
}
