//! PostgreSQL schema introspection
//!
//! Everything is read from `pg_catalog`. Names are cast to `text` so rows
//! decode straight into `String` instead of the `name` type.

use sqldocs_core::{
    Column, ColumnReference, DatabaseEngine, ForeignKey, ForeignKeyAction, Index, PrimaryKey,
    Result, SchemaDocument, SchemaGroup, SortOrder, Table, View,
};
use tokio_postgres::Row;

use crate::connection::PostgresConnection;

const DATABASE_QUERY: &str = "SELECT current_database()::text, current_setting('server_version')";

const SCHEMATA_QUERY: &str = r#"
    SELECT sch.nspname::text AS schema_name
    FROM pg_namespace sch
    WHERE sch.nspname NOT IN ('pg_toast', 'pg_catalog', 'information_schema')
      AND sch.nspname NOT LIKE 'pg\_temp\_%'
      AND sch.nspname NOT LIKE 'pg\_toast\_temp\_%'
    ORDER BY schema_name
"#;

const TABLES_QUERY: &str = r#"
    SELECT tbl.relname::text AS table_name
    FROM pg_class tbl
    JOIN pg_namespace sch ON sch.oid = tbl.relnamespace
    WHERE tbl.relkind IN ('r', 'p') AND NOT tbl.relispartition AND sch.nspname = $1
    ORDER BY table_name
"#;

const VIEWS_QUERY: &str = r#"
    SELECT rel.relname::text AS view_name, pg_get_viewdef(rel.oid) AS view_source
    FROM pg_class rel
    JOIN pg_namespace sch ON sch.oid = rel.relnamespace
    WHERE rel.relkind = 'v' AND sch.nspname = $1
    ORDER BY view_name
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
      col.attname::text AS name,
      format_type(col.atttypid, col.atttypmod) AS data_type,
      col.attnotnull AS not_null,
      col.attndims > 0 OR typ.typcategory = 'A' AS is_array,
      pg_get_expr(col_def.adbin, col_def.adrelid) AS "default"
    FROM pg_attribute col
    JOIN pg_class tbl ON tbl.oid = col.attrelid
    JOIN pg_namespace sch ON sch.oid = tbl.relnamespace
    JOIN pg_type typ ON typ.oid = col.atttypid
    LEFT JOIN pg_attrdef col_def
      ON col_def.adrelid = col.attrelid AND col_def.adnum = col.attnum AND col.atthasdef
    WHERE col.attnum > 0 AND NOT col.attisdropped
      AND sch.nspname = $1 AND tbl.relname = $2
    ORDER BY col.attnum
"#;

const PRIMARY_KEY_QUERY: &str = r#"
    SELECT
      c.conname::text AS constraint_name,
      ARRAY_AGG(col.attname::text ORDER BY u.attposition) AS table_columns
    FROM pg_constraint c
    CROSS JOIN LATERAL UNNEST(c.conkey) WITH ORDINALITY AS u(attnum, attposition)
    JOIN pg_class tbl ON tbl.oid = c.conrelid
    JOIN pg_namespace sch ON sch.oid = tbl.relnamespace
    JOIN pg_attribute col ON col.attrelid = tbl.oid AND col.attnum = u.attnum
    WHERE c.contype = 'p' AND sch.nspname = $1 AND tbl.relname = $2
    GROUP BY constraint_name
"#;

const FOREIGN_KEYS_QUERY: &str = r#"
    SELECT
      c.conname::text AS name,
      ARRAY_AGG(col.attname::text ORDER BY u.attposition) AS table_columns,
      f_sch.nspname::text AS foreign_table_schema,
      f_tbl.relname::text AS foreign_table_name,
      ARRAY_AGG(f_col.attname::text ORDER BY u.attposition) AS foreign_table_columns,
      c.confupdtype::text AS update_action,
      c.confdeltype::text AS delete_action
    FROM pg_constraint c
    CROSS JOIN LATERAL UNNEST(c.conkey, c.confkey) WITH ORDINALITY AS u(attnum, f_attnum, attposition)
    JOIN pg_class tbl ON tbl.oid = c.conrelid
    JOIN pg_namespace sch ON sch.oid = tbl.relnamespace
    JOIN pg_attribute col ON col.attrelid = tbl.oid AND col.attnum = u.attnum
    JOIN pg_class f_tbl ON f_tbl.oid = c.confrelid
    JOIN pg_namespace f_sch ON f_sch.oid = f_tbl.relnamespace
    JOIN pg_attribute f_col ON f_col.attrelid = f_tbl.oid AND f_col.attnum = u.f_attnum
    WHERE c.contype = 'f' AND sch.nspname = $1 AND tbl.relname = $2
    GROUP BY name, foreign_table_schema, foreign_table_name, update_action, delete_action
    ORDER BY name
"#;

const INDICES_QUERY: &str = r#"
    SELECT
      i_rel.relname::text AS index_name,
      idx.indisunique AS index_unique,
      ARRAY_AGG(col.attname::text ORDER BY k.ord) AS index_columns,
      ARRAY_AGG((k.opt & 1) = 1 ORDER BY k.ord) AS index_descending
    FROM pg_index idx
    JOIN pg_class tbl ON tbl.oid = idx.indrelid
    JOIN pg_namespace sch ON sch.oid = tbl.relnamespace
    JOIN pg_class i_rel ON i_rel.oid = idx.indexrelid
    CROSS JOIN LATERAL UNNEST(idx.indkey::int2[], idx.indoption::int2[])
      WITH ORDINALITY AS k(attnum, opt, ord)
    JOIN pg_attribute col ON col.attrelid = tbl.oid AND col.attnum = k.attnum
    WHERE NOT idx.indisprimary AND k.ord <= idx.indnkeyatts
      AND sch.nspname = $1 AND tbl.relname = $2
    GROUP BY index_name, index_unique
    ORDER BY index_name
"#;

/// Read the complete structure of the connected database
#[tracing::instrument(skip(connection))]
pub(crate) async fn read_schema(connection: &PostgresConnection) -> Result<SchemaDocument> {
    let row = connection.query_one(DATABASE_QUERY, &[]).await?;
    let database: String = row.get(0);
    let server_version: String = row.get(1);

    let mut document = SchemaDocument {
        name: Some(database.clone()),
        description: Some(database),
        dbms_name: Some(DatabaseEngine::Postgres.display_name().to_string()),
        dbms_version: Some(server_version),
        ..SchemaDocument::new()
    };

    for row in connection.query(SCHEMATA_QUERY, &[]).await? {
        let name: String = row.get("schema_name");
        document.schemata.push(read_schema_group(connection, name).await?);
    }

    tracing::debug!(schemata = document.schemata.len(), "PostgreSQL schema read");
    Ok(document)
}

async fn read_schema_group(connection: &PostgresConnection, name: String) -> Result<SchemaGroup> {
    tracing::trace!(schema = %name, "reading schema");
    let mut group = SchemaGroup::new(name);

    for row in connection.query(TABLES_QUERY, &[&group.name]).await? {
        let table_name: String = row.get("table_name");
        let table = read_table(connection, &group.name, table_name).await?;
        group.tables.push(table);
    }

    for row in connection.query(VIEWS_QUERY, &[&group.name]).await? {
        let view_name: String = row.get("view_name");
        let columns = read_columns(connection, &group.name, &view_name).await?;
        group.views.push(View {
            name: view_name,
            description: None,
            columns,
            source: row.get::<_, Option<String>>("view_source").map(|s| s.trim().to_string()),
        });
    }

    Ok(group)
}

async fn read_table(connection: &PostgresConnection, schema: &str, name: String) -> Result<Table> {
    tracing::trace!(schema = %schema, table = %name, "reading table");
    let columns = read_columns(connection, schema, &name).await?;
    let primary_key = connection
        .query(PRIMARY_KEY_QUERY, &[&schema, &name])
        .await?
        .first()
        .map(primary_key_from_row);
    let foreign_keys = connection
        .query(FOREIGN_KEYS_QUERY, &[&schema, &name])
        .await?
        .iter()
        .map(foreign_key_from_row)
        .collect();
    let indices = connection
        .query(INDICES_QUERY, &[&schema, &name])
        .await?
        .iter()
        .map(index_from_row)
        .collect();

    Ok(Table {
        name,
        description: None,
        columns,
        primary_key,
        foreign_keys,
        indices,
    })
}

async fn read_columns(
    connection: &PostgresConnection,
    schema: &str,
    relation: &str,
) -> Result<Vec<Column>> {
    Ok(connection
        .query(COLUMNS_QUERY, &[&schema, &relation])
        .await?
        .iter()
        .map(|row| Column {
            name: row.get("name"),
            data_type: row.get("data_type"),
            is_nullable: Some(!row.get::<_, bool>("not_null")),
            is_array: row.get("is_array"),
            default: row.get("default"),
            ..Default::default()
        })
        .collect())
}

fn primary_key_from_row(row: &Row) -> PrimaryKey {
    let columns: Vec<String> = row.get("table_columns");
    PrimaryKey {
        name: row.get("constraint_name"),
        description: None,
        columns: columns.into_iter().map(ColumnReference::new).collect(),
    }
}

fn foreign_key_from_row(row: &Row) -> ForeignKey {
    let columns: Vec<String> = row.get("table_columns");
    let foreign_columns: Vec<String> = row.get("foreign_table_columns");
    ForeignKey {
        name: row.get("name"),
        description: None,
        columns: columns.into_iter().map(ColumnReference::new).collect(),
        foreign_table_schema: row.get("foreign_table_schema"),
        foreign_table_name: row.get("foreign_table_name"),
        foreign_table_columns: foreign_columns.into_iter().map(ColumnReference::new).collect(),
        update_action: parse_fk_action(row.get("update_action")),
        delete_action: parse_fk_action(row.get("delete_action")),
    }
}

fn index_from_row(row: &Row) -> Index {
    let columns: Vec<String> = row.get("index_columns");
    let descending: Vec<bool> = row.get("index_descending");
    Index {
        name: row.get("index_name"),
        description: None,
        columns: columns
            .into_iter()
            .zip(descending)
            .map(|(name, desc)| {
                if desc {
                    ColumnReference::sorted(name, SortOrder::Descending)
                } else {
                    ColumnReference::new(name)
                }
            })
            .collect(),
        is_unique: Some(row.get("index_unique")),
    }
}

/// Decode `pg_constraint.confupdtype` / `confdeltype`
fn parse_fk_action(code: &str) -> Option<ForeignKeyAction> {
    match code {
        "a" => Some(ForeignKeyAction::NoAction),
        "r" => Some(ForeignKeyAction::Restrict),
        "c" => Some(ForeignKeyAction::Cascade),
        "n" => Some(ForeignKeyAction::SetNull),
        "d" => Some(ForeignKeyAction::SetDefault),
        _ => None,
    }
}
