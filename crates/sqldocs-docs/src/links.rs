//! Links from data type names to the engine's reference documentation

use sqldocs_core::DatabaseEngine;

const POSTGRES_DOCS: &str = "https://www.postgresql.org/docs/current";
const SQLITE_DATATYPES: &str = "https://www.sqlite.org/datatype3.html";

/// Documentation URL for a column's data type, if one is known
pub fn data_type_doc_link(engine: DatabaseEngine, data_type: &str) -> Option<String> {
    let base = base_type(data_type);
    if base.is_empty() {
        return None;
    }

    match engine {
        DatabaseEngine::Postgres => postgres_page(base).map(|page| format!("{}/{}", POSTGRES_DOCS, page)),
        DatabaseEngine::Sqlite => sqlite_is_known(base).then(|| SQLITE_DATATYPES.to_string()),
    }
}

/// Type name up to the first space, `[` or `(`
fn base_type(data_type: &str) -> &str {
    let end = data_type
        .find([' ', '[', '('])
        .unwrap_or(data_type.len());
    &data_type[..end]
}

fn postgres_page(base: &str) -> Option<&'static str> {
    let page = match base.to_lowercase().as_str() {
        "bigint" | "bigserial" | "decimal" | "double" | "integer" | "numeric" | "real"
        | "serial" | "smallint" | "smallserial" => "datatype-numeric.html",
        "money" => "datatype-money.html",
        "character" | "text" => "datatype-character.html",
        "bytea" => "datatype-binary.html",
        "timestamp" | "date" | "time" | "interval" => "datatype-datetime.html",
        "boolean" => "datatype-boolean.html",
        "bit" => "datatype-bit.html",
        "tsvector" | "tsquery" => "datatype-textsearch.html",
        "box" | "circle" | "line" | "lseg" | "path" | "point" | "polygon" => {
            "datatype-geometric.html"
        }
        "json" | "jsonb" => "datatype-json.html",
        "xml" => "datatype-xml.html",
        "int4range" | "int4multirange" | "int8range" | "int8multirange" | "numrange"
        | "nummultirange" | "tsrange" | "tsmultirange" | "tstzrange" | "tstzmultirange"
        | "daterange" | "datemultirange" => "rangetypes.html",
        "cidr" | "inet" | "macaddr" | "macaddr8" => "datatype-net-types.html",
        "uuid" => "datatype-uuid.html",
        _ => return None,
    };
    Some(page)
}

fn sqlite_is_known(base: &str) -> bool {
    matches!(
        base.to_uppercase().as_str(),
        "INT"
            | "INTEGER"
            | "TINYINT"
            | "SMALLINT"
            | "MEDIUMINT"
            | "BIGINT"
            | "TEXT"
            | "CHAR"
            | "CHARACTER"
            | "VARCHAR"
            | "NCHAR"
            | "NVARCHAR"
            | "CLOB"
            | "BLOB"
            | "REAL"
            | "DOUBLE"
            | "FLOAT"
            | "NUMERIC"
            | "DECIMAL"
            | "BOOLEAN"
            | "DATE"
            | "DATETIME"
            | "TIMESTAMP"
    )
}
