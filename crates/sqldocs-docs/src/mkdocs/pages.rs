//! Markdown content of the generated pages

use rust_i18n::t;
use sqldocs_core::{
    Column, DatabaseEngine, ForeignKey, ForeignKeyAction, Index, Key, Relation, SchemaDocument,
    SchemaGroup, SortOrder, Table, View,
};

use crate::links::data_type_doc_link;
use crate::markdown::{Definition, MarkdownBuilder, code_span, escape, link, strong, table};
use crate::markup::render_description;
use crate::text::plural;

/// Relation pages sit one folder below the schema pages
const RELATION_PREFIX: &str = "../";

pub(super) struct Pages<'a> {
    pub engine: DatabaseEngine,
    pub locale: &'a str,
}

impl Pages<'_> {
    /// Landing page, written once
    pub fn home(&self, document: &SchemaDocument) -> String {
        let mut md = MarkdownBuilder::new();
        md.heading(1, &t!("introduction", locale = self.locale));
        if let Some(description) = &document.description {
            md.paragraph(&escape(description));
        }
        md.finish()
    }

    pub fn schema(&self, group: &SchemaGroup) -> String {
        let locale = self.locale;
        let mut md = MarkdownBuilder::new();

        let name = strong(&escape(&group.name));
        md.heading(1, &t!("schema_title", locale = locale, name = name));
        if let Some(description) = &group.description {
            md.paragraph(&render_description("", description));
        }

        if !group.tables.is_empty() {
            let count = group.tables.len();
            md.heading(2, &t!("tables", locale = locale));
            md.paragraph(&plural(
                count,
                t!("schema_tables_one", locale = locale),
                t!("schema_tables_other", locale = locale, count = count),
            ));
            let items: Vec<String> = group
                .tables
                .iter()
                .map(|table| {
                    link(
                        &escape(&table.name),
                        &format!("tables/{}.md", table.name.to_lowercase()),
                    )
                })
                .collect();
            md.unordered_list(&items);
        }

        if !group.views.is_empty() {
            let count = group.views.len();
            md.heading(2, &t!("views", locale = locale));
            md.paragraph(&plural(
                count,
                t!("schema_views_one", locale = locale),
                t!("schema_views_other", locale = locale, count = count),
            ));
            let items: Vec<String> = group
                .views
                .iter()
                .map(|view| {
                    link(
                        &escape(&view.name),
                        &format!("views/{}.md", view.name.to_lowercase()),
                    )
                })
                .collect();
            md.unordered_list(&items);
        }

        md.finish()
    }

    pub fn table(&self, schema: Option<&str>, table: &Table) -> String {
        let locale = self.locale;
        let mut md = MarkdownBuilder::new();

        let name = strong(&escape(&table.name));
        md.heading(1, &t!("table_title", locale = locale, name = name));
        if let Some(description) = &table.description {
            md.paragraph(&render_description(RELATION_PREFIX, description));
        }

        if let Some(schema) = schema {
            let schema_link = schema_link(schema);
            md.heading(2, &t!("schema", locale = locale));
            md.paragraph(&t!("table_schema", locale = locale, link = schema_link));
        }

        let count = table.columns.len();
        self.columns_section(
            &mut md,
            table,
            plural(
                count,
                t!("table_columns_one", locale = locale),
                t!("table_columns_other", locale = locale, count = count),
            ),
        );

        if let Some(pk) = &table.primary_key {
            md.heading(2, &t!("primary_key", locale = locale));
            md.paragraph(&t!("table_primary_key", locale = locale));
            let mut definition = key_definition(pk);
            definition.push(code_span(&pk.column_list()));
            push_description(&mut definition, pk.description.as_deref());
            md.definition_list(&[definition]);
        }

        if !table.foreign_keys.is_empty() {
            let count = table.foreign_keys.len();
            md.heading(2, &t!("foreign_keys", locale = locale));
            md.paragraph(&plural(
                count,
                t!("table_foreign_keys_one", locale = locale),
                t!("table_foreign_keys_other", locale = locale, count = count),
            ));
            let definitions: Vec<Definition> = table
                .foreign_keys
                .iter()
                .map(|fk| {
                    let mut definition = key_definition(fk);
                    definition.push(foreign_key_paragraph(fk));
                    push_description(&mut definition, fk.description.as_deref());
                    definition
                })
                .collect();
            md.definition_list(&definitions);
        }

        if !table.indices.is_empty() {
            let count = table.indices.len();
            md.heading(2, &t!("indices", locale = locale));
            md.paragraph(&plural(
                count,
                t!("table_indices_one", locale = locale),
                t!("table_indices_other", locale = locale, count = count),
            ));
            let definitions: Vec<Definition> = table
                .indices
                .iter()
                .map(|index| {
                    let mut definition = key_definition(index);
                    definition.push(index_paragraph(index));
                    push_description(&mut definition, index.description.as_deref());
                    definition
                })
                .collect();
            md.definition_list(&definitions);
        }

        md.finish()
    }

    pub fn view(&self, schema: Option<&str>, view: &View) -> String {
        let locale = self.locale;
        let mut md = MarkdownBuilder::new();

        let name = strong(&escape(&view.name));
        md.heading(1, &t!("view_title", locale = locale, name = name));
        if let Some(description) = &view.description {
            md.paragraph(&render_description(RELATION_PREFIX, description));
        }

        if let Some(schema) = schema {
            let schema_link = schema_link(schema);
            md.heading(2, &t!("schema", locale = locale));
            md.paragraph(&t!("view_schema", locale = locale, link = schema_link));
        }

        if let Some(source) = view.source.as_deref().filter(|s| !s.trim().is_empty()) {
            md.heading(2, &t!("query", locale = locale));
            md.collapsed_admonition(
                "info",
                &t!("sql", locale = locale),
                &crate::markdown::fenced_code("sql", source),
            );
        }

        let count = view.columns.len();
        self.columns_section(
            &mut md,
            view,
            plural(
                count,
                t!("view_columns_one", locale = locale),
                t!("view_columns_other", locale = locale, count = count),
            ),
        );

        md.finish()
    }

    fn columns_section(&self, md: &mut MarkdownBuilder, relation: &impl Relation, summary: String) {
        md.heading(2, &t!("columns", locale = self.locale));
        md.paragraph(&summary);
        md.definition_list(&self.column_definitions(relation.columns()));
    }

    fn column_definitions(&self, columns: &[Column]) -> Vec<Definition> {
        columns
            .iter()
            .map(|column| {
                let mut definition = Definition::new(strong(&code_span(&column.name)));
                definition.push(self.data_type_and_constraints(column));
                push_description(&mut definition, column.description.as_deref());
                if !column.valid_values.is_empty() {
                    definition.push(self.valid_values_table(column));
                }
                definition
            })
            .collect()
    }

    /// `type` · `NOT NULL` · `default`
    fn data_type_and_constraints(&self, column: &Column) -> String {
        let mut parts = Vec::new();

        if !column.data_type.is_empty() {
            let data_type = code_span(&column.data_type);
            parts.push(match data_type_doc_link(self.engine, &column.data_type) {
                Some(url) => link(&data_type, &url),
                None => data_type,
            });
        }
        if column.is_nullable == Some(false) {
            parts.push(code_span("NOT NULL"));
        }
        if let Some(default) = &column.default {
            parts.push(code_span(default));
        }

        parts.join(" · ")
    }

    fn valid_values_table(&self, column: &Column) -> String {
        let header = vec![
            t!("value", locale = self.locale).into_owned(),
            t!("description", locale = self.locale).into_owned(),
        ];
        let rows: Vec<Vec<String>> = column
            .valid_values
            .iter()
            .map(|valid| {
                vec![
                    escape(&valid.value),
                    valid
                        .description
                        .as_deref()
                        .map(|d| render_description(RELATION_PREFIX, d))
                        .unwrap_or_default(),
                ]
            })
            .collect();
        table(&header, &rows)
    }
}

fn schema_link(schema: &str) -> String {
    link(&escape(schema), "../../schema")
}

fn key_definition(key: &impl Key) -> Definition {
    Definition::new(strong(&code_span(key.name())))
}

fn push_description(definition: &mut Definition, description: Option<&str>) {
    if let Some(description) = description {
        definition.push(render_description(RELATION_PREFIX, description));
    }
}

fn action_text(action: Option<ForeignKeyAction>) -> &'static str {
    action.map_or("?", |a| a.as_sql())
}

/// `cols` » [`schema.table (cols)`](link) · `ON UPDATE …` · `ON DELETE …`
fn foreign_key_paragraph(fk: &ForeignKey) -> String {
    let target_columns = fk
        .foreign_table_columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let target = match fk.foreign_table_schema.as_deref().filter(|s| !s.is_empty()) {
        None => link(
            &code_span(&format!("{} ({})", fk.foreign_table_name, target_columns)),
            &format!("../../tables/{}", fk.foreign_table_name.to_lowercase()),
        ),
        Some(schema) => link(
            &code_span(&format!(
                "{}.{} ({})",
                schema, fk.foreign_table_name, target_columns
            )),
            &format!(
                "../../../{}/tables/{}",
                schema.to_lowercase(),
                fk.foreign_table_name.to_lowercase()
            ),
        ),
    };

    format!(
        "{} » {} · {} · {}",
        code_span(&fk.column_list()),
        target,
        code_span(&format!("ON UPDATE {}", action_text(fk.update_action))),
        code_span(&format!("ON DELETE {}", action_text(fk.delete_action))),
    )
}

/// `col, col DESC` followed by `UNIQUE` for unique indices
fn index_paragraph(index: &Index) -> String {
    let columns = index
        .columns
        .iter()
        .map(|c| match c.sorting {
            Some(SortOrder::Descending) => format!("{} DESC", c.name),
            _ => c.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut paragraph = code_span(&columns);
    if index.is_unique == Some(true) {
        paragraph.push_str(" · ");
        paragraph.push_str(&code_span("UNIQUE"));
    }
    paragraph
}
