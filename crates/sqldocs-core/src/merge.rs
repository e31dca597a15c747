//! Schema merge engine
//!
//! Reconciles a stored, possibly hand-edited document (the target) with a
//! freshly introspected one (the source). Structure always follows the
//! source: elements missing from the source are dropped, new ones are
//! appended. Annotations survive: a target field is only overwritten when the
//! source actually carries a value for it.
//!
//! Every named collection is reconciled the same way by [`merge_list`];
//! elements are matched by exact, case-sensitive name (valid values by their
//! value). Names are expected to be unique within their parent.

use std::collections::HashSet;

use crate::model::{
    Column, ColumnReference, ForeignKey, Index, PrimaryKey, SchemaDocument, SchemaGroup, Table,
    ValidValue, View,
};

/// An element of a named collection that can absorb a newer version of itself
pub trait MergeItem {
    /// Identity used to match target and source elements
    fn identity(&self) -> &str;

    /// Fold a matching source element into this one
    fn merge_from(&mut self, source: Self);
}

/// Merge a freshly introspected `source` into `target` in place.
pub fn merge(target: &mut SchemaDocument, source: SchemaDocument) {
    adopt_if_blank(&mut target.name, source.name);
    adopt_if_blank(&mut target.version, source.version);
    adopt_if_blank(&mut target.description, source.description);
    adopt_if_blank(&mut target.dbms_name, source.dbms_name);
    adopt_if_blank(&mut target.dbms_version, source.dbms_version);

    merge_list(&mut target.schemata, source.schemata);
    merge_list(&mut target.tables, source.tables);
    merge_list(&mut target.views, source.views);

    tracing::debug!(
        schemata = target.schemata.len(),
        tables = target.tables.len(),
        views = target.views.len(),
        "schema document merged"
    );
}

/// Owned variant of [`merge`]
pub fn merged(mut target: SchemaDocument, source: SchemaDocument) -> SchemaDocument {
    merge(&mut target, source);
    target
}

/// Reconcile a named collection: drop what the source no longer has, update
/// what both have and append what only the source has.
pub fn merge_list<T: MergeItem>(target: &mut Vec<T>, source: Vec<T>) {
    let before = target.len();
    let incoming: HashSet<&str> = source.iter().map(T::identity).collect();
    target.retain(|item| incoming.contains(item.identity()));
    let removed = before - target.len();

    let mut added = 0usize;
    for item in source {
        match target.iter_mut().find(|t| t.identity() == item.identity()) {
            Some(existing) => existing.merge_from(item),
            None => {
                target.push(item);
                added += 1;
            }
        }
    }

    if removed > 0 || added > 0 {
        tracing::trace!(
            kind = std::any::type_name::<T>(),
            removed,
            added,
            "collection reconciled"
        );
    }
}

/// Rebuild a key column list in the source's order, keeping the sort order
/// recorded in the target for columns the source reports without one.
fn merge_column_references(target: &mut Vec<ColumnReference>, source: Vec<ColumnReference>) {
    let mut previous = std::mem::take(target);
    target.reserve(source.len());

    for mut reference in source {
        if let Some(pos) = previous.iter().position(|p| p.name == reference.name) {
            let existing = previous.swap_remove(pos);
            if reference.sorting.is_none() {
                reference.sorting = existing.sorting;
            }
        }
        target.push(reference);
    }
}

/// Replace `target` only when the source has a value
fn overwrite<T>(target: &mut Option<T>, source: Option<T>) {
    if source.is_some() {
        *target = source;
    }
}

fn overwrite_text(target: &mut String, source: String) {
    if !source.is_empty() {
        *target = source;
    }
}

/// Document-level fields are taken from the first introspection only
fn adopt_if_blank(target: &mut Option<String>, source: Option<String>) {
    if target.as_deref().is_none_or(str::is_empty) && source.is_some() {
        *target = source;
    }
}

impl MergeItem for SchemaGroup {
    fn identity(&self) -> &str {
        &self.name
    }

    fn merge_from(&mut self, source: Self) {
        overwrite(&mut self.description, source.description);
        merge_list(&mut self.tables, source.tables);
        merge_list(&mut self.views, source.views);
    }
}

impl MergeItem for Table {
    fn identity(&self) -> &str {
        &self.name
    }

    fn merge_from(&mut self, source: Self) {
        overwrite(&mut self.description, source.description);
        merge_list(&mut self.columns, source.columns);

        self.primary_key = match (self.primary_key.take(), source.primary_key) {
            (Some(mut existing), Some(incoming)) => {
                existing.merge_from(incoming);
                Some(existing)
            }
            (_, incoming) => incoming,
        };

        merge_list(&mut self.foreign_keys, source.foreign_keys);
        merge_list(&mut self.indices, source.indices);
    }
}

impl MergeItem for View {
    fn identity(&self) -> &str {
        &self.name
    }

    fn merge_from(&mut self, source: Self) {
        overwrite(&mut self.description, source.description);
        merge_list(&mut self.columns, source.columns);
        overwrite(&mut self.source, source.source);
    }
}

impl MergeItem for Column {
    fn identity(&self) -> &str {
        &self.name
    }

    fn merge_from(&mut self, source: Self) {
        overwrite_text(&mut self.data_type, source.data_type);
        overwrite(&mut self.description, source.description);
        overwrite(&mut self.is_nullable, source.is_nullable);
        self.is_array = source.is_array;
        overwrite(&mut self.default, source.default);

        // Introspection never reports valid values; an empty list means "no opinion".
        if !source.valid_values.is_empty() {
            merge_list(&mut self.valid_values, source.valid_values);
        }
    }
}

impl MergeItem for ValidValue {
    fn identity(&self) -> &str {
        &self.value
    }

    fn merge_from(&mut self, source: Self) {
        overwrite(&mut self.description, source.description);
    }
}

impl MergeItem for PrimaryKey {
    fn identity(&self) -> &str {
        &self.name
    }

    fn merge_from(&mut self, source: Self) {
        overwrite_text(&mut self.name, source.name);
        overwrite(&mut self.description, source.description);
        merge_column_references(&mut self.columns, source.columns);
    }
}

impl MergeItem for ForeignKey {
    fn identity(&self) -> &str {
        &self.name
    }

    fn merge_from(&mut self, source: Self) {
        overwrite(&mut self.description, source.description);
        merge_column_references(&mut self.columns, source.columns);
        overwrite(&mut self.foreign_table_schema, source.foreign_table_schema);
        overwrite_text(&mut self.foreign_table_name, source.foreign_table_name);
        merge_column_references(&mut self.foreign_table_columns, source.foreign_table_columns);
        overwrite(&mut self.delete_action, source.delete_action);
        overwrite(&mut self.update_action, source.update_action);
    }
}

impl MergeItem for Index {
    fn identity(&self) -> &str {
        &self.name
    }

    fn merge_from(&mut self, source: Self) {
        overwrite(&mut self.description, source.description);
        merge_column_references(&mut self.columns, source.columns);
        overwrite(&mut self.is_unique, source.is_unique);
    }
}
