//! MkDocs project generator
//!
//! Layout of the generated project:
//!
//! ```text
//! <output>/
//!   mkdocs.yml            written once
//!   docs/
//!     index.md            written once
//!     .pages              written once
//!     database/           rebuilt on every run
//!       .pages
//!       tables/ views/    engines without schemata
//!       <schema>/         one folder per non-empty schema
//!         schema.md
//!         .pages
//!         tables/ views/
//! ```
//!
//! Navigation uses the `awesome-pages` plugin; every folder gets a `.pages`
//! file listing its entries in document order.

mod pages;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rust_i18n::t;
use sqldocs_core::{DatabaseEngine, RelationContainer, Result, SchemaDocument, SchemaGroup, SqlDocsError};

use crate::generator::DocsGenerator;
use crate::scaffold::{NavEntry, Scaffold};
use crate::text::resolve_locale;
use pages::Pages;

const DEFAULT_SITE_NAME: &str = "SqlDocs";

/// Generates a MkDocs (Material theme) project
pub struct MkDocsGenerator {
    engine: DatabaseEngine,
    locale: String,
    scaffold: Scaffold,
}

impl MkDocsGenerator {
    /// Create a generator for documents of `engine`, writing text in `language`
    pub fn new(engine: DatabaseEngine, language: &str) -> Self {
        Self {
            engine,
            locale: resolve_locale(language),
            scaffold: Scaffold::new(),
        }
    }

    /// Catalog actually used for generated text
    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn pages(&self) -> Pages<'_> {
        Pages {
            engine: self.engine,
            locale: &self.locale,
        }
    }

    /// Site configuration and landing page; left alone once they exist
    fn write_project(&self, document: &SchemaDocument, output: &Path) -> Result<()> {
        let config_path = output.join("mkdocs.yml");
        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "keeping existing MkDocs configuration");
            return Ok(());
        }

        let site_name = document.name.as_deref().unwrap_or(DEFAULT_SITE_NAME);
        let config = self
            .scaffold
            .mkdocs_config(site_name, &self.locale)
            .map_err(|e| template_error(&config_path, e))?;
        write_file(&config_path, &config)?;

        let docs = output.join("docs");
        create_dir(&docs)?;
        write_file(&docs.join("index.md"), &self.pages().home(document))?;
        self.write_nav(
            &docs,
            &[
                NavEntry::new(t!("introduction", locale = self.locale.as_str()), "index.md"),
                NavEntry::new(t!("database", locale = self.locale.as_str()), "database"),
            ],
        )
    }

    fn write_nav(&self, folder: &Path, entries: &[NavEntry]) -> Result<()> {
        let path = folder.join(".pages");
        let contents = self
            .scaffold
            .pages(entries)
            .map_err(|e| template_error(&path, e))?;
        write_file(&path, &contents)
    }

    fn write_database(&self, document: &SchemaDocument, folder: &Path) -> Result<()> {
        let mut nav = Vec::new();

        if document.schemata.is_empty() {
            self.write_relations(None, document, folder)?;
            nav.extend(self.relation_nav(document));
        } else {
            for group in document.schemata.iter().filter(|g| !g.is_empty()) {
                let schema_folder = folder.join(group.name.to_lowercase());
                self.write_schema(group, &schema_folder)?;
                nav.push(NavEntry::new(group.name.as_str(), group.name.to_lowercase()));
            }
        }

        self.write_nav(folder, &nav)
    }

    fn write_schema(&self, group: &SchemaGroup, folder: &Path) -> Result<()> {
        tracing::debug!(schema = %group.name, "writing schema pages");
        create_dir(folder)?;
        write_file(&folder.join("schema.md"), &self.pages().schema(group))?;
        self.write_relations(Some(&group.name), group, folder)?;

        let mut nav = vec![NavEntry::new(t!("schema", locale = self.locale.as_str()), "schema.md")];
        nav.extend(self.relation_nav(group));
        self.write_nav(folder, &nav)
    }

    /// `Tables` / `Views` entries for the folders `write_relations` creates
    fn relation_nav(&self, container: &impl RelationContainer) -> Vec<NavEntry> {
        let mut nav = Vec::new();
        if !container.tables().is_empty() {
            nav.push(NavEntry::new(t!("tables", locale = self.locale.as_str()), "tables"));
        }
        if !container.views().is_empty() {
            nav.push(NavEntry::new(t!("views", locale = self.locale.as_str()), "views"));
        }
        nav
    }

    fn write_relations(
        &self,
        schema: Option<&str>,
        container: &impl RelationContainer,
        folder: &Path,
    ) -> Result<()> {
        let pages = self.pages();
        let tables = container.tables();
        let views = container.views();

        if !tables.is_empty() {
            let tables_folder = folder.join("tables");
            create_dir(&tables_folder)?;
            let mut nav = Vec::with_capacity(tables.len());
            for table in tables {
                let file_name = page_file_name(&table.name);
                write_file(&tables_folder.join(&file_name), &pages.table(schema, table))?;
                nav.push(NavEntry::new(table.name.as_str(), file_name));
            }
            self.write_nav(&tables_folder, &nav)?;
        }

        if !views.is_empty() {
            let views_folder = folder.join("views");
            create_dir(&views_folder)?;
            let mut nav = Vec::with_capacity(views.len());
            for view in views {
                let file_name = page_file_name(&view.name);
                write_file(&views_folder.join(&file_name), &pages.view(schema, view))?;
                nav.push(NavEntry::new(view.name.as_str(), file_name));
            }
            self.write_nav(&views_folder, &nav)?;
        }

        Ok(())
    }
}

impl DocsGenerator for MkDocsGenerator {
    #[tracing::instrument(skip(self, document), fields(output = %output.display(), locale = %self.locale))]
    fn generate(&self, document: &SchemaDocument, output: &Path) -> Result<()> {
        create_dir(output)?;
        self.write_project(document, output)?;

        let database = output.join("docs").join("database");
        clear_folder(&database)?;
        self.write_database(document, &database)?;

        tracing::info!(
            tables = document.tables.len()
                + document.schemata.iter().map(|g| g.tables.len()).sum::<usize>(),
            views = document.views.len()
                + document.schemata.iter().map(|g| g.views.len()).sum::<usize>(),
            "MkDocs pages generated"
        );
        Ok(())
    }
}

fn page_file_name(name: &str) -> String {
    format!("{}.md", name.to_lowercase())
}

fn render_error(path: &Path, source: io::Error) -> SqlDocsError {
    SqlDocsError::Render {
        path: path.to_path_buf(),
        source,
    }
}

fn template_error(path: &Path, error: minijinja::Error) -> SqlDocsError {
    render_error(path, io::Error::other(error))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| render_error(path, e))
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| render_error(path, e))
}

/// Empty `folder`, creating it if needed
fn clear_folder(folder: &Path) -> Result<()> {
    if !folder.exists() {
        return create_dir(folder);
    }

    let entries = fs::read_dir(folder).map_err(|e| render_error(folder, e))?;
    for entry in entries {
        let path: PathBuf = entry.map_err(|e| render_error(folder, e))?.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| render_error(&path, e))?;
    }
    Ok(())
}
