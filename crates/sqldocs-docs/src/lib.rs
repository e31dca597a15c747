//! SqlDocs Docs - documentation site generation
//!
//! Renders a [`SchemaDocument`](sqldocs_core::SchemaDocument) into a MkDocs
//! project. Generated text is localized through the catalogs in `locales/`.

rust_i18n::i18n!("locales", fallback = "en");

mod generator;
mod links;
mod markdown;
mod markup;
mod mkdocs;
mod scaffold;
mod text;

pub use generator::DocsGenerator;
pub use links::data_type_doc_link;
pub use markup::render_description;
pub use mkdocs::MkDocsGenerator;
pub use text::{DEFAULT_LOCALE, resolve_locale};
