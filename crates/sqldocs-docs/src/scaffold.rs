//! Site configuration and navigation files rendered with MiniJinja

use minijinja::{AutoEscape, Environment, context};
use serde::Serialize;

const MKDOCS_TEMPLATE: &str = r#"site_name: {{ site_name | tojson }}

theme:
   name: material
   language: {{ language }}
   features:
   - navigation.footer
   - navigation.instant
   - navigation.sections
   - search.highlight
   static_templates:
   - 404.html

plugins:
   - search
   - awesome-pages

markdown_extensions:
   - admonition
   - attr_list
   - def_list
   - pymdownx.details
   - pymdownx.superfences
"#;

const PAGES_TEMPLATE: &str = "nav:\n{% for entry in entries %}   - {{ entry.title }}: {{ entry.target }}\n{% endfor %}";

/// One line of an awesome-pages `.pages` file
#[derive(Debug, Clone, Serialize)]
pub struct NavEntry {
    pub title: String,
    pub target: String,
}

impl NavEntry {
    pub fn new(title: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            target: target.into(),
        }
    }
}

/// Templates for the non-Markdown files of the site
pub struct Scaffold {
    env: Environment<'static>,
}

impl Scaffold {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env }
    }

    pub fn mkdocs_config(&self, site_name: &str, language: &str) -> Result<String, minijinja::Error> {
        self.env
            .template_from_str(MKDOCS_TEMPLATE)?
            .render(context! { site_name, language })
    }

    pub fn pages(&self, entries: &[NavEntry]) -> Result<String, minijinja::Error> {
        self.env
            .template_from_str(PAGES_TEMPLATE)?
            .render(context! { entries })
    }
}

impl Default for Scaffold {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pages_file() {
        let scaffold = Scaffold::new();
        let pages = scaffold
            .pages(&[
                NavEntry::new("Tables", "tables"),
                NavEntry::new("Views", "views"),
            ])
            .unwrap();

        assert_eq!(pages, "nav:\n   - Tables: tables\n   - Views: views\n");
    }

    #[test]
    fn test_pages_file_without_entries() {
        let scaffold = Scaffold::new();
        assert_eq!(scaffold.pages(&[]).unwrap(), "nav:\n");
    }

    #[test]
    fn test_mkdocs_config() {
        let scaffold = Scaffold::new();
        let config = scaffold.mkdocs_config("orders: \"prod\"", "de").unwrap();

        assert!(config.starts_with("site_name: \"orders: \\\"prod\\\"\"\n\ntheme:\n"));
        assert!(config.contains("   language: de\n"));
        assert!(config.contains("   - awesome-pages\n"));
        assert!(config.ends_with("   - pymdownx.superfences\n"));
    }
}
