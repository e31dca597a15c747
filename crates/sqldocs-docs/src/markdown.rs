//! Minimal Markdown writer for the block types MkDocs pages use
//!
//! Block methods take already-rendered inline Markdown; use the inline
//! helpers ([`escape`], [`code_span`], [`strong`], [`link`]) to build it.

const INDENT: &str = "    ";

/// Escape characters that would otherwise start inline markup
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '|') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Inline code; widens the fence when the text contains backticks
pub fn code_span(text: &str) -> String {
    if text.contains('`') {
        format!("`` {} ``", text)
    } else {
        format!("`{}`", text)
    }
}

pub fn strong(inline: &str) -> String {
    format!("**{}**", inline)
}

pub fn emphasis(inline: &str) -> String {
    format!("*{}*", inline)
}

pub fn link(inline: &str, url: &str) -> String {
    format!("[{}]({})", inline, url)
}

/// A term with one or more definition blocks
#[derive(Debug, Clone, Default)]
pub struct Definition {
    pub title: String,
    pub blocks: Vec<String>,
}

impl Definition {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Append a block, ignoring empty ones
    pub fn push(&mut self, block: impl Into<String>) {
        let block = block.into();
        if !block.trim().is_empty() {
            self.blocks.push(block.trim_matches('\n').to_string());
        }
    }
}

/// Accumulates Markdown blocks separated by blank lines
#[derive(Debug, Default)]
pub struct MarkdownBuilder {
    out: String,
}

impl MarkdownBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn block(&mut self, text: &str) {
        self.out.push_str(text.trim_end_matches('\n'));
        self.out.push_str("\n\n");
    }

    pub fn heading(&mut self, level: usize, inline: &str) {
        if !inline.is_empty() {
            self.block(&format!("{} {}", "#".repeat(level.clamp(1, 6)), inline));
        }
    }

    pub fn paragraph(&mut self, inline: &str) {
        if !inline.trim().is_empty() {
            self.block(inline);
        }
    }

    pub fn unordered_list(&mut self, items: &[String]) {
        if items.is_empty() {
            return;
        }
        let list: Vec<String> = items.iter().map(|item| format!("- {}", item)).collect();
        self.block(&list.join("\n"));
    }

    /// `def_list` syntax: the term, then `:` followed by indented blocks
    pub fn definition_list(&mut self, definitions: &[Definition]) {
        for definition in definitions {
            if definition.blocks.is_empty() {
                self.block(&definition.title);
                continue;
            }

            let mut text = format!("{}\n", definition.title);
            for (i, block) in definition.blocks.iter().enumerate() {
                let indented = indent(block);
                if i == 0 {
                    text.push(':');
                    text.push_str(&indented[1..]);
                } else {
                    text.push('\n');
                    text.push_str(&indented);
                }
                text.push('\n');
            }
            self.block(&text);
        }
    }

    /// Collapsible admonition (`??? kind "title"`) wrapping `body`
    pub fn collapsed_admonition(&mut self, kind: &str, title: &str, body: &str) {
        self.block(&format!("??? {} \"{}\"\n\n{}", kind, title, indent(body)));
    }

    pub fn fenced_code(&mut self, language: &str, code: &str) {
        self.block(&fenced_code(language, code));
    }

    pub fn table(&mut self, header: &[String], rows: &[Vec<String>]) {
        self.block(&table(header, rows));
    }

    /// The document with exactly one trailing newline
    pub fn finish(self) -> String {
        let mut out = self.out.trim_end().to_string();
        out.push('\n');
        out
    }
}

pub fn fenced_code(language: &str, code: &str) -> String {
    let fence = if code.contains("```") { "````" } else { "```" };
    format!("{}{}\n{}\n{}", fence, language, code.trim_end(), fence)
}

pub fn table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(table_row(header));
    lines.push(format!("|{}", " --- |".repeat(header.len())));
    for row in rows {
        lines.push(table_row(row));
    }
    lines.join("\n")
}

fn table_row(cells: &[String]) -> String {
    let cells: Vec<String> = cells
        .iter()
        .map(|cell| cell.replace('\n', " ").trim().to_string())
        .collect();
    format!("| {} |", cells.join(" | "))
}

/// Indent every non-empty line by four spaces
fn indent(block: &str) -> String {
    block
        .trim_end_matches('\n')
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", INDENT, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_inline_markup() {
        assert_eq!(escape("order_lines"), "order\\_lines");
        assert_eq!(escape("a*b [c]"), "a\\*b \\[c\\]");
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn test_code_span_with_backticks() {
        assert_eq!(code_span("id"), "`id`");
        assert_eq!(code_span("a`b"), "`` a`b ``");
    }

    #[test]
    fn test_definition_list() {
        let mut id = Definition::new("**`id`**");
        id.push("`integer` · `NOT NULL`");
        id.push("Surrogate key.");
        id.push("");

        let mut md = MarkdownBuilder::new();
        md.definition_list(&[id, Definition::new("**`note`**")]);

        assert_eq!(
            md.finish(),
            indoc! {"
                **`id`**
                :   `integer` · `NOT NULL`

                    Surrogate key.

                **`note`**
            "}
        );
    }

    #[test]
    fn test_table_inside_definition_is_indented() {
        let mut status = Definition::new("**`status`**");
        status.push(table(
            &["Value".to_string(), "Description".to_string()],
            &[vec!["N".to_string(), "New".to_string()]],
        ));

        let mut md = MarkdownBuilder::new();
        md.definition_list(&[status]);

        assert_eq!(
            md.finish(),
            indoc! {"
                **`status`**
                :   | Value | Description |
                    | --- | --- |
                    | N | New |
            "}
        );
    }

    #[test]
    fn test_collapsed_admonition_with_code() {
        let mut md = MarkdownBuilder::new();
        md.heading(2, "Query");
        md.collapsed_admonition("info", "SQL", &fenced_code("sql", "SELECT 1\nFROM t\n"));

        assert_eq!(
            md.finish(),
            indoc! {r#"
                ## Query

                ??? info "SQL"

                    ```sql
                    SELECT 1
                    FROM t
                    ```
            "#}
        );
    }

    #[test]
    fn test_empty_blocks_are_skipped() {
        let mut md = MarkdownBuilder::new();
        md.heading(1, "Title");
        md.paragraph("  ");
        md.unordered_list(&[]);
        md.unordered_list(&["[a](a.md)".to_string()]);

        assert_eq!(md.finish(), "# Title\n\n- [a](a.md)\n");
    }
}
