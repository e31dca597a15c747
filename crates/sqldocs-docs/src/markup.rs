//! Description mini-markup
//!
//! Descriptions in a schema document may reference other objects and use a
//! few HTML-like tags:
//!
//! | Markup | Output |
//! |--------|--------|
//! | `@table:orders`, `@table:sales.orders` | link to the table page |
//! | `@view:…` | link to the view page |
//! | `@schema:sales` | link to the schema page |
//! | `@column:total` | code span |
//! | `<code>…</code>`, `<b>…</b>`, `<i>…</i>` | code span, strong, emphasis |
//!
//! Links are relative to a page inside `tables/` or `views/`; `prefix` moves
//! them up for pages nested deeper.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::markdown::{code_span, emphasis, escape, link, strong};

static DESCRIPTION_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)@(?P<type>\w+):((?P<schema>\w+)\.)?(?P<name>\w+)|<code>(?P<code>.*?)</code>|<b>(?P<bold>.*?)</b>|<i>(?P<italic>.*?)</i>",
    )
    .expect("valid regex")
});

/// Render a description to inline Markdown
pub fn render_description(prefix: &str, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for captures in DESCRIPTION_MARKUP.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        out.push_str(&escape(&text[last..whole.start()]));
        out.push_str(&render_match(prefix, &captures));
        last = whole.end();
    }

    out.push_str(&escape(&text[last..]));
    out
}

fn render_match(prefix: &str, captures: &Captures<'_>) -> String {
    if let Some(bold) = captures.name("bold") {
        return strong(&escape(bold.as_str()));
    }
    if let Some(italic) = captures.name("italic") {
        return emphasis(&escape(italic.as_str()));
    }
    if let Some(code) = captures.name("code") {
        return code_span(code.as_str());
    }

    let whole = captures.get(0).map_or("", |m| m.as_str());
    let (Some(kind), Some(name)) = (captures.name("type"), captures.name("name")) else {
        return escape(whole);
    };
    let kind = kind.as_str().to_lowercase();
    let name = name.as_str();

    match captures.name("schema").map(|s| s.as_str()) {
        None => match kind.as_str() {
            "schema" => link(
                &escape(name),
                &format!("{}../../{}/schema", prefix, name.to_lowercase()),
            ),
            "table" => link(
                &escape(name),
                &format!("{}../tables/{}", prefix, name.to_lowercase()),
            ),
            "view" => link(
                &escape(name),
                &format!("{}../views/{}", prefix, name.to_lowercase()),
            ),
            "column" => code_span(name),
            _ => escape(whole),
        },
        Some(schema) => {
            let folder = match kind.as_str() {
                "table" => "tables",
                "view" => "views",
                _ => return escape(whole),
            };
            link(
                &escape(&format!("{}.{}", schema, name)),
                &format!(
                    "{}../../{}/{}/{}",
                    prefix,
                    schema.to_lowercase(),
                    folder,
                    name.to_lowercase()
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_is_escaped() {
        assert_eq!(render_description("", "Total in EUR"), "Total in EUR");
        assert_eq!(render_description("", "a_b"), "a\\_b");
    }

    #[test]
    fn test_object_references() {
        assert_eq!(
            render_description("../", "Placed by @table:Customers."),
            "Placed by [Customers](../../tables/customers)."
        );
        assert_eq!(
            render_description("", "See @view:Active"),
            "See [Active](../views/active)"
        );
        assert_eq!(
            render_description("../", "Lives in @schema:Sales"),
            "Lives in [Sales](../../../sales/schema)"
        );
        assert_eq!(
            render_description("../", "Sum of @column:total"),
            "Sum of `total`"
        );
    }

    #[test]
    fn test_schema_qualified_references() {
        assert_eq!(
            render_description("../", "@table:sales.Orders"),
            "[sales.Orders](../../../sales/tables/orders)"
        );
        assert_eq!(
            render_description("", "@VIEW:sales.open_orders"),
            "[sales.open\\_orders](../../sales/views/open_orders)"
        );
    }

    #[test]
    fn test_inline_tags() {
        assert_eq!(
            render_description("", "<b>Never</b> <i>ever</i> use <code>SELECT *</code>"),
            "**Never** *ever* use `SELECT *`"
        );
        assert_eq!(render_description("", "<B>loud</B>"), "**loud**");
    }

    #[test]
    fn test_unknown_reference_kind_is_kept() {
        assert_eq!(
            render_description("", "mail @user:admin"),
            "mail @user:admin"
        );
    }
}
