//! In-process markdown rendering with heading anchors and a page template.

use std::collections::HashSet;
use std::path::Path;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use serde::Serialize;
use tera::{Context, Tera};

use super::{ConvertError, Converter};

const PAGE_TEMPLATE_NAME: &str = "page.html";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="generator" content="pagecast {{ version }}">
  <title>{{ title }}</title>
{%- for sheet in stylesheets %}
  <link rel="stylesheet" href="{{ sheet | safe }}">
{%- endfor %}
</head>
<body>
<main>
{{ content | safe }}
</main>
</body>
</html>
"#;

/// Renders markdown with pulldown-cmark and wraps it in a standalone page.
pub struct BuiltinConverter {
    extensions: Vec<String>,
    title: Option<String>,
}

/// Values visible to the page template.
#[derive(Debug, Serialize)]
struct PageContext<'a> {
    title: &'a str,
    stylesheets: &'a [String],
    content: &'a str,
    version: &'static str,
}

/// Result of rendering markdown to an HTML fragment.
pub(crate) struct MarkdownOutput {
    pub html: String,
    /// Text of the first top-level heading, if any
    pub title: Option<String>,
}

impl BuiltinConverter {
    pub fn new(extensions: Vec<String>, title: Option<String>) -> Self {
        Self { extensions, title }
    }

    fn options(&self) -> Result<Options, ConvertError> {
        let mut options = Options::empty();
        for extension in &self.extensions {
            match extension.as_str() {
                "definition_lists" => options.insert(Options::ENABLE_DEFINITION_LIST),
                "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
                "gfm" => options.insert(Options::ENABLE_GFM),
                "heading_attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
                "smart_punctuation" => options.insert(Options::ENABLE_SMART_PUNCTUATION),
                "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
                "tables" => options.insert(Options::ENABLE_TABLES),
                "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
                other => return Err(ConvertError::InvalidExtension(other.to_string())),
            }
        }
        Ok(options)
    }

    /// Render a whole page from markdown source.
    pub(crate) fn render_page(
        &self,
        markdown: &str,
        stylesheets: &[String],
    ) -> Result<String, ConvertError> {
        let output = render_markdown(markdown, self.options()?);
        let title = self
            .title
            .as_deref()
            .or(output.title.as_deref())
            .unwrap_or("");

        // hrefs are escaped here instead of by tera, which would also
        // entity-encode every `/` in the path
        let stylesheets: Vec<String> = stylesheets.iter().map(|s| escape_attr(s)).collect();

        let mut tera = Tera::default();
        tera.add_raw_template(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE)?;
        let context = Context::from_serialize(PageContext {
            title,
            stylesheets: &stylesheets,
            content: &output.html,
            version: env!("CARGO_PKG_VERSION"),
        })?;

        Ok(tera.render(PAGE_TEMPLATE_NAME, &context)?)
    }
}

impl Converter for BuiltinConverter {
    fn name(&self) -> &str {
        "builtin"
    }

    fn convert(
        &self,
        input: &Path,
        output: &Path,
        stylesheets: &[String],
    ) -> Result<(), ConvertError> {
        let markdown = std::fs::read_to_string(input).map_err(|source| ConvertError::Io {
            path: input.to_path_buf(),
            source,
        })?;
        let page = self.render_page(&markdown, stylesheets)?;
        std::fs::write(output, page).map_err(|source| ConvertError::Io {
            path: output.to_path_buf(),
            source,
        })
    }
}

/// Render markdown to an HTML fragment, giving every heading a unique id.
pub(crate) fn render_markdown(markdown: &str, options: Options) -> MarkdownOutput {
    let parser = Parser::new_ext(markdown, options);

    let mut in_heading: Option<(HeadingLevel, Vec<String>)> = None;
    let mut heading_html = String::new();
    let mut heading_text = String::new();
    let mut used_ids: HashSet<String> = HashSet::new();
    let mut title: Option<String> = None;

    let events: Vec<Event> = parser
        .flat_map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                ref id,
                ref classes,
                ..
            }) => {
                // Headings with an explicit id pass through untouched
                if let Some(existing_id) = id {
                    used_ids.insert(existing_id.to_string());
                    return vec![event];
                }
                in_heading = Some((level, classes.iter().map(|c| c.to_string()).collect()));
                heading_html.clear();
                heading_text.clear();
                vec![]
            }
            Event::End(TagEnd::Heading(_)) if in_heading.is_some() => {
                let Some((level, classes)) = in_heading.take() else {
                    return vec![];
                };

                let base_id = slugify(&heading_text);
                let mut id = base_id.clone();
                let mut suffix = 1;
                while used_ids.contains(&id) {
                    id = format!("{}-{}", base_id, suffix);
                    suffix += 1;
                }
                used_ids.insert(id.clone());

                if level == HeadingLevel::H1 && title.is_none() {
                    title = Some(heading_text.trim().to_string());
                }

                let class_attr = if classes.is_empty() {
                    String::new()
                } else {
                    format!(" class=\"{}\"", classes.join(" "))
                };
                vec![Event::Html(
                    format!(
                        "<{level} id=\"{id}\"{class_attr}>{heading_html}</{level}>\n",
                    )
                    .into(),
                )]
            }
            other if in_heading.is_some() => {
                if let Event::Text(text) | Event::Code(text) = &other {
                    heading_text.push_str(text);
                }
                html::push_html(&mut heading_html, std::iter::once(other));
                vec![]
            }
            _ => vec![event],
        })
        .collect();

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    MarkdownOutput {
        html: html_output,
        title,
    }
}

/// Convert a string to a slug suitable for use as an HTML id.
///
/// Headings with no usable characters get the slug `section`.
fn slugify(s: &str) -> String {
    let slug = s
        .trim()
        .to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| !c.is_alphanumeric() && c != '-', "");
    if slug.trim_matches('-').is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

/// Escape a value for use inside a double-quoted HTML attribute.
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> BuiltinConverter {
        BuiltinConverter::new(
            vec!["tables".to_string(), "strikethrough".to_string()],
            None,
        )
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("?!"), "section");
        assert_eq!(slugify(" - "), "section");
    }

    #[test]
    fn test_punctuation_headings_get_unique_ids() {
        let output = render_markdown("## ???\n\n## !!!\n", Options::empty());

        assert!(output.html.contains("id=\"section\""));
        assert!(output.html.contains("id=\"section-1\""));
        assert!(!output.html.contains("id=\"\""));
    }

    #[test]
    fn test_stylesheet_href_is_escaped() {
        let sheets = vec!["a\" onload=\"x.css".to_string(), "css/a&b.css".to_string()];
        let page = converter().render_page("# Project\n", &sheets).unwrap();

        assert!(page.contains("href=\"a&quot; onload=&quot;x.css\""));
        assert!(page.contains("href=\"css/a&amp;b.css\""));
        assert!(!page.contains("onload=\"x.css"));
    }

    #[test]
    fn test_render_basic_markdown() {
        let output = render_markdown("# Hello\n\nWorld", Options::empty());

        assert!(output.html.contains("<h1 id=\"hello\">Hello</h1>"));
        assert!(output.html.contains("<p>World</p>"));
        assert_eq!(output.title.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_duplicate_headings_get_unique_ids() {
        let output = render_markdown("## Usage\n\n## Usage\n", Options::empty());

        assert!(output.html.contains("id=\"usage\""));
        assert!(output.html.contains("id=\"usage-1\""));
        assert_eq!(output.title, None);
    }

    #[test]
    fn test_inline_markup_in_heading_is_kept() {
        let output = render_markdown("# The `pagecast` *tool*\n", Options::empty());

        assert!(output.html.contains("<code>pagecast</code>"));
        assert!(output.html.contains("<em>tool</em>"));
        assert_eq!(output.title.as_deref(), Some("The pagecast tool"));
    }

    #[test]
    fn test_page_links_stylesheets_in_order() {
        let sheets = vec![
            "css/normalize.css".to_string(),
            "css/base.css".to_string(),
            "css/layout.css".to_string(),
            "css/theme.css".to_string(),
        ];
        let page = converter().render_page("# Project\n", &sheets).unwrap();

        let positions: Vec<usize> = sheets
            .iter()
            .map(|s| {
                page.find(&format!("<link rel=\"stylesheet\" href=\"{s}\">"))
                    .unwrap_or_else(|| panic!("missing link for {s}"))
            })
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(page.contains("<title>Project</title>"));
        assert!(!page.contains("<style"));
    }

    #[test]
    fn test_configured_title_wins() {
        let converter = BuiltinConverter::new(vec![], Some("Home".to_string()));
        let page = converter.render_page("# Project\n", &[]).unwrap();
        assert!(page.contains("<title>Home</title>"));
    }

    #[test]
    fn test_tables_extension() {
        let page = converter()
            .render_page("| a | b |\n|---|---|\n| 1 | 2 |\n", &[])
            .unwrap();
        assert!(page.contains("<table>"));
    }

    #[test]
    fn test_invalid_extension() {
        let converter = BuiltinConverter::new(vec!["not_a_real_extension".to_string()], None);
        let result = converter.render_page("# Test", &[]);
        assert!(matches!(result, Err(ConvertError::InvalidExtension(_))));
    }

    #[test]
    fn test_convert_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("README.md");
        std::fs::write(&input, "# Same\n\nText\n").unwrap();
        let sheets = vec!["a.css".to_string()];

        converter()
            .convert(&input, &dir.path().join("one.html"), &sheets)
            .unwrap();
        converter()
            .convert(&input, &dir.path().join("two.html"), &sheets)
            .unwrap();

        let one = std::fs::read(dir.path().join("one.html")).unwrap();
        let two = std::fs::read(dir.path().join("two.html")).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn test_convert_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = converter()
            .convert(
                &dir.path().join("README.md"),
                &dir.path().join("index.html"),
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }
}
