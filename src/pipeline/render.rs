//! Output rendering: paragraphs → Markdown or HTML.
//!
//! Both renderers walk the same [`Paragraph`] list and share the same rules:
//!
//! - A header paragraph joins its blocks with single spaces and becomes one
//!   heading. Bold and italic are ignored on headers.
//! - A body paragraph styles each block on its own, then joins the blocks
//!   with single spaces. This collapses the PDF's line wrapping into prose.
//!
//! Markdown separates paragraphs with a blank line. HTML emits one element
//! per line and is optionally wrapped in a minimal document shell.

use crate::config::OutputFormat;
use crate::model::{FormattedBlock, Paragraph};

/// Render paragraphs in `format`.
///
/// `html_document` only affects HTML: when true the fragments are wrapped in
/// a complete `<!DOCTYPE html>` document, even when there are none.
pub fn render(paragraphs: &[Paragraph], format: OutputFormat, html_document: bool) -> String {
    match format {
        OutputFormat::Markdown => render_markdown(paragraphs),
        OutputFormat::Html => {
            let body = render_html_fragment(paragraphs);
            if html_document {
                wrap_html_document(&body)
            } else {
                body
            }
        }
    }
}

// ── Markdown ─────────────────────────────────────────────────────────────

pub fn render_markdown(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(markdown_paragraph)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn markdown_paragraph(paragraph: &Paragraph) -> String {
    if paragraph.is_header() {
        let marker = "#".repeat(usize::from(paragraph.header_level()));
        return format!("{} {}", marker, join_plain(&paragraph.blocks));
    }

    paragraph
        .blocks
        .iter()
        .map(markdown_inline)
        .collect::<Vec<_>>()
        .join(" ")
}

fn markdown_inline(block: &FormattedBlock) -> String {
    let mut text = block.text.clone();
    if block.is_bold {
        text = format!("**{text}**");
    }
    if block.is_italic {
        text = format!("*{text}*");
    }
    text
}

// ── HTML ─────────────────────────────────────────────────────────────────

/// The concatenated `<hN>` / `<p>` elements, one per line, without a shell.
pub fn render_html_fragment(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(html_paragraph)
        .collect::<Vec<_>>()
        .join("\n")
}

fn html_paragraph(paragraph: &Paragraph) -> String {
    if paragraph.is_header() {
        let level = paragraph.header_level().clamp(1, 6);
        let text = escape_html(&join_plain(&paragraph.blocks));
        return format!("<h{level}>{text}</h{level}>");
    }

    let inner = paragraph
        .blocks
        .iter()
        .map(html_inline)
        .collect::<Vec<_>>()
        .join(" ");
    format!("<p>{inner}</p>")
}

fn html_inline(block: &FormattedBlock) -> String {
    let text = escape_html(&block.text);
    match (block.is_bold, block.is_italic) {
        (true, true) => format!("<strong><em>{text}</em></strong>"),
        (true, false) => format!("<strong>{text}</strong>"),
        (false, true) => format!("<em>{text}</em>"),
        (false, false) => text,
    }
}

const HTML_STYLESHEET: &str = "\
body {
    font-family: Arial, sans-serif;
    line-height: 1.6;
    margin: 2rem;
    max-width: 800px;
}
h1, h2, h3, h4, h5, h6 {
    margin-top: 1.5em;
    margin-bottom: 0.5em;
}
p { margin-bottom: 1em; }";

/// Wrap an HTML fragment in a minimal standalone document.
pub fn wrap_html_document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
<html>\n\
<head>\n\
<meta charset=\"UTF-8\">\n\
<title>Extracted Highlighted Text</title>\n\
<style>\n\
{HTML_STYLESHEET}\n\
</style>\n\
</head>\n\
<body>\n\
{body}\n\
</body>\n\
</html>\n"
    )
}

/// Escape `&`, `<`, `>`, `"` and `'` for HTML text and attribute content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn join_plain(blocks: &[FormattedBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
