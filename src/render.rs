//! HTML rendering for the web form.
//!
//! Answers are Markdown; they are converted with `pulldown-cmark`, keeping single
//! line breaks as `<br />`. The page itself is a small fixed template.

use pulldown_cmark::{Event, Options, Parser, html};

/// Converts Markdown answer text to HTML.
///
/// Tables, footnotes and strikethrough are enabled, and soft line breaks are
/// rendered as hard breaks so the model's line structure is kept. Raw HTML in the
/// text is emitted as escaped text, never as markup.
///
/// # Examples
///
/// ```
/// use gemini_ask::render::markdown_to_html;
///
/// let html = markdown_to_html("**bold**\nnext line");
/// assert!(html.contains("<strong>bold</strong>"));
/// assert!(html.contains("<br />"));
/// ```
pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut output = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Ask Gemini</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; line-height: 1.5; }
textarea { width: 100%; min-height: 6rem; font: inherit; }
.question { color: #444; }
.answer { border-top: 1px solid #ddd; margin-top: 1rem; padding-top: 1rem; }
.error { color: #a00; }
pre { background: #f5f5f5; padding: 0.75rem; overflow-x: auto; }
</style>
</head>
<body>
<h1>Ask Gemini</h1>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

/// Renders the single page of the web form.
///
/// `question` is escaped and re-filled into the form; `answer_html` must already be
/// HTML (see `markdown_to_html`); `error` is escaped and shown instead of an answer.
pub fn render_page(
    question: Option<&str>,
    answer_html: Option<&str>,
    error: Option<&str>,
) -> String {
    let question_text = question.map(escape_html).unwrap_or_default();

    let mut page = String::from(PAGE_HEAD);
    page.push_str(&format!(
        concat!(
            "<form method=\"post\" action=\"/\">\n",
            "<textarea name=\"question\" placeholder=\"Ask anything...\" required>{}</textarea>\n",
            "<button type=\"submit\">Ask</button>\n",
            "</form>\n"
        ),
        question_text
    ));

    if let Some(message) = error {
        page.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(message)));
    }

    if let Some(answer) = answer_html {
        page.push_str("<section class=\"answer\">\n");
        if question.is_some() {
            page.push_str(&format!(
                "<p class=\"question\"><strong>Question:</strong> {question_text}</p>\n"
            ));
        }
        page.push_str(answer);
        page.push_str("</section>\n");
    }

    page.push_str(PAGE_TAIL);
    page
}
