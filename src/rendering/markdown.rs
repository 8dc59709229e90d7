use pulldown_cmark::{html, Options, Parser};

/// Render article Markdown to HTML that is safe to embed in a page.
///
/// GitHub Flavored Markdown features are enabled (tables, footnotes,
/// strikethrough, task lists, smart punctuation). Raw HTML in the source is
/// passed through `ammonia`, so scripts, event handlers and `javascript:`
/// links never reach the output.
pub fn render_markdown(raw: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION;

    let parser = Parser::new_ext(raw, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    let mut sanitizer = ammonia::Builder::default();
    sanitizer
        .add_tags(&["input"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("code", &["class"]);
    sanitizer.clean(&html_output).to_string()
}
