//! Markdown rendering with syntax highlighting
//!
//! pulldown-cmark does the parsing; this module rewrites the element types
//! the blog styles itself (headings, paragraphs, links, blockquotes, lists,
//! images, tables, fenced code) and lets everything else, including raw HTML
//! blocks such as embedded iframes, pass straight through.

use anyhow::Result;
use pulldown_cmark::{
    html, Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{highlighted_html_for_string, styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::helpers::html_escape;

const PARAGRAPH_CLASS: &str = "text-gray-300 mb-4 leading-relaxed";
const LINK_CLASS: &str = "text-blue-400 hover:text-blue-300 underline";
const BLOCKQUOTE_CLASS: &str = "border-l-4 border-purple-500 pl-4 italic bg-white/5 py-2 my-4";
const UL_CLASS: &str = "list-disc pl-6 mb-4 space-y-1";
const OL_CLASS: &str = "list-decimal pl-6 mb-4 space-y-1";
const LI_CLASS: &str = "text-gray-300";
const TH_CLASS: &str = "border border-white/20 bg-white/10 px-4 py-2 text-left";
const TD_CLASS: &str = "border border-white/10 px-4 py-2";
const COPY_BUTTON_CLASS: &str =
    "copy-code absolute right-2 top-2 z-10 px-2 py-1 text-xs bg-white/10 rounded hover:bg-white/20 transition-colors";

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

/// A fenced or indented code block being collected
struct CodeBlock {
    lang: Option<String>,
    text: String,
}

/// An image whose alt text is being collected
struct ImageTag {
    src: String,
    title: String,
    alt: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", true)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code: Option<CodeBlock> = None;
        let mut image: Option<ImageTag> = None;
        let mut alignments: Vec<Alignment> = Vec::new();
        let mut cell_index = 0;
        let mut in_table_head = false;

        for event in parser {
            if let Some(block) = code.as_mut() {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        let rendered = self.render_code_block(block);
                        code = None;
                        events.push(Event::Html(CowStr::from(rendered)));
                    }
                    Event::Text(text) => block.text.push_str(&text),
                    _ => {}
                }
                continue;
            }

            if let Some(img) = image.as_mut() {
                match event {
                    Event::End(TagEnd::Image) => {
                        let rendered = render_image(img);
                        image = None;
                        events.push(Event::Html(CowStr::from(rendered)));
                    }
                    Event::Text(text) | Event::Code(text) => img.alt.push_str(&text),
                    _ => {}
                }
                continue;
            }

            let markup = match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code = Some(CodeBlock {
                        lang: fence_language(&kind),
                        text: String::new(),
                    });
                    continue;
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some(ImageTag {
                        src: dest_url.to_string(),
                        title: title.to_string(),
                        alt: String::new(),
                    });
                    continue;
                }

                Event::Start(Tag::Heading { level, .. }) => {
                    let depth = heading_depth(level);
                    match heading_class(depth) {
                        Some(class) => format!(r#"<h{} class="{}">"#, depth, class),
                        None => format!("<h{}>", depth),
                    }
                }
                Event::End(TagEnd::Heading(level)) => format!("</h{}>\n", heading_depth(level)),

                Event::Start(Tag::Paragraph) => format!(r#"<p class="{}">"#, PARAGRAPH_CLASS),
                Event::End(TagEnd::Paragraph) => "</p>\n".to_string(),

                Event::Start(Tag::Link {
                    dest_url, title, ..
                }) => {
                    let title_attr = if title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, html_escape(&title))
                    };
                    format!(
                        r#"<a href="{}"{} class="{}" target="_blank" rel="noopener noreferrer">"#,
                        html_escape(&dest_url),
                        title_attr,
                        LINK_CLASS
                    )
                }
                Event::End(TagEnd::Link) => "</a>".to_string(),

                Event::Start(Tag::BlockQuote { .. }) => {
                    format!(r#"<blockquote class="{}">"#, BLOCKQUOTE_CLASS)
                }
                Event::End(TagEnd::BlockQuote { .. }) => "</blockquote>\n".to_string(),

                Event::Start(Tag::List(Some(1))) => format!(r#"<ol class="{}">"#, OL_CLASS),
                Event::Start(Tag::List(Some(start))) => {
                    format!(r#"<ol class="{}" start="{}">"#, OL_CLASS, start)
                }
                Event::Start(Tag::List(None)) => format!(r#"<ul class="{}">"#, UL_CLASS),
                Event::End(TagEnd::List(true)) => "</ol>\n".to_string(),
                Event::End(TagEnd::List(false)) => "</ul>\n".to_string(),
                Event::Start(Tag::Item) => format!(r#"<li class="{}">"#, LI_CLASS),
                Event::End(TagEnd::Item) => "</li>\n".to_string(),

                Event::Start(Tag::Table(aligns)) => {
                    alignments = aligns;
                    r#"<div class="overflow-x-auto my-4"><table class="w-full border-collapse">"#
                        .to_string()
                }
                Event::End(TagEnd::Table) => "</tbody></table></div>\n".to_string(),
                Event::Start(Tag::TableHead) => {
                    in_table_head = true;
                    cell_index = 0;
                    "<thead><tr>".to_string()
                }
                Event::End(TagEnd::TableHead) => {
                    in_table_head = false;
                    "</tr></thead>\n<tbody>\n".to_string()
                }
                Event::Start(Tag::TableRow) => {
                    cell_index = 0;
                    "<tr>".to_string()
                }
                Event::End(TagEnd::TableRow) => "</tr>\n".to_string(),
                Event::Start(Tag::TableCell) => {
                    let (tag, class) = if in_table_head {
                        ("th", TH_CLASS)
                    } else {
                        ("td", TD_CLASS)
                    };
                    let style = match alignments.get(cell_index) {
                        Some(Alignment::Left) => r#" style="text-align: left""#,
                        Some(Alignment::Center) => r#" style="text-align: center""#,
                        Some(Alignment::Right) => r#" style="text-align: right""#,
                        _ => "",
                    };
                    format!(r#"<{} class="{}"{}>"#, tag, class, style)
                }
                Event::End(TagEnd::TableCell) => {
                    cell_index += 1;
                    if in_table_head {
                        "</th>".to_string()
                    } else {
                        "</td>".to_string()
                    }
                }

                other => {
                    events.push(other);
                    continue;
                }
            };
            events.push(Event::Html(CowStr::from(markup)));
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Language-tagged blocks get highlighting and a copy button, the rest
    /// render as plain preformatted text
    fn render_code_block(&self, block: &CodeBlock) -> String {
        match &block.lang {
            Some(lang) => {
                let literal = block.text.strip_suffix('\n').unwrap_or(&block.text);
                format!(
                    r#"<div class="code-block relative"><button type="button" class="{}" data-code="{}">Copy</button>{}</div>"#,
                    COPY_BUTTON_CLASS,
                    html_escape(literal),
                    self.highlight_code(&block.text, lang)
                )
            }
            None => format!("<pre><code>{}</code></pre>\n", html_escape(&block.text)),
        }
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
        else {
            return plain_code_block(code, lang);
        };

        if self.line_numbers {
            match self.highlight_lines(code, syntax, theme) {
                Some(lines) => add_line_numbers(&lines, lang),
                None => plain_code_block(code, lang),
            }
        } else {
            match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
                Ok(highlighted) => highlighted,
                Err(_) => plain_code_block(code, lang),
            }
        }
    }

    /// Highlight line by line, one HTML fragment per source line
    fn highlight_lines(
        &self,
        code: &str,
        syntax: &SyntaxReference,
        theme: &Theme,
    ) -> Option<Vec<String>> {
        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(code) {
            let regions = highlighter.highlight_line(line, &self.syntax_set).ok()?;
            let trimmed: Vec<_> = regions
                .iter()
                .map(|(style, text)| (*style, text.trim_end_matches(|c: char| c == '\n' || c == '\r')))
                .collect();
            lines.push(styled_line_to_highlighted_html(&trimmed, IncludeBackground::No).ok()?);
        }

        Some(lines)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the language from a fence info string (```rust,ignore -> rust)
fn fence_language(kind: &CodeBlockKind) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => {
            let lang: String = info
                .trim()
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if lang.is_empty() {
                None
            } else {
                Some(lang)
            }
        }
        CodeBlockKind::Indented => None,
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn heading_class(depth: u8) -> Option<&'static str> {
    match depth {
        1 => Some("text-3xl md:text-4xl font-bold mb-4 mt-8 text-white"),
        2 => Some("text-2xl md:text-3xl font-bold mb-3 mt-6 text-white"),
        3 => Some("text-xl md:text-2xl font-bold mb-2 mt-5 text-white"),
        _ => None,
    }
}

/// Images sit in a bordered container and load lazily
fn render_image(img: &ImageTag) -> String {
    let title_attr = if img.title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, html_escape(&img.title))
    };
    format!(
        r#"<div class="my-6 rounded-lg overflow-hidden border border-white/10"><img class="w-full h-auto object-contain max-h-[500px] mx-auto" loading="lazy" src="{}" alt="{}"{}></div>"#,
        html_escape(&img.src),
        html_escape(&img.alt),
        title_attr
    )
}

fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        lang,
        html_escape(code)
    )
}

/// Add line numbers to highlighted code
fn add_line_numbers(lines: &[String], lang: &str) -> String {
    let gutter: Vec<String> = (1..=lines.len())
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect();

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
        lang,
        gutter.join("\n"),
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains(r#"<h1 class="text-3xl md:text-4xl font-bold mb-4 mt-8 text-white">Hello World</h1>"#));
        assert!(html.contains(&format!(r#"<p class="{}">This is a test.</p>"#, PARAGRAPH_CLASS)));
    }

    #[test]
    fn test_deep_headings_have_no_class() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("#### Small").unwrap();
        assert!(html.contains("<h4>Small</h4>"));
    }

    #[test]
    fn test_links_open_in_new_tab() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("[docs](https://docs.rs?a=1&b=2)").unwrap();
        assert!(html.contains(r#"href="https://docs.rs?a=1&amp;b=2""#));
        assert!(html.contains(r#"target="_blank" rel="noopener noreferrer">docs</a>"#));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() { println!(\"<hi>\"); }\n```").unwrap();
        assert!(html.contains("highlight rust"));
        assert!(html.contains(r#"<span class="line-number">1</span>"#));
        assert!(html.contains(
            r#"data-code="fn main() { println!(&quot;&lt;hi&gt;&quot;); }">Copy</button>"#
        ));
    }

    #[test]
    fn test_code_block_without_language_is_plain() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```\nx < y\n```\n\n    indented\n").unwrap();
        assert!(html.contains("<pre><code>x &lt; y\n</code></pre>"));
        assert!(html.contains("<pre><code>indented\n</code></pre>"));
        assert!(!html.contains("copy-code"));
    }

    #[test]
    fn test_code_block_without_line_numbers() {
        let renderer = MarkdownRenderer::with_options("base16-ocean.dark", false);
        let html = renderer.render("```python\nprint(1)\n```").unwrap();
        assert!(html.contains("<pre style="));
        assert!(!html.contains("line-number"));
    }

    #[test]
    fn test_fence_language() {
        let kind = CodeBlockKind::Fenced(CowStr::from("rust,ignore"));
        assert_eq!(fence_language(&kind), Some("rust".to_string()));
        let kind = CodeBlockKind::Fenced(CowStr::from(""));
        assert_eq!(fence_language(&kind), None);
    }

    #[test]
    fn test_tables_and_strikethrough() {
        let renderer = MarkdownRenderer::new();
        let markdown = "| Name | Score |\n|:-----|------:|\n| ~~old~~ | 3 |\n";
        let html = renderer.render(markdown).unwrap();
        assert!(html.contains(r#"<div class="overflow-x-auto my-4"><table class="w-full border-collapse">"#));
        assert!(html.contains(&format!(r#"<th class="{}" style="text-align: left">Name</th>"#, TH_CLASS)));
        assert!(html.contains(&format!(r#"<td class="{}" style="text-align: right">3</td>"#, TD_CLASS)));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("</tbody></table></div>"));
    }

    #[test]
    fn test_images_are_wrapped() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("![A *cat*](https://img.example/cat.png)").unwrap();
        assert!(html.contains(r#"<div class="my-6 rounded-lg overflow-hidden border border-white/10"><img"#));
        assert!(html.contains(r#"src="https://img.example/cat.png" alt="A cat""#));
    }

    #[test]
    fn test_raw_html_passthrough() {
        let renderer = MarkdownRenderer::new();
        let markdown = "Intro\n\n<iframe src=\"https://www.youtube.com/embed/x\"></iframe>\n\nOutro";
        let html = renderer.render(markdown).unwrap();
        assert!(html.contains(r#"<iframe src="https://www.youtube.com/embed/x"></iframe>"#));
    }

    #[test]
    fn test_blockquotes_and_lists() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("> quoted\n\n- a\n- b\n\n3. c\n").unwrap();
        assert!(html.contains(&format!(r#"<blockquote class="{}">"#, BLOCKQUOTE_CLASS)));
        assert!(html.contains(&format!(r#"<ul class="{}">"#, UL_CLASS)));
        assert!(html.contains(&format!(r#"<li class="{}">a</li>"#, LI_CLASS)));
        assert!(html.contains(&format!(r#"<ol class="{}" start="3">"#, OL_CLASS)));
    }
}
