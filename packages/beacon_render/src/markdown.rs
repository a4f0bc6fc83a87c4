//! Minimal markdown renderer for transcript bubbles.
//!
//! An ordered pipeline of pure text-rewrite passes. The order is load-bearing:
//! HTML escaping runs first so no later pass can introduce an injection, and
//! block constructs (fenced code) are rewritten before the inline passes that
//! would otherwise chew on their contents.
//!
//! Supported dialect: fenced and inline code, `#`..`######` headings, bold and
//! italic (asterisk and underscore forms), bullet and numbered lists, and
//! paragraph/line breaks. Everything else passes through as escaped text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Heading passes, longest hash run first so `#` never matches inside `######`.
static HEADINGS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    (1..=6)
        .rev()
        .map(|level| {
            let hashes = "#".repeat(level);
            (
                Regex::new(&format!(r"(?m)^{hashes}\s+(.+)$")).unwrap(),
                format!("<h{level}>$1</h{level}>"),
            )
        })
        .collect()
});

static BOLD_STAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
// The trailing space is part of the match and is consumed by the replacement.
// Long-standing quirk of the transcript dialect; kept so output stays stable.
static BOLD_UNDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__([^_]+)__ ").unwrap());
static ITALIC_UNDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_([^_]+)_").unwrap());

static BULLET_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*]\s+(.+)$").unwrap());
static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.+)$").unwrap());

static PARA_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

/// Renders transcript markdown to an HTML fragment.
///
/// Total: any input produces output, worst case fully-escaped plain text.
/// Unmatched emphasis markers stay literal.
pub fn render(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut html = escape_html(text);

    html = CODE_BLOCK
        .replace_all(&html, "<pre class=\"code\"><code>$1</code></pre>")
        .into_owned();
    html = INLINE_CODE.replace_all(&html, "<code>$1</code>").into_owned();

    for (pattern, replacement) in HEADINGS.iter() {
        html = pattern.replace_all(&html, replacement.as_str()).into_owned();
    }

    html = BOLD_STAR.replace_all(&html, "<strong>$1</strong>").into_owned();
    html = ITALIC_STAR.replace_all(&html, "<em>$1</em>").into_owned();
    html = BOLD_UNDER.replace_all(&html, "<strong>$1</strong>").into_owned();
    html = ITALIC_UNDER.replace_all(&html, "<em>$1</em>").into_owned();

    html = group_list(&html, &BULLET_ITEM, "ul");
    html = group_list(&html, &NUMBERED_ITEM, "ol");

    html = PARA_BREAK.replace_all(&html, "<br/><br/>").into_owned();
    html.replace('\n', "<br/>")
}

/// Renders event content that may be structured rather than plain text.
///
/// Non-string values are pretty-printed as JSON first and then run through the
/// same pipeline, so braces and quotes arrive escaped.
pub fn render_content(content: &Value) -> String {
    match content {
        Value::String(text) => render(text),
        other => render(&serde_json::to_string_pretty(other).unwrap_or_default()),
    }
}

fn escape_html(text: &str) -> String {
    // `&` first, or the later entities would be double-escaped.
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Wraps contiguous runs of matching lines in a list container, one `<li>` per
/// line. A non-matching line closes the open container; separate runs produce
/// separate containers. Line-based on purpose: a single matching line still
/// becomes a one-item list.
fn group_list(input: &str, item: &Regex, tag: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in input.split('\n') {
        if let Some(caps) = item.captures(line) {
            if !in_list {
                out.push(format!("<{tag}>"));
                in_list = true;
            }
            out.push(format!("<li>{}</li>", &caps[1]));
        } else {
            if in_list {
                out.push(format!("</{tag}>"));
                in_list = false;
            }
            out.push(line.to_string());
        }
    }
    if in_list {
        out.push(format!("</{tag}>"));
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escapes_html_before_markup() {
        let html = render("<script>alert('x')</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&#39;x&#39;"));
    }

    #[test]
    fn bold_and_italic_interplay() {
        let html = render("**bold** and *italic*");
        assert_eq!(html, "<strong>bold</strong> and <em>italic</em>");
    }

    #[test]
    fn unmatched_emphasis_stays_literal() {
        assert_eq!(render("*loner"), "*loner");
        assert_eq!(render("a ** b"), "a ** b");
    }

    #[test]
    fn double_underscore_requires_trailing_space() {
        // With the trailing space: bold, and the space is consumed.
        assert_eq!(render("__strong__ tail"), "<strong>strong</strong>tail");
        // Without it the italic pass picks up the inner pair instead.
        assert_eq!(render("__strong__"), "_<em>strong</em>_");
    }

    #[test]
    fn headings_by_level() {
        assert_eq!(render("# Title"), "<h1>Title</h1>");
        assert_eq!(render("### Sub"), "<h3>Sub</h3>");
        assert_eq!(render("###### Deep"), "<h6>Deep</h6>");
        // No space after the hash run: not a heading.
        assert_eq!(render("#nope"), "#nope");
    }

    #[test]
    fn fenced_code_block() {
        let html = render("```\nlet x = 1;\n```");
        assert!(html.starts_with("<pre class=\"code\"><code>"));
        assert!(html.contains("let x = 1;"));
        assert!(html.ends_with("</code></pre>"));
    }

    #[test]
    fn inline_code() {
        assert_eq!(render("use `cargo` here"), "use <code>cargo</code> here");
    }

    #[test]
    fn bullet_list_groups_contiguous_lines() {
        let html = render("- a\n- b\nc");
        let ul = html.find("<ul>").unwrap();
        let close = html.find("</ul>").unwrap();
        assert!(html.contains("<li>a</li>"));
        assert!(html.contains("<li>b</li>"));
        // Trailing non-list line lands outside the container.
        assert!(html[close..].contains('c'));
        assert_eq!(html.matches("<ul>").count(), 1);
        assert!(ul < close);
    }

    #[test]
    fn separate_runs_produce_separate_containers() {
        let html = render("- a\n\nplain\n- b");
        assert_eq!(html.matches("<ul>").count(), 2);
        assert_eq!(html.matches("</ul>").count(), 2);
    }

    #[test]
    fn numbered_list() {
        let html = render("1. one\n2. two");
        assert_eq!(html.matches("<ol>").count(), 1);
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<li>two</li>"));
    }

    #[test]
    fn single_line_makes_one_item_list() {
        let html = render("- alone");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>alone</li>"));
    }

    #[test]
    fn paragraph_and_line_breaks() {
        assert_eq!(render("a\n\n\nb"), "a<br/><br/>b");
        assert_eq!(render("a\nb"), "a<br/>b");
    }

    #[test]
    fn empty_input() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn structured_content_is_pretty_printed_and_escaped() {
        let html = render_content(&json!({ "key": "val" }));
        assert!(html.contains("&quot;key&quot;"));
        assert!(html.contains("&quot;val&quot;"));
        assert!(!html.contains('"'));
    }

    #[test]
    fn string_content_renders_directly() {
        let html = render_content(&json!("# Hello"));
        assert_eq!(html, "<h1>Hello</h1>");
    }

    #[test]
    fn idempotent_for_identical_input() {
        let input = "# h\n- a\n- b\n\n**x**";
        assert_eq!(render(input), render(input));
    }
}
