//! HTML escaping and sanitizing of raw inner HTML.
//!
//! [`sanitize_html`] keeps a fixed set of formatting tags and rebuilds them
//! with a fixed set of attributes. Everything else is reduced to text:
//!
//! - tags outside the allow-list are dropped, their text content is kept
//! - `script` and `style` elements are dropped together with their content
//! - comments are dropped
//! - a `<` that does not open a tag is escaped
//! - `href` and `src` only accept relative, `http`, `https` and `mailto` URLs

use crate::logging::targets;

/// Tags kept by [`sanitize_html`].
pub const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "del", "div", "em", "h1", "h2", "h3", "h4", "h5", "h6",
    "hr", "i", "img", "li", "ol", "p", "pre", "s", "span", "strong", "sub", "sup", "table",
    "tbody", "td", "th", "thead", "tr", "u", "ul",
];

/// Attributes kept on allowed tags.
pub const ALLOWED_ATTRIBUTES: &[&str] = &["alt", "class", "href", "src", "title"];

const URL_ATTRIBUTES: &[&str] = &["href", "src"];
const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];
const DROPPED_WITH_CONTENT: &[&str] = &["script", "style"];

/// Escape `text` for markup. Inside attribute values `"` is escaped too.
pub fn escape_html(text: &str, in_attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Reduce `html` to markup that is safe to inject as inner HTML.
pub fn sanitize_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];

        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        let parsed = tag_end(rest).and_then(|end| Some((Tag::parse(&rest[1..end])?, end)));
        let Some((tag, end)) = parsed else {
            out.push_str("&lt;");
            rest = &rest[1..];
            continue;
        };
        rest = &rest[end + 1..];

        if DROPPED_WITH_CONTENT.contains(&tag.name.as_str()) {
            if !tag.closing && !tag.self_closing {
                rest = skip_element(rest, &tag.name);
            }
            continue;
        }
        if ALLOWED_TAGS.contains(&tag.name.as_str()) {
            tag.write(&mut out);
        } else {
            tracing::trace!(target: targets::HTML, tag = %tag.name, "dropping tag");
        }
    }
    out.push_str(rest);
    out
}

/// Index of the `>` closing the tag that opens `s`, ignoring quoted `>`.
fn tag_end(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, ch) in s.char_indices().skip(1) {
        match (quote, ch) {
            (None, '"' | '\'') => quote = Some(ch),
            (Some(q), _) if ch == q => quote = None,
            (None, '>') => return Some(i),
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}

/// The remainder after the element named `name` closes.
fn skip_element<'a>(rest: &'a str, name: &str) -> &'a str {
    let closing = format!("</{name}");
    // ASCII lowercasing keeps byte offsets.
    let Some(start) = rest.to_ascii_lowercase().find(&closing) else {
        return "";
    };
    let after = &rest[start..];
    after.find('>').map_or("", |end| &after[end + 1..])
}

struct Tag<'a> {
    name: String,
    closing: bool,
    self_closing: bool,
    attributes: Vec<(String, Option<&'a str>)>,
}

impl<'a> Tag<'a> {
    /// Parse the text between `<` and `>`.
    fn parse(inner: &'a str) -> Option<Self> {
        let (closing, body) = match inner.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, inner),
        };
        let body = body.trim_end();
        let (self_closing, body) = match body.strip_suffix('/') {
            Some(body) => (true, body),
            None => (false, body),
        };

        let name_end = body
            .find(|ch: char| !ch.is_ascii_alphanumeric())
            .unwrap_or(body.len());
        let name = &body[..name_end];
        if !name.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            return None;
        }
        let attributes = &body[name_end..];
        if !attributes.is_empty() && !attributes.starts_with(char::is_whitespace) {
            return None;
        }

        Some(Self {
            name: name.to_ascii_lowercase(),
            closing,
            self_closing,
            attributes: parse_attributes(attributes),
        })
    }

    fn write(&self, out: &mut String) {
        if self.closing {
            out.push_str("</");
            out.push_str(&self.name);
            out.push('>');
            return;
        }
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            let Some(value) = value else { continue };
            if !ALLOWED_ATTRIBUTES.contains(&name.as_str()) {
                continue;
            }
            if URL_ATTRIBUTES.contains(&name.as_str()) && !is_safe_url(value) {
                tracing::debug!(target: targets::HTML, attribute = %name, "dropping unsafe url");
                continue;
            }
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_html(value, true, out);
            out.push('"');
        }
        out.push('>');
    }
}

fn parse_attributes(mut s: &str) -> Vec<(String, Option<&str>)> {
    let mut attributes = Vec::new();
    loop {
        s = s.trim_start();
        if s.is_empty() {
            break;
        }
        let name_end = s
            .find(|ch: char| ch.is_whitespace() || ch == '=')
            .unwrap_or(s.len());
        if name_end == 0 {
            // Stray `=`.
            s = &s[1..];
            continue;
        }
        let name = s[..name_end].to_ascii_lowercase();
        s = s[name_end..].trim_start();

        let Some(assigned) = s.strip_prefix('=') else {
            attributes.push((name, None));
            continue;
        };
        s = assigned.trim_start();
        let value = match s.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let quoted = &s[1..];
                let end = quoted.find(quote).unwrap_or(quoted.len());
                s = quoted.get(end + 1..).unwrap_or("");
                &quoted[..end]
            }
            _ => {
                let end = s.find(char::is_whitespace).unwrap_or(s.len());
                let value = &s[..end];
                s = &s[end..];
                value
            }
        };
        attributes.push((name, Some(value)));
    }
    attributes
}

/// Relative URLs and the schemes in [`URL_SCHEMES`].
fn is_safe_url(url: &str) -> bool {
    let compact: String = url
        .chars()
        .filter(|ch| !ch.is_whitespace() && !ch.is_control())
        .collect();
    let scheme_end = compact.find(|ch: char| matches!(ch, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if compact[i..].starts_with(':') => {
            let scheme = compact[..i].to_ascii_lowercase();
            URL_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}
