//! Parsed HTML documents and the lookup primitives extraction rules are
//! written against.
//!
//! The RRC pages carry very few ids or classes once fetched outside a
//! browser, so rules typically start at one of the few elements with an id
//! and walk from there: up to the parent heading, across to the next sibling
//! table, then down through its rows and cells. Everything here preserves
//! document order.

use crate::error::{FetchError, Result};
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements whose whitespace is content; their subtree is written inline.
const PREFORMATTED_ELEMENTS: &[&str] = &["pre", "textarea"];

pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// First element carrying the given `id` attribute.
    pub fn find_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().id() == Some(id))
    }

    /// Every element in the document satisfying `pred`, in document order.
    pub fn find_all<'a, P>(&'a self, pred: P) -> impl Iterator<Item = ElementRef<'a>> + 'a
    where
        P: Fn(&ElementRef<'a>) -> bool + 'a,
    {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(move |el| pred(el))
    }

    /// Elements matching a CSS selector, in document order.
    pub fn select_all(&self, css: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector = Selector::parse(css)
            .map_err(|e| FetchError::Parse(format!("Invalid selector {:?}: {}", css, e)))?;
        Ok(self.html.select(&selector).collect())
    }

    /// Indented rendering of the tree, one tag or text run per line.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        for child in self.html.tree.root().children() {
            match ElementRef::wrap(child) {
                Some(el) => write_element(el, 0, &mut out),
                None => write_leaf(child.value(), 0, &mut out),
            }
        }
        out
    }
}

/// Descendants of `container` (excluding itself) satisfying `pred`.
pub fn find_all_in<'a, P>(container: ElementRef<'a>, pred: P) -> impl Iterator<Item = ElementRef<'a>>
where
    P: Fn(&ElementRef<'a>) -> bool,
{
    container
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |el| pred(el))
}

/// First descendant of `container` with the given tag name.
pub fn find_tag<'a>(container: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    find_all_in(container, is_tag(tag)).next()
}

/// The next element sibling, skipping text and comment nodes.
pub fn next_sibling_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Rows of a table, top to bottom. Rows inside `thead`/`tbody`/`tfoot` are
/// included.
pub fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    find_all_in(table, is_tag("tr")).collect()
}

/// `td` and `th` children of a row, left to right.
pub fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

pub fn is_tag(name: &str) -> impl Fn(&ElementRef<'_>) -> bool + '_ {
    move |el| el.value().name().eq_ignore_ascii_case(name)
}

/// True when the element has at least one direct text child that is not
/// just whitespace.
pub fn has_direct_text(element: &ElementRef<'_>) -> bool {
    element.children().any(|child| match child.value() {
        Node::Text(text) => !text.trim().is_empty(),
        _ => false,
    })
}

/// Case-insensitive substring match against the element's full text.
pub fn text_contains(needle: &str) -> impl Fn(&ElementRef<'_>) -> bool + use<> {
    let needle = needle.to_lowercase();
    move |el| element_text(*el).to_lowercase().contains(&needle)
}

/// Text of the element's direct text children, whitespace-normalized.
pub fn direct_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for child in element.children() {
        if let Node::Text(text) = child.value() {
            raw.push_str(text);
        }
    }
    normalize_whitespace(&raw)
}

/// All descendant text, whitespace-normalized.
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Collapse whitespace runs to a single space and trim. Non-breaking spaces
/// count as whitespace.
pub fn normalize_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Resolve an `href` against `base`, dropping the fragment. Returns `None`
/// for empty, fragment-only and non-navigational (`javascript:`, `mailto:`,
/// `tel:`) links.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

fn write_element(element: ElementRef<'_>, depth: usize, out: &mut String) {
    let indent = " ".repeat(depth);
    let name = element.value().name();
    out.push_str(&indent);
    write_open_tag(element, out);
    out.push('\n');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    if PREFORMATTED_ELEMENTS.contains(&name) {
        // A newline right after the start tag is dropped by parsers, so the
        // content reads back unchanged.
        write_inline(element, out);
        out.push_str(&format!("</{}>\n", name));
        return;
    }

    if RAW_TEXT_ELEMENTS.contains(&name) {
        for child in element.children() {
            if let Node::Text(text) = child.value() {
                let body: &str = text;
                out.push_str(body);
                if !body.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    } else {
        for child in element.children() {
            match ElementRef::wrap(child) {
                Some(el) => write_element(el, depth + 1, out),
                None => write_leaf(child.value(), depth + 1, out),
            }
        }
    }

    out.push_str(&format!("{}</{}>\n", indent, name));
}

fn write_open_tag(element: ElementRef<'_>, out: &mut String) {
    out.push('<');
    out.push_str(element.value().name());
    for (key, value) in element.value().attrs() {
        out.push_str(&format!(" {}=\"{}\"", key, escape_attr(value)));
    }
    out.push('>');
}

/// Children of `element` exactly as parsed, without added whitespace.
fn write_inline(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match ElementRef::wrap(child) {
            Some(el) => {
                let name = el.value().name();
                write_open_tag(el, out);
                if !VOID_ELEMENTS.contains(&name) {
                    write_inline(el, out);
                    out.push_str(&format!("</{}>", name));
                }
            }
            None => match child.value() {
                Node::Text(text) => out.push_str(&escape_text(text)),
                Node::Comment(comment) => {
                    let body: &str = comment;
                    out.push_str(&format!("<!--{}-->", body));
                }
                _ => {}
            },
        }
    }
}

fn write_leaf(node: &Node, depth: usize, out: &mut String) {
    let indent = " ".repeat(depth);
    match node {
        Node::Doctype(doctype) => {
            out.push_str(&format!("<!DOCTYPE {}>\n", doctype.name()));
        }
        Node::Comment(comment) => {
            let body: &str = comment;
            out.push_str(&format!("{}<!--{}-->\n", indent, body));
        }
        Node::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push_str(&indent);
                out.push_str(&escape_text(trimmed));
                out.push('\n');
            }
        }
        _ => {}
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEANUP_FIXTURE: &str = r#"<html><body>
        <h3><a id="OCP_quarterly"></a>Oilfield Cleanup Program Quarterly Reports</h3>
        <!-- layout table -->
        <table>
          <tbody>
            <tr><td><strong>FY 2020</strong></td><td><strong>FY 2019</strong></td></tr>
            <tr><td><a href="/a.pdf">Q1 2020</a></td><td><a href="/b.pdf">Q1 2019</a></td></tr>
            <tr><th>Total</th><td>n/a</td></tr>
          </tbody>
        </table>
    </body></html>"#;

    #[test]
    fn test_find_by_id() {
        let doc = Document::parse(CLEANUP_FIXTURE);
        let anchor = doc.find_by_id("OCP_quarterly").unwrap();
        assert_eq!(anchor.value().name(), "a");
        assert!(doc.find_by_id("OCP_annual").is_none());
    }

    #[test]
    fn test_parent_and_next_sibling_skip_text_and_comments() {
        let doc = Document::parse(CLEANUP_FIXTURE);
        let anchor = doc.find_by_id("OCP_quarterly").unwrap();
        let header = parent_element(anchor).unwrap();
        assert_eq!(header.value().name(), "h3");

        let table = next_sibling_element(header).unwrap();
        assert_eq!(table.value().name(), "table");
        assert!(next_sibling_element(table).is_none());
    }

    #[test]
    fn test_rows_and_cells_in_document_order() {
        let doc = Document::parse(CLEANUP_FIXTURE);
        let table = doc.find_all(is_tag("table")).next().unwrap();
        let rows = table_rows(table);
        assert_eq!(rows.len(), 3);

        let texts: Vec<String> = row_cells(rows[1]).into_iter().map(element_text).collect();
        assert_eq!(texts, vec!["Q1 2020", "Q1 2019"]);

        let last: Vec<String> = row_cells(rows[2]).into_iter().map(element_text).collect();
        assert_eq!(last, vec!["Total", "n/a"]);
    }

    #[test]
    fn test_has_direct_text_matches_innermost_only() {
        let doc = Document::parse(CLEANUP_FIXTURE);
        let table = doc.find_all(is_tag("table")).next().unwrap();
        let first_row = table_rows(table)[0];

        let tagged: Vec<String> = find_all_in(first_row, has_direct_text)
            .map(|el| format!("{}:{}", el.value().name(), direct_text(el)))
            .collect();
        assert_eq!(tagged, vec!["strong:FY 2020", "strong:FY 2019"]);
    }

    #[test]
    fn test_text_contains_is_case_insensitive() {
        let doc = Document::parse(CLEANUP_FIXTURE);
        let headers: Vec<_> = doc
            .find_all(is_tag("h3"))
            .filter(text_contains("QUARTERLY reports"))
            .collect();
        assert_eq!(headers.len(), 1);

        let none = doc.find_all(text_contains("annual")).count();
        assert_eq!(none, 0);
    }

    #[test]
    fn test_find_all_is_restartable_and_finite() {
        let doc = Document::parse(CLEANUP_FIXTURE);
        let first = doc.find_all(is_tag("a")).count();
        let second = doc.find_all(is_tag("a")).count();
        assert_eq!(first, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_all_and_invalid_selector() {
        let doc = Document::parse(CLEANUP_FIXTURE);
        let links = doc.select_all("a[href]").unwrap();
        assert_eq!(links.len(), 2);
        assert!(doc.select_all("a[").is_err());
    }

    #[test]
    fn test_find_tag_within_cell() {
        let doc = Document::parse(CLEANUP_FIXTURE);
        let table = doc.find_all(is_tag("table")).next().unwrap();
        let rows = table_rows(table);
        let cells = row_cells(rows[1]);
        let a = find_tag(cells[0], "a").unwrap();
        assert_eq!(a.value().attr("href"), Some("/a.pdf"));
        assert!(find_tag(row_cells(rows[2])[1], "a").is_none());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  FY \n\t 2020 "), "FY 2020");
        assert_eq!(normalize_whitespace("FY\u{a0}2020"), "FY 2020");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_resolve_href() {
        let base = Url::parse("https://www.rrc.state.tx.us").unwrap();
        assert_eq!(
            resolve_href(&base, "/x/y.pdf").unwrap().as_str(),
            "https://www.rrc.state.tx.us/x/y.pdf"
        );
        assert_eq!(
            resolve_href(&base, "/x/y.pdf#page=2").unwrap().as_str(),
            "https://www.rrc.state.tx.us/x/y.pdf"
        );
        assert!(resolve_href(&base, "#top").is_none());
        assert!(resolve_href(&base, "mailto:someone@example.com").is_none());
        assert!(resolve_href(&base, "  ").is_none());
    }

    #[test]
    fn test_pretty_is_indented_and_escaped() {
        let doc = Document::parse(r#"<p class="a&quot;b">x &lt; y<br>z</p>"#);
        let pretty = doc.pretty();
        assert!(pretty.contains("\n <body>\n"));
        assert!(pretty.contains("<p class=\"a&quot;b\">"));
        assert!(pretty.contains("x &lt; y"));
        assert!(pretty.contains("<br>\n"));
        assert!(!pretty.contains("</br>"));
    }

    #[test]
    fn test_pretty_keeps_preformatted_content() {
        let doc = Document::parse("<pre>  Lease   Well\n<b>01 &lt; 02</b></pre><textarea> a  b</textarea>");
        let pretty = doc.pretty();
        assert!(pretty.contains("<pre>\n  Lease   Well\n<b>01 &lt; 02</b></pre>\n"), "{pretty}");
        assert!(pretty.contains("<textarea>\n a  b</textarea>\n"), "{pretty}");

        let reparsed = Document::parse(&pretty);
        let pre = reparsed.find_all(is_tag("pre")).next().unwrap();
        assert_eq!(pre.text().collect::<String>(), "  Lease   Well\n01 < 02");
    }

    #[test]
    fn test_pretty_does_not_touch_parsed_tree() {
        let doc = Document::parse(CLEANUP_FIXTURE);
        let before = doc.html().html();
        let _ = doc.pretty();
        assert_eq!(doc.html().html(), before);
    }
}
