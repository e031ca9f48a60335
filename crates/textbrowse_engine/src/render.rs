//! Markup-to-text rendering.
//!
//! The scanner makes a single pass over the input: everything between `<` and
//! `>` is dropped, and `&lt;` / `&gt;` are decoded. Any other entity is passed
//! through verbatim. Malformed markup never produces an error.

use std::fmt;

/// Turns a fetched body into display text.
pub trait Renderer: Send + Sync {
    fn render(&self, body: &str, out: &mut dyn fmt::Write) -> fmt::Result;

    fn render_to_string(&self, body: &str) -> String {
        let mut out = String::with_capacity(body.len());
        // Writing into a String cannot fail.
        let _ = self.render(body, &mut out);
        out
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TagStripRenderer;

impl Renderer for TagStripRenderer {
    fn render(&self, body: &str, out: &mut dyn fmt::Write) -> fmt::Result {
        let mut scanner = TextScanner::new();
        scanner.feed(body, out)?;
        scanner.finish();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Text,
    InTag,
    /// Collecting an entity name; `in_tag` is the mode to resume after `;`.
    /// An entity met inside a tag emits its text and then the tag continues.
    InEntity { in_tag: bool },
}

/// Incremental scanner. Input may be fed in arbitrary chunks; state carries
/// over between `feed` calls until `finish`.
#[derive(Debug, Default)]
pub struct TextScanner {
    mode: Mode,
    entity: String,
}

impl TextScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed<W: fmt::Write + ?Sized>(&mut self, chunk: &str, out: &mut W) -> fmt::Result {
        for c in chunk.chars() {
            self.step(c, out)?;
        }
        Ok(())
    }

    /// Reset for the next document. An entity still open at this point is
    /// discarded.
    pub fn finish(&mut self) {
        self.mode = Mode::Text;
        self.entity.clear();
    }

    fn step<W: fmt::Write + ?Sized>(&mut self, c: char, out: &mut W) -> fmt::Result {
        match (self.mode, c) {
            (Mode::InEntity { in_tag }, ';') => {
                match self.entity.as_str() {
                    "lt" => out.write_char('<')?,
                    "gt" => out.write_char('>')?,
                    name => write!(out, "&{name};")?,
                }
                self.entity.clear();
                self.mode = if in_tag { Mode::InTag } else { Mode::Text };
            }
            (Mode::InEntity { .. }, c) => self.entity.push(c),
            (mode, '&') => {
                self.entity.clear();
                self.mode = Mode::InEntity {
                    in_tag: mode == Mode::InTag,
                };
            }
            (_, '<') => self.mode = Mode::InTag,
            (_, '>') => self.mode = Mode::Text,
            (Mode::Text, c) => out.write_char(c)?,
            (Mode::InTag, _) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(body: &str) -> String {
        TagStripRenderer.render_to_string(body)
    }

    #[test]
    fn strips_tags() {
        assert_eq!(render("a<b>c</b>d"), "acd");
        assert_eq!(render("<html><body><p>Hi</p></body></html>"), "Hi");
    }

    #[test]
    fn decodes_lt_and_gt() {
        assert_eq!(render("1 &lt; 2 &gt; 0"), "1 < 2 > 0");
    }

    #[test]
    fn unknown_entities_pass_through() {
        assert_eq!(render("&amp;"), "&amp;");
        assert_eq!(render("fish &amp; chips &quot;x&quot;"), "fish &amp; chips &quot;x&quot;");
        assert_eq!(render("&;"), "&;");
    }

    #[test]
    fn decoded_brackets_are_not_markup() {
        assert_eq!(render("&lt;b&gt;bold&lt;/b&gt;"), "<b>bold</b>");
    }

    #[test]
    fn entity_swallows_markup_until_semicolon() {
        assert_eq!(render("a &b<i>c; d"), "a &b<i>c; d");
    }

    #[test]
    fn unterminated_entity_is_dropped() {
        assert_eq!(render("tail &lt"), "tail ");
    }

    #[test]
    fn malformed_markup_never_fails() {
        assert_eq!(render("a < b"), "a ");
        assert_eq!(render("a > b"), "a  b");
        assert_eq!(render("<<x>>y"), "y");
        assert_eq!(render("<a <b> c"), " c");
    }

    #[test]
    fn entity_inside_tag_resumes_tag() {
        assert_eq!(render("<a title=\"x &gt; y\">link</a>"), ">link");
    }

    #[test]
    fn non_ascii_text_is_kept() {
        assert_eq!(render("<p>h\u{e9}llo \u{1f600}</p>"), "h\u{e9}llo \u{1f600}");
    }

    #[test]
    fn chunked_feed_matches_single_pass() {
        let body = "x &l";
        let rest = "t; <b>y</b> &gt;";
        let mut scanner = TextScanner::new();
        let mut out = String::new();
        scanner.feed(body, &mut out).unwrap();
        scanner.feed(rest, &mut out).unwrap();
        scanner.finish();
        assert_eq!(out, render(&format!("{body}{rest}")));
        assert_eq!(out, "x < y >");
    }

    #[test]
    fn finish_resets_state() {
        let mut scanner = TextScanner::new();
        let mut out = String::new();
        scanner.feed("<unclosed", &mut out).unwrap();
        scanner.finish();
        scanner.feed("visible", &mut out).unwrap();
        assert_eq!(out, "visible");
    }
}
