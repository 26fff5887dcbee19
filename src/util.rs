//! Small text helpers shared by the condition compiler and the checks.
//!
//! All matching in this crate is case-insensitive and works on raw text, so most of
//! these helpers either build a case-insensitive regex or normalize text for containment.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

/// Build a case-insensitive regex. Returns `None` instead of failing, so a
/// pathological pattern degrades to "no match" rather than an error.
pub fn ci_regex(pattern: &str) -> Option<Regex> {
  RegexBuilder::new(pattern)
    .case_insensitive(true)
    .dot_matches_new_line(true)
    .build()
    .ok()
}

fn html_comment_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"))
}

fn css_comment_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"))
}

fn any_tag_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

/// Drop `<!-- ... -->` blocks. An unterminated comment is left alone.
pub fn strip_html_comments(html: &str) -> String {
  html_comment_re().replace_all(html, " ").into_owned()
}

/// Drop `/* ... */` blocks.
pub fn strip_css_comments(css: &str) -> String {
  css_comment_re().replace_all(css, " ").into_owned()
}

/// Lowercase and collapse every whitespace run to a single space.
pub fn collapse(s: &str) -> String {
  s.split_whitespace()
    .map(|w| w.to_lowercase())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Visible text of an HTML fragment: tags become spaces, a few entities are decoded,
/// then the result is collapsed.
pub fn text_content(html: &str) -> String {
  let no_comments = strip_html_comments(html);
  let no_tags = any_tag_re().replace_all(&no_comments, " ");
  collapse(&decode_entities(&no_tags))
}

/// Visible text split at every tag boundary, one collapsed chunk per text run.
/// `<h1>Daily Chronicle</h1><p>Since Tuesday</p>` gives `["daily chronicle", "since tuesday"]`.
pub fn text_chunks(html: &str) -> Vec<String> {
  let no_comments = strip_html_comments(html);
  any_tag_re()
    .split(&no_comments)
    .map(|run| collapse(&decode_entities(run)))
    .filter(|chunk| !chunk.is_empty())
    .collect()
}

fn decode_entities(s: &str) -> String {
  s.replace("&nbsp;", " ")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&amp;", "&")
}

/// Regex source for a `property: value` declaration. Spaces inside the value match any
/// whitespace run; `!important` is tolerated; the value must end at a declaration boundary.
pub fn declaration_pattern(property: &str, value: &str) -> String {
  let value_pat = value
    .split_whitespace()
    .map(regex::escape)
    .collect::<Vec<_>>()
    .join(r"\s+");
  format!(
    r#"(?:^|[^a-z0-9_-]){}\s*:\s*{}\s*(?:!\s*important\s*)?(?:;|\}}|"|'|$)"#,
    regex::escape(property.trim()),
    value_pat
  )
}

/// Split `"display: none"` into `("display", "none")`.
pub fn split_declaration(decl: &str) -> Option<(&str, &str)> {
  let (p, v) = decl.split_once(':')?;
  let (p, v) = (p.trim(), v.trim().trim_end_matches(';').trim());
  if p.is_empty() || v.is_empty() { None } else { Some((p, v)) }
}

/// True if `text` carries the declaration `decl` (`prop: value`), or simply contains it
/// when `decl` is not a declaration.
pub fn has_declaration(text: &str, decl: &str) -> bool {
  match split_declaration(decl) {
    Some((p, v)) => ci_regex(&declaration_pattern(p, v)).map_or(false, |re| re.is_match(text)),
    None => text.to_lowercase().contains(&decl.trim().to_lowercase()),
  }
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with whole learner submissions.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    None => s.to_string(),
    Some((cut, _)) => format!("{}… ({} bytes total)", &s[..cut], s.len()),
  }
}
