//! Evaluation of a single `CheckKind` against a submission.
//!
//! These are heuristics over raw text, not an HTML/CSS parser. A check never fails
//! for data-shape reasons: malformed markup simply does not match.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{CheckKind, Source};
use crate::util::{
  ci_regex, collapse, declaration_pattern, has_declaration, split_declaration, strip_css_comments,
  strip_html_comments, text_chunks, text_content,
};

/// Elements that never have a closing tag.
const VOID_TAGS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Element names a `StylePresentAnyOf` option may use as a bare type selector.
const HTML_ELEMENTS: &[&str] = &[
  "a", "abbr", "article", "aside", "b", "blockquote", "body", "button", "code", "del", "div", "em", "figure",
  "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "html", "i", "img", "input", "kbd", "label",
  "li", "main", "mark", "nav", "ol", "p", "pre", "section", "small", "span", "strong", "table", "td", "th",
  "tr", "u", "ul",
];

/// Elements whose closing tag is optional, so their open/close counts prove nothing.
const OPTIONAL_CLOSE_TAGS: &[&str] = &["p", "li", "dt", "dd", "option", "tr", "td", "th"];

/// A submission prepared once and shared by every check.
#[derive(Debug, Clone)]
pub struct Document {
  pub html: String,
  pub css: String,
  /// Collapsed, lowercased visible text of `html`.
  pub text: String,
}

impl Document {
  pub fn new(html: &str, css: &str) -> Self {
    let html = strip_html_comments(html);
    let text = text_content(&html);
    Self { html, css: strip_css_comments(css), text }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
  Pass,
  Fail(String),
}

impl Verdict {
  pub fn passed(&self) -> bool {
    matches!(self, Verdict::Pass)
  }
}

/// Evaluate one check. `prior` is the reference document that revealed/preserved
/// content is derived from when the check does not list it explicitly.
pub fn evaluate(check: &CheckKind, doc: &Document, prior: &Document) -> Verdict {
  match check {
    CheckKind::AttributeAbsent { source, marker, revealed } => attribute_absent(*source, marker, revealed, doc, prior),
    CheckKind::PropertyPresent { selector, property, value, conflicting } => {
      property_present(selector.as_deref(), property, value, conflicting, doc)
    }
    CheckKind::TagReplaced { deprecated, replacements, preserved } => {
      tag_replaced(deprecated, replacements, preserved, doc, prior)
    }
    CheckKind::StylePresentAnyOf { options } => style_present_any_of(options, doc),
  }
}

fn attribute_absent(source: Source, marker: &str, revealed: &[String], doc: &Document, prior: &Document) -> Verdict {
  let still_there = match source {
    Source::Html => html_has_marker(&doc.html, marker),
    Source::Css => has_declaration(&doc.css, marker),
  };
  if still_there {
    return Verdict::Fail(format!("`{}` is still present", marker.trim()));
  }

  let expected: Vec<String> = if !revealed.is_empty() {
    revealed.iter().map(|t| collapse(t)).collect()
  } else {
    match source {
      Source::Html => texts_of_marked_elements(&prior.html, marker),
      Source::Css => texts_hidden_by_css(prior, marker),
    }
  };
  for text in expected.iter().filter(|t| !t.is_empty()) {
    if !doc.text.contains(text.as_str()) {
      return Verdict::Fail(format!("the hidden content \"{}\" is missing", text));
    }
  }
  Verdict::Pass
}

fn property_present(
  selector: Option<&str>,
  property: &str,
  value: &str,
  conflicting: &[String],
  doc: &Document,
) -> Verdict {
  let Some(decl) = ci_regex(&declaration_pattern(property, value)) else {
    return Verdict::Fail(format!("`{}: {}` is not declared", property, value));
  };

  let declared = match selector {
    Some(sel) => css_blocks(&doc.css)
      .iter()
      .any(|(selectors, body)| selector_list_matches(selectors, sel) && decl.is_match(body)),
    None => decl.is_match(&doc.css),
  };
  if !declared {
    return match selector {
      Some(sel) => Verdict::Fail(format!("`{}: {}` is not declared for {}", property, value, sel)),
      None => Verdict::Fail(format!("`{}: {}` is not declared", property, value)),
    };
  }

  if let Some(conflict) = conflicting.iter().find(|c| has_declaration(&doc.css, c)) {
    return Verdict::Fail(format!("`{}` is still present", conflict.trim()));
  }
  Verdict::Pass
}

fn tag_replaced(
  deprecated: &str,
  replacements: &[String],
  preserved: &[String],
  doc: &Document,
  prior: &Document,
) -> Verdict {
  let deprecated = deprecated.trim().to_lowercase();
  let still_used = ci_regex(&format!(r"<\s*/?\s*{}\b", regex::escape(&deprecated)))
    .map_or(false, |re| re.is_match(&doc.html));
  if still_used {
    return Verdict::Fail(format!("<{}> tags are still present", deprecated));
  }

  let replacements: Vec<String> = replacements.iter().map(|t| t.trim().to_lowercase()).collect();
  if !replacements.iter().any(|t| count_open(&doc.html, t) > 0) {
    let names = replacements.iter().map(|t| format!("<{}>", t)).collect::<Vec<_>>().join(", ");
    return Verdict::Fail(format!("use one of {} instead", names));
  }

  let expected: Vec<String> = if !preserved.is_empty() {
    preserved.iter().map(|t| collapse(t)).collect()
  } else {
    inner_texts(&prior.html, &deprecated, |_| true)
  };
  for text in expected.iter().filter(|t| !t.is_empty()) {
    if !doc.text.contains(text.as_str()) {
      return Verdict::Fail(format!("the text \"{}\" was lost", text));
    }
  }

  if let Some(problem) = find_tag_mismatch(&doc.html, &replacements) {
    return Verdict::Fail(problem);
  }
  Verdict::Pass
}

fn style_present_any_of(options: &[String], doc: &Document) -> Verdict {
  let hit = options.iter().any(|opt| {
    let opt = opt.trim();
    if opt.starts_with('#') || opt.starts_with('.') || HTML_ELEMENTS.contains(&opt.to_lowercase().as_str()) {
      css_blocks(&doc.css).iter().any(|(selectors, _)| selector_list_matches(selectors, opt))
    } else if opt.starts_with('@') {
      doc.css.to_lowercase().contains(&opt.to_lowercase())
    } else if split_declaration(opt).is_some() {
      has_declaration(&doc.css, opt)
    } else {
      ci_regex(&format!(r"(?:^|[\s;{{]){}(?:-[a-z-]+)?\s*:", regex::escape(opt)))
        .map_or(false, |re| re.is_match(&doc.css))
    }
  });
  if hit {
    Verdict::Pass
  } else {
    Verdict::Fail(format!("none of {} is styled yet", options.join(", ")))
  }
}

// -------- HTML helpers --------

fn open_tag_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)<([a-z][a-z0-9]*)\b([^>]*)>").expect("valid regex"))
}

fn adjacent_pair_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"(?i)<([a-z][a-z0-9]*)\b(?:[^>]*[^>/])?>[^<]*</\s*([a-z][a-z0-9]*)\s*>").expect("valid regex")
  })
}

fn count_open(html: &str, tag: &str) -> usize {
  ci_regex(&format!(r"<\s*{}(?:\s[^>]*)?/?>", regex::escape(tag))).map_or(0, |re| re.find_iter(html).count())
}

fn count_self_closing(html: &str, tag: &str) -> usize {
  ci_regex(&format!(r"<\s*{}(?:\s[^>]*)?/>", regex::escape(tag))).map_or(0, |re| re.find_iter(html).count())
}

fn count_close(html: &str, tag: &str) -> usize {
  ci_regex(&format!(r"</\s*{}\s*>", regex::escape(tag))).map_or(0, |re| re.find_iter(html).count())
}

/// Narrow mismatch detection: an element opened and closed with a different tag around
/// plain text (`<header>Title</footer>`), or a replacement tag whose opens and closes do
/// not balance. Not a tree parser; nesting errors between balanced tags go unnoticed.
fn find_tag_mismatch(html: &str, watched: &[String]) -> Option<String> {
  let is_watched = |t: &str| watched.iter().any(|w| w == t);
  for cap in adjacent_pair_re().captures_iter(html) {
    let open = cap[1].to_lowercase();
    let close = cap[2].to_lowercase();
    if open != close && !VOID_TAGS.contains(&open.as_str()) && (is_watched(open.as_str()) || is_watched(close.as_str())) {
      return Some(format!("<{}> is closed with </{}>", open, close));
    }
  }
  for tag in watched {
    if VOID_TAGS.contains(&tag.as_str()) || OPTIONAL_CLOSE_TAGS.contains(&tag.as_str()) {
      continue;
    }
    let opens = count_open(html, tag).saturating_sub(count_self_closing(html, tag));
    let closes = count_close(html, tag);
    if opens != closes {
      return Some(format!("<{}> is opened {} time(s) but closed {} time(s)", tag, opens, closes));
    }
  }
  None
}

/// Text chunks inside every `<tag>` whose attribute text satisfies `keep`, up to the next
/// `</tag>`. Chunks are split at inner tags so each can be found on its own. Nested
/// elements of the same tag are not tracked.
fn inner_texts(html: &str, tag: &str, keep: impl Fn(&str) -> bool) -> Vec<String> {
  let Some(close_re) = ci_regex(&format!(r"</\s*{}\s*>", regex::escape(tag))) else {
    return Vec::new();
  };
  open_tag_re()
    .captures_iter(html)
    .filter(|cap| cap[1].eq_ignore_ascii_case(tag) && keep(&cap[2]))
    .filter_map(|cap| {
      let start = cap.get(0)?.end();
      let end = close_re.find_at(html, start)?.start();
      Some(text_chunks(&html[start..end]))
    })
    .flatten()
    .collect()
}

fn attrs_have_marker(attrs: &str, marker: &str) -> bool {
  if split_declaration(marker).is_some() {
    return has_declaration(attrs, marker);
  }
  ci_regex(&format!(r"(?:^|\s){}(?:[\s=/]|$)", regex::escape(marker.trim())))
    .map_or(false, |re| re.is_match(attrs))
}

fn html_has_marker(html: &str, marker: &str) -> bool {
  open_tag_re().captures_iter(html).any(|cap| attrs_have_marker(&cap[2], marker))
}

/// Text of prior elements carrying the marker (e.g. `<p hidden>secret</p>` gives "secret").
fn texts_of_marked_elements(html: &str, marker: &str) -> Vec<String> {
  let mut tags: Vec<String> = open_tag_re()
    .captures_iter(html)
    .filter(|cap| attrs_have_marker(&cap[2], marker))
    .map(|cap| cap[1].to_lowercase())
    .collect();
  tags.sort();
  tags.dedup();
  tags
    .iter()
    .flat_map(|tag| inner_texts(html, tag, |attrs| attrs_have_marker(attrs, marker)))
    .collect()
}

/// Text of prior elements targeted by a CSS rule carrying `marker`, for simple
/// `#id`, `.class` and bare tag selectors.
fn texts_hidden_by_css(prior: &Document, marker: &str) -> Vec<String> {
  let mut out = Vec::new();
  for (selectors, body) in css_blocks(&prior.css) {
    if !has_declaration(&body, marker) {
      continue;
    }
    for sel in selectors.split(',').map(str::trim) {
      out.extend(texts_for_simple_selector(&prior.html, sel));
    }
  }
  out
}

fn texts_for_simple_selector(html: &str, selector: &str) -> Vec<String> {
  let attr_token = |name: &str, value: &str| -> Option<Regex> {
    ci_regex(&format!(
      r#"(?:^|\s){}\s*=\s*["']?(?:[^"'>]*\s)?{}(?:["'\s>]|$)"#,
      name,
      regex::escape(value)
    ))
  };
  let mut tags: Vec<String> = open_tag_re().captures_iter(html).map(|cap| cap[1].to_lowercase()).collect();
  tags.sort();
  tags.dedup();

  if let Some(id) = selector.strip_prefix('#') {
    let Some(re) = attr_token("id", id) else { return Vec::new() };
    tags.iter().flat_map(|t| inner_texts(html, t, |a| re.is_match(a))).collect()
  } else if let Some(class) = selector.strip_prefix('.') {
    let Some(re) = attr_token("class", class) else { return Vec::new() };
    tags.iter().flat_map(|t| inner_texts(html, t, |a| re.is_match(a))).collect()
  } else if !selector.is_empty() && selector.chars().all(|c| c.is_ascii_alphanumeric()) {
    inner_texts(html, &selector.to_lowercase(), |_| true)
  } else {
    Vec::new()
  }
}

// -------- CSS helpers --------

fn css_block_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"([^{}]*)\{([^{}]*)\}").expect("valid regex"))
}

/// Flat `(selector list, declarations)` pairs. Blocks nested in at-rules come out with
/// their own selector; the at-rule header itself is dropped.
pub fn css_blocks(css: &str) -> Vec<(String, String)> {
  css_block_re()
    .captures_iter(css)
    .map(|cap| (cap[1].trim().to_string(), cap[2].to_string()))
    .collect()
}

/// Does any selector in a comma-separated list target `target`? A compound such as
/// `div#insta-clue` or a descendant `.case #insta-clue` counts; pseudo-classes do not.
pub fn selector_list_matches(selector_list: &str, target: &str) -> bool {
  let target = target.trim().to_lowercase();
  if target.is_empty() {
    return false;
  }
  selector_list.split(',').any(|sel| {
    sel
      .to_lowercase()
      .split(|c: char| c.is_whitespace() || matches!(c, '>' | '+' | '~'))
      .filter(|part| !part.is_empty())
      .any(|compound| compound_matches(compound, &target))
  })
}

fn compound_matches(compound: &str, target: &str) -> bool {
  if compound == target {
    return true;
  }
  // `div#x.y`: split on the next `#` or `.` and compare each simple selector.
  let mut simple = Vec::new();
  let mut current = String::new();
  for c in compound.chars() {
    if (c == '#' || c == '.') && !current.is_empty() {
      simple.push(std::mem::take(&mut current));
    }
    current.push(c);
  }
  if !current.is_empty() {
    simple.push(current);
  }
  simple.iter().any(|s| s == target)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn doc(html: &str, css: &str) -> Document {
    Document::new(html, css)
  }

  fn empty() -> Document {
    doc("", "")
  }

  #[test]
  fn selector_matching_handles_compounds_and_lists() {
    assert!(selector_list_matches("#insta-clue", "#insta-clue"));
    assert!(selector_list_matches("div#insta-clue", "#insta-clue"));
    assert!(selector_list_matches(".card, .case-file #insta-clue", "#insta-clue"));
    assert!(!selector_list_matches("#insta-clue-old", "#insta-clue"));
    assert!(!selector_list_matches("#insta-clue:hover", "#insta-clue"));
  }

  #[test]
  fn property_present_requires_selector_and_no_conflict() {
    let check = CheckKind::PropertyPresent {
      selector: Some("#insta-clue".into()),
      property: "display".into(),
      value: "block".into(),
      conflicting: vec!["display: none".into()],
    };
    assert!(evaluate(&check, &doc("", "#insta-clue { display: block; }"), &empty()).passed());
    assert!(!evaluate(&check, &doc("", ".other { display: block; }"), &empty()).passed());
    let both = doc("", "#insta-clue { display:none; display:block; }");
    assert_eq!(evaluate(&check, &both, &empty()), Verdict::Fail("`display: none` is still present".into()));
  }

  #[test]
  fn attribute_absent_derives_hidden_text_from_prior() {
    let prior = doc("<p class=\"w\" hidden>Red umbrella</p>", "");
    let check = CheckKind::AttributeAbsent { source: Source::Html, marker: "hidden".into(), revealed: vec![] };
    assert!(evaluate(&check, &doc("<p class=\"w\">Red umbrella</p>", ""), &prior).passed());
    assert!(!evaluate(&check, &doc("<p class=\"w\" hidden>Red umbrella</p>", ""), &prior).passed());
    // deleting the element along with the marker loses the clue
    assert!(!evaluate(&check, &doc("<p class=\"w\"></p>", ""), &prior).passed());
    // aria-hidden is a different attribute
    assert!(evaluate(&check, &doc("<p aria-hidden=\"false\">Red umbrella</p>", ""), &prior).passed());
  }

  #[test]
  fn css_marker_reveals_text_of_targeted_elements() {
    let prior = doc("<div class=\"vault-note\">Code 4815</div>", ".vault-note { display: none; }");
    let check = CheckKind::AttributeAbsent { source: Source::Css, marker: "display: none".into(), revealed: vec![] };
    assert!(evaluate(&check, &doc("<div class=\"vault-note\">Code 4815</div>", ".vault-note {}"), &prior).passed());
    assert!(!evaluate(&check, &doc("<div class=\"vault-note\"></div>", ".vault-note {}"), &prior).passed());
    assert!(!evaluate(&check, &doc("<div class=\"vault-note\">Code 4815</div>", ".vault-note{display:none}"), &prior).passed());
  }

  #[test]
  fn tag_replacement_rejects_mismatched_close() {
    let prior = doc("<center>Daily Chronicle</center>", "");
    let check = CheckKind::TagReplaced {
      deprecated: "center".into(),
      replacements: vec!["header".into(), "footer".into(), "div".into()],
      preserved: vec![],
    };
    assert!(evaluate(&check, &doc("<header>Daily Chronicle</header>", ""), &prior).passed());
    assert!(!evaluate(&check, &doc("<header>Daily Chronicle</footer>", ""), &prior).passed());
    assert!(!evaluate(&check, &doc("<header><h1>Daily Chronicle</h1></footer>", ""), &prior).passed());
    assert!(!evaluate(&check, &doc("<CENTER>Daily Chronicle</CENTER>", ""), &prior).passed());
    assert!(!evaluate(&check, &doc("<header>Weekly News</header>", ""), &prior).passed());
  }

  #[test]
  fn wrapped_text_may_be_regrouped_inside_the_replacement() {
    let prior = doc("<center class=\"masthead\"><h1>Daily Chronicle</h1><p>Editor missing since Tuesday</p></center>", "");
    let check = CheckKind::TagReplaced {
      deprecated: "center".into(),
      replacements: vec!["header".into()],
      preserved: vec![],
    };
    let html = "<header class=\"masthead\"><h1>Daily Chronicle</h1><p>Special edition</p><p>Editor missing since Tuesday</p></header>";
    assert!(evaluate(&check, &doc(html, ""), &prior).passed());
    let lost = "<header class=\"masthead\"><h1>Daily Chronicle</h1></header>";
    assert_eq!(
      evaluate(&check, &doc(lost, ""), &prior),
      Verdict::Fail("the text \"editor missing since tuesday\" was lost".into())
    );
  }

  #[test]
  fn self_closing_replacement_is_not_a_mismatch() {
    let check = CheckKind::TagReplaced {
      deprecated: "font".into(),
      replacements: vec!["span".into(), "p".into()],
      preserved: vec!["note".into()],
    };
    assert!(evaluate(&check, &doc("<p><span/>note</p>", ""), &empty()).passed());
    assert!(!evaluate(&check, &doc("<span>note</p>", ""), &empty()).passed());
  }

  #[test]
  fn void_elements_are_not_mismatches() {
    let check = CheckKind::TagReplaced {
      deprecated: "font".into(),
      replacements: vec!["span".into(), "p".into()],
      preserved: vec!["meet at midnight".into()],
    };
    let html = "<p>Note:<br>meet at <span>midnight</span></p>";
    assert!(evaluate(&check, &doc(html, ""), &empty()).passed());
  }

  #[test]
  fn style_any_of_accepts_longhands_and_selectors() {
    let check = CheckKind::StylePresentAnyOf { options: vec!["border".into(), ".alarm-active".into()] };
    assert!(evaluate(&check, &doc("", ".x { border-left: 1px solid red; }"), &empty()).passed());
    assert!(evaluate(&check, &doc("", ".alarm-active { opacity: 1 }"), &empty()).passed());
    assert!(!evaluate(&check, &doc("", ".x { color: red; }"), &empty()).passed());
    assert!(!evaluate(&check, &doc("", "/* .x { border: 1px } */"), &empty()).passed());
  }

  #[test]
  fn bare_tag_option_is_a_type_selector() {
    let check = CheckKind::StylePresentAnyOf { options: vec!["h1".into()] };
    assert!(evaluate(&check, &doc("", "h1 { letter-spacing: 2px; }"), &empty()).passed());
    assert!(evaluate(&check, &doc("", ".case h1.title { color: red; }"), &empty()).passed());
    assert!(!evaluate(&check, &doc("", ".h1 { color: red; }"), &empty()).passed());
    assert!(!evaluate(&check, &doc("", "h2 { color: red; }"), &empty()).passed());
  }

  #[test]
  fn malformed_markup_never_panics() {
    let junk = doc("<div <p hidden=>unterminated <!-- <center", "#a { display: ; } } {{ :");
    let prior = doc("<p hidden>x", "#a{display:none");
    for check in [
      CheckKind::AttributeAbsent { source: Source::Html, marker: "hidden".into(), revealed: vec![] },
      CheckKind::AttributeAbsent { source: Source::Css, marker: "display: none".into(), revealed: vec![] },
      CheckKind::PropertyPresent { selector: Some("#a".into()), property: "display".into(), value: "block".into(), conflicting: vec![] },
      CheckKind::TagReplaced { deprecated: "center".into(), replacements: vec!["div".into()], preserved: vec![] },
      CheckKind::StylePresentAnyOf { options: vec!["border".into()] },
    ] {
      let _ = evaluate(&check, &junk, &prior);
    }
  }
}
