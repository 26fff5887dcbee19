//! Compiling free-text success conditions into `CheckKind`s.
//!
//! Keyword rules, first match wins:
//!   1. "change <prop>: <a> to <prop>: <b> [on <selector>]"   -> PropertyPresent, conflicting `<prop>: <a>`
//!   2. mention of a deprecated tag (`<center>`, "font tags")   -> TagReplaced
//!   3. "remove/delete ... <marker>", "unhide", "reveal hidden" -> AttributeAbsent
//!   4. any other "<prop>: <value> [on|to <selector>]"          -> PropertyPresent
//!   5. styling vocabulary (border, animation, stand out, ...)  -> StylePresentAnyOf
//!
//! Anything else is rejected at load time so that every served mission is checkable.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::domain::{CheckKind, Source, SuccessCondition};
use crate::error::CatalogError;

const DEPRECATED_TAGS: &[&str] = &["center", "font", "marquee", "blink", "big", "strike", "tt", "acronym"];

/// Tags a learner may name as the modern replacement ("with a header").
const KNOWN_TAGS: &[&str] = &[
  "div", "span", "header", "footer", "section", "main", "article", "nav", "aside", "p", "strong", "em",
  "mark", "del", "code", "kbd", "samp", "abbr", "h1", "h2", "h3", "h4", "h5", "h6", "figure",
];

/// Properties recognized when a styling condition names what it wants.
const STYLE_VOCABULARY: &[&str] = &[
  "border", "animation", "background", "box-shadow", "text-shadow", "outline", "transform", "transition",
  "color", "font-weight", "text-decoration",
];

/// Accepted when a styling condition is vague ("make it stand out").
const DEFAULT_STYLE_OPTIONS: &[&str] = &[
  "border", "animation", "background", "box-shadow", "text-shadow", "outline", "transform",
];

fn default_replacements(deprecated: &str) -> Vec<String> {
  let tags: &[&str] = match deprecated {
    "center" => &[
      "div", "header", "footer", "section", "main", "article", "nav", "p", "h1", "h2", "h3", "h4", "h5", "h6",
    ],
    "font" => &["span", "p", "strong", "em", "mark"],
    "marquee" | "blink" => &["div", "span", "p"],
    "big" => &["span", "strong", "h1", "h2", "h3"],
    "strike" => &["del", "s"],
    "tt" => &["code", "kbd", "samp"],
    "acronym" => &["abbr"],
    _ => &["div", "span"],
  };
  tags.iter().map(|t| t.to_string()).collect()
}

/// Words that mark a "label: prose" sentence rather than a CSS value.
const PROSE_WORDS: &[&str] = &[
  "a", "an", "the", "so", "and", "or", "but", "it", "its", "this", "that", "add", "make", "use", "set", "with",
  "is", "are", "be", "should", "must", "then", "your", "you", "of", "from", "out",
];

/// Longest value accepted from a bare declaration (`0 0 4px gold`).
const MAX_VALUE_TOKENS: usize = 4;

fn change_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(
      r"(?i)\b(?:change|switch|turn)\s+(?:the\s+)?([a-z][a-z-]*)\s*:\s*([a-z0-9#%.()-]+)\s+(?:to|into)\s+(?:([a-z][a-z-]*)\s*:\s*)?([a-z0-9#%.()-]+)(?:\s+(?:on|for|in)\s+(?:the\s+)?([#.][a-z0-9_-]+))?",
    )
    .expect("valid regex")
  })
}

fn tag_mention_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)<\s*/?\s*([a-z][a-z0-9]*)\s*/?>|\b([a-z][a-z0-9]*)\s+(?:tags?|elements?)\b").expect("valid regex"))
}

fn word_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)\b[a-z][a-z0-9]*\b").expect("valid regex"))
}

fn remove_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(
      r#"(?i)\b(?:remove|delete|drop|get\s+rid\s+of|take\s+out)\s+(?:the\s+|all\s+|any\s+)?["'`]?([a-z][a-z-]*(?:\s*:\s*[a-z0-9#%.()-]+)?)["'`]?"#,
    )
    .expect("valid regex")
  })
}

fn declaration_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(
      r"(?i)\b([a-z][a-z-]*)\s*:\s*([a-z0-9#%().\s-]+?)(?:\s*;|\s+(?:on|to|for|in)\s+(?:the\s+)?([#.][a-z0-9_-]+)|\s+(?:on|to|for|in)\b|[,.]?\s*$)",
    )
    .expect("valid regex")
  })
}

/// Infer the check a condition text asks for.
pub fn infer_check(text: &str) -> Result<CheckKind, CatalogError> {
  let lower = text.to_lowercase();
  let check = infer_change(&lower)
    .or_else(|| infer_tag_replacement(&lower))
    .or_else(|| infer_removal(&lower))
    .or_else(|| infer_declaration(&lower))
    .or_else(|| infer_styling(&lower))
    .ok_or_else(|| CatalogError::UninferableCondition { text: text.to_string() })?;
  debug!(target: "catalog", condition = %text, ?check, "Inferred check");
  Ok(check)
}

/// Compile one condition: explicit binding wins, otherwise inference from the text.
pub fn compile_condition(
  text: &str,
  points: Option<u32>,
  check: Option<&CheckKind>,
  default_points: u32,
) -> Result<SuccessCondition, CatalogError> {
  let check = match check {
    Some(c) => c.clone(),
    None => infer_check(text)?,
  };
  Ok(SuccessCondition { text: text.trim().to_string(), points: points.unwrap_or(default_points), check })
}

fn infer_change(lower: &str) -> Option<CheckKind> {
  let cap = change_re().captures(lower)?;
  let from_prop = cap[1].to_string();
  let from_value = cap[2].trim_end_matches('.').to_string();
  let property = cap.get(3).map_or(from_prop.clone(), |m| m.as_str().to_string());
  let value = cap[4].trim_end_matches('.').to_string();
  Some(CheckKind::PropertyPresent {
    selector: cap.get(5).map(|m| m.as_str().to_string()),
    property,
    value,
    conflicting: vec![format!("{}: {}", from_prop, from_value)],
  })
}

fn infer_tag_replacement(lower: &str) -> Option<CheckKind> {
  let mentioned: Vec<(usize, String)> = tag_mention_re()
    .captures_iter(lower)
    .filter_map(|cap| {
      let m = cap.get(1).or_else(|| cap.get(2))?;
      Some((m.start(), m.as_str().to_string()))
    })
    .collect();
  let (at, deprecated) = mentioned
    .iter()
    .find(|(_, tag)| DEPRECATED_TAGS.contains(&tag.as_str()))
    .cloned()?;

  // Replacements are the known tags named after the deprecated one, in order.
  let mut replacements: Vec<String> = Vec::new();
  for word in word_re().find_iter(&lower[at + deprecated.len()..]) {
    let w = word.as_str();
    if KNOWN_TAGS.contains(&w) && !replacements.iter().any(|r| r == w) {
      replacements.push(w.to_string());
    }
  }
  if replacements.is_empty() {
    replacements = default_replacements(&deprecated);
  }
  Some(CheckKind::TagReplaced { deprecated, replacements, preserved: Vec::new() })
}

fn infer_removal(lower: &str) -> Option<CheckKind> {
  if let Some(cap) = remove_re().captures(lower) {
    let marker = cap[1].trim().trim_end_matches('.').to_string();
    let is_declaration = marker.contains(':');
    let inline = lower.contains("inline") || lower.contains("style attribute");
    let source = if is_declaration && !inline { Source::Css } else { Source::Html };
    return Some(CheckKind::AttributeAbsent { source, marker, revealed: Vec::new() });
  }
  let reveals = ["unhide", "reveal", "show"].iter().any(|w| lower.contains(w));
  if reveals && lower.contains("hidden") {
    return Some(CheckKind::AttributeAbsent { source: Source::Html, marker: "hidden".into(), revealed: Vec::new() });
  }
  None
}

fn infer_declaration(lower: &str) -> Option<CheckKind> {
  declaration_re().captures_iter(lower).find_map(|cap| {
    let value = cap[2].trim().to_string();
    if !looks_like_css_value(&value) {
      return None;
    }
    Some(CheckKind::PropertyPresent {
      selector: cap.get(3).map(|m| m.as_str().to_string()),
      property: cap[1].to_string(),
      value,
      conflicting: Vec::new(),
    })
  })
}

/// "Tip: add a border so it stands out" has a colon but no declaration.
fn looks_like_css_value(value: &str) -> bool {
  let tokens: Vec<&str> = value.split_whitespace().collect();
  !tokens.is_empty() && tokens.len() <= MAX_VALUE_TOKENS && !tokens.iter().any(|t| PROSE_WORDS.contains(t))
}

fn infer_styling(lower: &str) -> Option<CheckKind> {
  let mut options: Vec<String> = Vec::new();
  for prop in STYLE_VOCABULARY {
    if lower.contains(prop) && !options.iter().any(|o| prop.contains(o.as_str())) {
      options.push(prop.to_string());
    }
  }
  if lower.contains("shadow") && !options.iter().any(|o| o.ends_with("shadow")) {
    options.extend(["box-shadow".to_string(), "text-shadow".to_string()]);
  }
  if lower.contains("animate") && !options.iter().any(|o| o == "animation") {
    options.push("animation".into());
  }
  if !options.is_empty() {
    return Some(CheckKind::StylePresentAnyOf { options });
  }

  let vague = ["stand out", "highlight", "style", "glow", "emphasi", "eye-catching", "noticeable"];
  if vague.iter().any(|w| lower.contains(w)) {
    return Some(CheckKind::StylePresentAnyOf {
      options: DEFAULT_STYLE_OPTIONS.iter().map(|s| s.to_string()).collect(),
    });
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn change_phrase_becomes_property_with_conflict() {
    let check = infer_check("Change display: none to display: block on #insta-clue element").unwrap();
    assert_eq!(
      check,
      CheckKind::PropertyPresent {
        selector: Some("#insta-clue".into()),
        property: "display".into(),
        value: "block".into(),
        conflicting: vec!["display: none".into()],
      }
    );
  }

  #[test]
  fn deprecated_tag_mentions_become_tag_replacement() {
    match infer_check("Replace the deprecated <center> tag with a <header> element").unwrap() {
      CheckKind::TagReplaced { deprecated, replacements, .. } => {
        assert_eq!(deprecated, "center");
        assert_eq!(replacements, vec!["header".to_string()]);
      }
      other => panic!("unexpected {:?}", other),
    }
    match infer_check("Get rid of the font tags").unwrap() {
      CheckKind::TagReplaced { deprecated, replacements, .. } => {
        assert_eq!(deprecated, "font");
        assert!(replacements.contains(&"span".to_string()));
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn removal_phrases_pick_source_from_marker_shape() {
    assert_eq!(
      infer_check("Remove the hidden attribute from the witness statement").unwrap(),
      CheckKind::AttributeAbsent { source: Source::Html, marker: "hidden".into(), revealed: vec![] }
    );
    assert_eq!(
      infer_check("Remove display: none from the .vault-note rule").unwrap(),
      CheckKind::AttributeAbsent { source: Source::Css, marker: "display: none".into(), revealed: vec![] }
    );
    assert_eq!(
      infer_check("Reveal the hidden message").unwrap(),
      CheckKind::AttributeAbsent { source: Source::Html, marker: "hidden".into(), revealed: vec![] }
    );
  }

  #[test]
  fn bare_declarations_become_property_present() {
    assert_eq!(
      infer_check("Set text-align: center on .masthead").unwrap(),
      CheckKind::PropertyPresent {
        selector: Some(".masthead".into()),
        property: "text-align".into(),
        value: "center".into(),
        conflicting: vec![],
      }
    );
    assert_eq!(
      infer_check("Add color: red to .warning").unwrap(),
      CheckKind::PropertyPresent {
        selector: Some(".warning".into()),
        property: "color".into(),
        value: "red".into(),
        conflicting: vec![],
      }
    );
    assert_eq!(
      infer_check("Use font-size: 1.5em.").unwrap(),
      CheckKind::PropertyPresent { selector: None, property: "font-size".into(), value: "1.5em".into(), conflicting: vec![] }
    );
  }

  #[test]
  fn labelled_prose_is_not_a_declaration() {
    assert_eq!(
      infer_check("Tip: add a border so the note stands out").unwrap(),
      CheckKind::StylePresentAnyOf { options: vec!["border".into()] }
    );
    assert!(matches!(
      infer_check("Note: solve the mystery before midnight"),
      Err(CatalogError::UninferableCondition { .. })
    ));
    assert_eq!(
      infer_check("Bonus: give .alarm box-shadow: 0 0 8px red").unwrap(),
      CheckKind::PropertyPresent { selector: None, property: "box-shadow".into(), value: "0 0 8px red".into(), conflicting: vec![] }
    );
  }

  #[test]
  fn styling_phrases_collect_named_properties_or_defaults() {
    assert_eq!(
      infer_check("Add a border to make the witness statement stand out").unwrap(),
      CheckKind::StylePresentAnyOf { options: vec!["border".into()] }
    );
    match infer_check("Make the evidence board stand out").unwrap() {
      CheckKind::StylePresentAnyOf { options } => assert!(options.len() > 3),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn unrecognized_text_is_rejected() {
    assert!(matches!(
      infer_check("Solve the mystery"),
      Err(CatalogError::UninferableCondition { .. })
    ));
  }

  #[test]
  fn explicit_binding_and_points_override_inference() {
    let bound = CheckKind::StylePresentAnyOf { options: vec![".alarm-active".into()] };
    let c = compile_condition("Make the alarm flash", Some(25), Some(&bound), 10).unwrap();
    assert_eq!(c.points, 25);
    assert_eq!(c.check, bound);
    let c = compile_condition("Add a border", None, None, 10).unwrap();
    assert_eq!(c.points, 10);
  }
}
