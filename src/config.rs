//! Runtime settings from the environment and the optional TOML casebook.
//!
//! Casebook schema (all sections optional):
//!
//! ```toml
//! [scoring]
//! default_points = 10
//!
//! [[cases]]
//! id = "the-vanishing-influencer"
//! title = "The Vanishing Influencer"
//! difficulty = "rookie"
//! narrative = "..."
//!
//! [[cases.missions]]
//! id = "insta-clue"
//! title = "The Last Post"
//! starter_html = "<p id=\"insta-clue\">...</p>"
//! starter_css = "#insta-clue { display: none; }"
//! conditions = [
//!   "Change display: none to display: block on #insta-clue element",
//!   { text = "Make the clue glow", points = 5, check = { kind = "style_present_any_of", options = ["box-shadow"] } },
//! ]
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::conditions::compile_condition;
use crate::domain::{Case, CheckKind, Mission, DEFAULT_POINTS};
use crate::error::CatalogError;

/// Process-level settings read from environment variables.
#[derive(Clone, Debug)]
pub struct Settings {
  pub port: u16,
  pub static_dir: String,
  pub casebook_path: Option<String>,
}

impl Settings {
  pub fn from_env() -> Self {
    let port = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()).unwrap_or(3000);
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());
    let casebook_path = std::env::var("CASEBOOK_PATH").ok().filter(|p| !p.trim().is_empty());
    Self { port, static_dir, casebook_path }
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct Casebook {
  #[serde(default)]
  pub scoring: Scoring,
  #[serde(default)]
  pub cases: Vec<CaseCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Scoring {
  #[serde(default = "default_points")]
  pub default_points: u32,
}

impl Default for Scoring {
  fn default() -> Self {
    Self { default_points: DEFAULT_POINTS }
  }
}

fn default_points() -> u32 {
  DEFAULT_POINTS
}

/// Case entry accepted in the casebook. A missing id gets a UUID at load time.
#[derive(Clone, Debug, Deserialize)]
pub struct CaseCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub difficulty: String,
  #[serde(default)] pub narrative: String,
  #[serde(default)] pub missions: Vec<MissionCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MissionCfg {
  /// Defaults to `<case id>-<position>`.
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub briefing: String,
  #[serde(default)] pub starter_html: String,
  #[serde(default)] pub starter_css: String,
  #[serde(default)] pub conditions: Vec<ConditionCfg>,
}

/// A condition is either plain text (check inferred) or a table with an explicit binding.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ConditionCfg {
  Text(String),
  Detailed {
    text: String,
    #[serde(default)] points: Option<u32>,
    #[serde(default)] check: Option<CheckKind>,
  },
}

impl MissionCfg {
  pub fn compile(&self, case_id: &str, position: usize, default_points: u32) -> Result<Mission, CatalogError> {
    let id = self.id.clone().unwrap_or_else(|| format!("{}-{}", case_id, position + 1));
    if self.conditions.is_empty() {
      return Err(CatalogError::EmptyMission { mission_id: id });
    }
    let conditions = self
      .conditions
      .iter()
      .map(|c| match c {
        ConditionCfg::Text(text) => compile_condition(text, None, None, default_points),
        ConditionCfg::Detailed { text, points, check } => {
          compile_condition(text, *points, check.as_ref(), default_points)
        }
      })
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Mission {
      id,
      title: self.title.clone(),
      briefing: self.briefing.clone(),
      starter_html: self.starter_html.clone(),
      starter_css: self.starter_css.clone(),
      conditions,
    })
  }
}

impl CaseCfg {
  /// Compile every mission; a mission that fails to compile is logged and left out.
  pub fn compile(&self, default_points: u32) -> Case {
    let id = self.id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut missions = Vec::with_capacity(self.missions.len());
    for (pos, m) in self.missions.iter().enumerate() {
      match m.compile(&id, pos, default_points) {
        Ok(mission) => missions.push(mission),
        Err(e) => error!(target: "catalog", case = %id, mission = %m.title, error = %e, "Skipping mission."),
      }
    }
    Case {
      id,
      title: self.title.clone(),
      difficulty: self.difficulty.clone(),
      narrative: self.narrative.clone(),
      missions,
    }
  }
}

pub fn parse_casebook(source: &str, path: &str) -> Result<Casebook, CatalogError> {
  toml::from_str::<Casebook>(source).map_err(|e| CatalogError::Parse { path: path.to_string(), source: e })
}

pub fn read_casebook(path: &str) -> Result<Casebook, CatalogError> {
  let s = std::fs::read_to_string(path).map_err(|e| CatalogError::Read { path: path.to_string(), source: e })?;
  parse_casebook(&s, path)
}

/// Load the casebook named by CASEBOOK_PATH. On any IO/parse error, returns None.
pub fn load_casebook(settings: &Settings) -> Option<Casebook> {
  let path = settings.casebook_path.as_deref()?;
  match read_casebook(path) {
    Ok(cb) => {
      info!(target: "codecase_backend", %path, cases = cb.cases.len(), "Loaded casebook (TOML)");
      Some(cb)
    }
    Err(e) => {
      error!(target: "codecase_backend", %path, error = %e, "Failed to load casebook; serving built-in cases only");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Source;

  const BOOK: &str = r##"
[scoring]
default_points = 20

[[cases]]
id = "harbor"
title = "The Harbor Lights"

[[cases.missions]]
title = "Signal lamp"
starter_html = '<p class="lamp" hidden>Ship at pier 9</p>'
conditions = [
  "Remove the hidden attribute from the lamp",
  { text = "Make the lamp glow", points = 5, check = { kind = "style_present_any_of", options = ["box-shadow", ".lamp-on"] } },
]

[[cases.missions]]
id = "broken"
title = "Unreadable note"
conditions = ["Solve it somehow"]
"##;

  #[test]
  fn parses_plain_and_detailed_conditions() {
    let book = parse_casebook(BOOK, "inline").unwrap();
    assert_eq!(book.scoring.default_points, 20);
    let case = book.cases[0].compile(book.scoring.default_points);
    assert_eq!(case.id, "harbor");
    // the uninferable mission is dropped, the good one keeps a positional id
    assert_eq!(case.missions.len(), 1);
    let m = &case.missions[0];
    assert_eq!(m.id, "harbor-1");
    assert_eq!(m.conditions[0].points, 20);
    assert_eq!(
      m.conditions[0].check,
      CheckKind::AttributeAbsent { source: Source::Html, marker: "hidden".into(), revealed: vec![] }
    );
    assert_eq!(m.conditions[1].points, 5);
    assert_eq!(m.max_score(), 25);
  }

  #[test]
  fn empty_casebook_uses_defaults() {
    let book = parse_casebook("", "inline").unwrap();
    assert!(book.cases.is_empty());
    assert_eq!(book.scoring.default_points, DEFAULT_POINTS);
  }

  #[test]
  fn bad_toml_is_a_parse_error() {
    assert!(matches!(parse_casebook("[[cases]]\ntitle = ", "x.toml"), Err(CatalogError::Parse { .. })));
  }

  #[test]
  fn mission_without_conditions_is_rejected() {
    let m = MissionCfg {
      id: Some("m".into()),
      title: "t".into(),
      briefing: String::new(),
      starter_html: String::new(),
      starter_css: String::new(),
      conditions: vec![],
    };
    assert!(matches!(m.compile("c", 0, 10), Err(CatalogError::EmptyMission { .. })));
  }

  #[test]
  fn missing_case_id_gets_a_uuid() {
    let cfg = CaseCfg { id: None, title: "x".into(), difficulty: String::new(), narrative: String::new(), missions: vec![] };
    let case = cfg.compile(10);
    assert!(uuid::Uuid::parse_str(&case.id).is_ok());
  }
}
