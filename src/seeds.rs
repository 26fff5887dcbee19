//! Built-in cases that guarantee the academy is playable without a casebook.

use crate::config::{CaseCfg, ConditionCfg, MissionCfg};
use crate::domain::CheckKind;

fn text(s: &str) -> ConditionCfg {
  ConditionCfg::Text(s.into())
}

fn mission(id: &str, title: &str, briefing: &str, html: &str, css: &str, conditions: Vec<ConditionCfg>) -> MissionCfg {
  MissionCfg {
    id: Some(id.into()),
    title: title.into(),
    briefing: briefing.into(),
    starter_html: html.into(),
    starter_css: css.into(),
    conditions,
  }
}

/// Seed cases in the casebook shape, compiled through the same path as TOML entries.
pub fn seed_cases() -> Vec<CaseCfg> {
  vec![
    CaseCfg {
      id: Some("the-vanishing-influencer".into()),
      title: "The Vanishing Influencer".into(),
      difficulty: "rookie".into(),
      narrative: "A lifestyle influencer went quiet three days ago. Her last post was scrubbed from the page, \
                  but the markup still remembers."
        .into(),
      missions: vec![
        mission(
          "insta-clue",
          "The Last Post",
          "Someone hid the final post with CSS. Bring it back into view.",
          "<div class=\"case-file\">\n  <h2>Last known post</h2>\n  <p id=\"insta-clue\">Posted from the old lighthouse at 21:40</p>\n</div>",
          ".case-file { font-family: Georgia, serif; }\n#insta-clue { display: none; color: #333; }",
          vec![text("Change display: none to display: block on #insta-clue element")],
        ),
        mission(
          "hidden-witness",
          "The Silent Witness",
          "A witness statement was marked hidden before the page went live.",
          "<section class=\"statements\">\n  <p class=\"witness\" hidden>The witness saw a red umbrella near the pier</p>\n</section>",
          ".statements { padding: 1rem; }",
          vec![
            text("Remove the hidden attribute from the witness statement"),
            text("Add a border to make the witness statement stand out"),
          ],
        ),
      ],
    },
    CaseCfg {
      id: Some("the-forgotten-newsroom".into()),
      title: "The Forgotten Newsroom".into(),
      difficulty: "detective".into(),
      narrative: "The Daily Chronicle's website has not been touched since 1999. The editor is missing and the \
                  front page is full of tags nobody uses anymore."
        .into(),
      missions: vec![
        mission(
          "center-of-attention",
          "Center of Attention",
          "Modernize the masthead without losing a word of it.",
          "<center>\n  <h1>Daily Chronicle</h1>\n  <p>Editor missing since Tuesday</p>\n</center>",
          "h1 { font-size: 2rem; }",
          vec![
            text("Replace the deprecated <center> tag with a <header> element"),
            text("Set text-align: center on .masthead"),
          ],
        ),
        mission(
          "font-of-lies",
          "The Font of Lies",
          "The ransom note still uses <font>. Rewrite it with modern markup and CSS.",
          "<p>The ransom note says <font color=\"red\">meet at midnight</font>.</p>",
          "p { line-height: 1.4; }",
          vec![
            text("Replace <font> tags with <span>"),
            ConditionCfg::Detailed {
              text: "Add color: red to .warning".into(),
              points: Some(5),
              check: None,
            },
          ],
        ),
      ],
    },
    CaseCfg {
      id: Some("the-museum-heist".into()),
      title: "The Museum Heist".into(),
      difficulty: "inspector".into(),
      narrative: "The vault was opened without a sound. The security dashboard knows the code, \
                  but someone switched off its alarms."
        .into(),
      missions: vec![mission(
        "lights-on",
        "Lights On",
        "Reveal the vault note and make the alarm panel impossible to miss.",
        "<div class=\"vault-note\">Vault code: 4-8-15-16</div>\n<div class=\"alarm\">ALARM</div>",
        ".vault-note { display: none; }\n.alarm { background: #222; color: #eee; }",
        vec![
          text("Remove display: none from the .vault-note rule"),
          ConditionCfg::Detailed {
            text: "Make the alarm panel flash or glow".into(),
            points: Some(20),
            check: Some(CheckKind::StylePresentAnyOf {
              options: vec!["animation".into(), "box-shadow".into(), ".alarm-active".into()],
            }),
          },
        ],
      )],
    },
  ]
}
