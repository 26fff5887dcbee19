//! CodeCase Detective Academy · mission validator
//!
//! Learners repair broken HTML/CSS to crack a case. This crate scores a submission
//! against a mission's success conditions (`validator`), keeps the case catalog
//! (`state`, `seeds`, `config`) and exposes both over HTTP + WebSocket (`routes`).

pub mod checks;
pub mod conditions;
pub mod config;
pub mod domain;
pub mod error;
pub mod logic;
pub mod protocol;
pub mod routes;
pub mod seeds;
pub mod state;
pub mod telemetry;
pub mod util;
pub mod validator;
