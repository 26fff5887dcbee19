//! Application state: the immutable case catalog shared by every handler.
//!
//! The catalog is built once at startup from the optional TOML casebook plus the
//! built-in seed cases, then only read. Casebook entries win over seeds with the same id.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::config::{load_casebook, Casebook, Settings};
use crate::domain::{Case, Mission, DEFAULT_POINTS};
use crate::error::CatalogError;
use crate::seeds::seed_cases;

#[derive(Debug, Default)]
pub struct Catalog {
    cases: Vec<Case>,
    by_case_id: HashMap<String, usize>,
    /// mission id -> (case index, mission index)
    by_mission_id: HashMap<String, (usize, usize)>,
}

impl Catalog {
    /// Build from casebook cases (if any) followed by the seeds.
    #[instrument(level = "info", skip_all)]
    pub fn build(casebook: Option<&Casebook>) -> Self {
        let mut catalog = Catalog::default();

        if let Some(book) = casebook {
            for cfg in &book.cases {
                catalog.insert(cfg.compile(book.scoring.default_points));
            }
        }
        for cfg in seed_cases() {
            catalog.insert(cfg.compile(DEFAULT_POINTS));
        }

        // Inventory summary by difficulty.
        let mut by_difficulty: HashMap<&str, (usize, usize)> = HashMap::new();
        for case in &catalog.cases {
            let label = if case.difficulty.is_empty() { "unrated" } else { case.difficulty.as_str() };
            let entry = by_difficulty.entry(label).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += case.missions.len();
        }
        for (difficulty, (cases, missions)) in by_difficulty {
            info!(target: "catalog", %difficulty, cases, missions, "Startup case inventory");
        }
        catalog
    }

    /// Insert a case unless its id is taken. Missions whose id is already owned by
    /// another case are dropped from the incoming case.
    fn insert(&mut self, mut case: Case) {
        if self.by_case_id.contains_key(&case.id) {
            info!(target: "catalog", case = %case.id, "Case id already present; keeping the first definition");
            return;
        }
        let case_idx = self.cases.len();
        let mut kept = Vec::with_capacity(case.missions.len());
        for mission in case.missions.drain(..) {
            if let Some(&(owner, _)) = self.by_mission_id.get(&mission.id) {
                let err = CatalogError::DuplicateMission {
                    mission_id: mission.id.clone(),
                    owner: self.cases[owner].id.clone(),
                };
                error!(target: "catalog", case = %case.id, error = %err, "Skipping mission.");
                continue;
            }
            if kept.iter().any(|m: &Mission| m.id == mission.id) {
                let err = CatalogError::DuplicateMission { mission_id: mission.id.clone(), owner: case.id.clone() };
                error!(target: "catalog", case = %case.id, error = %err, "Skipping mission.");
                continue;
            }
            self.by_mission_id.insert(mission.id.clone(), (case_idx, kept.len()));
            kept.push(mission);
        }
        case.missions = kept;
        self.by_case_id.insert(case.id.clone(), case_idx);
        self.cases.push(case);
    }

    pub fn list_cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn get_case(&self, id: &str) -> Option<&Case> {
        self.by_case_id.get(id).map(|&i| &self.cases[i])
    }

    /// A mission id wins; a case id resolves to that case's first mission.
    pub fn resolve_mission(&self, identifier: &str) -> Option<(&Case, &Mission)> {
        if let Some(&(c, m)) = self.by_mission_id.get(identifier) {
            let case = &self.cases[c];
            return Some((case, &case.missions[m]));
        }
        let case = self.get_case(identifier)?;
        case.missions.first().map(|m| (case, m))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Build state from settings: load the casebook, compile it with the seeds.
    #[instrument(level = "info", skip_all)]
    pub fn new(settings: &Settings) -> Self {
        let casebook = load_casebook(settings);
        Self::from_catalog(Catalog::build(casebook.as_ref()))
    }

    pub fn from_catalog(catalog: Catalog) -> Self {
        Self { catalog: Arc::new(catalog) }
    }
}
