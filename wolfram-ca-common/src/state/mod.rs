use serde::{Deserialize, Serialize};
use wolfram_ca_automaton::Rule;

use crate::automaton::{AutomatonRenderer, Grid};
use crate::config::Limits;
use crate::init::{InitPolicy, Pattern, Seed, StartType};
use crate::Result;

/// One render request, before the rule has been checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    pub rule: i64,
    pub cells: usize,
    pub steps: usize,
    pub initial: Option<Pattern>,
    pub seed: Seed,
    pub start: StartType,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            rule: 110,
            cells: 200,
            steps: 200,
            initial: None,
            seed: Seed::ENTROPY,
            start: StartType::Random,
        }
    }
}

impl RenderParams {
    pub fn clamp(self, limits: &Limits) -> Self {
        Self {
            cells: limits.clamp_cells(self.cells),
            steps: limits.clamp_steps(self.steps),
            ..self
        }
    }

    pub fn rule(&self) -> Result<Rule> {
        Ok(Rule::try_from(self.rule)?)
    }

    pub fn init_policy(&self) -> InitPolicy {
        InitPolicy::from_start(self.start, self.initial.clone(), self.seed)
    }

    pub fn render(&self) -> Result<Grid> {
        AutomatonRenderer::new(self.rule()?).render(self.cells, self.steps, &self.init_policy())
    }

    /// Query string that reproduces these parameters.
    pub fn to_query(&self) -> String {
        format!(
            "cells={}&steps={}&rule={}&seed={}&initial={}&start_type={}",
            self.cells,
            self.steps,
            self.rule,
            self.seed,
            self.initial.as_ref().map_or("", Pattern::as_str),
            self.start,
        )
    }
}
