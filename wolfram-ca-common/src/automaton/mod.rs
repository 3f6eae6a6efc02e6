use wolfram_ca_automaton::{ElementaryCellularAutomaton, Rule, Wrap};

use crate::init::InitPolicy;
use crate::{Error, Result};

/// Every generation of one run, oldest first. Row `y` is image row `y`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    rows: Vec<Vec<bool>>,
}

impl Grid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn row(&self, y: usize) -> Option<&[bool]> {
        self.rows.get(y).map(Vec::as_slice)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        self.row(y).and_then(|row| row.get(x).copied())
    }
}

/// Drives an [`ElementaryCellularAutomaton`] from an initial row and collects
/// the initial row plus `steps` successors into a [`Grid`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutomatonRenderer {
    automaton: ElementaryCellularAutomaton,
}

impl AutomatonRenderer {
    pub fn new(rule: Rule) -> Self {
        Self::with_wrap(rule, Wrap::Wrap)
    }

    pub fn with_wrap(rule: Rule, wrap: Wrap) -> Self {
        Self {
            automaton: ElementaryCellularAutomaton::new(wrap, rule),
        }
    }

    pub fn rule(&self) -> Rule {
        self.automaton.rule
    }

    #[tracing::instrument(skip(self, policy), fields(rule = %self.rule(), start = %policy.start_type()))]
    pub fn render(&self, cells: usize, steps: usize, policy: &InitPolicy) -> Result<Grid> {
        check_steps(steps)?;
        let initial = policy.initial_row(cells)?;
        self.render_from(initial, steps)
    }

    pub fn render_from(&self, initial: Vec<bool>, steps: usize) -> Result<Grid> {
        check_steps(steps)?;
        if initial.is_empty() {
            return Err(Error::invalid_argument("row must contain at least one cell"));
        }

        let height = steps
            .checked_add(1)
            .ok_or_else(|| Error::invalid_argument(format!("step count {steps} is too large")))?;

        let width = initial.len();
        let mut rows = Vec::with_capacity(height);
        let mut current = initial;
        for _ in 0..steps {
            let next = self.automaton.step(&current)?;
            rows.push(std::mem::replace(&mut current, next));
        }
        rows.push(current);

        tracing::debug!(rule = %self.rule(), width, height = rows.len(), "rendered grid");
        Ok(Grid { width, rows })
    }
}

fn check_steps(steps: usize) -> Result<()> {
    if steps == 0 {
        return Err(Error::invalid_argument("step count must be at least 1"));
    }
    Ok(())
}
