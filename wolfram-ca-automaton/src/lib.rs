use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

pub type Result<T> = core::result::Result<T, AutomatonError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AutomatonError {
    /// A rule, row or policy that the engine refuses to work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl AutomatonError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Wolfram code of an elementary automaton. Bit `n` is the next state of a
/// cell whose `(left, center, right)` neighborhood reads as `n` in binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rule(u8);

impl Rule {
    pub const NEIGHBORHOODS: u8 = 8;

    pub fn new(rule: u8) -> Self {
        Self(rule)
    }

    pub fn inner(&self) -> u8 {
        self.0
    }

    pub fn output(&self, neighborhood: u8) -> bool {
        (self.0 >> (neighborhood & 0b111)) & 1 == 1
    }

    /// `(neighborhood, next state)` for every neighborhood, ascending.
    pub fn transitions(self) -> impl Iterator<Item = (u8, bool)> {
        (0..Self::NEIGHBORHOODS).map(move |neighborhood| (neighborhood, self.output(neighborhood)))
    }

    pub fn describe(self) -> RuleDescription {
        RuleDescription(self)
    }
}

impl TryFrom<i64> for Rule {
    type Error = AutomatonError;

    fn try_from(rule: i64) -> Result<Self> {
        u8::try_from(rule).map(Self).map_err(|_| {
            AutomatonError::invalid_argument(format!("rule must be in 0..=255, got {rule}"))
        })
    }
}

impl From<Rule> for u8 {
    fn from(rule: Rule) -> Self {
        rule.0
    }
}

impl FromStr for Rule {
    type Err = AutomatonError;

    fn from_str(s: &str) -> Result<Self> {
        let rule: i64 = s
            .trim()
            .parse()
            .map_err(|_| AutomatonError::invalid_argument(format!("rule is not an integer: {s:?}")))?;
        Self::try_from(rule)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human readable transition table, e.g. `Rule 4 maps 000 to 0, ..., and 111 to 0.`
#[derive(Clone, Copy, Debug)]
pub struct RuleDescription(Rule);

impl fmt::Display for RuleDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule {} maps ", self.0)?;
        for (neighborhood, output) in self.0.transitions() {
            if neighborhood != 0 {
                f.write_str(", ")?;
            }
            if neighborhood == Rule::NEIGHBORHOODS - 1 {
                f.write_str("and ")?;
            }
            write!(f, "{:03b} to {}", neighborhood, output as u8)?;
        }
        f.write_str(".")
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementaryCellularAutomaton {
    pub wrap: Wrap,
    pub rule: Rule,
}

impl ElementaryCellularAutomaton {
    pub fn new(wrapping: Wrap, rule: Rule) -> Self {
        Self {
            wrap: wrapping,
            rule,
        }
    }

    pub fn next(&self, state: &[bool], next_state: &mut [bool]) -> Result<()> {
        if state.is_empty() {
            return Err(AutomatonError::invalid_argument(
                "row must contain at least one cell",
            ));
        }
        if state.len() != next_state.len() {
            return Err(AutomatonError::invalid_argument(format!(
                "next row has {} cells, expected {}",
                next_state.len(),
                state.len()
            )));
        }

        for (i, next) in next_state.iter_mut().enumerate() {
            let left = self.wrap.left(state, i);
            let center = state[i];
            let right = self.wrap.right(state, i);

            *next = self.rule.output(neighborhood(left, center, right));
        }

        Ok(())
    }

    pub fn step(&self, state: &[bool]) -> Result<Vec<bool>> {
        let mut next_state = vec![false; state.len()];
        self.next(state, &mut next_state)?;
        Ok(next_state)
    }
}

/// Next generation of `current` under `rule` with a circular boundary.
pub fn next_row(rule: Rule, current: &[bool]) -> Result<Vec<bool>> {
    ElementaryCellularAutomaton::new(Wrap::Wrap, rule).step(current)
}

fn neighborhood(left: bool, center: bool, right: bool) -> u8 {
    (left as u8) << 2 | (center as u8) << 1 | right as u8
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Wrap {
    #[default]
    Wrap,
    Zero,
    One,
}

impl Wrap {
    fn left(&self, state: &[bool], i: usize) -> bool {
        if i > 0 {
            return state[i - 1];
        }
        match self {
            Wrap::Wrap => state[state.len() - 1],
            Wrap::Zero => false,
            Wrap::One => true,
        }
    }

    fn right(&self, state: &[bool], i: usize) -> bool {
        if i < state.len() - 1 {
            return state[i + 1];
        }
        match self {
            Wrap::Wrap => state[0],
            Wrap::Zero => false,
            Wrap::One => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<bool> {
        s.bytes().map(|b| b == b'1').collect()
    }

    #[test]
    fn test_elementary_cellular_automaton() {
        // https://mathworld.wolfram.com/Rule30.html
        let automaton = ElementaryCellularAutomaton::new(Wrap::Zero, Rule::new(30));
        let mut next_state = [false; 9];

        let mut state = [false, false, false, false, true, false, false, false, false];
        automaton.next(&state, &mut next_state).unwrap();

        assert_eq!(
            next_state,
            [false, false, false, true, true, true, false, false, false]
        );

        state.copy_from_slice(&next_state);
        automaton.next(&state, &mut next_state).unwrap();

        assert_eq!(
            next_state,
            [false, false, true, true, false, false, true, false, false]
        );
    }

    #[test]
    fn test_wrap_shifts_across_boundary() {
        // Rule 2 only keeps a cell alive whose right neighbor is alive.
        let automaton = ElementaryCellularAutomaton::new(Wrap::Wrap, Rule::new(2));

        let state = automaton.step(&bits("00000001")).unwrap();
        assert_eq!(state, bits("00000010"));

        let state = automaton.step(&bits("10000000")).unwrap();
        assert_eq!(state, bits("00000001"));
    }

    #[test]
    fn test_one_boundary() {
        // Rule 1 turns on only cells in an all-dead neighborhood.
        let automaton = ElementaryCellularAutomaton::new(Wrap::One, Rule::new(1));
        assert_eq!(automaton.step(&bits("000")).unwrap(), bits("010"));

        let automaton = ElementaryCellularAutomaton::new(Wrap::Zero, Rule::new(1));
        assert_eq!(automaton.step(&bits("000")).unwrap(), bits("111"));
    }

    #[test]
    fn test_rule_110_wraps() {
        // 110 = 0b0110_1110
        // cell 0: 0 0 1 -> bit 1 = 1
        // cell 1: 0 1 0 -> bit 2 = 1
        // cell 2: 1 0 0 -> bit 4 = 0
        let next = next_row(Rule::new(110), &bits("010")).unwrap();
        assert_eq!(next, bits("110"));
    }

    #[test]
    fn test_row_length_is_preserved() {
        for rule in 0..=255 {
            for len in [2, 3, 7, 64] {
                let row: Vec<bool> = (0..len).map(|i| i % 3 == 0).collect();
                let next = next_row(Rule::new(rule), &row).unwrap();
                assert_eq!(next.len(), len);
            }
        }
    }

    #[test]
    fn test_next_row_is_deterministic() {
        let row = bits("0110100111010001");
        for rule in [30, 90, 110, 184] {
            let rule = Rule::new(rule);
            assert_eq!(next_row(rule, &row).unwrap(), next_row(rule, &row).unwrap());
        }
    }

    #[test]
    fn test_all_zero_row() {
        let zeros = vec![false; 10];
        for rule in 0..=255u8 {
            let next = next_row(Rule::new(rule), &zeros).unwrap();
            let expected = rule & 1 == 1;
            assert!(next.iter().all(|&cell| cell == expected), "rule {rule}");
        }
    }

    #[test]
    fn test_single_cell_row() {
        for rule in 0..=255u8 {
            assert_eq!(next_row(Rule::new(rule), &[true]).unwrap(), [(rule >> 7) & 1 == 1]);
            assert_eq!(next_row(Rule::new(rule), &[false]).unwrap(), [rule & 1 == 1]);
        }
    }

    #[test]
    fn test_empty_row_is_rejected() {
        assert!(matches!(
            next_row(Rule::new(30), &[]),
            Err(AutomatonError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        let automaton = ElementaryCellularAutomaton::new(Wrap::Wrap, Rule::new(30));
        let mut next_state = [false; 2];
        assert!(automaton.next(&[true, false, true], &mut next_state).is_err());
    }

    #[test]
    fn test_rule_range() {
        assert_eq!(Rule::try_from(0).unwrap().inner(), 0);
        assert_eq!(Rule::try_from(255).unwrap().inner(), 255);
        assert!(matches!(Rule::try_from(-1), Err(AutomatonError::InvalidArgument(_))));
        assert!(matches!(Rule::try_from(256), Err(AutomatonError::InvalidArgument(_))));
    }

    #[test]
    fn test_rule_from_str() {
        assert_eq!("30".parse::<Rule>().unwrap(), Rule::new(30));
        assert!("300".parse::<Rule>().is_err());
        assert!("thirty".parse::<Rule>().is_err());
    }

    #[test]
    fn test_rule_serde() {
        assert_eq!(serde_json::to_string(&Rule::new(90)).unwrap(), "90");
        assert_eq!(serde_json::from_str::<Rule>("90").unwrap(), Rule::new(90));
        assert!(serde_json::from_str::<Rule>("256").is_err());
    }

    #[test]
    fn test_rule_description() {
        assert_eq!(
            Rule::new(110).describe().to_string(),
            "Rule 110 maps 000 to 0, 001 to 1, 010 to 1, 011 to 1, \
             100 to 0, 101 to 1, 110 to 1, and 111 to 0."
        );
    }
}
