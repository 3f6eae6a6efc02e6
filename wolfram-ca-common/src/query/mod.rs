//! Lenient request parameter parsing.
//!
//! Missing values fall back to defaults and sizes are clamped into range
//! instead of being rejected. An unknown start type is the only error raised
//! here; an out-of-range rule passes through and fails when rendered.

use std::collections::HashMap;

use crate::config::RenderConfig;
use crate::init::{Pattern, Seed};
use crate::state::RenderParams;
use crate::Result;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    /// Parses `a=1&b=2`. Repeated keys keep their last value.
    pub fn parse(query: &str) -> Self {
        let values = query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (percent_decode(key), percent_decode(value))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// `true` when the parameter is present and equal to `yes`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name) == Some("yes")
    }

    /// Integer value, truncated toward zero. Text without a numeric prefix reads as 0.
    pub fn int_or(&self, name: &str, default: i64) -> i64 {
        self.float_or(name, default as f64) as i64
    }

    pub fn int_in_range(&self, name: &str, default: i64, min: i64, max: i64) -> i64 {
        self.float_or(name, default as f64)
            .max(min as f64)
            .min(max as f64) as i64
    }

    fn float_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).map_or(default, leading_float)
    }

    /// Request parameters with `config` supplying defaults and limits.
    pub fn render_params(&self, config: &RenderConfig) -> Result<RenderParams> {
        let defaults = &config.defaults;
        let limits = &config.limits;

        let cells = self.int_in_range(
            "cells",
            to_i64(defaults.cells),
            to_i64(limits.min_cells),
            to_i64(limits.max_cells),
        );
        let steps = self.int_in_range(
            "steps",
            to_i64(defaults.steps),
            to_i64(limits.min_steps),
            to_i64(limits.max_steps),
        );
        let initial = match self.get("initial") {
            Some(initial) => Pattern::parse(initial).ok(),
            None => defaults.initial.clone(),
        };
        let start = match self.get("start_type") {
            None | Some("") => defaults.start,
            Some(start) => start.parse()?,
        };

        let params = RenderParams {
            rule: self.int_or("rule", defaults.rule),
            cells: usize::try_from(cells).unwrap_or(0),
            steps: usize::try_from(steps).unwrap_or(0),
            initial,
            seed: Seed::new(self.int_or("seed", defaults.seed.inner())),
            start,
        };
        Ok(params.clamp(limits))
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Numeric prefix of `s` (`" 12.5abc"` is 12.5), or 0 when there is none.
fn leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    end = digits(end);
    if bytes.get(end) == Some(&b'.') {
        end = digits(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_end = digits(exponent);
        if exponent_end > exponent {
            end = exponent_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => decoded.push(b' '),
            b'%' if i + 2 < bytes.len() && hex_pair(bytes[i + 1], bytes[i + 2]).is_some() => {
                decoded.extend(hex_pair(bytes[i + 1], bytes[i + 2]));
                i += 2;
            }
            b => decoded.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_pair(high: u8, low: u8) -> Option<u8> {
    let high = (high as char).to_digit(16)?;
    let low = (low as char).to_digit(16)?;
    Some((high * 16 + low) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::StartType;

    #[test]
    fn test_parse() {
        let query = QueryParams::parse("?cells=10&rule=30&rule=90&image=yes&empty&initial=1%2B0+1");
        assert_eq!(query.get("cells"), Some("10"));
        assert_eq!(query.get("rule"), Some("90"));
        assert_eq!(query.get("empty"), Some(""));
        assert_eq!(query.get("initial"), Some("1+0 1"));
        assert_eq!(query.get("steps"), None);
        assert!(query.flag("image"));
        assert!(!query.flag("empty"));
    }

    #[test]
    fn test_int_parsing() {
        let query = QueryParams::parse("a=12.9&b=-3.7&c=abc&d=7px&e=1e2&f=2e");
        assert_eq!(query.int_or("a", 0), 12);
        assert_eq!(query.int_or("b", 0), -3);
        assert_eq!(query.int_or("c", 5), 0);
        assert_eq!(query.int_or("d", 0), 7);
        assert_eq!(query.int_or("e", 0), 100);
        assert_eq!(query.int_or("f", 0), 2);
        assert_eq!(query.int_or("missing", 110), 110);
        assert_eq!(query.int_in_range("a", 0, 1, 10), 10);
        assert_eq!(query.int_in_range("b", 0, 1, 10), 1);
        assert_eq!(query.int_in_range("missing", 200, 1, 1000), 200);
    }

    #[test]
    fn test_render_params_defaults() {
        let params = QueryParams::parse("").render_params(&RenderConfig::default()).unwrap();
        assert_eq!(params, RenderParams::default());
    }

    #[test]
    fn test_render_params() {
        let query = QueryParams::parse(
            "cells=5000&steps=0&rule=-1&seed=9&initial=10x&start_type=middle",
        );
        let params = query.render_params(&RenderConfig::default()).unwrap();
        assert_eq!(params.cells, 1000);
        assert_eq!(params.steps, 1);
        assert_eq!(params.rule, -1);
        assert_eq!(params.seed, Seed::new(9));
        assert_eq!(params.initial, None);
        assert_eq!(params.start, StartType::Middle);
    }

    #[test]
    fn test_render_params_with_unchecked_limits() {
        let mut config = RenderConfig::default();
        config.limits.max_steps = usize::MAX;
        config.limits.min_cells = 500;
        config.limits.max_cells = 10;

        let params = QueryParams::parse("steps=50&cells=50").render_params(&config).unwrap();
        assert_eq!(params.steps, 50);
        assert_eq!(params.cells, 500);
    }

    #[test]
    fn test_unknown_start_type() {
        let query = QueryParams::parse("start_type=sideways");
        let err = query.render_params(&RenderConfig::default()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_query_round_trip() {
        let params = RenderParams {
            rule: 30,
            cells: 64,
            steps: 32,
            initial: Some(Pattern::parse("0110").unwrap()),
            seed: Seed::new(-5),
            start: StartType::Right,
        };
        let parsed = QueryParams::parse(&params.to_query())
            .render_params(&RenderConfig::default())
            .unwrap();
        assert_eq!(parsed, params);
    }
}
