//! Population mix scenarios and their canonical keys.

use serde::Serialize;

use crate::errors::{DivError, ErrorInfo};

/// Separator between proportion tokens in a scenario key.
pub const KEY_SEPARATOR: char = '_';

const SUM_TOLERANCE: f64 = 1e-6;
const REMAINDER_DECIMALS: f64 = 1e12;
const LABEL_TOKEN_WIDTH: usize = 4;

/// Immutable population mix identified by its canonical key (`0.7_0.2_0.1`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    proportions: Vec<f64>,
    tokens: Vec<String>,
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl Scenario {
    /// Builds a scenario from group proportions.
    ///
    /// The list may either cover every group (summing to one) or omit the
    /// final group, in which case the remainder `1 - sum` is appended. The
    /// remainder is rounded to twelve decimals so that `[0.7]` yields the key
    /// `0.7_0.3` rather than exposing floating point noise.
    pub fn new(proportions: &[f64]) -> Result<Self, DivError> {
        if proportions.is_empty() {
            return Err(scenario_error("scenario-empty", "scenario has no proportions"));
        }
        for (idx, &value) in proportions.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(DivError::Scenario(
                    ErrorInfo::new("scenario-proportion", "proportions must lie in (0, 1]")
                        .with_context("group", idx.to_string())
                        .with_context("value", value.to_string()),
                ));
            }
        }
        let mut values = proportions.to_vec();
        let sum: f64 = values.iter().sum();
        if sum < 1.0 - SUM_TOLERANCE {
            let remainder = ((1.0 - sum) * REMAINDER_DECIMALS).round() / REMAINDER_DECIMALS;
            values.push(remainder);
        } else if sum > 1.0 + SUM_TOLERANCE {
            return Err(DivError::Scenario(
                ErrorInfo::new("scenario-sum", "proportions exceed one")
                    .with_context("sum", sum.to_string()),
            ));
        }
        let tokens = values.iter().map(|value| value.to_string()).collect();
        Self::from_parts(values, tokens)
    }

    /// Parses a canonical key such as `0.4_0.4_0.1_0.1`.
    ///
    /// The tokens are kept verbatim so that labels derived from a stored key
    /// match the labels produced when the key was first generated.
    pub fn from_key(key: &str) -> Result<Self, DivError> {
        let mut values = Vec::new();
        let mut tokens = Vec::new();
        for token in key.split(KEY_SEPARATOR) {
            let value: f64 = token.trim().parse().map_err(|_| {
                DivError::Scenario(
                    ErrorInfo::new("scenario-key-token", "scenario key token is not a number")
                        .with_context("key", key)
                        .with_context("token", token),
                )
            })?;
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(DivError::Scenario(
                    ErrorInfo::new("scenario-proportion", "proportions must lie in (0, 1]")
                        .with_context("key", key)
                        .with_context("token", token),
                ));
            }
            values.push(value);
            tokens.push(token.trim().to_string());
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(DivError::Scenario(
                ErrorInfo::new("scenario-sum", "scenario key proportions must sum to one")
                    .with_context("key", key)
                    .with_context("sum", sum.to_string()),
            ));
        }
        Self::from_parts(values, tokens)
    }

    fn from_parts(proportions: Vec<f64>, tokens: Vec<String>) -> Result<Self, DivError> {
        if proportions.len() < 2 {
            return Err(DivError::Scenario(
                ErrorInfo::new("scenario-groups", "a scenario needs at least two groups")
                    .with_context("groups", proportions.len().to_string()),
            ));
        }
        let key = tokens.join(&KEY_SEPARATOR.to_string());
        Ok(Self {
            proportions,
            tokens,
            key,
            label: None,
        })
    }

    /// Attaches a display label (for example `Single minority`).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Canonical key joining every proportion, remainder group included.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Optional display label injected by the sweep configuration.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Group proportions in group order.
    pub fn proportions(&self) -> &[f64] {
        &self.proportions
    }

    /// Number of population groups.
    pub fn group_count(&self) -> usize {
        self.proportions.len()
    }

    /// Raw group identifiers `g0`, `g1`, ... as emitted by world models.
    pub fn group_ids(&self) -> Vec<String> {
        (0..self.group_count()).map(group_id).collect()
    }

    /// Proportion-annotated label for the group at `index` (`g1-0.20`).
    pub fn group_label(&self, index: usize) -> Option<String> {
        self.tokens.get(index).map(|token| {
            let mut padded = token.clone();
            while padded.len() < LABEL_TOKEN_WIDTH {
                padded.push('0');
            }
            format!("{}-{}", group_id(index), padded)
        })
    }

    /// Rewrites a raw group id into its proportion-annotated label.
    pub fn annotate(&self, raw: &str) -> Option<String> {
        parse_group_id(raw).and_then(|index| self.group_label(index))
    }
}

/// Formats the raw identifier of the group at `index`.
pub fn group_id(index: usize) -> String {
    format!("g{index}")
}

/// Parses a raw group identifier (`g3`) back into its index.
pub fn parse_group_id(raw: &str) -> Option<usize> {
    raw.strip_prefix('g').and_then(|digits| digits.parse().ok())
}

fn scenario_error(code: &str, message: &str) -> DivError {
    DivError::Scenario(ErrorInfo::new(code, message))
}
