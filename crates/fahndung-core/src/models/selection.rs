use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// How many records may be marked selected at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    None,
    Single,
    Multi,
}

impl Display for SelectionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SelectionMode::None => write!(f, "none"),
            SelectionMode::Single => write!(f, "single"),
            SelectionMode::Multi => write!(f, "multi"),
        }
    }
}

impl FromStr for SelectionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SelectionMode::None),
            "single" => Ok(SelectionMode::Single),
            "multi" | "multiple" => Ok(SelectionMode::Multi),
            _ => Err(anyhow::anyhow!("Invalid selection mode: {}", s)),
        }
    }
}
