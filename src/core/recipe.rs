/// Normalized recipe model
///
/// Every source adapter maps its own record format into these types, so the
/// rest of the crate never has to care where a recipe came from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cooking time used when a source doesn't say
pub const DEFAULT_READY_IN_MINUTES: u32 = 30;

/// Servings used when a source doesn't say
pub const DEFAULT_SERVINGS: u32 = 2;

/// Shown instead of a missing or broken recipe image
pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1495521821757-a1efb6729352?auto=format&fit=crop&w=500&q=80";

/// Where a recipe came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    Local,
    FreeApi,
    PaidApi,
    Synthetic,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provenance::Local => "local",
            Provenance::FreeApi => "free-api",
            Provenance::PaidApi => "paid-api",
            Provenance::Synthetic => "synthetic",
        };
        write!(f, "{}", s)
    }
}

/// Ingredient quantity. Some sources give numbers, others give "1 cup".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Numeric(f64),
    Text(String),
}

impl Amount {
    pub fn is_empty(&self) -> bool {
        matches!(self, Amount::Text(text) if text.trim().is_empty())
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Text(String::new())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // 400.0 prints as "400", 0.5 stays "0.5"
            Amount::Numeric(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Amount::Numeric(n) => write!(f, "{}", n),
            Amount::Text(text) => write!(f, "{}", text.trim()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: Amount,
    pub unit: String,
    pub original: String,
}

impl Ingredient {
    /// Build an ingredient and derive the `original` display line
    pub fn new(name: impl Into<String>, amount: Amount, unit: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        let unit = unit.into().trim().to_string();
        let original = [amount.to_string(), unit.clone(), name.clone()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            name,
            amount,
            unit,
            original,
        }
    }
}

/// One numbered instruction step (1-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Instructions {
    Narrative(String),
    Steps(Vec<Step>),
}

impl Instructions {
    /// Number a list of step texts 1..=n
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Step {
                number: i as u32 + 1,
                text: text.into(),
            })
            .collect();
        Instructions::Steps(steps)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Instructions::Narrative(text) => text.trim().is_empty(),
            Instructions::Steps(steps) => steps.is_empty(),
        }
    }
}

impl Default for Instructions {
    fn default() -> Self {
        Instructions::Narrative(String::new())
    }
}

/// The common shape every source normalizes into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub ready_in_minutes: u32,
    pub servings: u32,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Instructions,
    pub source: Provenance,
}

impl Recipe {
    /// Image URL to display, never blank
    pub fn image_or_placeholder(&self) -> &str {
        match self.image.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => PLACEHOLDER_IMAGE,
        }
    }

    /// Lowercased title plus ingredient names, the text relevance is scored on
    pub fn searchable_text(&self) -> String {
        let mut text = self.title.to_lowercase();
        for ingredient in &self.ingredients {
            text.push(' ');
            text.push_str(&ingredient.name.to_lowercase());
        }
        text
    }
}

/// Replace missing or non-positive durations with the default
pub fn minutes_or_default(value: Option<i64>) -> u32 {
    positive_or(value, DEFAULT_READY_IN_MINUTES)
}

/// Replace missing or non-positive servings with the default
pub fn servings_or_default(value: Option<i64>) -> u32 {
    positive_or(value, DEFAULT_SERVINGS)
}

fn positive_or(value: Option<i64>, default: u32) -> u32 {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

/// Blank strings become None
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
