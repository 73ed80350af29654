//! Typed view over the model's JSON answer.
//!
//! The envelope never depends on this module: `result` is always the raw
//! model text. Callers that want numbers (the CLI's `--check`, a client
//! library, a future schema gate) parse it here.
//!
//! Models are inconsistent about number formatting, so each value accepts
//! `120`, `"120"` or `null`.

use crate::config::Variant;
use serde::{Deserialize, Deserializer, Serialize};

/// One monitor display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub systolic: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub diastolic: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub pulse: Option<u32>,
}

/// Answer to the single-image prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleReport {
    #[serde(flatten)]
    pub reading: Reading,
    pub summary: String,
}

/// Answer to the multi-image prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiReport {
    pub readings: Vec<Reading>,
    pub summary: String,
}

/// Either report shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Single(SingleReport),
    Multi(MultiReport),
}

impl Report {
    /// Parse `text` against the schema requested for `variant`.
    pub fn parse(variant: Variant, text: &str) -> Result<Self, serde_json::Error> {
        match variant {
            Variant::Single => serde_json::from_str(text).map(Report::Single),
            Variant::Multi => serde_json::from_str(text).map(Report::Multi),
        }
    }

    pub fn readings(&self) -> Vec<&Reading> {
        match self {
            Report::Single(r) => vec![&r.reading],
            Report::Multi(r) => r.readings.iter().collect(),
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            Report::Single(r) => &r.summary,
            Report::Multi(r) => &r.summary,
        }
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u32),
        Float(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(n)) => Ok(Some(n)),
        Some(Raw::Float(f)) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
            Ok(Some(f as u32))
        }
        Some(Raw::Float(f)) => Err(serde::de::Error::custom(format!("not a whole number: {f}"))),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("not a number: {s:?}"))),
    }
}
