//! Row shapes for distillery and bottle import files.
//!
//! Raw records are decoded as strings first and then validated into typed
//! rows, so a bad coordinate is reported against its line rather than failing
//! the whole file.

use serde::Deserialize;

use crate::error::RowError;

/// A validated distillery record.
#[derive(Debug, Clone, PartialEq)]
pub struct DistilleryRow {
    /// Distillery name, also used to join bottle rows.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Free-text description; `None` when the column is blank.
    pub description: Option<String>,
    /// Whether tours are offered. Only a case-insensitive `true` counts.
    pub tours_available: bool,
    /// Tour details; `None` when the column is blank.
    pub tour_info: Option<String>,
}

/// A validated bottle record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BottleRow {
    /// Exact name of the distillery this bottle belongs to.
    pub distillery_name: String,
    /// Bottle name.
    pub name: String,
    /// Age statement such as `12 Years`; `None` when blank or absent.
    pub age_statement: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDistilleryRow {
    name: String,
    latitude: String,
    longitude: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tours_available: String,
    #[serde(default)]
    tour_info: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBottleRow {
    distillery_name: String,
    name: String,
    #[serde(default)]
    age_statement: Option<String>,
}

impl RawDistilleryRow {
    pub(crate) fn validate(self, line: u64) -> Result<DistilleryRow, RowError> {
        let name = required(self.name, "name", line)?;
        let latitude = coordinate(&self.latitude, "latitude", 90, line)?;
        let longitude = coordinate(&self.longitude, "longitude", 180, line)?;

        Ok(DistilleryRow {
            name,
            latitude,
            longitude,
            description: optional(self.description),
            tours_available: self.tours_available.trim().eq_ignore_ascii_case("true"),
            tour_info: optional(self.tour_info),
        })
    }
}

impl RawBottleRow {
    pub(crate) fn validate(self, line: u64) -> Result<BottleRow, RowError> {
        Ok(BottleRow {
            distillery_name: required(self.distillery_name, "distillery_name", line)?,
            name: required(self.name, "name", line)?,
            age_statement: self.age_statement.and_then(optional),
        })
    }
}

fn required(value: String, field: &'static str, line: u64) -> Result<String, RowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RowError::EmptyField { line, field });
    }
    Ok(trimmed.to_owned())
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn coordinate(raw: &str, field: &'static str, bound: i16, line: u64) -> Result<f64, RowError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| RowError::InvalidCoordinate {
            line,
            field,
            value: raw.to_owned(),
        })?;

    let limit = f64::from(bound);
    if !(-limit..=limit).contains(&value) {
        return Err(RowError::CoordinateOutOfRange {
            line,
            field,
            value: raw.to_owned(),
            min: -bound,
            max: bound,
        });
    }
    Ok(value)
}
