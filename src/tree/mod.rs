//! # Plan tree
//!
//! In-memory representation of a training plan:
//!
//! ```text
//! PlanTree
//! └── Week (number, start date)
//!     └── Day (keyed by day name, Monday..Sunday)
//!         └── Session (Normal | Superset)
//!             └── Exercise (catalog reference)
//!                 └── Set (numeric targets, render config)
//!                     └── CheckIn
//! ```
//!
//! The same tree is used for every storage shape:
//! - plannings are persisted reference-on-write (one table per level, see `rows`)
//! - templates are persisted embed-on-write (the whole tree as one JSON column)
//!
//! Skeletons add a color-coded variant level between day and session and live
//! in `skeleton`.
//!
//! Submodules:
//! - `locate`: the single week → day → session → exercise → set locator
//! - `ops`: mutations (add/update/remove session, exercise, sets, check-ins)
//! - `rows`: flattening to table rows and row diffing for the referenced shape
//! - `skeleton`: the Esqueleto variant tree

pub mod locate;
pub mod ops;
pub mod rows;
pub mod skeleton;

pub use locate::{Indices, Level, LocateError, NodePath, Selector};
pub use ops::{NewCheckIn, NewExercise, NewSession, SessionPatch};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// New node id (UUIDv7, time ordered).
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Errors raised while locating or mutating a tree.
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("invalid {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("{0}")]
    Conflict(String),
}

impl TreeError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        TreeError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefixes the offending field, e.g. `weight` → `sets[2].weight`.
    pub fn within(self, prefix: &str) -> Self {
        match self {
            TreeError::Invalid { field, message } => TreeError::Invalid {
                field: format!("{}.{}", prefix, field),
                message,
            },
            other => other,
        }
    }
}

// ── Day names ──

/// The seven fixed day names. Serialized in Spanish, parsed from Spanish,
/// English (case and accent insensitive) or a 1-based day number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(try_from = "String", into = "&'static str")]
#[sqlx(rename_all = "lowercase")]
pub enum DayName {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayName {
    pub const ALL: [DayName; 7] = [
        DayName::Monday,
        DayName::Tuesday,
        DayName::Wednesday,
        DayName::Thursday,
        DayName::Friday,
        DayName::Saturday,
        DayName::Sunday,
    ];

    /// 1-based position in the week (Monday = 1).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Days after the week's first day (Monday = 0).
    pub fn offset(self) -> i64 {
        self as i64
    }

    pub fn from_number(number: i64) -> Option<DayName> {
        if (1..=7).contains(&number) {
            Some(Self::ALL[(number - 1) as usize])
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayName::Monday => "Lunes",
            DayName::Tuesday => "Martes",
            DayName::Wednesday => "Miércoles",
            DayName::Thursday => "Jueves",
            DayName::Friday => "Viernes",
            DayName::Saturday => "Sábado",
            DayName::Sunday => "Domingo",
        }
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DayName> for &'static str {
    fn from(day: DayName) -> Self {
        day.as_str()
    }
}

fn fold_accents(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}

impl FromStr for DayName {
    type Err = TreeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let day = match fold_accents(raw).as_str() {
            "lunes" | "monday" | "1" => DayName::Monday,
            "martes" | "tuesday" | "2" => DayName::Tuesday,
            "miercoles" | "wednesday" | "3" => DayName::Wednesday,
            "jueves" | "thursday" | "4" => DayName::Thursday,
            "viernes" | "friday" | "5" => DayName::Friday,
            "sabado" | "saturday" | "6" => DayName::Saturday,
            "domingo" | "sunday" | "7" => DayName::Sunday,
            _ => {
                return Err(TreeError::invalid(
                    "day",
                    format!("'{}' is not a day of the week", raw),
                ))
            }
        };
        Ok(day)
    }
}

impl TryFrom<String> for DayName {
    type Error = TreeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

// ── Enumerations stored on nodes ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum SessionKind {
    #[default]
    #[serde(alias = "normal")]
    Normal,
    #[serde(alias = "superset", alias = "Superserie", alias = "superserie")]
    Superset,
}

/// The 4-color enum used for skeleton variants and check-in markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Color {
    #[serde(alias = "rojo")]
    Red,
    #[serde(alias = "amarillo")]
    Yellow,
    #[serde(alias = "verde")]
    Green,
    #[serde(alias = "azul")]
    Blue,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = TreeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "red" | "rojo" => Ok(Color::Red),
            "yellow" | "amarillo" => Ok(Color::Yellow),
            "green" | "verde" => Ok(Color::Green),
            "blue" | "azul" => Ok(Color::Blue),
            _ => Err(TreeError::invalid("color", format!("unknown color '{}'", raw))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum WeightType {
    #[default]
    #[serde(alias = "absoluto")]
    Absolute,
    #[serde(alias = "rmPercentage", alias = "porcentajeRM")]
    RmPercentage,
}

/// Metrics a set can display in one of its three render slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RenderField {
    Reps,
    Weight,
    Rest,
    Tempo,
    Rpe,
    Rpm,
    Rir,
    Speed,
    Cadence,
    Distance,
    Height,
    Calories,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub campo1: RenderField,
    pub campo2: RenderField,
    pub campo3: RenderField,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            campo1: RenderField::Reps,
            campo2: RenderField::Weight,
            campo3: RenderField::Rest,
        }
    }
}

/// Partial render-config write. Only the three slots are writable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfigPatch {
    pub campo1: Option<RenderField>,
    pub campo2: Option<RenderField>,
    pub campo3: Option<RenderField>,
}

impl RenderConfig {
    pub fn apply(&mut self, patch: &RenderConfigPatch) {
        if let Some(field) = patch.campo1 {
            self.campo1 = field;
        }
        if let Some(field) = patch.campo2 {
            self.campo2 = field;
        }
        if let Some(field) = patch.campo3 {
            self.campo3 = field;
        }
    }
}

// ── Set values ──

/// Numeric set fields that can be addressed individually (modification log).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "String", into = "&'static str")]
#[sqlx(rename_all = "snake_case")]
pub enum SetField {
    Reps,
    Weight,
    Rest,
    Tempo,
    Rpe,
    Rir,
    Speed,
    Cadence,
    Distance,
    Height,
    Calories,
    Round,
    RmPercentage,
}

impl SetField {
    pub fn as_str(self) -> &'static str {
        match self {
            SetField::Reps => "reps",
            SetField::Weight => "weight",
            SetField::Rest => "rest",
            SetField::Tempo => "tempo",
            SetField::Rpe => "rpe",
            SetField::Rir => "rir",
            SetField::Speed => "speed",
            SetField::Cadence => "cadence",
            SetField::Distance => "distance",
            SetField::Height => "height",
            SetField::Calories => "calories",
            SetField::Round => "round",
            SetField::RmPercentage => "rm_percentage",
        }
    }
}

impl From<SetField> for &'static str {
    fn from(field: SetField) -> Self {
        field.as_str()
    }
}

impl FromStr for SetField {
    type Err = TreeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let field = match fold_accents(raw).as_str() {
            "reps" | "repeticiones" => SetField::Reps,
            "weight" | "peso" => SetField::Weight,
            "rest" | "descanso" => SetField::Rest,
            "tempo" => SetField::Tempo,
            "rpe" => SetField::Rpe,
            "rir" => SetField::Rir,
            "speed" | "velocidad" => SetField::Speed,
            "cadence" | "cadencia" => SetField::Cadence,
            "distance" | "distancia" => SetField::Distance,
            "height" | "altura" => SetField::Height,
            "calories" | "calorias" => SetField::Calories,
            "round" | "ronda" => SetField::Round,
            "rm_percentage" | "rmpercentage" | "porcentajerm" => SetField::RmPercentage,
            _ => {
                return Err(TreeError::invalid(
                    "field",
                    format!("'{}' is not a set field", raw),
                ))
            }
        };
        Ok(field)
    }
}

impl TryFrom<String> for SetField {
    type Error = TreeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Numeric targets of a set. Accepts English field names and the Spanish
/// aliases used by older clients (`repeticiones`, `peso`, `descanso`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetValues {
    #[serde(alias = "repeticiones")]
    pub reps: Option<i64>,
    #[serde(alias = "peso")]
    pub weight: Option<f64>,
    #[serde(alias = "descanso")]
    pub rest: Option<f64>,
    pub tempo: Option<f64>,
    pub rpe: Option<f64>,
    pub rir: Option<f64>,
    #[serde(alias = "velocidad")]
    pub speed: Option<f64>,
    #[serde(alias = "cadencia")]
    pub cadence: Option<f64>,
    #[serde(alias = "distancia")]
    pub distance: Option<f64>,
    #[serde(alias = "altura")]
    pub height: Option<f64>,
    #[serde(alias = "calorias")]
    pub calories: Option<f64>,
    #[serde(alias = "ronda")]
    pub round: Option<i64>,
    #[serde(default, alias = "weightType", alias = "tipoPeso")]
    pub weight_type: WeightType,
    #[serde(alias = "rmPercentage", alias = "porcentajeRM")]
    pub rm_percentage: Option<f64>,
}

fn non_negative(field: &str, value: Option<f64>) -> Result<(), TreeError> {
    match value {
        Some(v) if !v.is_finite() => Err(TreeError::invalid(field, "must be a finite number")),
        Some(v) if v < 0.0 => Err(TreeError::invalid(field, "must not be negative")),
        _ => Ok(()),
    }
}

impl SetValues {
    /// Validates the values and applies the weight-type rule: an
    /// rm-percentage set never carries an absolute weight.
    pub fn normalize(mut self) -> Result<Self, TreeError> {
        non_negative("reps", self.reps.map(|v| v as f64))?;
        non_negative("rest", self.rest)?;
        non_negative("tempo", self.tempo)?;
        non_negative("rpe", self.rpe)?;
        non_negative("rir", self.rir)?;
        non_negative("speed", self.speed)?;
        non_negative("cadence", self.cadence)?;
        non_negative("distance", self.distance)?;
        non_negative("height", self.height)?;
        non_negative("calories", self.calories)?;
        non_negative("round", self.round.map(|v| v as f64))?;
        if matches!(self.rpe, Some(rpe) if rpe > 10.0) {
            return Err(TreeError::invalid("rpe", "must be between 0 and 10"));
        }

        match self.weight_type {
            WeightType::RmPercentage => {
                match self.rm_percentage {
                    Some(pct) if pct.is_finite() && pct > 0.0 && pct <= 100.0 => {}
                    Some(_) => {
                        return Err(TreeError::invalid(
                            "rm_percentage",
                            "must be greater than 0 and at most 100",
                        ))
                    }
                    None => {
                        return Err(TreeError::invalid(
                            "rm_percentage",
                            "is required when weight_type is rm_percentage",
                        ))
                    }
                }
                self.weight = None;
            }
            WeightType::Absolute => {
                non_negative("weight", self.weight)?;
                self.rm_percentage = None;
            }
        }
        Ok(self)
    }

    pub fn get(&self, field: SetField) -> Option<f64> {
        match field {
            SetField::Reps => self.reps.map(|v| v as f64),
            SetField::Weight => self.weight,
            SetField::Rest => self.rest,
            SetField::Tempo => self.tempo,
            SetField::Rpe => self.rpe,
            SetField::Rir => self.rir,
            SetField::Speed => self.speed,
            SetField::Cadence => self.cadence,
            SetField::Distance => self.distance,
            SetField::Height => self.height,
            SetField::Calories => self.calories,
            SetField::Round => self.round.map(|v| v as f64),
            SetField::RmPercentage => self.rm_percentage,
        }
    }
}

// ── Nodes ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    #[serde(default = "new_id")]
    pub id: String,
    pub color: Color,
    pub comment: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(flatten)]
    pub values: SetValues,
    #[serde(default, alias = "renderConfig")]
    pub render_config: RenderConfig,
    #[serde(default)]
    pub check_ins: Vec<CheckIn>,
}

/// Request shape of a set: values plus an optional render config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetInput {
    #[serde(flatten)]
    pub values: SetValues,
    #[serde(default, alias = "renderConfig")]
    pub render_config: Option<RenderConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default = "new_id")]
    pub id: String,
    /// Global exercise catalog entry.
    pub exercise_id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default, alias = "renderConfig")]
    pub render_config: Option<RenderConfig>,
    #[serde(default)]
    pub sets: Vec<Set>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: SessionKind,
    pub rounds: Option<i64>,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    #[serde(default = "new_id")]
    pub id: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl Day {
    pub fn empty(date: Option<NaiveDate>) -> Self {
        Self {
            id: new_id(),
            date,
            sessions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week {
    #[serde(default = "new_id")]
    pub id: String,
    pub number: u32,
    pub start_date: Option<NaiveDate>,
    /// Day name → day. The map keeps day names unique within a week.
    #[serde(default)]
    pub days: BTreeMap<DayName, Day>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanTree {
    #[serde(default)]
    pub weeks: Vec<Week>,
}
