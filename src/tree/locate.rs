//! # Node locator
//!
//! Resolves a [`NodePath`] (week number, day name, then optional session,
//! exercise and set selectors) to the exact node in a [`PlanTree`].
//!
//! Every mutation goes through here, so "not found" means the same thing
//! everywhere: the first level that fails to resolve is reported and nothing
//! is changed.

use super::{Color, Day, DayName, Exercise, PlanTree, Session, Set};
use std::fmt;
use thiserror::Error;

/// Picks a child either by 0-based position or by node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Index(usize),
    Id(String),
}

impl Selector {
    /// Parses a path segment: all digits → index, UUID → id. Ids are kept in
    /// canonical form (lowercase, hyphenated), the form nodes are stored in.
    pub fn parse(raw: &str) -> Option<Selector> {
        let raw = raw.trim();
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw.parse().ok().map(Selector::Index);
        }
        uuid::Uuid::parse_str(raw)
            .ok()
            .map(|id| Selector::Id(id.to_string()))
    }

    pub fn position<T>(&self, items: &[T], id_of: impl Fn(&T) -> &str) -> Option<usize> {
        match self {
            Selector::Index(i) if *i < items.len() => Some(*i),
            Selector::Index(_) => None,
            Selector::Id(id) => items.iter().position(|item| id_of(item) == id),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(i) => write!(f, "at index {}", i),
            Selector::Id(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Week,
    Day,
    Variant,
    Session,
    Exercise,
    Set,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Week => "week",
            Level::Day => "day",
            Level::Variant => "variant",
            Level::Session => "session",
            Level::Exercise => "exercise",
            Level::Set => "set",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocateError {
    #[error("week {0} not found")]
    Week(u32),

    #[error("day {day} not found in week {week}")]
    Day { week: u32, day: DayName },

    #[error("variant {0} not found")]
    Variant(Color),

    #[error("session {0} not found")]
    Session(Selector),

    #[error("exercise {0} not found")]
    Exercise(Selector),

    #[error("set {0} not found")]
    Set(Selector),

    #[error("a {0} selector is required")]
    Missing(Level),
}

impl LocateError {
    pub fn level(&self) -> Level {
        match self {
            LocateError::Week(_) => Level::Week,
            LocateError::Day { .. } => Level::Day,
            LocateError::Variant(_) => Level::Variant,
            LocateError::Session(_) => Level::Session,
            LocateError::Exercise(_) => Level::Exercise,
            LocateError::Set(_) => Level::Set,
            LocateError::Missing(level) => *level,
        }
    }
}

/// Address of a node, from the week down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath {
    pub week: u32,
    pub day: DayName,
    pub session: Option<Selector>,
    pub exercise: Option<Selector>,
    pub set: Option<Selector>,
}

impl NodePath {
    pub fn day(week: u32, day: DayName) -> Self {
        Self {
            week,
            day,
            session: None,
            exercise: None,
            set: None,
        }
    }

    pub fn session(mut self, selector: Selector) -> Self {
        self.session = Some(selector);
        self
    }

    pub fn exercise(mut self, selector: Selector) -> Self {
        self.exercise = Some(selector);
        self
    }

    pub fn set(mut self, selector: Selector) -> Self {
        self.set = Some(selector);
        self
    }
}

/// Positions resolved from a [`NodePath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indices {
    pub week: usize,
    pub day: DayName,
    pub session: Option<usize>,
    pub exercise: Option<usize>,
    pub set: Option<usize>,
}

impl PlanTree {
    /// Walks the path level by level. Stops at the deepest selector present.
    pub fn resolve(&self, path: &NodePath) -> Result<Indices, LocateError> {
        let week = self
            .weeks
            .iter()
            .position(|w| w.number == path.week)
            .ok_or(LocateError::Week(path.week))?;
        let day = self.weeks[week]
            .days
            .get(&path.day)
            .ok_or(LocateError::Day {
                week: path.week,
                day: path.day,
            })?;

        let mut found = Indices {
            week,
            day: path.day,
            session: None,
            exercise: None,
            set: None,
        };

        let Some(selector) = &path.session else {
            return Ok(found);
        };
        let s = selector
            .position(&day.sessions, |s| &s.id)
            .ok_or_else(|| LocateError::Session(selector.clone()))?;
        found.session = Some(s);
        let session = &day.sessions[s];

        let Some(selector) = &path.exercise else {
            return Ok(found);
        };
        let e = selector
            .position(&session.exercises, |e| &e.id)
            .ok_or_else(|| LocateError::Exercise(selector.clone()))?;
        found.exercise = Some(e);
        let exercise = &session.exercises[e];

        let Some(selector) = &path.set else {
            return Ok(found);
        };
        let t = selector
            .position(&exercise.sets, |t| &t.id)
            .ok_or_else(|| LocateError::Set(selector.clone()))?;
        found.set = Some(t);

        Ok(found)
    }

    pub fn day(&self, path: &NodePath) -> Result<&Day, LocateError> {
        let at = self.resolve(path)?;
        self.day_at(path.week, &at)
    }

    pub fn day_mut(&mut self, path: &NodePath) -> Result<&mut Day, LocateError> {
        let at = self.resolve(path)?;
        self.day_at_mut(path.week, &at)
    }

    pub fn session(&self, path: &NodePath) -> Result<&Session, LocateError> {
        let at = self.resolve(path)?;
        let s = at.session.ok_or(LocateError::Missing(Level::Session))?;
        Ok(&self.day_at(path.week, &at)?.sessions[s])
    }

    pub fn session_mut(&mut self, path: &NodePath) -> Result<&mut Session, LocateError> {
        let at = self.resolve(path)?;
        let s = at.session.ok_or(LocateError::Missing(Level::Session))?;
        Ok(&mut self.day_at_mut(path.week, &at)?.sessions[s])
    }

    pub fn exercise(&self, path: &NodePath) -> Result<&Exercise, LocateError> {
        let at = self.resolve(path)?;
        let (s, e) = require_exercise(&at)?;
        Ok(&self.day_at(path.week, &at)?.sessions[s].exercises[e])
    }

    pub fn exercise_mut(&mut self, path: &NodePath) -> Result<&mut Exercise, LocateError> {
        let at = self.resolve(path)?;
        let (s, e) = require_exercise(&at)?;
        Ok(&mut self.day_at_mut(path.week, &at)?.sessions[s].exercises[e])
    }

    pub fn set(&self, path: &NodePath) -> Result<&Set, LocateError> {
        let at = self.resolve(path)?;
        let (s, e) = require_exercise(&at)?;
        let t = at.set.ok_or(LocateError::Missing(Level::Set))?;
        Ok(&self.day_at(path.week, &at)?.sessions[s].exercises[e].sets[t])
    }

    pub fn set_mut(&mut self, path: &NodePath) -> Result<&mut Set, LocateError> {
        let at = self.resolve(path)?;
        let (s, e) = require_exercise(&at)?;
        let t = at.set.ok_or(LocateError::Missing(Level::Set))?;
        Ok(&mut self.day_at_mut(path.week, &at)?.sessions[s].exercises[e].sets[t])
    }

    /// Path (by ids) of the session with this id, if any.
    pub fn find_session(&self, id: &str) -> Option<NodePath> {
        self.paths()
            .find(|(_, session)| session.id == id)
            .map(|(path, session)| path.session(Selector::Id(session.id.clone())))
    }

    /// Path (by ids) of the exercise with this id, if any.
    pub fn find_exercise(&self, id: &str) -> Option<NodePath> {
        self.paths().find_map(|(path, session)| {
            session.exercises.iter().find(|e| e.id == id).map(|e| {
                path.session(Selector::Id(session.id.clone()))
                    .exercise(Selector::Id(e.id.clone()))
            })
        })
    }

    /// Path (by ids) of the set with this id, if any.
    pub fn find_set(&self, id: &str) -> Option<NodePath> {
        self.paths().find_map(|(path, session)| {
            session.exercises.iter().find_map(|e| {
                e.sets.iter().find(|t| t.id == id).map(|t| {
                    path.clone()
                        .session(Selector::Id(session.id.clone()))
                        .exercise(Selector::Id(e.id.clone()))
                        .set(Selector::Id(t.id.clone()))
                })
            })
        })
    }

    /// Every session with the day path it lives under.
    fn paths(&self) -> impl Iterator<Item = (NodePath, &Session)> + '_ {
        self.weeks.iter().flat_map(|week| {
            week.days.iter().flat_map(move |(name, day)| {
                day.sessions
                    .iter()
                    .map(move |session| (NodePath::day(week.number, *name), session))
            })
        })
    }

    fn day_at(&self, week: u32, at: &Indices) -> Result<&Day, LocateError> {
        self.weeks[at.week]
            .days
            .get(&at.day)
            .ok_or(LocateError::Day { week, day: at.day })
    }

    fn day_at_mut(&mut self, week: u32, at: &Indices) -> Result<&mut Day, LocateError> {
        self.weeks[at.week]
            .days
            .get_mut(&at.day)
            .ok_or(LocateError::Day { week, day: at.day })
    }
}

/// Session and exercise positions, reporting the shallowest missing selector.
fn require_exercise(at: &Indices) -> Result<(usize, usize), LocateError> {
    let s = at.session.ok_or(LocateError::Missing(Level::Session))?;
    let e = at.exercise.ok_or(LocateError::Missing(Level::Exercise))?;
    Ok((s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NewExercise, NewSession, SetInput, SetValues};
    use chrono::NaiveDate;

    fn set_with_reps(reps: i64) -> SetInput {
        SetInput {
            values: SetValues {
                reps: Some(reps),
                ..Default::default()
            },
            render_config: None,
        }
    }

    /// Three weeks; week 3 Wednesday has two sessions, the second holding one
    /// exercise with three sets (reps 10, 8, 6).
    fn sample_tree() -> PlanTree {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut tree = PlanTree::scaffold(Some(start), 3);
        let day = NodePath::day(3, DayName::Wednesday);
        for name in ["Warm-up", "Strength"] {
            tree.add_session(
                &day,
                NewSession {
                    name: name.to_string(),
                    kind: Default::default(),
                    rounds: None,
                },
            )
            .unwrap();
        }
        tree.add_exercise(
            &day.clone().session(Selector::Index(1)),
            NewExercise {
                exercise_id: uuid::Uuid::now_v7().to_string(),
                render_config: None,
                sets: vec![set_with_reps(10), set_with_reps(8), set_with_reps(6)],
            },
        )
        .unwrap();
        tree
    }

    #[test]
    fn resolves_set_by_indices() {
        let tree = sample_tree();
        let path = NodePath::day(3, "Miércoles".parse().unwrap())
            .session(Selector::Index(1))
            .exercise(Selector::Index(0))
            .set(Selector::Index(2));

        let set = tree.set(&path).unwrap();
        assert_eq!(set.values.reps, Some(6));

        let at = tree.resolve(&path).unwrap();
        assert_eq!(at.week, 2);
        assert_eq!(at.session, Some(1));
        assert_eq!(at.set, Some(2));
    }

    #[test]
    fn out_of_range_reports_failing_level() {
        let tree = sample_tree();
        let base = NodePath::day(3, DayName::Wednesday);

        let err = tree.resolve(&NodePath::day(9, DayName::Wednesday)).unwrap_err();
        assert_eq!(err, LocateError::Week(9));

        let err = tree.session(&base.clone().session(Selector::Index(2))).unwrap_err();
        assert_eq!(err.level(), Level::Session);

        let err = tree
            .exercise(&base.clone().session(Selector::Index(1)).exercise(Selector::Index(1)))
            .unwrap_err();
        assert_eq!(err.level(), Level::Exercise);

        let err = tree
            .set(
                &base
                    .clone()
                    .session(Selector::Index(1))
                    .exercise(Selector::Index(0))
                    .set(Selector::Index(3)),
            )
            .unwrap_err();
        assert_eq!(err, LocateError::Set(Selector::Index(3)));
    }

    #[test]
    fn missing_selector_is_not_a_default() {
        let tree = sample_tree();
        let err = tree.set(&NodePath::day(3, DayName::Wednesday)).unwrap_err();
        assert_eq!(err, LocateError::Missing(Level::Session));
    }

    #[test]
    fn finds_nodes_by_id() {
        let tree = sample_tree();
        let day = &tree.weeks[2].days[&DayName::Wednesday];
        let set_id = day.sessions[1].exercises[0].sets[1].id.clone();

        let path = tree.find_set(&set_id).unwrap();
        assert_eq!(path.week, 3);
        assert_eq!(path.day, DayName::Wednesday);
        assert_eq!(tree.set(&path).unwrap().values.reps, Some(8));

        assert!(tree.find_session(&uuid::Uuid::now_v7().to_string()).is_none());
    }

    #[test]
    fn selector_parsing() {
        assert_eq!(Selector::parse("2"), Some(Selector::Index(2)));
        let id = uuid::Uuid::now_v7().to_string();
        assert_eq!(Selector::parse(&id), Some(Selector::Id(id.clone())));
        assert_eq!(Selector::parse(&id.to_uppercase()), Some(Selector::Id(id.clone())));
        assert_eq!(
            Selector::parse(&format!("{{{}}}", id)),
            Some(Selector::Id(id.clone()))
        );
        assert_eq!(Selector::parse(&id.replace('-', "")), Some(Selector::Id(id.clone())));
        assert_eq!(Selector::parse("not-an-id"), None);
        assert_eq!(Selector::parse(""), None);
    }
}
