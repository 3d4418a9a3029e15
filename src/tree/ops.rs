//! # Tree mutations
//!
//! Construction (scaffold, append week), session / exercise / set edits,
//! check-ins, whole-tree validation and template instantiation. All edits
//! resolve their target through [`PlanTree::resolve`] first, so a failed
//! lookup never leaves a partial change behind.

use super::{
    new_id, CheckIn, Color, Day, DayName, Exercise, NodePath, PlanTree, RenderConfig,
    RenderConfigPatch, Session, SessionKind, Set, SetInput, TreeError, Week,
};
use crate::services::calendar;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// Longest plan accepted when scaffolding (two years).
pub const MAX_WEEKS: u32 = 104;

#[derive(Debug, Clone, Deserialize)]
pub struct NewSession {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "type", alias = "tipo", alias = "sessionType")]
    pub kind: SessionKind,
    #[serde(alias = "rondas")]
    pub rounds: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionPatch {
    pub name: Option<String>,
    pub kind: Option<SessionKind>,
    /// `Some(None)` clears the round count.
    #[serde(default, deserialize_with = "double_option")]
    pub rounds: Option<Option<i64>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewExercise {
    #[serde(alias = "exerciseId", alias = "ejercicio")]
    pub exercise_id: String,
    #[serde(default, alias = "renderConfig")]
    pub render_config: Option<RenderConfig>,
    #[serde(default, alias = "series")]
    pub sets: Vec<SetInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCheckIn {
    pub color: Color,
    #[serde(alias = "comentario")]
    pub comment: Option<String>,
}

fn check_name(name: &str) -> Result<String, TreeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TreeError::invalid("name", "must not be empty"));
    }
    Ok(name.to_string())
}

fn check_rounds(rounds: Option<i64>) -> Result<Option<i64>, TreeError> {
    match rounds {
        Some(r) if r < 1 => Err(TreeError::invalid("rounds", "must be a positive integer")),
        other => Ok(other),
    }
}

impl Set {
    pub fn from_input(input: SetInput) -> Result<Set, TreeError> {
        Ok(Set {
            id: new_id(),
            values: input.values.normalize()?,
            render_config: input.render_config.unwrap_or_default(),
            check_ins: Vec::new(),
        })
    }
}

/// Builds sets in order; errors name the offending set (`sets[1].weight`).
pub fn build_sets(inputs: Vec<SetInput>) -> Result<Vec<Set>, TreeError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| Set::from_input(input).map_err(|e| e.within(&format!("sets[{}]", i))))
        .collect()
}

impl Session {
    pub fn new(input: NewSession, order: u32) -> Result<Session, TreeError> {
        Ok(Session {
            id: new_id(),
            name: check_name(&input.name)?,
            kind: input.kind,
            rounds: check_rounds(input.rounds)?,
            order,
            exercises: Vec::new(),
        })
    }

    /// Appends an exercise; its order is the new length.
    pub fn push_exercise(&mut self, input: NewExercise) -> Result<&Exercise, TreeError> {
        let order = self.exercises.len() as u32 + 1;
        let exercise = Exercise::new(input, order)?;
        let at = self.exercises.len();
        self.exercises.push(exercise);
        Ok(&self.exercises[at])
    }
}

impl Exercise {
    pub fn new(input: NewExercise, order: u32) -> Result<Exercise, TreeError> {
        if input.exercise_id.trim().is_empty() {
            return Err(TreeError::invalid("exercise_id", "is required"));
        }
        Ok(Exercise {
            id: new_id(),
            exercise_id: input.exercise_id,
            order,
            render_config: input.render_config,
            sets: build_sets(input.sets)?,
        })
    }
}

fn renumber_sessions(sessions: &mut [Session]) {
    for (i, session) in sessions.iter_mut().enumerate() {
        session.order = i as u32 + 1;
    }
}

fn renumber_exercises(exercises: &mut [Exercise]) {
    for (i, exercise) in exercises.iter_mut().enumerate() {
        exercise.order = i as u32 + 1;
    }
}

fn empty_week(number: u32, start_date: Option<NaiveDate>) -> Week {
    let days = DayName::ALL
        .iter()
        .map(|&day| (day, Day::empty(start_date.map(|s| calendar::day_date(s, day)))))
        .collect();
    Week {
        id: new_id(),
        number,
        start_date,
        days,
    }
}

impl PlanTree {
    /// `weeks` empty weeks with all seven days. Dated from `start` when given
    /// (plannings); undated for templates.
    pub fn scaffold(start: Option<NaiveDate>, weeks: u32) -> PlanTree {
        let weeks = (1..=weeks)
            .map(|number| empty_week(number, start.map(|s| calendar::week_start(s, number))))
            .collect();
        PlanTree { weeks }
    }

    /// Appends week `len + 1`, dated seven days after the last dated week, or
    /// from `fallback_start` when there is none.
    pub fn append_week(&mut self, fallback_start: Option<NaiveDate>) -> &Week {
        let number = self.weeks.iter().map(|w| w.number).max().unwrap_or(0) + 1;
        let start = match self.weeks.last().and_then(|w| w.start_date) {
            Some(previous) => Some(calendar::week_start(previous, 2)),
            None => fallback_start.map(|s| calendar::week_start(s, number)),
        };
        self.weeks.push(empty_week(number, start));
        let at = self.weeks.len() - 1;
        &self.weeks[at]
    }

    pub fn add_session(&mut self, path: &NodePath, input: NewSession) -> Result<&Session, TreeError> {
        let day = self.day_mut(path)?;
        let session = Session::new(input, day.sessions.len() as u32 + 1)?;
        let at = day.sessions.len();
        day.sessions.push(session);
        Ok(&day.sessions[at])
    }

    pub fn update_session(&mut self, path: &NodePath, patch: SessionPatch) -> Result<&Session, TreeError> {
        let name = patch.name.as_deref().map(check_name).transpose()?;
        let rounds = patch.rounds.map(check_rounds).transpose()?;

        let session = self.session_mut(path)?;
        if let Some(name) = name {
            session.name = name;
        }
        if let Some(kind) = patch.kind {
            session.kind = kind;
        }
        if let Some(rounds) = rounds {
            session.rounds = rounds;
        }
        Ok(&*session)
    }

    /// Detaches the session and everything below it. The removed subtree is
    /// returned so callers can report what went away.
    pub fn remove_session(&mut self, path: &NodePath) -> Result<Session, TreeError> {
        let at = self.resolve(path)?;
        let index = at.session.ok_or(super::LocateError::Missing(super::Level::Session))?;
        let day = self.day_mut(path)?;
        let removed = day.sessions.remove(index);
        renumber_sessions(&mut day.sessions);
        Ok(removed)
    }

    pub fn add_exercise(&mut self, path: &NodePath, input: NewExercise) -> Result<&Exercise, TreeError> {
        self.session_mut(path)?.push_exercise(input)
    }

    /// Replaces every set of the exercise. There is no partial set update.
    pub fn replace_sets(&mut self, path: &NodePath, inputs: Vec<SetInput>) -> Result<&Exercise, TreeError> {
        let sets = build_sets(inputs)?;
        let exercise = self.exercise_mut(path)?;
        exercise.sets = sets;
        Ok(&*exercise)
    }

    pub fn remove_exercise(&mut self, path: &NodePath) -> Result<Exercise, TreeError> {
        let at = self.resolve(path)?;
        let index = at.exercise.ok_or(super::LocateError::Missing(super::Level::Exercise))?;
        let session = self.session_mut(path)?;
        let removed = session.exercises.remove(index);
        renumber_exercises(&mut session.exercises);
        Ok(removed)
    }

    pub fn update_render_config(&mut self, path: &NodePath, patch: &RenderConfigPatch) -> Result<&Set, TreeError> {
        let set = self.set_mut(path)?;
        set.render_config.apply(patch);
        Ok(&*set)
    }

    pub fn add_check_in(
        &mut self,
        path: &NodePath,
        input: NewCheckIn,
        at: DateTime<Utc>,
    ) -> Result<&CheckIn, TreeError> {
        let comment = input
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let set = self.set_mut(path)?;
        set.check_ins.push(CheckIn {
            id: new_id(),
            color: input.color,
            comment,
            created_at: at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        });
        let last = set.check_ins.len() - 1;
        Ok(&set.check_ins[last])
    }

    /// Checks a tree received as a whole (template create / replace). Week
    /// numbers must run 1..=n without repeats or gaps; session names,
    /// rounds and sets are checked and normalized. Weeks are sorted, missing
    /// days filled in empty and order fields renumbered.
    pub fn validate(&mut self) -> Result<(), TreeError> {
        let mut seen = HashSet::new();
        for week in &self.weeks {
            if week.number == 0 {
                return Err(TreeError::invalid("weeks.number", "week numbers start at 1"));
            }
            if !seen.insert(week.number) {
                return Err(TreeError::invalid(
                    "weeks.number",
                    format!("week {} appears more than once", week.number),
                ));
            }
        }
        self.weeks.sort_by_key(|w| w.number);
        let total = self.weeks.len();
        if let Some(gap) = (1..).zip(&self.weeks).find(|(n, w)| w.number != *n) {
            return Err(TreeError::invalid(
                "weeks.number",
                format!("week {} is missing; weeks run 1 to {} without gaps", gap.0, total),
            ));
        }

        for week in &mut self.weeks {
            for name in DayName::ALL {
                let date = week.start_date.map(|s| calendar::day_date(s, name));
                week.days.entry(name).or_insert_with(|| Day::empty(date));
            }
            let prefix = format!("weeks[{}]", week.number);
            for (day_name, day) in week.days.iter_mut() {
                for session in day.sessions.iter_mut() {
                    let within = format!("{}.{}", prefix, day_name);
                    session.name = check_name(&session.name).map_err(|e| e.within(&within))?;
                    check_rounds(session.rounds).map_err(|e| e.within(&within))?;
                    for exercise in session.exercises.iter_mut() {
                        if exercise.exercise_id.trim().is_empty() {
                            return Err(TreeError::invalid("exercise_id", "is required").within(&within));
                        }
                        for (i, set) in exercise.sets.iter_mut().enumerate() {
                            set.values = std::mem::take(&mut set.values)
                                .normalize()
                                .map_err(|e| e.within(&format!("{}.sets[{}]", within, i)))?;
                        }
                    }
                    renumber_exercises(&mut session.exercises);
                }
                renumber_sessions(&mut day.sessions);
            }
        }
        Ok(())
    }

    /// Deep copy with new ids everywhere and no check-ins.
    pub fn with_fresh_ids(&self) -> PlanTree {
        let weeks = self
            .weeks
            .iter()
            .map(|week| Week {
                id: new_id(),
                number: week.number,
                start_date: week.start_date,
                days: week
                    .days
                    .iter()
                    .map(|(name, day)| {
                        let copy = Day {
                            id: new_id(),
                            date: day.date,
                            sessions: day.sessions.iter().map(fresh_session).collect(),
                        };
                        (*name, copy)
                    })
                    .collect::<BTreeMap<_, _>>(),
            })
            .collect();
        PlanTree { weeks }
    }

    /// Stamps a concrete, dated copy of this tree: fresh ids, week `n` starting
    /// `anchor + (n-1)*7` days, each day dated by its offset in the week.
    pub fn instantiate(&self, anchor: NaiveDate) -> PlanTree {
        let mut tree = self.with_fresh_ids();
        for week in &mut tree.weeks {
            let start = calendar::week_start(anchor, week.number);
            week.start_date = Some(start);
            for (name, day) in week.days.iter_mut() {
                day.date = Some(calendar::day_date(start, *name));
            }
            for name in DayName::ALL {
                week.days
                    .entry(name)
                    .or_insert_with(|| Day::empty(Some(calendar::day_date(start, name))));
            }
        }
        tree
    }

    pub fn set_count(&self) -> usize {
        self.weeks
            .iter()
            .flat_map(|w| w.days.values())
            .flat_map(|d| d.sessions.iter())
            .flat_map(|s| s.exercises.iter())
            .map(|e| e.sets.len())
            .sum()
    }
}

fn fresh_session(session: &Session) -> Session {
    Session {
        id: new_id(),
        name: session.name.clone(),
        kind: session.kind,
        rounds: session.rounds,
        order: session.order,
        exercises: session
            .exercises
            .iter()
            .map(|exercise| Exercise {
                id: new_id(),
                exercise_id: exercise.exercise_id.clone(),
                order: exercise.order,
                render_config: exercise.render_config,
                sets: exercise
                    .sets
                    .iter()
                    .map(|set| Set {
                        id: new_id(),
                        values: set.values.clone(),
                        render_config: set.render_config,
                        check_ins: Vec::new(),
                    })
                    .collect(),
            })
            .collect(),
    }
}
