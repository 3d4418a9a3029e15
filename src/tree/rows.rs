//! # Row mapping (reference-on-write shape)
//!
//! Plannings live in one table per level (`week_plans`, `day_plans`,
//! `sessions`, `planning_exercises`, `sets`, `check_ins`). This module turns
//! a [`PlanTree`] into those rows and back, and computes the row-level
//! difference between two versions of a tree so a mutation only writes what
//! changed.
//!
//! Every row carries its `planning_id`, which lets each level be loaded with
//! a single query.

use super::{
    CheckIn, Color, Day, DayName, Exercise, PlanTree, RenderConfig, RenderField, Session,
    SessionKind, Set, SetValues, Week, WeightType,
};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct WeekRow {
    pub id: String,
    pub planning_id: String,
    pub week_number: i64,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DayRow {
    pub id: String,
    pub planning_id: String,
    pub week_id: String,
    pub day_name: DayName,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SessionRow {
    pub id: String,
    pub planning_id: String,
    pub day_id: String,
    pub name: String,
    pub kind: SessionKind,
    pub rounds: Option<i64>,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ExerciseRow {
    pub id: String,
    pub planning_id: String,
    pub session_id: String,
    pub exercise_id: String,
    pub position: i64,
    pub campo1: Option<RenderField>,
    pub campo2: Option<RenderField>,
    pub campo3: Option<RenderField>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SetRow {
    pub id: String,
    pub planning_id: String,
    pub planning_exercise_id: String,
    pub position: i64,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
    pub rest: Option<f64>,
    pub tempo: Option<f64>,
    pub rpe: Option<f64>,
    pub rir: Option<f64>,
    pub speed: Option<f64>,
    pub cadence: Option<f64>,
    pub distance: Option<f64>,
    pub height: Option<f64>,
    pub calories: Option<f64>,
    pub round: Option<i64>,
    pub weight_type: WeightType,
    pub rm_percentage: Option<f64>,
    pub campo1: RenderField,
    pub campo2: RenderField,
    pub campo3: RenderField,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CheckInRow {
    pub id: String,
    pub planning_id: String,
    pub set_id: String,
    pub position: i64,
    pub color: Color,
    pub comment: Option<String>,
    pub created_at: String,
}

/// All rows of one planning's tree, level by level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeRows {
    pub weeks: Vec<WeekRow>,
    pub days: Vec<DayRow>,
    pub sessions: Vec<SessionRow>,
    pub exercises: Vec<ExerciseRow>,
    pub sets: Vec<SetRow>,
    pub check_ins: Vec<CheckInRow>,
}

impl TreeRows {
    pub fn to_rows(planning_id: &str, tree: &PlanTree) -> TreeRows {
        let mut rows = TreeRows::default();
        let pid = planning_id.to_string();

        for week in &tree.weeks {
            rows.weeks.push(WeekRow {
                id: week.id.clone(),
                planning_id: pid.clone(),
                week_number: i64::from(week.number),
                start_date: week.start_date,
            });
            for (name, day) in &week.days {
                rows.days.push(DayRow {
                    id: day.id.clone(),
                    planning_id: pid.clone(),
                    week_id: week.id.clone(),
                    day_name: *name,
                    date: day.date,
                });
                for (s, session) in day.sessions.iter().enumerate() {
                    rows.sessions.push(SessionRow {
                        id: session.id.clone(),
                        planning_id: pid.clone(),
                        day_id: day.id.clone(),
                        name: session.name.clone(),
                        kind: session.kind,
                        rounds: session.rounds,
                        position: s as i64,
                    });
                    for (e, exercise) in session.exercises.iter().enumerate() {
                        let config = exercise.render_config;
                        rows.exercises.push(ExerciseRow {
                            id: exercise.id.clone(),
                            planning_id: pid.clone(),
                            session_id: session.id.clone(),
                            exercise_id: exercise.exercise_id.clone(),
                            position: e as i64,
                            campo1: config.map(|c| c.campo1),
                            campo2: config.map(|c| c.campo2),
                            campo3: config.map(|c| c.campo3),
                        });
                        for (t, set) in exercise.sets.iter().enumerate() {
                            rows.sets.push(set_row(&pid, &exercise.id, t, set));
                            for (c, check_in) in set.check_ins.iter().enumerate() {
                                rows.check_ins.push(CheckInRow {
                                    id: check_in.id.clone(),
                                    planning_id: pid.clone(),
                                    set_id: set.id.clone(),
                                    position: c as i64,
                                    color: check_in.color,
                                    comment: check_in.comment.clone(),
                                    created_at: check_in.created_at.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
        rows
    }

    /// Reassembles the tree. Rows whose parent is absent are dropped.
    pub fn into_tree(self) -> PlanTree {
        let mut check_ins = group(self.check_ins, |r| &r.set_id, |r| r.position);
        let mut sets = group(self.sets, |r| &r.planning_exercise_id, |r| r.position);
        let mut exercises = group(self.exercises, |r| &r.session_id, |r| r.position);
        let mut sessions = group(self.sessions, |r| &r.day_id, |r| r.position);
        let mut days = group(self.days, |r| &r.week_id, |r| r.day_name.number() as i64);

        let mut weeks = self.weeks;
        weeks.sort_by_key(|w| w.week_number);

        let weeks = weeks
            .into_iter()
            .map(|week| {
                let days = take(&mut days, &week.id)
                    .into_iter()
                    .map(|day| {
                        let sessions = take(&mut sessions, &day.id)
                            .into_iter()
                            .map(|session| {
                                let exercises = take(&mut exercises, &session.id)
                                    .into_iter()
                                    .map(|exercise| {
                                        let sets = take(&mut sets, &exercise.id)
                                            .into_iter()
                                            .map(|set| {
                                                let check_ins = take(&mut check_ins, &set.id)
                                                    .into_iter()
                                                    .map(|c| CheckIn {
                                                        id: c.id,
                                                        color: c.color,
                                                        comment: c.comment,
                                                        created_at: c.created_at,
                                                    })
                                                    .collect();
                                                set_from_row(set, check_ins)
                                            })
                                            .collect();
                                        exercise_from_row(exercise, sets)
                                    })
                                    .collect();
                                Session {
                                    id: session.id,
                                    name: session.name,
                                    kind: session.kind,
                                    rounds: session.rounds,
                                    order: session.position as u32 + 1,
                                    exercises,
                                }
                            })
                            .collect();
                        (
                            day.day_name,
                            Day {
                                id: day.id,
                                date: day.date,
                                sessions,
                            },
                        )
                    })
                    .collect();
                Week {
                    id: week.id,
                    number: week.week_number as u32,
                    start_date: week.start_date,
                    days,
                }
            })
            .collect();

        PlanTree { weeks }
    }
}

fn set_row(planning_id: &str, exercise_id: &str, position: usize, set: &Set) -> SetRow {
    let v = &set.values;
    SetRow {
        id: set.id.clone(),
        planning_id: planning_id.to_string(),
        planning_exercise_id: exercise_id.to_string(),
        position: position as i64,
        reps: v.reps,
        weight: v.weight,
        rest: v.rest,
        tempo: v.tempo,
        rpe: v.rpe,
        rir: v.rir,
        speed: v.speed,
        cadence: v.cadence,
        distance: v.distance,
        height: v.height,
        calories: v.calories,
        round: v.round,
        weight_type: v.weight_type,
        rm_percentage: v.rm_percentage,
        campo1: set.render_config.campo1,
        campo2: set.render_config.campo2,
        campo3: set.render_config.campo3,
    }
}

fn set_from_row(row: SetRow, check_ins: Vec<CheckIn>) -> Set {
    Set {
        id: row.id,
        values: SetValues {
            reps: row.reps,
            weight: row.weight,
            rest: row.rest,
            tempo: row.tempo,
            rpe: row.rpe,
            rir: row.rir,
            speed: row.speed,
            cadence: row.cadence,
            distance: row.distance,
            height: row.height,
            calories: row.calories,
            round: row.round,
            weight_type: row.weight_type,
            rm_percentage: row.rm_percentage,
        },
        render_config: RenderConfig {
            campo1: row.campo1,
            campo2: row.campo2,
            campo3: row.campo3,
        },
        check_ins,
    }
}

fn exercise_from_row(row: ExerciseRow, sets: Vec<Set>) -> Exercise {
    let render_config = match (row.campo1, row.campo2, row.campo3) {
        (Some(campo1), Some(campo2), Some(campo3)) => Some(RenderConfig {
            campo1,
            campo2,
            campo3,
        }),
        _ => None,
    };
    Exercise {
        id: row.id,
        exercise_id: row.exercise_id,
        order: row.position as u32 + 1,
        render_config,
        sets,
    }
}

fn group<R>(
    rows: Vec<R>,
    parent: impl Fn(&R) -> &String,
    position: impl Fn(&R) -> i64,
) -> HashMap<String, Vec<R>> {
    let mut grouped: HashMap<String, Vec<R>> = HashMap::new();
    for row in rows {
        grouped.entry(parent(&row).clone()).or_default().push(row);
    }
    for children in grouped.values_mut() {
        children.sort_by_key(|r| position(r));
    }
    grouped
}

fn take<R>(grouped: &mut HashMap<String, Vec<R>>, parent: &str) -> Vec<R> {
    grouped.remove(parent).unwrap_or_default()
}

// ── Diffing ──

pub trait Row: Clone + PartialEq {
    fn id(&self) -> &str;
}

macro_rules! impl_row {
    ($($ty:ty),*) => {
        $(impl Row for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_row!(WeekRow, DayRow, SessionRow, ExerciseRow, SetRow, CheckInRow);

/// Rows to insert, update and delete to turn `before` into `after`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDiff<R> {
    pub inserted: Vec<R>,
    pub updated: Vec<R>,
    pub deleted: Vec<String>,
}

impl<R: Row> RowDiff<R> {
    pub fn between(before: &[R], after: &[R]) -> Self {
        let old: HashMap<&str, &R> = before.iter().map(|r| (r.id(), r)).collect();
        let new: HashMap<&str, &R> = after.iter().map(|r| (r.id(), r)).collect();

        let mut inserted = Vec::new();
        let mut updated = Vec::new();
        for row in after {
            match old.get(row.id()) {
                None => inserted.push(row.clone()),
                Some(previous) if *previous != row => updated.push(row.clone()),
                Some(_) => {}
            }
        }
        let deleted = before
            .iter()
            .filter(|r| !new.contains_key(r.id()))
            .map(|r| r.id().to_string())
            .collect();

        Self {
            inserted,
            updated,
            deleted,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeChanges {
    pub weeks: RowDiff<WeekRow>,
    pub days: RowDiff<DayRow>,
    pub sessions: RowDiff<SessionRow>,
    pub exercises: RowDiff<ExerciseRow>,
    pub sets: RowDiff<SetRow>,
    pub check_ins: RowDiff<CheckInRow>,
}

impl TreeChanges {
    pub fn between(before: &TreeRows, after: &TreeRows) -> Self {
        Self {
            weeks: RowDiff::between(&before.weeks, &after.weeks),
            days: RowDiff::between(&before.days, &after.days),
            sessions: RowDiff::between(&before.sessions, &after.sessions),
            exercises: RowDiff::between(&before.exercises, &after.exercises),
            sets: RowDiff::between(&before.sets, &after.sets),
            check_ins: RowDiff::between(&before.check_ins, &after.check_ins),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
            && self.days.is_empty()
            && self.sessions.is_empty()
            && self.exercises.is_empty()
            && self.sets.is_empty()
            && self.check_ins.is_empty()
    }
}
