//! # Skeleton (Esqueleto) tree
//!
//! A plan outline without dates: weeks → days (numbered 1..7) → color-coded
//! variants → sessions → exercises. Sessions and exercises are the same
//! nodes used by [`PlanTree`](super::PlanTree), so set validation is shared.

use super::{
    new_id, Color, DayName, Exercise, LocateError, NewExercise, NewSession, Selector, Session,
    TreeError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default = "new_id")]
    pub id: String,
    pub color: Color,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonDay {
    #[serde(default = "new_id")]
    pub id: String,
    pub day_number: u8,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonWeek {
    #[serde(default = "new_id")]
    pub id: String,
    pub week_number: u32,
    #[serde(default)]
    pub days: Vec<SkeletonDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonTree {
    #[serde(default)]
    pub weeks: Vec<SkeletonWeek>,
}

fn empty_week(week_number: u32) -> SkeletonWeek {
    SkeletonWeek {
        id: new_id(),
        week_number,
        days: DayName::ALL
            .iter()
            .map(|day| SkeletonDay {
                id: new_id(),
                day_number: day.number(),
                variants: Vec::new(),
            })
            .collect(),
    }
}

impl SkeletonTree {
    pub fn scaffold(weeks: u32) -> SkeletonTree {
        SkeletonTree {
            weeks: (1..=weeks).map(empty_week).collect(),
        }
    }

    pub fn append_week(&mut self) -> &SkeletonWeek {
        let number = self.weeks.iter().map(|w| w.week_number).max().unwrap_or(0) + 1;
        self.weeks.push(empty_week(number));
        let at = self.weeks.len() - 1;
        &self.weeks[at]
    }

    fn day_mut(&mut self, week: u32, day: u8) -> Result<&mut SkeletonDay, TreeError> {
        let name = DayName::from_number(i64::from(day))
            .ok_or_else(|| TreeError::invalid("day", "day number must be between 1 and 7"))?;
        let found = self
            .weeks
            .iter_mut()
            .find(|w| w.week_number == week)
            .ok_or(LocateError::Week(week))?
            .days
            .iter_mut()
            .find(|d| d.day_number == day)
            .ok_or(LocateError::Day { week, day: name })?;
        Ok(found)
    }

    fn variant_mut(&mut self, week: u32, day: u8, color: Color) -> Result<&mut Variant, TreeError> {
        let found = self
            .day_mut(week, day)?
            .variants
            .iter_mut()
            .find(|v| v.color == color)
            .ok_or(LocateError::Variant(color))?;
        Ok(found)
    }

    /// One variant per color and day.
    pub fn add_variant(&mut self, week: u32, day: u8, color: Color) -> Result<&Variant, TreeError> {
        let day_node = self.day_mut(week, day)?;
        if day_node.variants.iter().any(|v| v.color == color) {
            return Err(TreeError::Conflict(format!(
                "variant {} already exists on week {} day {}",
                color, week, day
            )));
        }
        let order = day_node.variants.len() as u32 + 1;
        day_node.variants.push(Variant {
            id: new_id(),
            color,
            order,
            sessions: Vec::new(),
        });
        let at = day_node.variants.len() - 1;
        Ok(&day_node.variants[at])
    }

    pub fn add_session(
        &mut self,
        week: u32,
        day: u8,
        color: Color,
        input: NewSession,
    ) -> Result<&Session, TreeError> {
        let variant = self.variant_mut(week, day, color)?;
        let session = Session::new(input, variant.sessions.len() as u32 + 1)?;
        let at = variant.sessions.len();
        variant.sessions.push(session);
        Ok(&variant.sessions[at])
    }

    pub fn add_exercise(
        &mut self,
        week: u32,
        day: u8,
        color: Color,
        session: &Selector,
        input: NewExercise,
    ) -> Result<&Exercise, TreeError> {
        let variant = self.variant_mut(week, day, color)?;
        let at = session
            .position(&variant.sessions, |s| &s.id)
            .ok_or_else(|| LocateError::Session(session.clone()))?;
        variant.sessions[at].push_exercise(input)
    }
}
