//! # Planning queries
//!
//! A planning is a header row plus one table per tree level. Reads use a
//! population chain: one query per level, all keyed by `planning_id`, then
//! [`TreeRows::into_tree`] assembles the tree in memory.
//!
//! Writes never touch the tables directly from handlers. A handler loads the
//! tree, edits it through the tree API and hands both versions to
//! [`sync_tree`], which writes the row difference inside the caller's
//! transaction:
//!
//! 1. deletes, children first (check-ins → sets → exercises → sessions → days → weeks)
//! 2. inserts, parents first
//! 3. updates

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::planning::{Planning, PlanningKind};
use crate::tree::rows::{
    CheckInRow, DayRow, ExerciseRow, RowDiff, SessionRow, SetRow, TreeChanges, TreeRows, WeekRow,
};
use crate::tree::PlanTree;
use chrono::NaiveDate;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, trainer_id, client_id, name, description, goal, start_date, \
                       week_count, kind, template_id, created_at, updated_at";

/// Header fields of a planning about to be inserted.
#[derive(Debug)]
pub struct NewPlanning<'a> {
    pub id: &'a str,
    pub trainer_id: &'a str,
    pub client_id: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub goal: Option<&'a str>,
    pub start_date: NaiveDate,
    pub kind: PlanningKind,
    pub template_id: Option<&'a str>,
}

/// Who is asking, for [`authorize`].
#[derive(Debug, Clone, Copy)]
pub enum Access<'a> {
    /// Only the owning trainer.
    Owner(&'a str),
    /// The owning trainer or the account linked to the planning's client.
    OwnerOrClient(&'a AuthUser),
}

// ── Header ──

pub async fn get_planning<'e, E>(executor: E, id: &str) -> Result<Option<Planning>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let planning = sqlx::query_as::<_, Planning>(&format!(
        "SELECT {} FROM plannings WHERE id = ?",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(planning)
}

pub async fn list_plannings(pool: &SqlitePool, trainer_id: &str) -> Result<Vec<Planning>, AppError> {
    let plannings = sqlx::query_as::<_, Planning>(&format!(
        "SELECT {} FROM plannings WHERE trainer_id = ? ORDER BY created_at DESC",
        COLUMNS
    ))
    .bind(trainer_id)
    .fetch_all(pool)
    .await?;

    Ok(plannings)
}

pub async fn list_for_client(pool: &SqlitePool, client_id: &str) -> Result<Vec<Planning>, AppError> {
    let plannings = sqlx::query_as::<_, Planning>(&format!(
        "SELECT {} FROM plannings WHERE client_id = ? ORDER BY start_date DESC",
        COLUMNS
    ))
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(plannings)
}

/// Loads the planning and checks the caller may see it. Missing → 404,
/// somebody else's → 403.
pub async fn authorize(
    conn: &mut SqliteConnection,
    id: &str,
    access: Access<'_>,
) -> Result<Planning, AppError> {
    let planning = get_planning(&mut *conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("planning"))?;

    let allowed = match access {
        Access::Owner(trainer_id) => planning.trainer_id == trainer_id,
        Access::OwnerOrClient(user) if user.is_trainer() => planning.trainer_id == user.user_id,
        Access::OwnerOrClient(user) => {
            let linked: Option<(i64,)> =
                sqlx::query_as("SELECT 1 FROM clients WHERE id = ? AND user_id = ?")
                    .bind(&planning.client_id)
                    .bind(&user.user_id)
                    .fetch_optional(&mut *conn)
                    .await?;
            linked.is_some()
        }
    };

    if !allowed {
        return Err(AppError::Forbidden(
            "You do not have access to this planning".to_string(),
        ));
    }
    Ok(planning)
}

/// Inserts the header and every row of `tree`. Runs on the caller's
/// transaction.
pub async fn insert_planning(
    conn: &mut SqliteConnection,
    new: &NewPlanning<'_>,
    tree: &PlanTree,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO plannings
            (id, trainer_id, client_id, name, description, goal, start_date, week_count, kind, template_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.id)
    .bind(new.trainer_id)
    .bind(new.client_id)
    .bind(new.name)
    .bind(new.description)
    .bind(new.goal)
    .bind(new.start_date)
    .bind(tree.weeks.len() as i64)
    .bind(new.kind)
    .bind(new.template_id)
    .execute(&mut *conn)
    .await?;

    sync_tree(conn, new.id, &PlanTree::default(), tree).await
}

pub async fn create_planning(
    pool: &SqlitePool,
    new: &NewPlanning<'_>,
    tree: &PlanTree,
) -> Result<Planning, AppError> {
    let mut tx = super::begin_write(pool).await?;
    insert_planning(&mut tx, new, tree).await?;
    tx.commit().await?;

    get_planning(pool, new.id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created planning".to_string()))
}

/// Deletes every row of the planning, children first, then the header.
pub async fn purge_planning(conn: &mut SqliteConnection, id: &str) -> Result<bool, AppError> {
    for table in [
        "check_ins",
        "sets",
        "planning_exercises",
        "sessions",
        "day_plans",
        "week_plans",
    ] {
        sqlx::query(&format!("DELETE FROM {} WHERE planning_id = ?", table))
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }

    let result = sqlx::query("DELETE FROM plannings WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ── Node → planning lookups ──

pub async fn planning_of_session(pool: &SqlitePool, session_id: &str) -> Result<Option<String>, AppError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT planning_id FROM sessions WHERE id = ?")
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(id,)| id))
}

pub async fn planning_of_set(pool: &SqlitePool, set_id: &str) -> Result<Option<String>, AppError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT planning_id FROM sets WHERE id = ?")
        .bind(set_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(id,)| id))
}

// ── Tree read / write ──

/// Population chain: weeks, days, sessions, exercises, sets, check-ins.
pub async fn load_tree(conn: &mut SqliteConnection, planning_id: &str) -> Result<PlanTree, AppError> {
    let weeks = sqlx::query_as::<_, WeekRow>(
        "SELECT id, planning_id, week_number, start_date FROM week_plans WHERE planning_id = ? ORDER BY week_number",
    )
    .bind(planning_id)
    .fetch_all(&mut *conn)
    .await?;

    let days = sqlx::query_as::<_, DayRow>(
        "SELECT id, planning_id, week_id, day_name, date FROM day_plans WHERE planning_id = ?",
    )
    .bind(planning_id)
    .fetch_all(&mut *conn)
    .await?;

    let sessions = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT id, planning_id, day_id, name, kind, rounds, position
        FROM sessions WHERE planning_id = ? ORDER BY position
        "#,
    )
    .bind(planning_id)
    .fetch_all(&mut *conn)
    .await?;

    let exercises = sqlx::query_as::<_, ExerciseRow>(
        r#"
        SELECT id, planning_id, session_id, exercise_id, position, campo1, campo2, campo3
        FROM planning_exercises WHERE planning_id = ? ORDER BY position
        "#,
    )
    .bind(planning_id)
    .fetch_all(&mut *conn)
    .await?;

    let sets = sqlx::query_as::<_, SetRow>(
        r#"
        SELECT id, planning_id, planning_exercise_id, position, reps, weight, rest, tempo, rpe,
               rir, speed, cadence, distance, height, calories, round, weight_type,
               rm_percentage, campo1, campo2, campo3
        FROM sets WHERE planning_id = ? ORDER BY position
        "#,
    )
    .bind(planning_id)
    .fetch_all(&mut *conn)
    .await?;

    let check_ins = sqlx::query_as::<_, CheckInRow>(
        r#"
        SELECT id, planning_id, set_id, position, color, comment, created_at
        FROM check_ins WHERE planning_id = ? ORDER BY position
        "#,
    )
    .bind(planning_id)
    .fetch_all(&mut *conn)
    .await?;

    let rows = TreeRows {
        weeks,
        days,
        sessions,
        exercises,
        sets,
        check_ins,
    };
    Ok(rows.into_tree())
}

/// Writes the difference between `before` and `after` and refreshes the
/// header's week count. No-op when nothing changed.
pub async fn sync_tree(
    conn: &mut SqliteConnection,
    planning_id: &str,
    before: &PlanTree,
    after: &PlanTree,
) -> Result<(), AppError> {
    let changes = TreeChanges::between(
        &TreeRows::to_rows(planning_id, before),
        &TreeRows::to_rows(planning_id, after),
    );
    if changes.is_empty() {
        return Ok(());
    }

    delete_rows(conn, "check_ins", &changes.check_ins).await?;
    delete_rows(conn, "sets", &changes.sets).await?;
    delete_rows(conn, "planning_exercises", &changes.exercises).await?;
    delete_rows(conn, "sessions", &changes.sessions).await?;
    delete_rows(conn, "day_plans", &changes.days).await?;
    delete_rows(conn, "week_plans", &changes.weeks).await?;

    for row in &changes.weeks.inserted {
        insert_week(conn, row).await?;
    }
    for row in &changes.days.inserted {
        insert_day(conn, row).await?;
    }
    for row in &changes.sessions.inserted {
        insert_session(conn, row).await?;
    }
    for row in &changes.exercises.inserted {
        insert_exercise(conn, row).await?;
    }
    for row in &changes.sets.inserted {
        write_set(conn, row, false).await?;
    }
    for row in &changes.check_ins.inserted {
        insert_check_in(conn, row).await?;
    }

    for row in &changes.weeks.updated {
        sqlx::query("UPDATE week_plans SET week_number = ?, start_date = ? WHERE id = ?")
            .bind(row.week_number)
            .bind(row.start_date)
            .bind(&row.id)
            .execute(&mut *conn)
            .await?;
    }
    for row in &changes.days.updated {
        sqlx::query("UPDATE day_plans SET date = ? WHERE id = ?")
            .bind(row.date)
            .bind(&row.id)
            .execute(&mut *conn)
            .await?;
    }
    for row in &changes.sessions.updated {
        sqlx::query("UPDATE sessions SET name = ?, kind = ?, rounds = ?, position = ? WHERE id = ?")
            .bind(&row.name)
            .bind(row.kind)
            .bind(row.rounds)
            .bind(row.position)
            .bind(&row.id)
            .execute(&mut *conn)
            .await?;
    }
    for row in &changes.exercises.updated {
        sqlx::query(
            "UPDATE planning_exercises SET position = ?, campo1 = ?, campo2 = ?, campo3 = ? WHERE id = ?",
        )
        .bind(row.position)
        .bind(row.campo1)
        .bind(row.campo2)
        .bind(row.campo3)
        .bind(&row.id)
        .execute(&mut *conn)
        .await?;
    }
    for row in &changes.sets.updated {
        write_set(conn, row, true).await?;
    }

    sqlx::query(
        r#"
        UPDATE plannings
        SET week_count = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(after.weeks.len() as i64)
    .bind(planning_id)
    .execute(&mut *conn)
    .await?;

    tracing::debug!(
        planning_id,
        weeks = after.weeks.len(),
        sets = after.set_count(),
        "planning tree synced"
    );
    Ok(())
}

async fn delete_rows<R: crate::tree::rows::Row>(
    conn: &mut SqliteConnection,
    table: &str,
    diff: &RowDiff<R>,
) -> Result<(), AppError> {
    for id in &diff.deleted {
        sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn insert_week(conn: &mut SqliteConnection, row: &WeekRow) -> Result<(), AppError> {
    sqlx::query("INSERT INTO week_plans (id, planning_id, week_number, start_date) VALUES (?, ?, ?, ?)")
        .bind(&row.id)
        .bind(&row.planning_id)
        .bind(row.week_number)
        .bind(row.start_date)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_day(conn: &mut SqliteConnection, row: &DayRow) -> Result<(), AppError> {
    sqlx::query("INSERT INTO day_plans (id, planning_id, week_id, day_name, date) VALUES (?, ?, ?, ?, ?)")
        .bind(&row.id)
        .bind(&row.planning_id)
        .bind(&row.week_id)
        .bind(row.day_name)
        .bind(row.date)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_session(conn: &mut SqliteConnection, row: &SessionRow) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO sessions (id, planning_id, day_id, name, kind, rounds, position)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.id)
    .bind(&row.planning_id)
    .bind(&row.day_id)
    .bind(&row.name)
    .bind(row.kind)
    .bind(row.rounds)
    .bind(row.position)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_exercise(conn: &mut SqliteConnection, row: &ExerciseRow) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO planning_exercises
            (id, planning_id, session_id, exercise_id, position, campo1, campo2, campo3)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.id)
    .bind(&row.planning_id)
    .bind(&row.session_id)
    .bind(&row.exercise_id)
    .bind(row.position)
    .bind(row.campo1)
    .bind(row.campo2)
    .bind(row.campo3)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Sets have too many columns for two hand-written statements; insert and
/// update share the value list.
async fn write_set(conn: &mut SqliteConnection, row: &SetRow, update: bool) -> Result<(), AppError> {
    let sql = if update {
        r#"
        UPDATE sets SET
            planning_id = ?1, planning_exercise_id = ?2, position = ?3, reps = ?4, weight = ?5,
            rest = ?6, tempo = ?7, rpe = ?8, rir = ?9, speed = ?10, cadence = ?11,
            distance = ?12, height = ?13, calories = ?14, round = ?15, weight_type = ?16,
            rm_percentage = ?17, campo1 = ?18, campo2 = ?19, campo3 = ?20
        WHERE id = ?21
        "#
    } else {
        r#"
        INSERT INTO sets
            (planning_id, planning_exercise_id, position, reps, weight, rest, tempo, rpe, rir,
             speed, cadence, distance, height, calories, round, weight_type, rm_percentage,
             campo1, campo2, campo3, id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                ?18, ?19, ?20, ?21)
        "#
    };

    sqlx::query(sql)
        .bind(&row.planning_id)
        .bind(&row.planning_exercise_id)
        .bind(row.position)
        .bind(row.reps)
        .bind(row.weight)
        .bind(row.rest)
        .bind(row.tempo)
        .bind(row.rpe)
        .bind(row.rir)
        .bind(row.speed)
        .bind(row.cadence)
        .bind(row.distance)
        .bind(row.height)
        .bind(row.calories)
        .bind(row.round)
        .bind(row.weight_type)
        .bind(row.rm_percentage)
        .bind(row.campo1)
        .bind(row.campo2)
        .bind(row.campo3)
        .bind(&row.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_check_in(conn: &mut SqliteConnection, row: &CheckInRow) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO check_ins (id, planning_id, set_id, position, color, comment, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.id)
    .bind(&row.planning_id)
    .bind(&row.set_id)
    .bind(row.position)
    .bind(row.color)
    .bind(&row.comment)
    .bind(&row.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Loads, edits and syncs a planning tree in one transaction. `edit` sees
/// the header (already authorized) and a mutable copy of the tree; if it
/// fails nothing is written.
pub async fn edit_tree<T>(
    pool: &SqlitePool,
    planning_id: &str,
    access: Access<'_>,
    edit: impl FnOnce(&Planning, &mut PlanTree) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut tx = super::begin_write(pool).await?;
    let planning = authorize(&mut tx, planning_id, access).await?;
    let before = load_tree(&mut tx, planning_id).await?;

    let mut tree = before.clone();
    let out = edit(&planning, &mut tree)?;

    sync_tree(&mut tx, planning_id, &before, &tree).await?;
    tx.commit().await?;
    Ok(out)
}

/// Authorized read of the populated tree.
pub async fn read_tree(
    pool: &SqlitePool,
    planning_id: &str,
    access: Access<'_>,
) -> Result<(Planning, PlanTree), AppError> {
    let mut conn = pool.acquire().await?;
    let planning = authorize(&mut conn, planning_id, access).await?;
    let tree = load_tree(&mut conn, planning_id).await?;
    Ok((planning, tree))
}
