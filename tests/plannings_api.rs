mod common;

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate};
use common::{
    create_client, create_exercise, create_planning, data, error_code, link_client, register, spawn,
};
use serde_json::{json, Value};

async fn add_session(app: &common::TestApp, planning_id: &str, day: &str, name: &str) -> Value {
    let response = app
        .server
        .post("/api/v1/plannings/session")
        .authorization_bearer(&app.token)
        .json(&json!({
            "planning_id": planning_id,
            "week": 1,
            "day": day,
            "name": name,
            "kind": "Normal",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    data(response.json())
}

async fn add_exercise(app: &common::TestApp, session_id: &str, exercise_id: &str, sets: Value) -> Value {
    let response = app
        .server
        .post(&format!("/api/v1/plannings/session/{}/exercise", session_id))
        .authorization_bearer(&app.token)
        .json(&json!({ "exercise_id": exercise_id, "sets": sets }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    data(response.json())
}

#[tokio::test]
async fn new_planning_has_every_week_and_day() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;

    let planning = create_planning(&app.server, &app.token, &client_id, 3).await;
    assert_eq!(planning["week_count"], 3);
    assert_eq!(planning["kind"], "plan");

    let weeks = planning["weeks"].as_array().unwrap();
    assert_eq!(weeks.len(), 3);
    for (i, week) in weeks.iter().enumerate() {
        assert_eq!(week["number"], i as u64 + 1);
        assert_eq!(week["days"].as_object().unwrap().len(), 7);
    }
    assert_eq!(weeks[0]["start_date"], "2026-01-05");
    assert_eq!(weeks[1]["start_date"], "2026-01-12");
    assert_eq!(weeks[0]["days"]["Lunes"]["date"], "2026-01-05");
    assert_eq!(weeks[0]["days"]["Domingo"]["date"], "2026-01-11");

    // Same shape on a fresh read.
    let id = planning["id"].as_str().unwrap();
    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}", id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let read = data(response.json());
    assert_eq!(read["weeks"], planning["weeks"]);
}

#[tokio::test]
async fn planning_creation_validates_input() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;

    let response = app
        .server
        .post("/api/v1/plannings")
        .authorization_bearer(&app.token)
        .json(&json!({
            "name": "Too long",
            "start_date": "2026-01-05",
            "weeks": 0,
            "client_id": client_id,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["field"], "weeks");

    let response = app
        .server
        .post("/api/v1/plannings")
        .authorization_bearer(&app.token)
        .json(&json!({
            "name": "No date",
            "weeks": 2,
            "client_id": client_id,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/api/v1/plannings")
        .authorization_bearer(&app.token)
        .json(&json!({
            "name": "Nobody",
            "start_date": "2026-01-05",
            "weeks": 2,
            "client_id": uuid::Uuid::now_v7().to_string(),
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn planning_header_and_dates_survive_a_read_back() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;

    // A Wednesday start is taken as given.
    let response = app
        .server
        .post("/api/v1/plannings")
        .authorization_bearer(&app.token)
        .json(&json!({
            "nombre": "Hipertrofia",
            "descripcion": "Bloque de volumen",
            "objetivo": "Ganar masa muscular",
            "fechaInicio": "2026-01-07",
            "semanas": 3,
            "clientId": client_id,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let id = data(response.json())["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}", id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let read = data(response.json());
    assert_eq!(read["name"], "Hipertrofia");
    assert_eq!(read["description"], "Bloque de volumen");
    assert_eq!(read["goal"], "Ganar masa muscular");
    assert_eq!(read["start_date"], "2026-01-07");
    assert_eq!(read["client_id"], client_id.as_str());
    assert_eq!(read["week_count"], 3);

    let start = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
    let weeks = read["weeks"].as_array().unwrap();
    assert_eq!(weeks.len(), 3);
    for (w, week) in weeks.iter().enumerate() {
        let week_start = start + Duration::days(7 * w as i64);
        assert_eq!(week["number"], w as u64 + 1);
        assert_eq!(week["start_date"], week_start.to_string());
        for (offset, name) in ["Lunes", "Martes", "Miércoles", "Jueves", "Viernes", "Sábado", "Domingo"]
            .iter()
            .enumerate()
        {
            let expected = week_start + Duration::days(offset as i64);
            assert_eq!(week["days"][*name]["date"], expected.to_string(), "week {} {}", w + 1, name);
        }
    }
}

#[tokio::test]
async fn sessions_exercises_and_sets_round_trip() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 2).await;
    let planning_id = planning["id"].as_str().unwrap();

    let session = add_session(&app, planning_id, "lunes", "Fuerza").await;
    assert_eq!(session["order"], 1);
    let session_id = session["id"].as_str().unwrap();

    let exercise = add_exercise(
        &app,
        session_id,
        &squat,
        json!([
            { "reps": 5, "weight": 100.0, "rest": 180 },
            { "repeticiones": 5, "peso": 60.0, "weight_type": "rm_percentage", "rm_percentage": 80 }
        ]),
    )
    .await;
    let sets = exercise["sets"].as_array().unwrap();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0]["weight"], 100.0);
    assert_eq!(sets[1]["reps"], 5);
    assert_eq!(sets[1]["weight"], Value::Null);
    assert_eq!(sets[1]["rm_percentage"], 80.0);
    assert_eq!(sets[0]["render_config"]["campo1"], "reps");

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}/weeks/1/days/lunes", planning_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let day = data(response.json());
    assert_eq!(day["day_name"], "Lunes");
    assert_eq!(day["sessions"][0]["name"], "Fuerza");
    assert_eq!(day["sessions"][0]["exercises"][0]["exercise_id"], squat.as_str());
    assert_eq!(day["sessions"][0]["exercises"][0]["sets"], exercise["sets"]);

    // Week two is untouched.
    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}/weeks/2/days/1", planning_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(data(response.json())["sessions"], json!([]));
}

#[tokio::test]
async fn replacing_sets_swaps_the_whole_list() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 1).await;
    let planning_id = planning["id"].as_str().unwrap();
    let session = add_session(&app, planning_id, "martes", "Pierna").await;
    let session_id = session["id"].as_str().unwrap();
    add_exercise(&app, session_id, &squat, json!([{ "reps": 5 }, { "reps": 5 }, { "reps": 5 }])).await;

    // Node ids in the path are matched in canonical form.
    let response = app
        .server
        .put(&format!(
            "/api/v1/plannings/{}/weeks/1/days/martes/sessions/{}/exercises/0",
            planning_id,
            session_id.to_uppercase()
        ))
        .authorization_bearer(&app.token)
        .json(&json!({ "sets": [{ "reps": 4 }, { "reps": 4 }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(data(response.json())["sets"].as_array().unwrap().len(), 2);

    let path = format!(
        "/api/v1/plannings/{}/weeks/1/days/martes/sessions/0/exercises/0",
        planning_id
    );
    let response = app
        .server
        .put(&path)
        .authorization_bearer(&app.token)
        .json(&json!({ "series": [{ "reps": 3, "weight": 120.0 }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let exercise = data(response.json());
    assert_eq!(exercise["sets"].as_array().unwrap().len(), 1);
    assert_eq!(exercise["sets"][0]["reps"], 3);

    // A rejected replacement leaves the stored sets alone.
    let response = app
        .server
        .put(&path)
        .authorization_bearer(&app.token)
        .json(&json!({ "sets": [{ "weight_type": "rm_percentage", "rm_percentage": 0 }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(error_code(&body), "validation_error");

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}/weeks/1/days/martes", planning_id))
        .authorization_bearer(&app.token)
        .await;
    let day = data(response.json());
    assert_eq!(day["sessions"][0]["exercises"][0]["sets"][0]["weight"], 120.0);

    let response = app.server.delete(&path).authorization_bearer(&app.token).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    let response = app.server.delete(&path).authorization_bearer(&app.token).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_session_removes_everything_below_it() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let bench = create_exercise(&app.server, &app.token, "Bench press").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 1).await;
    let planning_id = planning["id"].as_str().unwrap();

    let first = add_session(&app, planning_id, "lunes", "A").await;
    let second = add_session(&app, planning_id, "lunes", "B").await;
    let first_id = first["id"].as_str().unwrap();

    // 2 exercises x 2 sets, one check-in per set.
    let mut set_ids = Vec::new();
    let mut check_in_ids = Vec::new();
    for exercise_id in [&squat, &bench] {
        let exercise = add_exercise(&app, first_id, exercise_id, json!([{ "reps": 8 }, { "reps": 6 }])).await;
        for set in exercise["sets"].as_array().unwrap() {
            let set_id = set["id"].as_str().unwrap().to_string();
            let response = app
                .server
                .post(&format!("/api/v1/plannings/sets/{}/checkins", set_id))
                .authorization_bearer(&app.token)
                .json(&json!({ "color": "green", "comment": "easy" }))
                .await;
            assert_eq!(response.status_code(), StatusCode::CREATED);
            check_in_ids.push(data(response.json())["id"].as_str().unwrap().to_string());
            set_ids.push(set_id);
        }
    }
    assert_eq!(set_ids.len(), 4);

    let response = app
        .server
        .delete(&format!("/api/v1/plannings/session/{}", first_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    for set_id in &set_ids {
        let response = app
            .server
            .get(&format!("/api/v1/plannings/sets/{}/checkins", set_id))
            .authorization_bearer(&app.token)
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "set {}", set_id);
    }

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}", planning_id))
        .authorization_bearer(&app.token)
        .await;
    let stored = data(response.json()).to_string();
    assert!(!stored.contains(first_id));
    for id in set_ids.iter().chain(&check_in_ids) {
        assert!(!stored.contains(id.as_str()), "{} still stored", id);
    }

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}/weeks/1/days/lunes", planning_id))
        .authorization_bearer(&app.token)
        .await;
    let day = data(response.json());
    let sessions = day["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["id"], second["id"]);
    assert_eq!(sessions[0]["order"], 1);
}

async fn post_session(app: &common::TestApp, planning_id: &str, name: &str) -> StatusCode {
    app.server
        .post("/api/v1/plannings/session")
        .authorization_bearer(&app.token)
        .json(&json!({ "planning_id": planning_id, "week": 1, "day": "jueves", "name": name }))
        .await
        .status_code()
}

#[tokio::test]
async fn concurrent_edits_of_one_planning_all_land() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 1).await;
    let id = planning["id"].as_str().unwrap();

    let statuses = tokio::join!(
        post_session(&app, id, "S1"),
        post_session(&app, id, "S2"),
        post_session(&app, id, "S3"),
        post_session(&app, id, "S4"),
        post_session(&app, id, "S5"),
        post_session(&app, id, "S6"),
        post_session(&app, id, "S7"),
        post_session(&app, id, "S8"),
    );
    let statuses = [
        statuses.0, statuses.1, statuses.2, statuses.3, statuses.4, statuses.5, statuses.6, statuses.7,
    ];
    assert!(statuses.iter().all(|s| *s == StatusCode::CREATED), "{:?}", statuses);

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}/weeks/1/days/jueves", id))
        .authorization_bearer(&app.token)
        .await;
    let day = data(response.json());
    let orders: Vec<u64> = day["sessions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["order"].as_u64().unwrap())
        .collect();
    assert_eq!(orders, (1..=8).collect::<Vec<u64>>());
}

#[tokio::test]
async fn sessions_can_be_renamed_and_retyped() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 1).await;
    let session = add_session(&app, planning["id"].as_str().unwrap(), "viernes", "Metcon").await;

    let response = app
        .server
        .patch(&format!("/api/v1/plannings/session/{}", session["id"].as_str().unwrap()))
        .authorization_bearer(&app.token)
        .json(&json!({ "name": "Metcon 2", "kind": "Superset", "rounds": 4 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated = data(response.json());
    assert_eq!(updated["name"], "Metcon 2");
    assert_eq!(updated["kind"], "Superset");
    assert_eq!(updated["rounds"], 4);

    let response = app
        .server
        .patch(&format!("/api/v1/plannings/session/{}", session["id"].as_str().unwrap()))
        .authorization_bearer(&app.token)
        .json(&json!({ "rounds": 0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn next_week_continues_the_calendar() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 2).await;
    let planning_id = planning["id"].as_str().unwrap();

    let response = app
        .server
        .post(&format!("/api/v1/plannings/{}/anadirsemanasiguiente", planning_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let week = data(response.json());
    assert_eq!(week["number"], 3);
    assert_eq!(week["start_date"], "2026-01-19");
    assert_eq!(week["days"].as_object().unwrap().len(), 7);

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}", planning_id))
        .authorization_bearer(&app.token)
        .await;
    let read = data(response.json());
    assert_eq!(read["week_count"], 3);
    assert_eq!(read["weeks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn render_config_only_accepts_the_three_slots() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 1).await;
    let planning_id = planning["id"].as_str().unwrap();
    let session = add_session(&app, planning_id, "lunes", "A").await;
    add_exercise(&app, session["id"].as_str().unwrap(), &squat, json!([{ "reps": 8 }])).await;

    let path = format!(
        "/api/v1/plannings/{}/weeks/1/days/lunes/sessions/0/exercises/0/sets/0/render-config",
        planning_id
    );
    let response = app
        .server
        .patch(&path)
        .authorization_bearer(&app.token)
        .json(&json!({ "campo1": "rpe", "campo3": "tempo" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let set = data(response.json());
    assert_eq!(set["render_config"]["campo1"], "rpe");
    assert_eq!(set["render_config"]["campo2"], "weight");
    assert_eq!(set["render_config"]["campo3"], "tempo");

    let response = app
        .server
        .patch(&path)
        .authorization_bearer(&app.token)
        .json(&json!({ "campo4": "reps" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .patch(&path)
        .authorization_bearer(&app.token)
        .json(&json!({ "campo1": "mood" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lookups_distinguish_bad_ids_missing_nodes_and_foreign_plans() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 1).await;
    let planning_id = planning["id"].as_str().unwrap();

    let response = app
        .server
        .get("/api/v1/plannings/not-a-uuid")
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}", uuid::Uuid::now_v7()))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}/weeks/5/days/lunes", planning_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"]["message"].as_str().unwrap().contains("week 5"));

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}/weeks/1/days/funday", planning_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .put(&format!(
            "/api/v1/plannings/{}/weeks/1/days/lunes/sessions/3/exercises/0",
            planning_id
        ))
        .authorization_bearer(&app.token)
        .json(&json!({ "sets": [] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let other = register(&app.server, "rival", "rival@example.com", "trainer").await;
    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}", planning_id))
        .authorization_bearer(&other)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .post("/api/v1/plannings/session")
        .authorization_bearer(&other)
        .json(&json!({ "planning_id": planning_id, "week": 1, "day": "lunes", "name": "X" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app.server.get(&format!("/api/v1/plannings/{}", planning_id)).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_catalog_exercise_is_not_found() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 1).await;
    let session = add_session(&app, planning["id"].as_str().unwrap(), "lunes", "A").await;

    let response = app
        .server
        .post(&format!(
            "/api/v1/plannings/session/{}/exercise",
            session["id"].as_str().unwrap()
        ))
        .authorization_bearer(&app.token)
        .json(&json!({ "exercise_id": uuid::Uuid::now_v7().to_string(), "sets": [] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn linked_client_account_reads_and_checks_in() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 1).await;
    let planning_id = planning["id"].as_str().unwrap();
    let session = add_session(&app, planning_id, "lunes", "A").await;
    let exercise = add_exercise(&app, session["id"].as_str().unwrap(), &squat, json!([{ "reps": 8 }])).await;
    let set_id = exercise["sets"][0]["id"].as_str().unwrap();

    let ana = register(&app.server, "ana", "ana@example.com", "client").await;
    link_client(&app.server, &app.token, &client_id, "ana").await;

    let response = app.server.get("/api/v1/plannings").authorization_bearer(&ana).await;
    let plannings = data(response.json());
    assert_eq!(plannings.as_array().unwrap().len(), 1);
    assert_eq!(plannings[0]["id"], planning_id);

    let response = app
        .server
        .post(&format!("/api/v1/plannings/sets/{}/checkins", set_id))
        .authorization_bearer(&ana)
        .json(&json!({ "color": "amarillo", "comentario": "  heavy today " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let check_in = data(response.json());
    assert_eq!(check_in["color"], "yellow");
    assert_eq!(check_in["comment"], "heavy today");

    let response = app
        .server
        .get(&format!("/api/v1/plannings/sets/{}/checkins", set_id))
        .authorization_bearer(&app.token)
        .await;
    let check_ins = data(response.json());
    assert_eq!(check_ins.as_array().unwrap().len(), 1);

    // Clients never edit the plan itself.
    let response = app
        .server
        .post("/api/v1/plannings/session")
        .authorization_bearer(&ana)
        .json(&json!({ "planning_id": planning_id, "week": 1, "day": "lunes", "name": "Extra" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // An unrelated client account sees nothing.
    let stranger = register(&app.server, "bob", "bob@example.com", "client").await;
    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}", planning_id))
        .authorization_bearer(&stranger)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_a_planning_cascades() {
    let app = spawn().await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let planning = create_planning(&app.server, &app.token, &client_id, 2).await;
    let planning_id = planning["id"].as_str().unwrap();
    let session = add_session(&app, planning_id, "lunes", "A").await;
    add_exercise(&app, session["id"].as_str().unwrap(), &squat, json!([{ "reps": 8 }])).await;

    let response = app
        .server
        .delete(&format!("/api/v1/plannings/{}", planning_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}", planning_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .get(&format!("/api/v1/clients/{}/plannings", client_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(data(response.json()), json!([]));
}
