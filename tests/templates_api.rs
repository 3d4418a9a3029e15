mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use common::{create_client, create_exercise, data, register, spawn, TestApp};
use serde_json::{json, Value};

/// One-week template with a single Monday session: one exercise, two sets.
async fn full_template(app: &TestApp, exercise_id: &str) -> Value {
    let response = app
        .server
        .post("/api/v1/templates")
        .authorization_bearer(&app.token)
        .json(&json!({
            "name": "Base strength",
            "category": "strength",
            "difficulty": "intermedio",
            "tree": {
                "weeks": [{
                    "number": 1,
                    "days": {
                        "lunes": {
                            "sessions": [{
                                "name": "A",
                                "exercises": [{
                                    "exercise_id": exercise_id,
                                    "sets": [
                                        { "reps": 5, "weight": 100.0 },
                                        { "reps": 5, "weight_type": "rm_percentage", "rm_percentage": 75 }
                                    ]
                                }]
                            }]
                        }
                    }
                }]
            }
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    data(response.json())
}

fn next_monday_after(today: NaiveDate) -> NaiveDate {
    today + Duration::days(7 - i64::from(today.weekday().num_days_from_monday()))
}

#[tokio::test]
async fn template_metadata_crud_and_tag_filter() {
    let app = spawn().await;

    let response = app
        .server
        .post("/api/v1/templates")
        .authorization_bearer(&app.token)
        .json(&json!({
            "name": "Hypertrophy 8w",
            "total_weeks": 2,
            "tags": ["Fuerza Máxima", "fuerza maxima", "Hipertrofia"],
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let template = data(response.json());
    let id = template["id"].as_str().unwrap().to_string();
    assert_eq!(template["total_weeks"], 2);
    assert_eq!(template["tags"], json!(["fuerza-maxima", "hipertrofia"]));
    assert_eq!(template["tree"]["weeks"].as_array().unwrap().len(), 2);

    let response = app
        .server
        .get("/api/v1/templates")
        .authorization_bearer(&app.token)
        .add_query_param("tag", "Hipertrofia")
        .await;
    let listed = data(response.json());
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["assigned_clients"], 0);

    let response = app
        .server
        .get("/api/v1/templates")
        .authorization_bearer(&app.token)
        .add_query_param("tag", "cardio")
        .await;
    assert_eq!(data(response.json()), json!([]));

    let response = app
        .server
        .patch(&format!("/api/v1/templates/{}", id))
        .authorization_bearer(&app.token)
        .json(&json!({ "name": "Hypertrophy 6w", "difficulty": "advanced" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated = data(response.json());
    assert_eq!(updated["name"], "Hypertrophy 6w");
    assert_eq!(updated["difficulty"], "advanced");
    assert_eq!(updated["tags"], template["tags"]);

    let rival = register(&app.server, "rival", "rival@example.com", "trainer").await;
    let response = app
        .server
        .get(&format!("/api/v1/templates/{}", id))
        .authorization_bearer(&rival)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .delete(&format!("/api/v1/templates/{}", id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    let response = app
        .server
        .get(&format!("/api/v1/templates/{}", id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn embedded_tree_is_edited_with_the_plan_operations() {
    let app = spawn().await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;

    let response = app
        .server
        .post("/api/v1/templates")
        .authorization_bearer(&app.token)
        .json(&json!({ "name": "Blank", "total_weeks": 1 }))
        .await;
    let id = data(response.json())["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .post(&format!("/api/v1/templates/{}/weeks/1/days/jueves/sessions", id))
        .authorization_bearer(&app.token)
        .json(&json!({ "nombre": "Pierna", "tipo": "superserie", "rondas": 3 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let session = data(response.json());
    assert_eq!(session["kind"], "Superset");

    let response = app
        .server
        .post(&format!(
            "/api/v1/templates/{}/weeks/1/days/jueves/sessions/{}/exercises",
            id,
            session["id"].as_str().unwrap()
        ))
        .authorization_bearer(&app.token)
        .json(&json!({ "exercise_id": squat, "series": [{ "reps": 10 }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = app
        .server
        .post(&format!("/api/v1/templates/{}/weeks", id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(data(response.json())["number"], 2);

    let response = app
        .server
        .get(&format!("/api/v1/templates/{}", id))
        .authorization_bearer(&app.token)
        .await;
    let template = data(response.json());
    assert_eq!(template["total_weeks"], 2);
    let thursday = &template["tree"]["weeks"][0]["days"]["Jueves"];
    assert_eq!(thursday["sessions"][0]["exercises"][0]["sets"][0]["reps"], 10);

    let response = app
        .server
        .delete(&format!("/api/v1/templates/{}/weeks/1/days/jueves/sessions/0", id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app
        .server
        .delete(&format!("/api/v1/templates/{}/weeks/1/days/jueves/sessions/0", id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replacing_the_tree_checks_the_catalog() {
    let app = spawn().await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let template = full_template(&app, &squat).await;
    let id = template["id"].as_str().unwrap();

    let ghost = uuid::Uuid::now_v7().to_string();
    let response = app
        .server
        .put(&format!("/api/v1/templates/{}/tree", id))
        .authorization_bearer(&app.token)
        .json(&json!({
            "weeks": [{ "number": 1, "days": { "martes": { "sessions": [{
                "name": "B", "exercises": [{ "exercise_id": ghost, "sets": [] }]
            }] } } }]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .put(&format!("/api/v1/templates/{}/tree", id))
        .authorization_bearer(&app.token)
        .json(&json!({
            "weeks": [
                { "number": 2, "days": {} },
                { "number": 1, "days": { "martes": { "sessions": [{
                    "name": "B", "exercises": [{ "exercise_id": squat, "sets": [{ "reps": 1 }] }]
                }] } } }
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let replaced = data(response.json());
    assert_eq!(replaced["total_weeks"], 2);
    assert_eq!(replaced["tree"]["weeks"][0]["number"], 1);

    let response = app
        .server
        .put(&format!("/api/v1/templates/{}/tree", id))
        .authorization_bearer(&app.token)
        .json(&json!({ "weeks": [{ "number": 1 }, { "number": 1 }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn replaced_tree_has_contiguous_weeks_of_seven_days() {
    let app = spawn().await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let template = full_template(&app, &squat).await;
    let id = template["id"].as_str().unwrap();

    let response = app
        .server
        .put(&format!("/api/v1/templates/{}/tree", id))
        .authorization_bearer(&app.token)
        .json(&json!({ "weeks": [{ "number": 1, "days": { "lunes": {} } }, { "number": 5, "days": {} }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["field"], "weeks.number");

    // The rejected tree left the stored one alone.
    let response = app
        .server
        .get(&format!("/api/v1/templates/{}", id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(data(response.json())["tree"], template["tree"]);

    let response = app
        .server
        .put(&format!("/api/v1/templates/{}/tree", id))
        .authorization_bearer(&app.token)
        .json(&json!({ "weeks": [{ "number": 1, "days": { "lunes": {} } }, { "number": 2, "days": {} }] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let replaced = data(response.json());
    assert_eq!(replaced["total_weeks"], 2);
    for week in replaced["tree"]["weeks"].as_array().unwrap() {
        assert_eq!(week["days"].as_object().unwrap().len(), 7);
    }

    let response = app
        .server
        .post(&format!("/api/v1/templates/{}/weeks/1/days/martes/sessions", id))
        .authorization_bearer(&app.token)
        .json(&json!({ "name": "Upper" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let response = app
        .server
        .post(&format!("/api/v1/templates/{}/weeks/2/days/domingo/sessions", id))
        .authorization_bearer(&app.token)
        .json(&json!({ "name": "Long run" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn clone_copies_the_tree_with_fresh_ids() {
    let app = spawn().await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let source = full_template(&app, &squat).await;

    let response = app
        .server
        .post(&format!("/api/v1/templates/{}/clone", source["id"].as_str().unwrap()))
        .authorization_bearer(&app.token)
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let copy = data(response.json());
    assert_ne!(copy["id"], source["id"]);
    assert_eq!(copy["name"], "Base strength (copy)");
    assert_eq!(copy["difficulty"], "intermediate");

    let original = &source["tree"]["weeks"][0]["days"]["Lunes"]["sessions"][0];
    let cloned = &copy["tree"]["weeks"][0]["days"]["Lunes"]["sessions"][0];
    assert_eq!(cloned["name"], original["name"]);
    assert_ne!(cloned["id"], original["id"]);
    assert_ne!(
        cloned["exercises"][0]["sets"][0]["id"],
        original["exercises"][0]["sets"][0]["id"]
    );
    assert_eq!(
        cloned["exercises"][0]["sets"][1]["rm_percentage"],
        original["exercises"][0]["sets"][1]["rm_percentage"]
    );

    let response = app
        .server
        .post(&format!("/api/v1/templates/{}/clone", source["id"].as_str().unwrap()))
        .authorization_bearer(&app.token)
        .json(&json!({ "newName": "Peaking" }))
        .await;
    assert_eq!(data(response.json())["name"], "Peaking");

    let response = app
        .server
        .get(&format!("/api/v1/templates/{}/clients", copy["id"].as_str().unwrap()))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(data(response.json()), json!([]));
}

#[tokio::test]
async fn assigning_materializes_a_dated_planning_once() {
    let app = spawn().await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let template = full_template(&app, &squat).await;
    let id = template["id"].as_str().unwrap();

    let response = app
        .server
        .post(&format!("/api/v1/templates/{}/assign", id))
        .authorization_bearer(&app.token)
        .json(&json!({ "clientId": client_id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let assignment = data(response.json());
    assert_eq!(assignment["status"], "active");
    assert_eq!(assignment["current_week"], 1);
    assert_eq!(assignment["current_day"], 1);
    let planning_id = assignment["planning_id"].as_str().unwrap().to_string();

    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}", planning_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let planning = data(response.json());
    assert_eq!(planning["kind"], "template_instance");
    assert_eq!(planning["template_id"], id);
    assert_eq!(planning["client_id"], client_id.as_str());

    let monday = next_monday_after(Utc::now().date_naive()).to_string();
    assert_eq!(planning["start_date"], monday.as_str());
    let week = &planning["weeks"][0];
    assert_eq!(week["start_date"], monday.as_str());
    assert_eq!(week["days"].as_object().unwrap().len(), 7);
    assert_eq!(week["days"]["Lunes"]["date"], monday.as_str());

    let sets = &week["days"]["Lunes"]["sessions"][0]["exercises"][0]["sets"];
    let template_sets = &template["tree"]["weeks"][0]["days"]["Lunes"]["sessions"][0]["exercises"][0]["sets"];
    assert_eq!(sets[0]["weight"], 100.0);
    assert_eq!(sets[1]["weight"], Value::Null);
    assert_eq!(sets[1]["rm_percentage"], 75.0);
    assert_ne!(sets[0]["id"], template_sets[0]["id"]);

    // Second assignment of the same client is refused and changes nothing.
    let response = app
        .server
        .post(&format!("/api/v1/templates/{}/assign", id))
        .authorization_bearer(&app.token)
        .json(&json!({ "client_id": client_id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let response = app
        .server
        .get(&format!("/api/v1/templates/{}/clients", id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(data(response.json()).as_array().unwrap().len(), 1);

    let response = app
        .server
        .get(&format!("/api/v1/clients/{}/plannings", client_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(data(response.json()).as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn progress_modifications_and_unassignment() {
    let app = spawn().await;
    let squat = create_exercise(&app.server, &app.token, "Back squat").await;
    let client_id = create_client(&app.server, &app.token, "Ana", "ana@example.com").await;
    let template = full_template(&app, &squat).await;
    let id = template["id"].as_str().unwrap();

    let response = app
        .server
        .post(&format!("/api/v1/templates/{}/assign", id))
        .authorization_bearer(&app.token)
        .json(&json!({ "client_id": client_id }))
        .await;
    let planning_id = data(response.json())["planning_id"].as_str().unwrap().to_string();
    let base = format!("/api/v1/templates/{}/clients/{}", id, client_id);

    let response = app
        .server
        .patch(&format!("{}/progress", base))
        .authorization_bearer(&app.token)
        .json(&json!({ "current_week": 1, "current_day": 3, "status": "paused" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let progress = data(response.json());
    assert_eq!(progress["current_day"], 3);
    assert_eq!(progress["status"], "paused");

    let response = app
        .server
        .patch(&format!("{}/progress", base))
        .authorization_bearer(&app.token)
        .json(&json!({ "current_week": 4 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .patch(&format!("{}/exercises", base))
        .authorization_bearer(&app.token)
        .json(&json!({
            "week": 1, "day": "lunes", "session": 0, "exercise": 0, "set": 0,
            "field": "peso", "value": 105.0
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let modification = data(response.json());
    assert_eq!(modification["field"], "weight");
    assert_eq!(modification["old_value"], 100.0);
    assert_eq!(modification["new_value"], 105.0);
    assert_eq!(modification["day_name"], "Lunes");

    let response = app
        .server
        .patch(&format!("{}/exercises", base))
        .authorization_bearer(&app.token)
        .json(&json!({
            "week": 1, "day": "lunes", "session": 0, "exercise": 0, "set": 7,
            "field": "reps", "value": 3
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // The template itself is untouched.
    let response = app
        .server
        .get(&format!("/api/v1/templates/{}", id))
        .authorization_bearer(&app.token)
        .await;
    let current = data(response.json());
    assert_eq!(
        current["tree"]["weeks"][0]["days"]["Lunes"]["sessions"][0]["exercises"][0]["sets"][0]["weight"],
        100.0
    );

    let response = app
        .server
        .get(&format!("{}/modifications", base))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(data(response.json()).as_array().unwrap().len(), 1);

    let response = app.server.delete(&base).authorization_bearer(&app.token).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    let response = app.server.delete(&base).authorization_bearer(&app.token).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // The client keeps the materialized planning.
    let response = app
        .server
        .get(&format!("/api/v1/plannings/{}", planning_id))
        .authorization_bearer(&app.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}
