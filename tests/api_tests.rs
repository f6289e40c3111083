//! HTTP surface tests: the real route table over a temp-file database.

use actix_web::{test, web, App};
use classquest::store::Db;
use serde_json::{json, Value};

macro_rules! service {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.clone()))
                .configure(classquest::server::configure),
        )
        .await
    };
}

macro_rules! post_json {
    ($app:expr, $path:expr, $body:expr) => {{
        let req = test::TestRequest::post().uri($path).set_json($body).to_request();
        let resp = test::call_service($app, req).await;
        let status = resp.status().as_u16();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

macro_rules! put_json {
    ($app:expr, $path:expr, $body:expr) => {{
        let req = test::TestRequest::put().uri($path).set_json($body).to_request();
        let resp = test::call_service($app, req).await;
        let status = resp.status().as_u16();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

macro_rules! get_json {
    ($app:expr, $path:expr) => {{
        let req = test::TestRequest::get().uri($path).to_request();
        let resp = test::call_service($app, req).await;
        let status = resp.status().as_u16();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

fn scratch_db() -> (tempfile::TempDir, Db) {
    let dir = tempfile::tempdir().unwrap();
    let db = Db::at(dir.path().join("api.db"));
    db.init().unwrap();
    (dir, db)
}

#[actix_web::test]
async fn registration_to_leaderboard_flow() {
    let (_dir, db) = scratch_db();
    let app = service!(db);

    let (status, body) = post_json!(
        &app,
        "/teacher/register",
        json!({"email": "ms.cruz@school.ph", "password": "pw123",
               "first_name": "Maria", "last_name": "Cruz"})
    );
    assert_eq!(status, 200);
    let teacher_id = body["teacher"]["id"].as_i64().unwrap();

    let (status, body) =
        post_json!(&app, "/classes", json!({"name": "Math 6", "teacher_id": teacher_id}));
    assert_eq!(status, 200);
    let class_code = body["class"]["class_code"].as_str().unwrap().to_string();
    let class_id = body["class"]["id"].as_i64().unwrap();
    assert_eq!(body["class"]["gameplay_type"], "MultipleChoice");

    let (status, body) = post_json!(
        &app,
        &format!("/class/{class_id}/assignments"),
        json!({
            "title": "Fractions quiz",
            "questions": [
                {"text": "1/2 + 1/4 = ?", "type": "multiple_choice", "points": 2,
                 "options": ["1/2", "3/4", "2/6"], "correct_answers": ["3/4"]},
                {"text": "Name the top and bottom parts of a fraction",
                 "type": "enumeration", "points": 4,
                 "correct_answers": ["numerator", "denominator"]}
            ]
        })
    );
    assert_eq!(status, 200);
    assert_eq!(body["assignment"]["question_count"], 2);
    let assignment_id = body["assignment"]["id"].as_i64().unwrap();

    let (status, body) = post_json!(
        &app,
        "/student/register",
        json!({"name": "Miguel", "email": "miguel@school.ph", "class_code": class_code})
    );
    assert_eq!(status, 200);
    assert_eq!(body["already_registered"], false);
    let student_id = body["student"]["id"].as_i64().unwrap();

    let (status, payload) = get_json!(&app, &format!("/assignment/{assignment_id}"));
    assert_eq!(status, 200);
    let questions = payload["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["correct_answer_index"], 1);
    let q1 = questions[0]["id"].as_i64().unwrap();
    let q2 = questions[1]["id"].as_i64().unwrap();

    let mut answers = serde_json::Map::new();
    answers.insert(q1.to_string(), json!("3/4"));
    answers.insert(q2.to_string(), json!("denominator|numerator"));
    let (status, body) = post_json!(
        &app,
        &format!("/submit/{assignment_id}"),
        json!({"student_id": student_id, "answers": answers})
    );
    assert_eq!(status, 200);
    assert_eq!(body["score"], 6);
    assert_eq!(body["grade"], "A");

    // second submit blocked while multiple submissions stay disabled
    let (status, body) = post_json!(
        &app,
        &format!("/submit/{assignment_id}"),
        json!({"student_id": student_id, "answers": {}})
    );
    assert_eq!(status, 400);
    assert_eq!(body["status"], "error");

    let (status, body) = get_json!(&app, &format!("/leaderboard/{class_code}"));
    assert_eq!(status, 200);
    assert_eq!(body["entries"][0]["name"], "Miguel");
    assert_eq!(body["entries"][0]["points"], 6);

    let (status, body) = get_json!(&app, &format!("/assignment/{assignment_id}/monitor"));
    assert_eq!(status, 200);
    assert_eq!(body["stats"]["submitted"], 1);
    assert_eq!(body["stats"]["missing"], 0);
}

#[actix_web::test]
async fn maintenance_mode_blanks_the_mobile_surface() {
    let (_dir, db) = scratch_db();
    let app = service!(db);

    let (status, _) = put_json!(
        &app,
        "/settings",
        json!({"key": "access.maintenance_mode", "value": "true"})
    );
    assert_eq!(status, 200);

    let (status, body) = post_json!(
        &app,
        "/student/simple-register",
        json!({"name": "A", "email": "a@s.ph", "password": "pw"})
    );
    assert_eq!(status, 503);
    assert_eq!(body["status"], "error");

    // management endpoints keep working
    let (status, _) = get_json!(&app, "/classes");
    assert_eq!(status, 200);
}

#[actix_web::test]
async fn unknown_setting_key_is_rejected() {
    let (_dir, db) = scratch_db();
    let app = service!(db);
    let (status, body) =
        put_json!(&app, "/settings", json!({"key": "game.cheat_mode", "value": "true"}));
    assert_eq!(status, 400);
    assert_eq!(body["status"], "error");
}

#[actix_web::test]
async fn joining_an_archived_class_fails() {
    let (_dir, db) = scratch_db();
    let app = service!(db);

    let (_, body) = post_json!(
        &app,
        "/teacher/register",
        json!({"email": "t@s.ph", "password": "pw", "first_name": "T", "last_name": "S"})
    );
    let teacher_id = body["teacher"]["id"].as_i64().unwrap();
    let (_, body) =
        post_json!(&app, "/classes", json!({"name": "PE", "teacher_id": teacher_id}));
    let class_id = body["class"]["id"].as_i64().unwrap();
    let class_code = body["class"]["class_code"].as_str().unwrap().to_string();

    let (_, body) = post_json!(
        &app,
        "/student/simple-register",
        json!({"name": "Ana", "email": "ana@s.ph", "password": "pw"})
    );
    let student_id = body["student"]["id"].as_i64().unwrap();

    let (status, _) = post_json!(&app, &format!("/class/{class_id}/archive"), json!({}));
    assert_eq!(status, 200);

    let (status, body) = post_json!(
        &app,
        "/student/join-class",
        json!({"student_id": student_id, "class_code": class_code.to_lowercase()})
    );
    assert_eq!(status, 400);
    assert!(body["detail"].as_str().unwrap().contains("archived"));
}

#[actix_web::test]
async fn restored_assignment_in_archived_class_stays_unplayable() {
    let (_dir, db) = scratch_db();
    let app = service!(db);

    let (_, body) = post_json!(
        &app,
        "/teacher/register",
        json!({"email": "t@s.ph", "password": "pw", "first_name": "T", "last_name": "S"})
    );
    let teacher_id = body["teacher"]["id"].as_i64().unwrap();
    let (_, body) =
        post_json!(&app, "/classes", json!({"name": "Math 6", "teacher_id": teacher_id}));
    let class_id = body["class"]["id"].as_i64().unwrap();
    let class_code = body["class"]["class_code"].as_str().unwrap().to_string();

    let (_, body) = post_json!(
        &app,
        &format!("/class/{class_id}/assignments"),
        json!({"title": "Quiz", "questions": [
            {"text": "2 + 2 = ?", "type": "identification", "points": 1,
             "correct_answer": "4"}
        ]})
    );
    let assignment_id = body["assignment"]["id"].as_i64().unwrap();

    let (_, body) = post_json!(
        &app,
        "/student/register",
        json!({"name": "Miguel", "email": "miguel@s.ph", "class_code": class_code})
    );
    let student_id = body["student"]["id"].as_i64().unwrap();

    // archive the class, then restore only the assignment
    let (status, _) = post_json!(&app, &format!("/class/{class_id}/archive"), json!({}));
    assert_eq!(status, 200);
    let (status, _) =
        post_json!(&app, &format!("/assignment/{assignment_id}/restore"), json!({}));
    assert_eq!(status, 200);

    let (status, body) = get_json!(&app, &format!("/assignment/{assignment_id}"));
    assert_eq!(status, 403);
    assert_eq!(body["status"], "error");

    let (status, body) = post_json!(
        &app,
        &format!("/submit/{assignment_id}"),
        json!({"student_id": student_id, "answers": {}})
    );
    assert_eq!(status, 403);
    assert!(body["detail"].as_str().unwrap().contains("archived"));

    // restoring the class makes the assignment playable again
    let (status, _) = post_json!(&app, &format!("/class/{class_id}/restore"), json!({}));
    assert_eq!(status, 200);
    let (status, _) = get_json!(&app, &format!("/assignment/{assignment_id}"));
    assert_eq!(status, 200);
}

#[actix_web::test]
async fn disabling_registration_blocks_teachers_but_not_students() {
    let (_dir, db) = scratch_db();
    let app = service!(db);

    let (status, _) = put_json!(
        &app,
        "/settings",
        json!({"key": "access.enable_registration", "value": "false"})
    );
    assert_eq!(status, 200);

    let (status, body) = post_json!(
        &app,
        "/teacher/register",
        json!({"email": "t@s.ph", "password": "pw", "first_name": "T", "last_name": "S"})
    );
    assert_eq!(status, 403);
    assert_eq!(body["status"], "error");

    let (status, body) = post_json!(
        &app,
        "/student/simple-register",
        json!({"name": "Ana", "email": "ana@s.ph", "password": "pw"})
    );
    assert_eq!(status, 200);
    assert_eq!(body["status"], "success");
}

#[actix_web::test]
async fn navigation_events_always_succeed() {
    let (_dir, db) = scratch_db();
    let app = service!(db);
    let (status, body) = post_json!(
        &app,
        "/events/navigation",
        json!({"screen": "MainMenu", "action": "open"})
    );
    assert_eq!(status, 200);
    assert_eq!(body["status"], "logged");
}
