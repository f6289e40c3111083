use crate::api::handlers::{
    assignments, classes, events, health, leaderboard, settings, students, submissions, teachers,
};
use crate::store::Db;
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

/// Full route table. Shared between `run_server` and the test harness.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::index))
        .route("/stats", web::get().to(health::stats))
        // mobile
        .route("/student/register", web::post().to(students::register))
        .route("/student/simple-register", web::post().to(students::simple_register))
        .route("/student/login", web::post().to(students::login))
        .route("/student/join-class", web::post().to(students::join_class))
        .route("/student/{id}/profile", web::get().to(students::profile))
        .route("/student/{id}/avatar", web::put().to(students::set_avatar))
        .route("/student/subjects", web::post().to(students::subjects_list))
        .route("/student/assignments", web::post().to(students::assignments_for_subject))
        .route("/student/assignments", web::get().to(students::assignments_for_subject_get))
        .route("/submit/{assignment_id}", web::post().to(submissions::submit))
        .route("/leaderboard/{class_code}", web::get().to(leaderboard::get))
        .route("/events/navigation", web::post().to(events::navigation))
        // classes & assignments
        .route("/classes", web::get().to(classes::list))
        .route("/classes", web::post().to(classes::create))
        .route("/class/{code}/assignments", web::get().to(classes::assignments_by_code))
        .route("/class/{id}/assignments", web::post().to(classes::create_assignment))
        .route("/class/{id}/archive", web::post().to(classes::archive))
        .route("/class/{id}/restore", web::post().to(classes::restore))
        .route("/class/{id}", web::delete().to(classes::delete))
        .route("/assignment/{id}", web::get().to(assignments::get))
        .route("/assignment/{id}", web::put().to(assignments::update))
        .route("/assignment/{id}", web::delete().to(assignments::delete))
        .route("/assignment/{id}/archive", web::post().to(assignments::archive))
        .route("/assignment/{id}/restore", web::post().to(assignments::restore))
        .route("/assignment/{id}/results", web::get().to(assignments::results))
        .route("/assignment/{id}/monitor", web::get().to(assignments::monitor))
        // teachers
        .route("/teacher/register", web::post().to(teachers::register))
        .route("/teacher/login", web::post().to(teachers::login))
        .route("/teacher/{id}/classes", web::get().to(teachers::list_classes))
        // admin
        .route("/settings", web::get().to(settings::get))
        .route("/settings", web::put().to(settings::update));
}

pub async fn run_server(bind_addr: &str, db: Db) -> std::io::Result<()> {
    db.init()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    tracing::info!(%bind_addr, "starting server");
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(web::Data::new(db.clone()))
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
