//! Single binary web server: JSON API over the court scheduler.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT, plus the
//! scheduler settings read by `SchedulerConfig::from_env`.

use actix_web::{
    delete, get, post, put,
    web::{Bytes, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use court_scheduler::interchange;
use court_scheduler::{
    CourtId, ErrorKind, MatchDetailsUpdate, MatchId, NewMatch, PlayerId, PlayerUpdate, Scheduler,
    SchedulerConfig, Score, ScheduleError, Side,
};
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;

/// In-memory state: one scheduler, all writes serialized by the lock.
type AppState = Data<RwLock<Scheduler>>;

/// How often the background tick checks for warmups that just ran out.
const TICK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct ActivateBody {
    court_id: CourtId,
}

#[derive(Deserialize)]
struct CompleteBody {
    #[serde(default)]
    score: Option<Score>,
}

#[derive(Deserialize)]
struct CheckInBody {
    side: Side,
}

#[derive(Deserialize)]
struct ReorderBody {
    target: MatchId,
}

#[derive(Deserialize)]
struct NumCourtsBody {
    num_courts: usize,
}

#[derive(Deserialize)]
struct GridSizeBody {
    rows: usize,
    cols: usize,
}

#[derive(Deserialize)]
struct PositionBody {
    row: i64,
    col: i64,
}

#[derive(Deserialize)]
struct RenameBody {
    name: String,
}

#[derive(Deserialize)]
struct TimerSettingsBody {
    warmup_seconds: Option<u32>,
    flash_seconds: Option<u32>,
    match_interval_minutes: Option<u32>,
}

/// Path segment: match id (e.g. /api/matches/{match_id})
#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

#[derive(Deserialize)]
struct PlayerPath {
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct CourtPath {
    court_id: CourtId,
}

fn error_response(e: &ScheduleError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Validation | ErrorKind::InvalidTransition => HttpResponse::BadRequest().json(body),
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

/// Apply a write and answer with the fresh snapshot.
fn mutate<F>(state: &AppState, op: F) -> HttpResponse
where
    F: FnOnce(&mut Scheduler) -> Result<(), ScheduleError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match op(&mut *g) {
        Ok(()) => HttpResponse::Ok().json(g.snapshot()),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "court-scheduler",
    })
}

/// Full state snapshot with derived timers, conflicts and court occupancy.
#[get("/api/state")]
async fn api_state(state: AppState) -> HttpResponse {
    match state.read() {
        Ok(g) => HttpResponse::Ok().json(g.snapshot()),
        Err(_) => lock_error(),
    }
}

#[post("/api/players")]
async fn api_add_player(state: AppState, body: Json<AddPlayerBody>) -> HttpResponse {
    mutate(&state, |s| s.create_player(&body.name).map(|_| ()))
}

#[put("/api/players/{player_id}")]
async fn api_update_player(state: AppState, path: Path<PlayerPath>, body: Json<PlayerUpdate>) -> HttpResponse {
    mutate(&state, |s| s.update_player(path.player_id, body.into_inner()))
}

/// Remove a player; their matches go with them.
#[delete("/api/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    mutate(&state, |s| s.remove_player(path.player_id).map(|_| ()))
}

#[post("/api/matches")]
async fn api_create_match(state: AppState, body: Json<NewMatch>) -> HttpResponse {
    mutate(&state, |s| s.create_match(body.into_inner()).map(|_| ()))
}

#[put("/api/matches/{match_id}")]
async fn api_update_match(state: AppState, path: Path<MatchPath>, body: Json<MatchDetailsUpdate>) -> HttpResponse {
    mutate(&state, |s| s.update_match_details(path.match_id, body.into_inner()))
}

#[delete("/api/matches/{match_id}")]
async fn api_remove_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    mutate(&state, |s| s.remove_match(path.match_id))
}

/// Put a pending match on a court (warmup starts).
#[post("/api/matches/{match_id}/activate")]
async fn api_activate_match(state: AppState, path: Path<MatchPath>, body: Json<ActivateBody>) -> HttpResponse {
    mutate(&state, |s| s.activate_match(path.match_id, body.court_id))
}

/// Send an active match back to the queue.
#[post("/api/matches/{match_id}/deactivate")]
async fn api_deactivate_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    mutate(&state, |s| s.deactivate_match(path.match_id))
}

#[post("/api/matches/{match_id}/complete")]
async fn api_complete_match(state: AppState, path: Path<MatchPath>, body: Option<Json<CompleteBody>>) -> HttpResponse {
    let score = body.and_then(|b| b.into_inner().score);
    mutate(&state, |s| s.complete_match(path.match_id, score))
}

/// Undo a completion. A miss is reported in `outcome`, not as an error.
#[post("/api/matches/{match_id}/undo-complete")]
async fn api_undo_complete(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let outcome = g.undo_complete_match(path.match_id);
    HttpResponse::Ok().json(serde_json::json!({ "outcome": outcome, "state": g.snapshot() }))
}

/// End warmup and start the match clock.
#[post("/api/matches/{match_id}/start-timer")]
async fn api_start_timer(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    mutate(&state, |s| s.start_match_timer(path.match_id))
}

#[post("/api/matches/{match_id}/pause")]
async fn api_toggle_pause(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    mutate(&state, |s| s.toggle_pause(path.match_id).map(|_| ()))
}

#[put("/api/matches/{match_id}/score")]
async fn api_update_score(state: AppState, path: Path<MatchPath>, body: Json<Score>) -> HttpResponse {
    mutate(&state, |s| s.update_match_score(path.match_id, body.into_inner()))
}

#[post("/api/matches/{match_id}/check-in")]
async fn api_toggle_check_in(state: AppState, path: Path<MatchPath>, body: Json<CheckInBody>) -> HttpResponse {
    mutate(&state, |s| s.toggle_check_in(path.match_id, body.side).map(|_| ()))
}

/// Move a pending match to another pending match's place in the queue.
#[post("/api/matches/{match_id}/reorder")]
async fn api_reorder(state: AppState, path: Path<MatchPath>, body: Json<ReorderBody>) -> HttpResponse {
    mutate(&state, |s| s.reorder_queue(path.match_id, body.target))
}

#[get("/api/matches/{match_id}/conflicts")]
async fn api_conflicts(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.conflicts_for(path.match_id) {
        Ok(conflicts) => HttpResponse::Ok().json(conflicts),
        Err(e) => error_response(&e),
    }
}

#[put("/api/courts/count")]
async fn api_set_num_courts(state: AppState, body: Json<NumCourtsBody>) -> HttpResponse {
    mutate(&state, |s| s.set_num_courts(body.num_courts))
}

#[put("/api/courts/grid")]
async fn api_set_grid_size(state: AppState, body: Json<GridSizeBody>) -> HttpResponse {
    mutate(&state, |s| s.set_grid_size(body.rows, body.cols))
}

/// Drop a court at a grid anchor (clamped onto the grid, refused on overlap).
#[put("/api/courts/{court_id}/position")]
async fn api_move_court(state: AppState, path: Path<CourtPath>, body: Json<PositionBody>) -> HttpResponse {
    mutate(&state, |s| s.move_court(path.court_id, body.row, body.col).map(|_| ()))
}

/// Where a dragged court would land and what it would cover. Changes nothing.
#[post("/api/courts/{court_id}/preview")]
async fn api_preview_move(state: AppState, path: Path<CourtPath>, body: Json<PositionBody>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.preview_move(path.court_id, body.row, body.col) {
        Ok(preview) => HttpResponse::Ok().json(preview),
        Err(e) => error_response(&e),
    }
}

#[put("/api/courts/{court_id}/name")]
async fn api_rename_court(state: AppState, path: Path<CourtPath>, body: Json<RenameBody>) -> HttpResponse {
    mutate(&state, |s| s.rename_court(path.court_id, &body.name))
}

#[post("/api/courts/{court_id}/rotate")]
async fn api_rotate_court(state: AppState, path: Path<CourtPath>) -> HttpResponse {
    mutate(&state, |s| s.rotate_court(path.court_id).map(|_| ()))
}

#[put("/api/config/timers")]
async fn api_set_timers(state: AppState, body: Json<TimerSettingsBody>) -> HttpResponse {
    mutate(&state, |s| {
        if let Some(v) = body.warmup_seconds {
            s.set_warmup_seconds(v);
        }
        if let Some(v) = body.flash_seconds {
            s.set_flash_seconds(v);
        }
        if let Some(v) = body.match_interval_minutes {
            s.set_match_interval_minutes(v);
        }
        Ok(())
    })
}

#[get("/api/config/time-slots")]
async fn api_time_slots(state: AppState) -> HttpResponse {
    match state.read() {
        Ok(g) => {
            let slots: Vec<String> = g
                .config()
                .time_slots()
                .iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect();
            HttpResponse::Ok().json(slots)
        }
        Err(_) => lock_error(),
    }
}

#[get("/api/export.csv")]
async fn api_export_csv(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let records = interchange::export_records(g.tournament());
    let mut out = Vec::new();
    match interchange::write_csv(&mut out, &records) {
        Ok(()) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(out),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

#[get("/api/export.json")]
async fn api_export_json(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(interchange::export_json(g.tournament(), "Tournament", g.now()))
}

#[post("/api/import/csv")]
async fn api_import_csv(state: AppState, body: Bytes) -> HttpResponse {
    let records = match interchange::read_csv(body.as_ref()) {
        Ok(r) => r,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(interchange::import_records(&mut *g, &records))
}

#[post("/api/import/json")]
async fn api_import_json(state: AppState, body: Bytes) -> HttpResponse {
    let export = match interchange::from_json_bytes(&body) {
        Ok(e) => e,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(interchange::import_records(&mut *g, &export.matches))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);

    let config = SchedulerConfig::from_env();
    let scheduler = Scheduler::new(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!(
        "Starting server at http://{}:{} with {} court(s)",
        bind.0,
        bind.1,
        scheduler.tournament().courts().len()
    );
    let state = Data::new(RwLock::new(scheduler));

    // Background tick: report each warmup that ran out since the previous tick.
    let state_tick = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        let mut last = None;
        loop {
            interval.tick().await;
            let g = match state_tick.read() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let now = g.now();
            if let Some(last) = last {
                for id in g.warmups_finished_between(last, now) {
                    if let Ok(m) = g.tournament().game(id) {
                        log::info!("Warmup over for match #{}", m.match_number);
                    }
                }
            }
            last = Some(now);
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_state)
            .service(api_add_player)
            .service(api_update_player)
            .service(api_remove_player)
            .service(api_create_match)
            .service(api_update_match)
            .service(api_remove_match)
            .service(api_activate_match)
            .service(api_deactivate_match)
            .service(api_complete_match)
            .service(api_undo_complete)
            .service(api_start_timer)
            .service(api_toggle_pause)
            .service(api_update_score)
            .service(api_toggle_check_in)
            .service(api_reorder)
            .service(api_conflicts)
            .service(api_set_num_courts)
            .service(api_set_grid_size)
            .service(api_move_court)
            .service(api_preview_move)
            .service(api_rename_court)
            .service(api_rotate_court)
            .service(api_set_timers)
            .service(api_time_slots)
            .service(api_export_csv)
            .service(api_export_json)
            .service(api_import_csv)
            .service(api_import_json)
    })
    .bind(bind)?
    .run()
    .await
}
