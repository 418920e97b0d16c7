//! End-to-end test against a stand-in roster backend.
//!
//! Serves the backend endpoints with axum on an ephemeral port and drives
//! the real HTTP transport through login, a spreadsheet drop, a batch
//! push and a restored session.

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use roster_sync::cli::Commands;
use roster_sync::config::ConsoleConfig;
use roster_sync::execute;
use roster_sync::models::{BatchAction, BatchSurface};
use roster_sync::services::pipeline::UploadTarget;
use roster_sync::state::Console;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// `Basic base64("admin:hunter2")`.
const EXPECTED_AUTH: &str = "Basic YWRtaW46aHVudGVyMg==";

#[derive(Default)]
struct Backend {
    auth_headers: Vec<String>,
    uploads: Vec<(String, String, String)>,
    ingested: bool,
    invalidations: usize,
    batches: Vec<Value>,
}

type Shared = Arc<Mutex<Backend>>;
type Reply = Result<Json<Value>, (StatusCode, String)>;

fn check_auth(state: &Shared, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let values: Vec<String> = headers
        .get_all("authorization")
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect();
    let mut backend = state.lock().unwrap();
    backend.auth_headers.extend(values.iter().cloned());
    if values.len() == 1 && values[0] == EXPECTED_AUTH {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()))
    }
}

async fn authenticate(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    check_auth(&state, &headers)?;
    Ok(Json(json!({ "message": "ok" })))
}

async fn upload_csv(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply {
    check_auth(&state, &headers)?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let text = field
            .text()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        state.lock().unwrap().uploads.push((name, file_name, text));
    }
    Ok(Json(json!({ "message": "File uploaded" })))
}

async fn ingest_csv(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    check_auth(&state, &headers)?;
    let mut backend = state.lock().unwrap();
    if backend.uploads.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Nothing uploaded".to_string()));
    }
    backend.ingested = true;
    Ok(Json(json!({ "message": "Roster ingested" })))
}

async fn invalidate(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    check_auth(&state, &headers)?;
    state.lock().unwrap().invalidations += 1;
    Ok(Json(json!({})))
}

async fn get_info(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    check_auth(&state, &headers)?;
    let info = if state.lock().unwrap().ingested {
        json!([{ "buid": "U1", "name": "Ada", "project_name": "engine", "status": "invited" }])
    } else {
        json!([])
    };
    Ok(Json(json!({ "info": info })))
}

async fn get_csv(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    check_auth(&state, &headers)?;
    let rows = if state.lock().unwrap().uploads.is_empty() {
        json!([])
    } else {
        json!([{ "buid": "U1", "name": "Ada" }])
    };
    Ok(Json(json!({ "csv": rows })))
}

async fn get_csv_projects(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    check_auth(&state, &headers)?;
    Ok(Json(json!({ "csv_projects": [] })))
}

async fn get_projects(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    check_auth(&state, &headers)?;
    Ok(Json(json!({
        "projects": [
            { "name": "engine", "semester": "s25", "github_url": "https://github.com/spark/engine" },
            { "name": "loom", "semester": "s25", "github_url": "https://github.com/spark/loom" },
        ]
    })))
}

async fn get_repos(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    check_auth(&state, &headers)?;
    Ok(Json(json!({ "repos": [["engine", "https://github.com/spark/engine"]] })))
}

async fn set_projects(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    check_auth(&state, &headers)?;
    let action = body["action"].as_str().unwrap_or_default().to_string();
    let names: Vec<String> = body["projects"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|pair| format!("{}: {} granted", pair[0].as_str().unwrap_or_default(), action))
                .collect()
        })
        .unwrap_or_default();
    state.lock().unwrap().batches.push(body);
    Ok(Json(json!({ "results": names })))
}

async fn start_backend() -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(Backend::default()));
    let app = Router::new()
        .route("/authenticate", post(authenticate))
        .route("/upload/csv", post(upload_csv))
        .route("/ingest/csv", post(ingest_csv))
        .route("/refresh", post(invalidate))
        .route("/get_info", get(get_info))
        .route("/get_csv", get(get_csv))
        .route("/get_csv_projects", get(get_csv_projects))
        .route("/get_projects", get(get_projects))
        .route("/git/get_all_repos", get(get_repos))
        .route("/set_projects", post(set_projects))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

fn config(api_url: &str, dir: &std::path::Path) -> ConsoleConfig {
    ConsoleConfig {
        api_url: api_url.to_string(),
        timeout_secs: Some(10),
        store_path: dir.join("session.json"),
    }
}

#[tokio::test]
async fn test_login_upload_and_push_over_http() {
    let (url, backend) = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let console = Console::with_http(config(&url, dir.path())).unwrap();

    // Rejected login leaves nothing on disk.
    let err = execute(
        &console,
        Commands::Login {
            username: "admin".to_string(),
            password: "wrong".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_authentication());
    assert!(err.to_string().contains("Invalid credentials"));
    assert!(!dir.path().join("session.json").exists());

    execute(
        &console,
        Commands::Login {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        },
    )
    .await
    .unwrap();
    assert!(dir.path().join("session.json").exists());

    // Drop a roster spreadsheet.
    let roster = dir.path().join("roster.csv");
    std::fs::write(&roster, "buid,name\nU1,Ada\n").unwrap();
    let output = execute(
        &console,
        Commands::Upload {
            files: vec![roster],
            target: UploadTarget::Roster,
        },
    )
    .await
    .unwrap();
    assert_eq!(output, "File uploaded\nRoster ingested");

    {
        let backend = backend.lock().unwrap();
        assert_eq!(
            backend.uploads,
            vec![(
                "file".to_string(),
                "roster.csv".to_string(),
                "buid,name\nU1,Ada\n".to_string()
            )]
        );
        assert!(backend.ingested);
        assert_eq!(backend.invalidations, 1);
    }
    let info = console.resources().info.rows().await;
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].buid, "U1");
    assert_eq!(info[0].project, "engine");

    // Push on the second project.
    let output = execute(
        &console,
        Commands::Set {
            action: BatchAction::Push,
            surface: BatchSurface::Projects,
            select: vec![1],
            unlock: true,
        },
    )
    .await
    .unwrap();
    assert_eq!(output, "loom: push granted");

    {
        let backend = backend.lock().unwrap();
        assert_eq!(
            backend.batches,
            vec![json!({
                "action": "push",
                "projects": [["loom", "https://github.com/spark/loom"]]
            })]
        );
        // Every call after the rejected probe carried the same single header.
        assert!(backend.auth_headers[1..].iter().all(|h| h == EXPECTED_AUTH));
    }
}

#[tokio::test]
async fn test_restored_session_is_trusted() {
    let (url, backend) = start_backend().await;
    let dir = tempfile::tempdir().unwrap();

    let first = Console::with_http(config(&url, dir.path())).unwrap();
    execute(
        &first,
        Commands::Login {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        },
    )
    .await
    .unwrap();
    drop(first);

    let restored = Console::with_http(config(&url, dir.path())).unwrap();
    assert!(restored.session().is_authenticated().await);
    let calls_before = backend.lock().unwrap().auth_headers.len();

    let output = execute(
        &restored,
        Commands::Show {
            resource: roster_sync::models::ResourceKind::Repos,
        },
    )
    .await
    .unwrap();

    assert!(output.contains("engine"));
    // Five table loads, no second authenticate probe.
    assert_eq!(backend.lock().unwrap().auth_headers.len(), calls_before + 5);
}
