// tests/api_tests.rs
//
// Backend falso en axum sobre un puerto efímero; la consola habla con él por HTTP real.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
};
use bodega_console::{
    api::{HttpTransport, Transport},
    cli::Cli,
    common::{error::AppError, notice::NoticeLevel},
    config::{AppConfig, AppState},
    handlers::{self, Output},
    middleware::auth::{SessionContext, SessionStore},
    models::auth::SessionUser,
};
use clap::Parser;
use serde_json::{Value, json};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
struct Hit {
    method: String,
    path: String,
    authorization: Option<String>,
}

#[derive(Default)]
struct Backend {
    clientes: Mutex<Vec<Value>>,
    hits: Mutex<Vec<Hit>>,
}

type Shared = Arc<Backend>;

async fn record(State(backend): State<Shared>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.hits.lock().unwrap().push(Hit {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization,
    });
    next.run(request).await
}

async fn list_clientes(State(backend): State<Shared>) -> Json<Value> {
    let clientes = backend.clientes.lock().unwrap().clone();
    Json(json!({ "success": true, "clientes": clientes }))
}

async fn toggle_cliente(State(backend): State<Shared>, Path((id, action)): Path<(i64, String)>) -> Response {
    let mut clientes = backend.clientes.lock().unwrap();
    let Some(cliente) = clientes.iter_mut().find(|c| c["id"] == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"success": false, "error": "Cliente no encontrado"}))).into_response();
    };
    cliente["activo"] = json!(action == "activar");
    let verb = if action == "activar" { "activado" } else { "desactivado" };
    Json(json!({"success": true, "message": format!("Cliente {}", verb)})).into_response()
}

async fn register_proveedor() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"success": false, "message": "El RUT ya está registrado"}))).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secreta" {
        Json(json!({"token": "tok-int", "cargo": 2, "nombre": "Marta", "apellido": "Rojas"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Credenciales inválidas"}))).into_response()
    }
}

async fn broken_products() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Server Error (500)</h1>")).into_response()
}

struct Harness {
    backend: Shared,
    base_url: String,
    dir: TempDir,
}

impl Harness {
    async fn start() -> Self {
        let backend: Shared = Arc::new(Backend::default());
        *backend.clientes.lock().unwrap() = vec![
            json!({"id": 1, "nombre": "Supermercado Norte", "rut": "76111222-3", "activo": true, "es_persona_juridica": true}),
            json!({"id": 2, "nombre": "Almacén Doña Rosa", "rut": "12345678-9", "activo": false}),
        ];

        let app = Router::new()
            .route("/api/admin/clientes/", get(list_clientes))
            .route("/api/admin/clientes/{id}/{action}/", put(toggle_cliente))
            .route("/api/admin/proveedores/registrar/", post(register_proveedor))
            .route("/api/auth/login/", post(login))
            .route("/api/data/productos-admin/", get(broken_products))
            .layer(middleware::from_fn_with_state(backend.clone(), record))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { backend, base_url: format!("http://{}/api/", addr), dir: tempfile::tempdir().unwrap() }
    }

    fn state(&self, session: SessionContext) -> AppState {
        let config = AppConfig {
            api_url: self.base_url.clone(),
            session_file: self.dir.path().join("session.json"),
            export_dir: self.dir.path().to_path_buf(),
            reload_delay: Duration::ZERO,
            ..AppConfig::default()
        };
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(self.base_url.clone()).unwrap());
        let store = SessionStore::new(config.session_file.clone());
        AppState::with_transport(config, transport, store, session)
    }

    fn hits(&self) -> Vec<Hit> {
        self.backend.hits.lock().unwrap().clone()
    }
}

fn session(cargo: i64) -> SessionContext {
    SessionContext::authenticated(SessionUser {
        token: "tok-int".into(),
        cargo,
        nombre: "Ana".into(),
        apellido: "Pérez".into(),
    })
}

async fn run(state: &AppState, args: &[&str]) -> Result<Output, AppError> {
    let cli = Cli::parse_from(std::iter::once("bodega").chain(args.iter().copied()));
    handlers::run(cli.command, state).await
}

fn notice(output: Output) -> (NoticeLevel, String) {
    match output {
        Output::Notice(n) => (n.level, n.message),
        other => panic!("se esperaba un aviso, llegó {:?}", other),
    }
}

#[tokio::test]
async fn toggle_deactivates_and_refetches_once() {
    let harness = Harness::start().await;
    let state = harness.state(session(4));

    let (level, message) = notice(run(&state, &["clientes", "toggle", "1"]).await.unwrap());

    assert_eq!(level, NoticeLevel::Success);
    assert_eq!(message, "Cliente desactivado");
    let hits = harness.hits();
    let summary: Vec<(&str, &str)> = hits.iter().map(|h| (h.method.as_str(), h.path.as_str())).collect();
    assert_eq!(
        summary,
        vec![
            ("GET", "/api/admin/clientes/"),
            ("PUT", "/api/admin/clientes/1/desactivar/"),
            ("GET", "/api/admin/clientes/"),
        ]
    );
    assert!(hits.iter().all(|h| h.authorization.as_deref() == Some("Token tok-int")));
    assert_eq!(harness.backend.clientes.lock().unwrap()[0]["activo"], false);
}

#[tokio::test]
async fn list_filters_by_status_after_the_fetch() {
    let harness = Harness::start().await;
    let state = harness.state(session(4));

    let output = run(&state, &["clientes", "listar", "--estado", "inactivo"]).await.unwrap();

    let Output::Listing(listing) = output else { panic!("se esperaba un listado") };
    assert_eq!(listing.json["total"], 1);
    assert_eq!(listing.json["rows"][0]["nombre"], "Almacén Doña Rosa");
    assert!(listing.to_string().starts_with("Clientes"));
}

#[tokio::test]
async fn declared_failure_shows_the_server_message() {
    let harness = Harness::start().await;
    let state = harness.state(session(4));

    let output = run(
        &state,
        &[
            "proveedores", "registrar",
            "--tipo", "juridica",
            "--nombre", "Distribuidora Central",
            "--rut", "76543210-1",
            "--telefono", "912345678",
            "--email", "ventas@central.cl",
            "--direccion", "Av. Matta 1200",
            "--region", "Región Metropolitana de Santiago",
        ],
    )
    .await
    .unwrap();

    assert!(output.is_failure());
    let (_, message) = notice(output);
    assert_eq!(message, "El RUT ya está registrado");
    // sin recarga tras un fallo
    assert_eq!(harness.hits().len(), 1);
}

#[tokio::test]
async fn invalid_form_never_reaches_the_backend() {
    let harness = Harness::start().await;
    let state = harness.state(session(4));

    let output = run(&state, &["proveedores", "registrar", "--nombre", "AB"]).await.unwrap();

    let (level, message) = notice(output);
    assert_eq!(level, NoticeLevel::Error);
    assert!(message.contains("nombre: El nombre debe tener al menos 3 caracteres"));
    assert!(harness.hits().is_empty());
}

#[tokio::test]
async fn guard_stops_commands_outside_the_role_menu() {
    let harness = Harness::start().await;
    let bodeguero = harness.state(session(1));

    let err = run(&bodeguero, &["clientes", "listar"]).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let anonymous = harness.state(SessionContext::anonymous());
    let err = run(&anonymous, &["clientes", "listar"]).await.unwrap_err();
    assert!(matches!(err, AppError::NotAuthenticated));

    assert!(harness.hits().is_empty());
}

#[tokio::test]
async fn html_error_page_falls_back_to_the_generic_message() {
    let harness = Harness::start().await;
    let state = harness.state(session(4));

    let err = run(&state, &["productos", "listar"]).await.unwrap_err();

    assert!(matches!(err, AppError::Api { status: 500, .. }));
    assert_eq!(err.user_message(), "Error al cargar los productos");
}

#[tokio::test]
async fn login_is_public_and_persists_the_session() {
    let harness = Harness::start().await;
    let state = harness.state(SessionContext::anonymous());

    let (level, message) =
        notice(run(&state, &["login", "--rut", "12345678-9", "--password", "secreta"]).await.unwrap());

    assert_eq!(level, NoticeLevel::Success);
    assert!(message.ends_with("/jefebodega"));
    assert_eq!(harness.hits()[0].authorization, None);

    let saved = state.store.load().await;
    assert_eq!(saved.token(), Some("tok-int"));
    assert_eq!(saved.role().code(), 2);
}

#[tokio::test]
async fn wrong_password_keeps_the_session_empty() {
    let harness = Harness::start().await;
    let state = harness.state(SessionContext::anonymous());

    let err = run(&state, &["login", "--rut", "12345678-9", "--password", "otra"]).await.unwrap_err();

    assert_eq!(err.user_message(), "Credenciales inválidas");
    assert_eq!(state.store.load().await.token(), None);
}
