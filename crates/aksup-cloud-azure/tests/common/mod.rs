#![allow(dead_code)] // Test helpers appear unused when compiled independently

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{post, put},
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

pub const MOCK_TOKEN: &str = "mock-access-token";
pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";
pub const TENANT: &str = "tenant-1";

/// Which status monitor the PUT response advertises
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Monitor {
    #[default]
    AsyncOperation,
    Location,
    /// No monitor headers; clients fall back to the resource itself
    Resource,
}

/// Knobs and recordings for the fake ARM + identity endpoints
#[derive(Default)]
pub struct MockArmState {
    pub base_url: String,
    pub reject_token: bool,
    pub reject_put: Option<(u16, &'static str, &'static str)>,
    pub fail_get_cluster: bool,
    pub monitor: Monitor,
    /// provisioningState echoed by the PUT response (default `Creating`)
    pub put_state: Option<&'static str>,
    /// HTTP status codes returned by the Location monitor; the last repeats
    pub location_script: VecDeque<u16>,
    pub last_location: Option<u16>,
    /// provisioningState returned by resource GETs; the last repeats
    pub cluster_states: VecDeque<&'static str>,
    pub last_cluster_state: Option<&'static str>,
    /// Status strings returned by the async operation monitor, in order.
    /// The last one repeats.
    pub operation_script: VecDeque<Value>,
    pub last_operation: Option<Value>,
    pub token_requests: Vec<String>,
    pub put_bodies: Vec<Value>,
    pub operation_polls: usize,
    pub location_polls: usize,
    pub cluster_gets: usize,
}

pub struct MockArm {
    pub state: Arc<Mutex<MockArmState>>,
    pub base_url: String,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl MockArm {
    pub async fn start(configure: impl FnOnce(&mut MockArmState)) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock ARM listener");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let mut initial = MockArmState {
            base_url: base_url.clone(),
            ..Default::default()
        };
        configure(&mut initial);
        let state = Arc::new(Mutex::new(initial));

        let app = Router::new()
            .route("/:tenant/oauth2/v2.0/token", post(token))
            .route(
                "/subscriptions/:sub/resourceGroups/:rg/providers/Microsoft.ContainerService/managedClusters/:name",
                put(create_cluster).get(get_cluster),
            )
            .route("/operations/:id", axum::routing::get(get_operation))
            .route("/locations/:id", axum::routing::get(get_location))
            .with_state(state.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = server.await {
                eprintln!("mock ARM server error: {}", err);
            }
        });

        Self {
            state,
            base_url,
            shutdown_tx,
            handle,
        }
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

pub fn op_status(status: &str) -> Value {
    json!({ "name": "op-1", "status": status })
}

pub fn op_failed(code: &str, message: &str) -> Value {
    json!({ "name": "op-1", "status": "Failed", "error": { "code": code, "message": message } })
}

fn arm_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", MOCK_TOKEN))
}

async fn token(
    State(state): State<Arc<Mutex<MockArmState>>>,
    Path(tenant): Path<String>,
    body: String,
) -> Response {
    let mut state = state.lock().await;
    state.token_requests.push(body);

    if state.reject_token || tenant != TENANT {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })),
        )
            .into_response();
    }

    Json(json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "access_token": MOCK_TOKEN
    }))
    .into_response()
}

async fn create_cluster(
    State(state): State<Arc<Mutex<MockArmState>>>,
    Path((_sub, _rg, name)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return arm_error(StatusCode::UNAUTHORIZED, "InvalidAuthenticationToken", "bad token");
    }

    let mut state = state.lock().await;
    state.put_bodies.push(body.clone());

    if let Some((status, code, message)) = state.reject_put {
        return arm_error(StatusCode::from_u16(status).unwrap(), code, message);
    }

    let mut echoed = body;
    echoed["name"] = json!(name);
    echoed["properties"]["provisioningState"] = json!(state.put_state.unwrap_or("Creating"));

    match state.monitor {
        Monitor::AsyncOperation => {
            let monitor = format!(
                "{}/operations/op-1?api-version=2017-08-31",
                state.base_url
            );
            (
                StatusCode::CREATED,
                [("Azure-AsyncOperation", monitor)],
                Json(echoed),
            )
                .into_response()
        }
        Monitor::Location => {
            let monitor = format!("{}/locations/op-1?api-version=2017-08-31", state.base_url);
            (StatusCode::ACCEPTED, [(header::LOCATION.as_str(), monitor)], Json(echoed))
                .into_response()
        }
        Monitor::Resource => (StatusCode::CREATED, Json(echoed)).into_response(),
    }
}

async fn get_location(
    State(state): State<Arc<Mutex<MockArmState>>>,
    Path(_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return arm_error(StatusCode::UNAUTHORIZED, "InvalidAuthenticationToken", "bad token");
    }

    let mut state = state.lock().await;
    state.location_polls += 1;
    if let Some(next) = state.location_script.pop_front() {
        state.last_location = Some(next);
    }
    let status = StatusCode::from_u16(state.last_location.unwrap_or(202)).unwrap();
    if status.is_success() {
        status.into_response()
    } else {
        arm_error(status, "InternalServerError", "monitor failure")
    }
}

async fn get_operation(
    State(state): State<Arc<Mutex<MockArmState>>>,
    Path(_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return arm_error(StatusCode::UNAUTHORIZED, "InvalidAuthenticationToken", "bad token");
    }

    let mut state = state.lock().await;
    state.operation_polls += 1;
    if let Some(next) = state.operation_script.pop_front() {
        state.last_operation = Some(next);
    }
    match state.last_operation.clone() {
        Some(Value::Number(code)) => {
            let status = StatusCode::from_u16(code.as_u64().unwrap_or(500) as u16).unwrap();
            arm_error(status, "InternalServerError", "transient failure")
        }
        Some(body) => Json(body).into_response(),
        None => Json(op_status("InProgress")).into_response(),
    }
}

async fn get_cluster(
    State(state): State<Arc<Mutex<MockArmState>>>,
    Path((sub, rg, name)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return arm_error(StatusCode::UNAUTHORIZED, "InvalidAuthenticationToken", "bad token");
    }

    let mut state = state.lock().await;
    state.cluster_gets += 1;
    if state.fail_get_cluster {
        return arm_error(StatusCode::NOT_FOUND, "ResourceNotFound", "cluster not found");
    }
    if let Some(next) = state.cluster_states.pop_front() {
        state.last_cluster_state = Some(next);
    }
    let provisioning_state = state.last_cluster_state.unwrap_or("Succeeded");

    Json(json!({
        "id": format!("/subscriptions/{}/resourcegroups/{}/providers/Microsoft.ContainerService/managedClusters/{}", sub, rg, name),
        "name": name,
        "location": "eastus",
        "properties": {
            "provisioningState": provisioning_state,
            "powerState": { "code": "Running" },
            "kubernetesVersion": "1.22.6",
            "dnsPrefix": name,
            "fqdn": format!("{}-dns.hcp.eastus.azmk8s.io", name),
            "nodeResourceGroup": format!("MC_{}_{}_eastus", rg, name),
            "agentPoolProfiles": [
                { "name": "pool", "count": 1, "vmSize": "Standard_D2s_v3", "mode": "System" }
            ],
            "servicePrincipalProfile": { "clientId": "client-1" }
        }
    }))
    .into_response()
}
