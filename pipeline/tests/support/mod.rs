#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use pipeline::{Config, DiagnosisService};
use serde_json::Value;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Debug)]
pub enum Reply {
    Json(u16, Value),
    Text(u16, String),
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

struct FakeState {
    routes: HashMap<String, Reply>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Model and advice services stand-in. Runs its own actix system on a
/// background thread and records every request it receives.
pub struct FakeBackend {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeBackend {
    pub fn start(routes: &[(&str, Reply)]) -> Self {
        let routes: HashMap<String, Reply> = routes
            .iter()
            .map(|(path, reply)| (path.to_string(), reply.clone()))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            actix_web::rt::System::new().block_on(async move {
                let state = web::Data::new(FakeState {
                    routes,
                    requests: recorded,
                });
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(state.clone())
                        .default_service(web::to(record))
                })
                .workers(1)
                .bind(("127.0.0.1", 0))
                .expect("bind fake backend");

                tx.send(server.addrs()[0]).expect("report fake backend address");
                server.run().await
            })
        });

        let addr = rx.recv().expect("fake backend did not start");
        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn record(req: HttpRequest, body: web::Bytes, state: web::Data<FakeState>) -> HttpResponse {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        path: req.path().to_string(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    match state.routes.get(req.path()) {
        Some(Reply::Json(status, body)) => {
            HttpResponse::build(StatusCode::from_u16(*status).unwrap()).json(body)
        }
        Some(Reply::Text(status, body)) => {
            HttpResponse::build(StatusCode::from_u16(*status).unwrap()).body(body.clone())
        }
        None => HttpResponse::NotFound().finish(),
    }
}

/// An address nothing is listening on.
pub fn closed_port_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, path)
}

pub fn config(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn service(pairs: &[(&str, &str)]) -> DiagnosisService {
    DiagnosisService::from_config(&config(pairs)).unwrap()
}

pub fn prediction_json(label: &str, confidence: f64) -> Value {
    let mut probs = serde_json::Map::new();
    probs.insert("HEALTHY_LEAF".to_string(), Value::from(1.0 - confidence));
    probs.insert(label.to_string(), Value::from(confidence));
    serde_json::json!({
        "label": label,
        "probs": probs,
        "latency_ms": 87,
        "model_version": "leaf-v3"
    })
}

pub fn advice_json(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "bullets": ["Remove infected leaves", "Improve drainage"],
        "disclaimer": "Follow product labels"
    })
}
