//! An in-process stand-in for the parts of the Kubernetes API that the manager and the event
//! watcher talk to. Requests are recorded so tests can check what was (or was not) done.

use chrono::{SecondsFormat, Utc};
use futures::{stream, StreamExt};
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, StatusCode};
use hyper::body::Bytes;
use hyper::Body;
use k8s_openapi::api::core::v1::Event;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};

/// The uid the mock assigns to every `Cluster` it creates.
pub(crate) const CREATED_UID: &str = "created-uid";

#[derive(Debug, Default)]
pub(crate) struct MockState {
    /// Whether the namespace exists. Creating it again is a conflict.
    pub(crate) namespace_exists: bool,
    /// Answer namespace deletion with a server error.
    pub(crate) namespace_delete_fails: bool,
    /// Answer every events request with `403`.
    pub(crate) events_forbidden: bool,
    /// Events already present when the watch lists the namespace.
    pub(crate) listed_events: Vec<Event>,
    /// Events streamed to the watch after the initial list. The stream stays open afterwards.
    pub(crate) watched_events: Vec<Event>,
    /// `METHOD /path` of every request received.
    pub(crate) requests: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockApi {
    state: Arc<Mutex<MockState>>,
}

impl MockApi {
    pub(crate) fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    pub(crate) fn client(&self) -> kube::Client {
        let api = self.clone();
        let service = tower::service_fn(move |request: Request<Body>| {
            let api = api.clone();
            async move { Ok::<_, Infallible>(api.handle(request).await) }
        });
        kube::Client::new(service, "default")
    }

    async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let (parts, body) = request.into_parts();
        let body = hyper::body::to_bytes(body).await.unwrap_or_default();
        let path = parts.uri.path().to_string();
        let watch = parts
            .uri
            .query()
            .map(|query| query.contains("watch=true"))
            .unwrap_or(false);

        let mut state = self.state();
        state.requests.push(format!("{} {}", parts.method, path));
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        match (&parts.method, segments.as_slice()) {
            (&Method::POST, ["api", "v1", "namespaces"]) => {
                if state.namespace_exists {
                    return failure(StatusCode::CONFLICT, "AlreadyExists", "namespace exists");
                }
                state.namespace_exists = true;
                respond(StatusCode::CREATED, parse(&body))
            }
            (&Method::GET, ["api", "v1", "namespaces", name]) => {
                if !state.namespace_exists {
                    return failure(StatusCode::NOT_FOUND, "NotFound", "no such namespace");
                }
                respond(StatusCode::OK, namespace(name))
            }
            (&Method::DELETE, ["api", "v1", "namespaces", name]) => {
                if state.namespace_delete_fails {
                    return failure(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "InternalError",
                        "etcd is unavailable",
                    );
                }
                state.namespace_exists = false;
                respond(StatusCode::OK, namespace(name))
            }
            (&Method::POST, ["apis", "cluster.k8s.io", "v1alpha1", "namespaces", _, "clusters"]) => {
                let mut cluster = parse(&body);
                cluster["metadata"]["uid"] = json!(CREATED_UID);
                cluster["metadata"]["resourceVersion"] = json!("1");
                cluster["metadata"]["creationTimestamp"] =
                    json!(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
                respond(StatusCode::CREATED, cluster)
            }
            (&Method::GET, ["api", "v1", "namespaces", _, "events"]) if state.events_forbidden => {
                failure(StatusCode::FORBIDDEN, "Forbidden", "events is forbidden")
            }
            (&Method::GET, ["api", "v1", "namespaces", _, "events"]) if watch => {
                let lines: Vec<Result<Bytes, Infallible>> = state
                    .watched_events
                    .iter()
                    .map(|event| {
                        // The watcher rejects watch events without a resourceVersion.
                        let mut object = json!(event);
                        object["metadata"]["resourceVersion"] = json!("2");
                        Ok(Bytes::from(format!(
                            "{}\n",
                            json!({ "type": "ADDED", "object": object })
                        )))
                    })
                    .collect();
                let body = stream::iter(lines).chain(stream::pending());
                Response::builder()
                    .status(StatusCode::OK)
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::wrap_stream(body))
                    .unwrap()
            }
            (&Method::GET, ["api", "v1", "namespaces", _, "events"]) => respond(
                StatusCode::OK,
                json!({
                    "apiVersion": "v1",
                    "kind": "EventList",
                    "metadata": { "resourceVersion": "1" },
                    "items": state.listed_events,
                }),
            ),
            _ => failure(StatusCode::NOT_FOUND, "NotFound", "unknown path"),
        }
    }
}

fn parse(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| json!({}))
}

fn namespace(name: &str) -> Value {
    json!({ "apiVersion": "v1", "kind": "Namespace", "metadata": { "name": name } })
}

fn respond(code: StatusCode, body: Value) -> Response<Body> {
    Response::builder()
        .status(code)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn failure(code: StatusCode, reason: &str, message: &str) -> Response<Body> {
    respond(
        code,
        json!({
            "apiVersion": "v1",
            "kind": "Status",
            "metadata": {},
            "status": "Failure",
            "reason": reason,
            "message": message,
            "code": code.as_u16(),
        }),
    )
}
