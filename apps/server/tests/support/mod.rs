//! Shared helpers for integration tests
//!
//! Every test gets a fresh in-memory app seeded from
//! `tests/fixtures/standard_test_dataset.json`. Requests go straight through
//! the router with `tower::ServiceExt::oneshot`; no socket is opened.

use std::future::Future;
use std::pin::Pin;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use chartkeeper::{api::create_router, config::Config, state::AppState};
use serde::Serialize;
use tower::ServiceExt;

pub const BASE: &str = "/ws/rest/v1";

// Reference data
pub const UNKNOWN_LOCATION: &str = "8d6c993e-c2cc-11de-8d13-0010c6dffd0f";
pub const XANADU: &str = "9356400c-a5a2-4532-8f2b-2361b3446eb8";
pub const OPENMRS_ID_TYPE: &str = "1a339fe9-38bc-4ab3-b180-320988c0b968";
pub const OLD_ID_TYPE: &str = "2f470aa8-1d73-43b7-81b5-01f0c0dfa53c";
pub const RETIRED_ID_TYPE: &str = "8d79403a-c2cc-11de-8d13-0010c6dffd0f";

// Patients and their persons
pub const HORATIO_PATIENT: &str = "da7f524f-27ce-4bb2-86d6-6d1d05312bd5";
pub const HORATIO_PERSON: &str = "341b4e41-6a2b-4f71-8ba4-95b1ae4c0dbc";
pub const HORATIO_NAME: &str = "399e3a7b-6482-487d-94ce-c07bb3ca3cc7";
pub const HORATIO_OLD_IDENTIFIER: &str = "4f5d8d4a-1c2e-4b6f-9a7e-2d3c4b5a6f70";
pub const COLLET_PATIENT: &str = "86526ed6-3c11-11de-a0ba-001e378eb67e";
pub const COLLET_PERSON: &str = "5946f880-b197-400b-9caa-a3c661d23041";
pub const VOIDED_PATIENT: &str = "61b38324-e2fd-4feb-95b7-9e9a2a4400df";

// Persons that are not patients
pub const JOHNNY_PERSON: &str = "ba1b19c2-3ed6-4f63-b8c0-f762dc8d7562";
pub const ANET_PERSON: &str = "a7e04421-525f-442f-8138-05b619d16def";

pub const NON_EXISTENT_UUID: &str = "00000000-0000-4000-8000-000000000000";

pub type TestFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>>>>;

pub fn fixture_path() -> String {
    format!(
        "{}/tests/fixtures/standard_test_dataset.json",
        env!("CARGO_MANIFEST_DIR")
    )
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.rest.seed_file = Some(fixture_path());
    config
}

#[derive(Clone)]
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let state = AppState::new(config).await?;
        let router = create_router(state.clone());
        Ok(Self { state, router })
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_with_extra_headers(method, path, body, &[])
            .await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut builder = Request::builder().method(method).uri(path);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty))?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, headers, bytes))
    }

    /// GET `{BASE}/{path}` and parse the body, asserting 200.
    pub async fn get_json(&self, path: &str) -> anyhow::Result<serde_json::Value> {
        let (status, _headers, body) = self
            .request(Method::GET, &format!("{BASE}/{path}"), None)
            .await?;
        if status != StatusCode::OK {
            eprintln!("{}", String::from_utf8_lossy(&body));
        }
        assert_status(status, StatusCode::OK, path);
        Ok(serde_json::from_slice(&body)?)
    }
}

pub async fn with_test_app<F>(test: F) -> anyhow::Result<()>
where
    F: FnOnce(TestApp) -> TestFuture,
{
    with_test_app_with_config(|_| {}, test).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, test: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: FnOnce(TestApp) -> TestFuture,
{
    let mut config = test_config();
    configure(&mut config);
    let app = TestApp::new(config).await?;
    test(app).await
}

pub fn to_json_body<T: Serialize>(value: &T) -> anyhow::Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

#[track_caller]
pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(
        actual, expected,
        "unexpected status for {context}: got {actual}, expected {expected}"
    );
}

/// Error code from a `{"error": {"code", "message"}}` body.
pub fn error_code(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["code"].as_str().map(str::to_string))
        .unwrap_or_default()
}

/// UUIDs of the `results` array of a list response, in order.
pub fn result_uuids(list: &serde_json::Value) -> Vec<String> {
    list["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter_map(|r| r["uuid"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
