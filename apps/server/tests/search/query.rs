//! Free-text search (GET /{resource}?q=)

use crate::support::*;
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn search_patients_by_name_and_identifier() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let list = app.get_json("patient?q=Horatio").await?;
            assert_eq!(result_uuids(&list), [HORATIO_PATIENT]);
            assert_eq!(list["results"][0]["display"], "101-6 - Horatio Test Hornblower");

            let list = app.get_json("patient?q=101-6").await?;
            assert_eq!(result_uuids(&list), [HORATIO_PATIENT]);

            // Secondary identifiers are searchable too
            let list = app.get_json("patient?q=old-9900").await?;
            assert_eq!(result_uuids(&list), [HORATIO_PATIENT]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn every_query_token_must_match() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            // "Test" is shared; ordering follows display
            let list = app.get_json("patient?q=test").await?;
            assert_eq!(result_uuids(&list), [HORATIO_PATIENT, COLLET_PATIENT]);

            let list = app.get_json("patient?q=Test+Cheb").await?;
            assert_eq!(result_uuids(&list), [COLLET_PATIENT]);

            let list = app.get_json("patient?q=Horatio+Chebaskwony").await?;
            assert!(result_uuids(&list).is_empty());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn search_ignores_case_and_accents() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let payload = json!({
                "gender": "M",
                "names": [{ "givenName": "José", "familyName": "Núñez" }]
            });
            let (status, _headers, _body) = app
                .request(Method::POST, &format!("{BASE}/person"), Some(to_json_body(&payload)?))
                .await?;
            assert_status(status, StatusCode::CREATED, "create person");

            let list = app.get_json("person?q=JOSE%20nunez").await?;
            assert_eq!(list["results"][0]["display"], "José Núñez");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn voided_records_are_hidden_unless_requested() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let list = app.get_json("patient?q=Horace").await?;
            assert!(result_uuids(&list).is_empty());

            let list = app.get_json("patient?q=Horace&includeAll=true").await?;
            assert_eq!(result_uuids(&list), [VOIDED_PATIENT]);

            // Voiding through the API takes effect immediately
            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("{BASE}/patient/{HORATIO_PATIENT}"), None)
                .await?;
            assert_status(status, StatusCode::OK, "void patient");
            let list = app.get_json("patient?q=Hornblower").await?;
            assert!(result_uuids(&list).is_empty());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn voiding_a_person_keeps_their_patient_searchable() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("{BASE}/person/{COLLET_PERSON}"), None)
                .await?;
            assert_status(status, StatusCode::OK, "void person");

            // The patient itself is not voided and stays searchable
            let list = app.get_json("patient?q=Collet").await?;
            assert_eq!(result_uuids(&list), [COLLET_PATIENT]);

            let list = app.get_json("person?q=Collet").await?;
            assert!(result_uuids(&list).is_empty());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn search_uses_requested_representation() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let list = app.get_json("patient?q=6TS&v=ref").await?;
            let result = &list["results"][0];
            assert_eq!(result["uuid"], COLLET_PATIENT);
            assert!(result.get("person").is_none());

            let list = app.get_json("location?q=xan&v=full").await?;
            assert_eq!(list["results"][0]["uuid"], XANADU);
            assert!(list["results"][0]["auditInfo"].is_object());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn blank_query_matches_nothing() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let list = app.get_json("patient?q=%20--%20").await?;
            assert!(result_uuids(&list).is_empty());
            assert_eq!(list["links"], json!([]));
            Ok(())
        })
    })
    .await
}
