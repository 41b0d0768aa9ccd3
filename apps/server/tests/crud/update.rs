//! UPDATE (POST /{resource}/{uuid})

use crate::support::*;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn update_replaces_patient_identifiers() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let payload = json!({
                "identifiers": [
                    {
                        "uuid": HORATIO_OLD_IDENTIFIER,
                        "identifier": "OLD-9900",
                        "identifierType": OLD_ID_TYPE,
                        "location": XANADU,
                        "preferred": true
                    },
                    {
                        "identifier": "101-7",
                        "identifierType": OPENMRS_ID_TYPE,
                        "location": UNKNOWN_LOCATION
                    }
                ]
            });
            let (status, _headers, body) = app
                .request_with_extra_headers(
                    Method::POST,
                    &format!("{BASE}/patient/{HORATIO_PATIENT}?v=full"),
                    Some(to_json_body(&payload)?),
                    &[("x-records-user", "registrar")],
                )
                .await?;
            assert_status(status, StatusCode::OK, "update patient");

            let updated: Value = serde_json::from_slice(&body)?;
            assert_eq!(updated["display"], "OLD-9900 - Horatio Test Hornblower");
            assert_eq!(updated["identifiers"][0]["uuid"], HORATIO_OLD_IDENTIFIER);
            assert_eq!(updated["identifiers"][1]["identifier"], "101-7");
            assert_eq!(updated["auditInfo"]["changedBy"], "registrar");
            assert!(updated["auditInfo"]["dateChanged"].is_string());

            // The dropped identifier no longer matches
            let list = app.get_json("patient?q=101-6").await?;
            assert!(result_uuids(&list).is_empty());
            let list = app.get_json("patient?q=101-7").await?;
            assert_eq!(result_uuids(&list), [HORATIO_PATIENT]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn patient_person_cannot_change() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let before = app.get_json(&format!("patient/{HORATIO_PATIENT}?v=full")).await?;

            let payload = json!({
                "person": JOHNNY_PERSON,
                "identifiers": [{
                    "identifier": "101-8",
                    "identifierType": OPENMRS_ID_TYPE,
                    "location": XANADU,
                    "preferred": true
                }]
            });
            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    &format!("{BASE}/patient/{HORATIO_PATIENT}"),
                    Some(to_json_body(&payload)?),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "change person");
            assert_eq!(error_code(&body), "conversion");

            // Nothing from the rejected payload was applied
            let after = app.get_json(&format!("patient/{HORATIO_PATIENT}?v=full")).await?;
            assert_eq!(after, before);
            let list = app.get_json("patient?q=101-8").await?;
            assert!(result_uuids(&list).is_empty());

            // Naming the current person is accepted
            let (status, _headers, _body) = app
                .request(
                    Method::POST,
                    &format!("{BASE}/patient/{HORATIO_PATIENT}"),
                    Some(to_json_body(&json!({ "person": { "uuid": HORATIO_PERSON } }))?),
                )
                .await?;
            assert_status(status, StatusCode::OK, "same person");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_rejects_foreign_identifier_uuid() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let payload = json!({
                "identifiers": [{
                    "uuid": HORATIO_OLD_IDENTIFIER,
                    "identifier": "6TS-5",
                    "identifierType": OPENMRS_ID_TYPE,
                    "location": XANADU
                }]
            });
            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    &format!("{BASE}/patient/{COLLET_PATIENT}"),
                    Some(to_json_body(&payload)?),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "foreign identifier");
            assert_eq!(error_code(&body), "conversion");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn person_update_is_partial_and_reindexes_patient() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let payload = json!({
                "names": [{
                    "uuid": HORATIO_NAME,
                    "givenName": "Horatio",
                    "familyName": "Hornblöwer-Smythe"
                }]
            });
            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    &format!("{BASE}/person/{HORATIO_PERSON}?v=full"),
                    Some(to_json_body(&payload)?),
                )
                .await?;
            assert_status(status, StatusCode::OK, "update person");

            let person: Value = serde_json::from_slice(&body)?;
            assert_eq!(person["display"], "Horatio Hornblöwer-Smythe");
            assert_eq!(person["names"][0]["uuid"], HORATIO_NAME);
            // Untouched fields survive
            assert_eq!(person["gender"], "M");
            assert_eq!(person["birthdate"], "1975-04-08");

            // The patient display and search entry follow the person
            let patient = app.get_json(&format!("patient/{HORATIO_PATIENT}")).await?;
            assert_eq!(patient["display"], "101-6 - Horatio Hornblöwer-Smythe");
            let list = app.get_json("patient?q=smythe").await?;
            assert_eq!(result_uuids(&list), [HORATIO_PATIENT]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_of_missing_or_read_only_resources_fails() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    &format!("{BASE}/person/{NON_EXISTENT_UUID}"),
                    Some(to_json_body(&json!({ "dead": true }))?),
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "missing person");
            assert_eq!(error_code(&body), "not_found");

            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    &format!("{BASE}/location/{XANADU}"),
                    Some(to_json_body(&json!({ "name": "Shangri-La" }))?),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "read-only location");
            assert_eq!(error_code(&body), "unsupported_operation");
            Ok(())
        })
    })
    .await
}
