//! Listing without a query

use crate::support::*;
use axum::http::{Method, StatusCode};

#[tokio::test]
async fn patients_cannot_be_listed_without_query() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, body) = app
                .request(Method::GET, &format!("{BASE}/patient"), None)
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "list patients");
            assert_eq!(error_code(&body), "unsupported_operation");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn persons_list_in_insertion_order() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let list = app.get_json("person").await?;
            // The dead Horace is not voided, so he is listed
            assert_eq!(
                result_uuids(&list),
                [
                    HORATIO_PERSON,
                    COLLET_PERSON,
                    "0cbd4d26-cf24-4a4e-8a1b-19d0d7a5ac4e",
                    JOHNNY_PERSON,
                    ANET_PERSON
                ]
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn retired_metadata_needs_include_all() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let list = app.get_json("patientidentifiertype").await?;
            assert_eq!(result_uuids(&list), [OPENMRS_ID_TYPE, OLD_ID_TYPE]);

            let list = app.get_json("patientidentifiertype?includeAll").await?;
            assert_eq!(
                result_uuids(&list),
                [OPENMRS_ID_TYPE, OLD_ID_TYPE, RETIRED_ID_TYPE]
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unknown_resource_is_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, body) = app
                .request(Method::GET, &format!("{BASE}/encounter"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "unknown resource");
            assert_eq!(error_code(&body), "unknown_resource");
            Ok(())
        })
    })
    .await
}
