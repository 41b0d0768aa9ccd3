//! READ (GET /{resource}/{uuid}) and representation levels

use crate::support::*;
use axum::http::{Method, StatusCode};
use serde_json::Value;

fn keys(value: &Value) -> Vec<String> {
    value
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn default_representation_of_patient() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let patient = app.get_json(&format!("patient/{HORATIO_PATIENT}")).await?;

            assert_eq!(
                keys(&patient),
                ["uuid", "display", "identifiers", "person", "voided", "links"]
            );
            assert_eq!(patient["display"], "101-6 - Horatio Test Hornblower");
            assert_eq!(patient["voided"], false);

            // Identifiers are nested as refs
            let identifier = &patient["identifiers"][0];
            assert_eq!(keys(identifier), ["uuid", "display", "links"]);
            assert_eq!(identifier["display"], "OpenMRS Identification Number = 101-6");
            assert_eq!(
                identifier["links"][0]["uri"],
                format!("{BASE}/patient/{HORATIO_PATIENT}/identifier/ff41928c-3bca-48d9-a4dc-9198f6b2873b")
            );

            // The person is nested at the default level
            let person = &patient["person"];
            assert_eq!(person["uuid"], HORATIO_PERSON);
            assert_eq!(person["gender"], "M");
            assert_eq!(person["birthdate"], "1975-04-08");
            assert!(person["age"].as_u64().is_some());
            assert_eq!(person["preferredName"]["uuid"], HORATIO_NAME);
            assert!(person.get("names").is_none());

            assert_eq!(patient["links"][0]["rel"], "self");
            assert_eq!(
                patient["links"][0]["uri"],
                format!("{BASE}/patient/{HORATIO_PATIENT}")
            );
            assert!(patient.get("auditInfo").is_none());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn full_representation_adds_detail_and_audit_info() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let patient = app
                .get_json(&format!("patient/{HORATIO_PATIENT}?v=full"))
                .await?;

            assert_eq!(
                keys(&patient),
                [
                    "uuid",
                    "display",
                    "identifiers",
                    "person",
                    "voided",
                    "voidReason",
                    "auditInfo",
                    "links"
                ]
            );

            let identifier = &patient["identifiers"][1];
            assert_eq!(identifier["identifier"], "OLD-9900");
            assert_eq!(identifier["preferred"], false);
            assert_eq!(identifier["identifierType"]["uuid"], OLD_ID_TYPE);
            assert_eq!(identifier["location"]["display"], "Xanadu");

            let person = &patient["person"];
            assert_eq!(person["names"][0]["givenName"], "Horatio");
            assert_eq!(person["names"][0]["familyName"], "Hornblower");
            assert_eq!(person["auditInfo"]["creator"], "admin");

            assert_eq!(patient["voidReason"], Value::Null);
            assert!(patient["auditInfo"]["dateCreated"].is_string());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn ref_representation_is_minimal() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let patient = app
                .get_json(&format!("patient/{HORATIO_PATIENT}?v=ref"))
                .await?;
            assert_eq!(keys(&patient), ["uuid", "display", "links"]);

            // A voided entity says so even as a ref
            let voided = app
                .get_json(&format!("patient/{VOIDED_PATIENT}?v=REF"))
                .await?;
            assert_eq!(keys(&voided), ["uuid", "display", "voided", "links"]);
            assert_eq!(voided["voided"], true);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn custom_representation_selects_and_nests() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let patient = app
                .get_json(&format!(
                    "patient/{HORATIO_PATIENT}?v=custom:(uuid,person:(gender,birthdate),identifiers)"
                ))
                .await?;

            assert_eq!(keys(&patient), ["uuid", "person", "identifiers", "links"]);
            assert_eq!(keys(&patient["person"]), ["gender", "birthdate", "links"]);
            // Nested fields without their own selection come back as refs
            assert_eq!(keys(&patient["identifiers"][0]), ["uuid", "display", "links"]);

            let person = app
                .get_json(&format!("person/{HORATIO_PERSON}?v=custom:(display,names:full)"))
                .await?;
            assert_eq!(person["display"], "Horatio Test Hornblower");
            assert_eq!(person["names"][0]["middleName"], "Test");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn invalid_representations_are_rejected() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let cases = [
                ("v=bogus", "bad_request"),
                ("v=custom:(uuid", "bad_request"),
                ("v=custom:(uuid,unknownProperty)", "conversion"),
                ("v=custom:(uuid,auditInfo)", "conversion"),
            ];
            for (query, code) in cases {
                let (status, _headers, body) = app
                    .request(
                        Method::GET,
                        &format!("{BASE}/patient/{HORATIO_PATIENT}?{query}"),
                        None,
                    )
                    .await?;
                assert_status(status, StatusCode::BAD_REQUEST, query);
                assert_eq!(error_code(&body), code, "{query}");
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn missing_and_unknown_targets_are_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let cases = [
                (format!("{BASE}/patient/{NON_EXISTENT_UUID}"), "not_found"),
                (format!("{BASE}/patient/not-a-uuid"), "not_found"),
                (format!("{BASE}/encounter/{HORATIO_PATIENT}"), "unknown_resource"),
                // A person uuid is not a patient uuid
                (format!("{BASE}/patient/{JOHNNY_PERSON}"), "not_found"),
            ];
            for (path, code) in cases {
                let (status, _headers, body) = app.request(Method::GET, &path, None).await?;
                assert_status(status, StatusCode::NOT_FOUND, &path);
                assert_eq!(error_code(&body), code, "{path}");
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn resource_names_are_case_insensitive() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let patient = app.get_json(&format!("Patient/{COLLET_PATIENT}")).await?;
            assert_eq!(patient["display"], "6TS-4 - Collet Test Chebaskwony");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn metadata_resources_render_name_and_description() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let location = app.get_json(&format!("location/{XANADU}")).await?;
            assert_eq!(location["display"], "Xanadu");
            assert_eq!(location["name"], "Xanadu");
            assert_eq!(location["description"], "Xanadu district hospital");

            let kind = app
                .get_json(&format!("patientidentifiertype/{RETIRED_ID_TYPE}?v=ref"))
                .await?;
            assert_eq!(kind["display"], "Legacy Clinic Number");
            assert_eq!(kind["voided"], true);
            Ok(())
        })
    })
    .await
}
