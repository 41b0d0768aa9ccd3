//! Paging with `limit` and `startIndex`

use crate::support::*;
use axum::http::{Method, StatusCode};

fn link<'a>(list: &'a serde_json::Value, rel: &str) -> Option<&'a str> {
    list["links"]
        .as_array()?
        .iter()
        .find(|link| link["rel"] == rel)?
        .get("uri")?
        .as_str()
}

#[tokio::test]
async fn pages_carry_next_and_prev_links() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let first = app.get_json("person?limit=2").await?;
            assert_eq!(result_uuids(&first), [HORATIO_PERSON, COLLET_PERSON]);
            assert_eq!(
                link(&first, "next"),
                Some(format!("{BASE}/person?limit=2&startIndex=2").as_str())
            );
            assert!(link(&first, "prev").is_none());

            let middle = app.get_json("person?limit=2&startIndex=2").await?;
            assert_eq!(result_uuids(&middle).len(), 2);
            assert!(link(&middle, "next").is_some());
            assert_eq!(
                link(&middle, "prev"),
                Some(format!("{BASE}/person?limit=2&startIndex=0").as_str())
            );

            let last = app.get_json("person?limit=2&startIndex=4").await?;
            assert_eq!(result_uuids(&last), [ANET_PERSON]);
            assert!(link(&last, "next").is_none());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn paging_links_keep_query_and_representation() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let list = app.get_json("patient?q=test&v=ref&limit=1").await?;
            assert_eq!(result_uuids(&list), [HORATIO_PATIENT]);
            assert_eq!(
                link(&list, "next"),
                Some(format!("{BASE}/patient?q=test&v=ref&limit=1&startIndex=1").as_str())
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn limit_is_capped_and_validated() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| {
            config.rest.max_limit = 3;
            config.rest.default_limit = 3;
        },
        |app| {
            Box::pin(async move {
                let list = app.get_json("person?limit=1000").await?;
                assert_eq!(result_uuids(&list).len(), 3);

                for query in ["limit=0", "limit=-1", "limit=many", "startIndex=x"] {
                    let (status, _headers, body) = app
                        .request(Method::GET, &format!("{BASE}/person?{query}"), None)
                        .await?;
                    assert_status(status, StatusCode::BAD_REQUEST, query);
                    assert_eq!(error_code(&body), "bad_request", "{query}");
                }
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn start_index_past_the_end_is_empty() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let list = app.get_json("person?startIndex=50").await?;
            assert!(result_uuids(&list).is_empty());
            assert!(link(&list, "prev").is_some());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn huge_start_index_is_an_empty_last_page() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let list = app
                .get_json(&format!("person?limit=2&startIndex={}", usize::MAX))
                .await?;
            assert!(result_uuids(&list).is_empty());
            assert!(link(&list, "next").is_none());
            assert_eq!(
                link(&list, "prev"),
                Some(format!("{BASE}/person?limit=2&startIndex={}", usize::MAX - 2).as_str())
            );
            Ok(())
        })
    })
    .await
}
