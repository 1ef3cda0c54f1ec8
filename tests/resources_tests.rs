//! Role, category and metadata accessors against a mock server.

mod common;

use cerberus::{Error, MetadataOpts};
use chrono::{DateTime, Utc};
use common::{client_for, ERROR_RESPONSE};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

mod role_tests {
    use super::*;

    const ROLES: &str = r#"[
        {
            "id": "f7fff4d6-faaa-11e5-a8a9-7fa3b294cd46",
            "name": "owner",
            "created_ts": "2016-04-05T04:19:51Z",
            "last_updated_ts": "2016-04-05T04:19:51Z",
            "created_by": "system",
            "last_updated_by": "system"
        },
        {
            "id": "f800558e-faaa-11e5-a8a9-7fa3b294cd46",
            "name": "read",
            "created_ts": "2016-04-05T04:19:51Z",
            "last_updated_ts": "2016-04-05T04:19:51Z",
            "created_by": "system",
            "last_updated_by": "system"
        }
    ]"#;

    #[tokio::test]
    async fn test_list_roles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/role"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ROLES))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let roles = client.role().list().await.unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].name, "owner");
        assert_eq!(roles[1].id, "f800558e-faaa-11e5-a8a9-7fa3b294cd46");
        assert_eq!(roles[0].created, Some(ts("2016-04-05T04:19:51Z")));
        assert_eq!(roles[0].last_updated_by, "system");
    }

    #[tokio::test]
    async fn test_list_roles_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/role"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(matches!(
            client.role().list().await,
            Err(Error::UnexpectedStatus { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_role() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/role/f7fff4d6-faaa-11e5-a8a9-7fa3b294cd46"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id": "f7fff4d6-faaa-11e5-a8a9-7fa3b294cd46", "name": "owner", "created_by": null}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let role = client
            .role()
            .get("f7fff4d6-faaa-11e5-a8a9-7fa3b294cd46")
            .await
            .unwrap();
        assert_eq!(role.name, "owner");
        assert!(role.created_by.is_empty());
        assert!(role.created.is_none());
        assert!(matches!(client.role().get("").await, Err(Error::NotFound)));
    }
}

mod category_tests {
    use super::*;

    const CATEGORIES: &str = r#"[
        {
            "id": "f7ff85a0-faaa-11e5-a8a9-7fa3b294cd46",
            "display_name": "Applications",
            "path": "app",
            "created_ts": "2016-04-05T04:19:51Z",
            "last_updated_ts": "2016-04-05T04:19:51Z",
            "created_by": "system",
            "last_updated_by": "system"
        },
        {
            "id": "f7ffb890-faaa-11e5-a8a9-7fa3b294cd46",
            "display_name": "Shared",
            "path": "shared",
            "created_ts": "2016-04-05T04:19:51Z",
            "last_updated_ts": "2016-04-05T04:19:51Z",
            "created_by": "system",
            "last_updated_by": "system"
        }
    ]"#;

    #[tokio::test]
    async fn test_list_categories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/category"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CATEGORIES))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let categories = client.category().list().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].display_name, "Applications");
        assert_eq!(categories[1].path, "shared");
        assert_eq!(categories[1].last_updated, Some(ts("2016-04-05T04:19:51Z")));
    }

    #[tokio::test]
    async fn test_get_category_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/category/nope"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(matches!(client.category().get("nope").await, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn test_list_categories_bad_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/category"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(matches!(client.category().list().await, Err(Error::Json(_))));
    }
}

mod metadata_tests {
    use super::*;

    const METADATA: &str = r#"{
        "has_next": false,
        "next_offset": 0,
        "limit": 10,
        "offset": 0,
        "sdb_count_in_result": 2,
        "total_sdbcount": 2,
        "safe_deposit_box_metadata": [
            {
                "name": "dev demo",
                "path": "app/dev-demo/",
                "category": "Applications",
                "owner": "Lst-Squad.Carebears",
                "description": "test",
                "created_ts": "2017-01-04T23:18:40-08:00",
                "created_by": "justin.field@nike.com",
                "last_updated_ts": "2017-01-04T23:18:40-08:00",
                "last_updated_by": "justin.field@nike.com",
                "user_group_permissions": {
                    "Application.FOO.User": "read"
                },
                "iam_role_permissions": {
                    "arn:aws:iam::265866363820:role/asdf": "write"
                }
            },
            {
                "name": "IaM W d WASD",
                "path": "shared/iam-w-d-wasd/",
                "category": "Shared",
                "owner": "Lst-Squad.Carebears",
                "description": "CAREBERS",
                "created_ts": "2017-01-04T23:18:40-08:00",
                "created_by": "justin.field@nike.com",
                "last_updated_ts": "2017-01-04T23:18:40-08:00",
                "last_updated_by": "justin.field@nike.com",
                "user_group_permissions": {},
                "iam_role_permissions": {}
            }
        ]
    }"#;

    fn page(names: &[&str], has_next: bool, next_offset: Option<u32>) -> String {
        let entries: Vec<_> = names
            .iter()
            .map(|n| serde_json::json!({"name": n, "path": format!("app/{}/", n)}))
            .collect();
        serde_json::json!({
            "has_next": has_next,
            "next_offset": next_offset,
            "safe_deposit_box_metadata": entries,
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_list_metadata_default_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/metadata"))
            .and(query_param("limit", "100"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(METADATA))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let resp = client.metadata().list(MetadataOpts::default()).await.unwrap();
        assert!(!resp.has_next);
        assert_eq!(resp.limit, 10);
        assert_eq!(resp.result_count, 2);
        assert_eq!(resp.total_count, 2);
        assert_eq!(resp.metadata[0].owner, "Lst-Squad.Carebears");
        assert_eq!(resp.metadata[0].created, Some(ts("2017-01-04T23:18:40-08:00")));
        assert_eq!(resp.metadata[0].user_group_permissions["Application.FOO.User"], "read");
        assert!(resp.metadata[1].iam_role_permissions.is_empty());
    }

    #[tokio::test]
    async fn test_list_metadata_custom_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/metadata"))
            .and(query_param("limit", "5"))
            .and(query_param("offset", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&["a"], false, None)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let opts = MetadataOpts { limit: 5, offset: 10 };
        assert_eq!(client.metadata().list(opts).await.unwrap().metadata.len(), 1);
    }

    #[tokio::test]
    async fn test_list_metadata_bad_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/metadata"))
            .respond_with(ResponseTemplate::new(400).set_body_string(ERROR_RESPONSE))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(matches!(
            client.metadata().list(MetadataOpts::default()).await,
            Err(Error::Api(_))
        ));
    }

    #[tokio::test]
    async fn test_list_all_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/metadata"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&["a", "b"], true, Some(2))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/metadata"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&["c"], false, None)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let all = client.metadata().list_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_list_all_stops_when_offset_does_not_advance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&["a"], true, Some(0))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.metadata().list_all().await.unwrap().len(), 1);
    }
}
