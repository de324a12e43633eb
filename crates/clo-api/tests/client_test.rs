use clo_api::{ApiClient, ClientConfig, ErrorKind, ServerCreateBody, VolumeCreateBody};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientConfig::new(server.uri(), "test-token")).unwrap()
}

#[tokio::test]
async fn test_server_detail_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/servers/srv-1/detail"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "result": {
                "id": "srv-1",
                "name": "web",
                "status": "ACTIVE",
                "flavor": {"ram": 4, "vcpus": 2},
                "disk_data": [{"id": "vol-1", "storage_type": "volume"}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = client_for(&server).server_detail("srv-1").await.unwrap();
    assert_eq!(detail.name, "web");
    assert_eq!(detail.status, "ACTIVE");
    assert_eq!(detail.flavor.vcpus, 2);
    assert_eq!(detail.volume_ids(), vec!["vol-1".to_string()]);
}

#[tokio::test]
async fn test_missing_entity_is_tagged_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/volumes/vol-9/detail"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"code": 404, "title": "Not Found"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).volume_detail("vol-9").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_server_error_is_not_reported_as_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/addresses/a1/detail"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server).address_detail("a1").await.unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(err.kind(), Some(ErrorKind::Server));
    assert!(err.to_string().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_create_volume_posts_body_and_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/projects/p1/volumes"))
        .and(body_json(json!({"size": 20, "autorename": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 200, "result": {"id": "vol-2"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = client_for(&server)
        .create_volume("p1", &VolumeCreateBody::new(None, 20))
        .await
        .unwrap();
    assert_eq!(created.id, "vol-2");
}

#[tokio::test]
async fn test_create_server_omits_empty_collections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/projects/p1/servers"))
        .and(body_json(json!({
            "name": "web",
            "image": "img-1",
            "flavor": {"ram": 2, "vcpus": 1},
            "storages": []
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": {"id": "srv-2"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let body = ServerCreateBody {
        name: "web".to_string(),
        image: "img-1".to_string(),
        flavor: clo_api::Flavor { ram: 2, vcpus: 1 },
        ..Default::default()
    };
    let created = client_for(&server).create_server("p1", &body).await.unwrap();
    assert_eq!(created.id, "srv-2");
}

#[tokio::test]
async fn test_list_tolerates_missing_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0})))
        .mount(&server)
        .await;

    let projects = client_for(&server).list_projects().await.unwrap();
    assert!(projects.is_empty());
}

#[tokio::test]
async fn test_delete_accepts_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/s3/users/u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).delete_s3_user("u1").await.unwrap();
}
