mod common;

use common::{client, object_details, BUCKET};
use forgemd::{ContainerStatus, ForgeError, Region};
use serde_json::json;
use std::fs::File;
use std::io::Write;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_ensure_bucket_existing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/oss/v2/buckets/{BUCKET}/details")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bucketKey": BUCKET,
            "bucketOwner": "client123",
            "createdDate": 1700000000000i64,
            "policyKey": "persistent"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oss/v2/buckets"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let status = client(&server).ensure_bucket(BUCKET, Region::Us).await.unwrap();
    assert_eq!(status, ContainerStatus::Existing);
}

#[tokio::test]
async fn test_ensure_bucket_creates_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/oss/v2/buckets/{BUCKET}/details")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "reason": "Bucket not found" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oss/v2/buckets"))
        .and(header("x-ads-region", "EMEA"))
        .and(body_json(json!({ "bucketKey": BUCKET, "policyKey": "persistent" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "bucketKey": BUCKET })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client(&server)
        .ensure_bucket(BUCKET, Region::Emea)
        .await
        .unwrap();
    assert_eq!(status, ContainerStatus::Created);
}

#[tokio::test]
async fn test_create_bucket_conflict_is_usable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oss/v2/buckets"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "reason": "Bucket already exists" })))
        .mount(&server)
        .await;

    let status = client(&server)
        .create_bucket(BUCKET, Region::Us, Default::default())
        .await
        .unwrap();
    assert_eq!(status, ContainerStatus::Existing);
}

#[tokio::test]
async fn test_ensure_bucket_fails_on_forbidden() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/oss/v2/buckets/{BUCKET}/details")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client(&server)
        .ensure_bucket(BUCKET, Region::Us)
        .await
        .unwrap_err();
    assert!(matches!(err, ForgeError::Api { status, .. } if status.as_u16() == 403));
}

#[tokio::test]
async fn test_locate_existing_object_skips_upload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/oss/v2/buckets/{BUCKET}/objects/model.rvt/details")))
        .respond_with(ResponseTemplate::new(200).set_body_json(object_details(BUCKET, "model.rvt")))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let details = client(&server)
        .locate_or_upload(BUCKET, "model.rvt", "/does/not/matter.rvt")
        .await
        .unwrap();
    assert_eq!(details.object_key, "model.rvt");
}

#[tokio::test]
async fn test_upload_streams_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/oss/v2/buckets/{BUCKET}/objects/model.rvt/details")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/oss/v2/buckets/{BUCKET}/objects/model.rvt")))
        .and(header("content-type", "application/octet-stream"))
        .and(header("content-length", "16"))
        .respond_with(ResponseTemplate::new(200).set_body_json(object_details(BUCKET, "model.rvt")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("model.rvt");
    File::create(&file_path)
        .unwrap()
        .write_all(b"dummy model data")
        .unwrap();

    let details = client(&server)
        .locate_or_upload(BUCKET, "model.rvt", &file_path)
        .await
        .unwrap();
    assert_eq!(
        details.object_id,
        "urn:adsk.objects:os.object:forge_sample_client123-us/model.rvt"
    );

    let requests = server.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .unwrap();
    assert_eq!(upload.body, b"dummy model data");
}

#[tokio::test]
async fn test_upload_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("model.rvt");
    File::create(&file_path).unwrap().write_all(b"x").unwrap();

    let err = client(&server)
        .upload_object(BUCKET, "model.rvt", &file_path)
        .await
        .unwrap_err();
    assert!(err.is_transient());
}
