#![allow(dead_code)]

use forgemd::{Credentials, ForgeClient, PollOptions};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "CLIENT123";
pub const BUCKET: &str = "forge_sample_client123-us";
pub const DERIVATIVES: &str = "/modelderivative/v2/designdata";

pub fn credentials(server: &MockServer) -> Credentials {
    Credentials::new(CLIENT_ID, "test_secret", server.uri())
}

pub fn client(server: &MockServer) -> ForgeClient {
    ForgeClient::with_token("test_token", &server.uri()).unwrap()
}

/// Poll settings fast enough for tests.
pub fn fast_poll() -> PollOptions {
    PollOptions {
        interval: Duration::from_millis(10),
        timeout: Some(Duration::from_secs(5)),
        ..Default::default()
    }
}

pub async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/authentication/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test_token",
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .mount(server)
        .await;
}

pub fn object_id(bucket: &str, object: &str) -> String {
    format!("urn:adsk.objects:os.object:{bucket}/{object}")
}

pub fn object_details(bucket: &str, object: &str) -> serde_json::Value {
    json!({
        "bucketKey": bucket,
        "objectId": object_id(bucket, object),
        "objectKey": object,
        "size": 16,
        "contentType": "application/octet-stream",
        "location": format!("https://example.com/oss/v2/buckets/{bucket}/objects/{object}")
    })
}
