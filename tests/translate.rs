mod common;

use common::{client, BUCKET, DERIVATIVES};
use forgemd::{DerivativeFormat, ObjExportOptions, Region, Unit, Urn};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn accepted(urn: &Urn) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "result": "success",
        "urn": urn.as_str(),
        "acceptedJobs": { "output": { "formats": [] } }
    }))
}

#[tokio::test]
async fn test_translate_svf2_forces_reprocessing() {
    let server = MockServer::start().await;
    let urn = Urn::build(BUCKET, "model.rvt");

    Mock::given(method("POST"))
        .and(path(format!("{DERIVATIVES}/job")))
        .and(header("x-ads-force", "true"))
        .and(body_json(json!({
            "input": { "urn": urn.as_str() },
            "output": {
                "destination": { "region": "us" },
                "formats": [{ "type": "svf2", "views": ["2d", "3d"] }]
            }
        })))
        .respond_with(accepted(&urn))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .translate(&urn, &DerivativeFormat::Svf2, Region::Us, Region::Us, true)
        .await
        .unwrap();
    assert_eq!(response.result, "success");
}

#[tokio::test]
async fn test_translate_obj_uses_regional_endpoint() {
    let server = MockServer::start().await;
    let urn = Urn::build(BUCKET, "model.rvt");

    Mock::given(method("POST"))
        .and(path("/modelderivative/v2/regions/eu/designdata/job"))
        .and(body_json(json!({
            "input": { "urn": urn.as_str() },
            "output": {
                "destination": { "region": "emea" },
                "formats": [{
                    "type": "obj",
                    "advanced": { "modelGuid": "guid-1", "objectIds": [1526, 1527], "unit": "millimeter" }
                }]
            }
        })))
        .respond_with(accepted(&urn))
        .expect(1)
        .mount(&server)
        .await;

    let format = DerivativeFormat::Obj {
        model_guid: "guid-1".to_string(),
        options: ObjExportOptions {
            unit: Unit::Millimeter,
            ..Default::default()
        },
    };
    client(&server)
        .translate(&urn, &format, Region::Emea, Region::Emea, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_translate_stl_fixed_options() {
    let server = MockServer::start().await;
    let urn = Urn::build(BUCKET, "model.rvt");

    Mock::given(method("POST"))
        .and(path(format!("{DERIVATIVES}/job")))
        .and(body_json(json!({
            "input": { "urn": urn.as_str() },
            "output": {
                "destination": { "region": "us" },
                "formats": [{
                    "type": "stl",
                    "advanced": { "format": "ascii", "exportColor": true, "exportFileStructure": "single" }
                }]
            }
        })))
        .respond_with(accepted(&urn))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .translate(&urn, &DerivativeFormat::Stl, Region::Us, Region::Us, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_translate_rejected() {
    let server = MockServer::start().await;
    let urn = Urn::build(BUCKET, "model.rvt");

    Mock::given(method("POST"))
        .and(path(format!("{DERIVATIVES}/job")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "diagnostic": "Failed to trigger translation for this file."
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .translate(&urn, &DerivativeFormat::Svf2, Region::Us, Region::Us, true)
        .await
        .unwrap_err();
    assert!(!err.is_transient());
    assert!(err.to_string().contains("Failed to trigger translation"));
}
