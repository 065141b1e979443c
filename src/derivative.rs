//! Translation jobs, manifests and metadata of the Model Derivative API.

use crate::client::ForgeClient;
use crate::config::ObjExportOptions;
use crate::error::{found, ForgeError};
use crate::region::Region;
use crate::types::{
    DerivativeHeaders, JobDestination, JobInput, JobOutput, JobPayload, JobResponse, Manifest,
    Metadata, ObjAdvanced, OutputFormat, StlAdvanced, View,
};
use crate::urn::Urn;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::fmt;
use tracing::{error, info};

const FORCE_HEADER: &str = "x-ads-force";

/// A derivative format that can be requested for a source file.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivativeFormat {
    Svf,
    Svf2,
    /// OBJ export of the given model view.
    Obj {
        model_guid: String,
        options: ObjExportOptions,
    },
    Stl,
}

impl DerivativeFormat {
    /// The `outputType` this format shows up as in the manifest.
    pub fn output_type(&self) -> &'static str {
        match self {
            DerivativeFormat::Svf => "svf",
            DerivativeFormat::Svf2 => "svf2",
            DerivativeFormat::Obj { .. } => "obj",
            DerivativeFormat::Stl => "stl",
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        let views = vec![View::TwoD, View::ThreeD];
        match self {
            DerivativeFormat::Svf => OutputFormat::Svf { views },
            DerivativeFormat::Svf2 => OutputFormat::Svf2 { views },
            DerivativeFormat::Obj {
                model_guid,
                options,
            } => OutputFormat::Obj {
                advanced: ObjAdvanced {
                    model_guid: model_guid.clone(),
                    object_ids: options.object_ids.clone(),
                    unit: options.unit,
                },
            },
            DerivativeFormat::Stl => OutputFormat::Stl {
                advanced: StlAdvanced::default(),
            },
        }
    }
}

impl fmt::Display for DerivativeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output_type().to_uppercase())
    }
}

/// Builds the job description translating `urn` into `format`, with output
/// stored in `target`.
pub fn job_payload(urn: &Urn, format: &DerivativeFormat, target: Region) -> JobPayload {
    JobPayload {
        input: JobInput {
            urn: urn.to_string(),
        },
        output: JobOutput {
            destination: JobDestination { region: target },
            formats: vec![format.output_format()],
        },
    }
}

impl ForgeClient {
    /// Submits a translation job through the `server` endpoint.
    ///
    /// With `force` set an already translated URN is processed again instead
    /// of the request being a no-op.
    pub async fn translate(
        &self,
        urn: &Urn,
        format: &DerivativeFormat,
        server: Region,
        target: Region,
        force: bool,
    ) -> Result<JobResponse, ForgeError> {
        info!("Requesting {} translation for: {}", format, urn);
        let url = self.derivative_endpoint(server, &["job"])?;
        let request = self
            .client
            .post(url)
            .header(FORCE_HEADER, force.to_string())
            .json(&job_payload(urn, format, target));

        self.send_json(request).await.map_err(|e| {
            error!("Failed to register file for {} translation: {}", format, e);
            e
        })
    }

    /// Fetches the manifest, or `None` if the service has none for `urn` yet.
    pub async fn manifest(&self, urn: &Urn, region: Region) -> Result<Option<Manifest>, ForgeError> {
        info!("Getting Manifest of: {}", urn);
        let url = self.derivative_endpoint(region, &[urn.as_str(), "manifest"])?;
        found(self.send_json(self.client.get(url)).await)
    }

    /// Deletes the manifest and every derivative produced for `urn`.
    pub async fn delete_manifest(&self, urn: &Urn, region: Region) -> Result<(), ForgeError> {
        info!("Deleting manifest for: {}", urn);
        let url = self.derivative_endpoint(region, &[urn.as_str(), "manifest"])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    /// Lists the model views of a translated file.
    pub async fn metadata(&self, urn: &Urn, region: Region) -> Result<Option<Metadata>, ForgeError> {
        info!("Getting Metadata of: {}", urn);
        let url = self.derivative_endpoint(region, &[urn.as_str(), "metadata"])?;
        found(self.send_json(self.client.get(url)).await)
    }

    /// Reads size and type of a derivative resource without downloading it.
    pub async fn derivative_headers(
        &self,
        urn: &Urn,
        derivative_urn: &str,
        region: Region,
    ) -> Result<DerivativeHeaders, ForgeError> {
        info!("Getting derivative headers of: {}", derivative_urn);
        let url = self.derivative_endpoint(region, &[urn.as_str(), "manifest", derivative_urn])?;
        let response = self.send(self.client.head(url)).await?;
        let headers = response.headers();

        Ok(DerivativeHeaders {
            content_length: headers
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok()),
            content_type: headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn svf2_payload() {
        let urn = Urn::build("b", "o.rvt");
        let payload = job_payload(&urn, &DerivativeFormat::Svf2, Region::Emea);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "input": { "urn": urn.as_str() },
                "output": {
                    "destination": { "region": "emea" },
                    "formats": [{ "type": "svf2", "views": ["2d", "3d"] }]
                }
            })
        );
    }

    #[test]
    fn obj_payload_carries_object_subset() {
        let format = DerivativeFormat::Obj {
            model_guid: "guid-1".to_string(),
            options: ObjExportOptions::default(),
        };
        let value = serde_json::to_value(format.output_format()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "obj",
                "advanced": { "modelGuid": "guid-1", "objectIds": [1526, 1527], "unit": "meter" }
            })
        );
    }

    #[test]
    fn output_types_match_manifest_tags() {
        assert_eq!(DerivativeFormat::Svf2.output_type(), "svf2");
        assert_eq!(DerivativeFormat::Stl.to_string(), "STL");
    }
}
