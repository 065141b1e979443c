use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// (Internal) Response body of the client-credentials token exchange.
#[derive(Deserialize, Debug)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    #[serde(default)]
    pub(crate) token_type: Option<String>,
    #[serde(default)]
    pub(crate) expires_in: Option<i64>,
}

/// Retention policy applied to a bucket and everything stored in it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKey {
    Transient,
    Temporary,
    #[default]
    Persistent,
}

/// (Internal) Request body for bucket creation.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBucketRequest<'a> {
    pub(crate) bucket_key: &'a str,
    pub(crate) policy_key: PolicyKey,
}

/// Metadata describing a storage bucket.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BucketDetails {
    pub bucket_key: String,
    #[serde(default)]
    pub bucket_owner: Option<String>,
    #[serde(default)]
    pub created_date: Option<i64>,
    #[serde(default)]
    pub policy_key: Option<PolicyKey>,
}

/// Metadata describing an object stored in a bucket.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDetails {
    pub bucket_key: String,
    /// Stable identifier, `urn:adsk.objects:os.object:{bucket}/{object}`.
    pub object_id: String,
    pub object_key: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Views generated for viewer-oriented formats.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "3d")]
    ThreeD,
}

/// Length unit applied to OBJ geometry.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Meter,
    Decimeter,
    Centimeter,
    Millimeter,
    Micrometer,
    Nanometer,
    Yard,
    Foot,
    Inch,
    Mil,
    Microinch,
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s.to_ascii_lowercase().as_str() {
            "meter" => Unit::Meter,
            "decimeter" => Unit::Decimeter,
            "centimeter" => Unit::Centimeter,
            "millimeter" => Unit::Millimeter,
            "micrometer" => Unit::Micrometer,
            "nanometer" => Unit::Nanometer,
            "yard" => Unit::Yard,
            "foot" => Unit::Foot,
            "inch" => Unit::Inch,
            "mil" => Unit::Mil,
            "microinch" => Unit::Microinch,
            other => return Err(format!("unknown unit `{other}`")),
        };
        Ok(unit)
    }
}

/// Advanced options of an OBJ output.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjAdvanced {
    pub model_guid: String,
    pub object_ids: Vec<i64>,
    pub unit: Unit,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    Ascii,
    Binary,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFileStructure {
    Single,
    Multiple,
}

/// Advanced options of an STL output.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StlAdvanced {
    pub format: StlFormat,
    pub export_color: bool,
    pub export_file_structure: ExportFileStructure,
}

impl Default for StlAdvanced {
    fn default() -> Self {
        Self {
            format: StlFormat::Ascii,
            export_color: true,
            export_file_structure: ExportFileStructure::Single,
        }
    }
}

/// A single output item of a translation job.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputFormat {
    Svf { views: Vec<View> },
    Svf2 { views: Vec<View> },
    Obj { advanced: ObjAdvanced },
    Stl { advanced: StlAdvanced },
}

#[derive(Serialize, Debug, Clone)]
pub struct JobInput {
    pub urn: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct JobDestination {
    pub region: Region,
}

#[derive(Serialize, Debug, Clone)]
pub struct JobOutput {
    pub destination: JobDestination,
    pub formats: Vec<OutputFormat>,
}

/// Request body submitted to the job endpoint.
#[derive(Serialize, Debug, Clone)]
pub struct JobPayload {
    pub input: JobInput,
    pub output: JobOutput,
}

/// The response from a successfully accepted translation job.
#[derive(Deserialize, Debug, Clone)]
pub struct JobResponse {
    pub result: String,
    #[serde(default)]
    pub urn: Option<String>,
}

/// Remote record of translation progress for one URN.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub urn: Option<String>,
    /// Top-level progress, e.g. `"45% complete"` or `"complete"`.
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub derivatives: Vec<DerivativeNode>,
}

/// One output format tracked by a manifest.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DerivativeNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub output_type: Option<String>,
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub children: Vec<ManifestChild>,
}

/// A resource descriptor nested under a derivative node.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManifestChild {
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model_guid: Option<String>,
    /// Location of the resource, addressable through the derivative download endpoint.
    #[serde(default)]
    pub urn: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub children: Vec<ManifestChild>,
}

/// A model view listed in the metadata response.
#[derive(Deserialize, Debug, Clone)]
pub struct MetadataView {
    pub guid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MetadataData {
    #[serde(default)]
    pub metadata: Vec<MetadataView>,
}

/// The list of model views extracted from a translated source file.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Metadata {
    #[serde(default)]
    pub data: MetadataData,
}

impl Metadata {
    /// GUID of the first listed view, which scopes OBJ and STL exports.
    pub fn first_guid(&self) -> Option<&str> {
        self.data.metadata.first().map(|view| view.guid.as_str())
    }
}

/// Headers reported for a derivative resource before downloading it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivativeHeaders {
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}
