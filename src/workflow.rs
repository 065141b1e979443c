//! End-to-end orchestration: upload, translate, poll, fetch OBJ output, clean up.

use crate::client::ForgeClient;
use crate::config::{Credentials, WorkflowConfig};
use crate::derivative::DerivativeFormat;
use crate::error::ForgeError;
use crate::manifest::{find_derivative_node, DerivativeState};
use crate::region::Region;
use crate::types::{JobResponse, Manifest};
use crate::urn::Urn;
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info, warn};

const SUCCESS: &str = "success";

/// Progress of one [`Workflow::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Init,
    Authenticated,
    ContainerReady,
    Uploaded,
    UrnBuilt,
    TranslationRequested,
    Polling,
    Complete,
    Failed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Result of [`Workflow::generate_obj`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjOutcome {
    /// No OBJ derivative existed, so one was requested.
    TranslationRequested,
    /// The model views are not known yet, so nothing could be requested or fetched.
    MetadataUnavailable,
    /// An OBJ derivative exists but is not complete; carries its progress.
    Pending(String),
    /// Files written to the output directory.
    Downloaded(Vec<PathBuf>),
}

/// What [`clean`] managed to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    pub manifest_deleted: bool,
    pub container_deleted: bool,
}

/// Drives one source file through upload, translation and polling.
pub struct Workflow {
    config: WorkflowConfig,
    credentials: Credentials,
    client: Option<ForgeClient>,
    state: WorkflowState,
    manifest: Option<Manifest>,
}

impl Workflow {
    pub fn new(config: WorkflowConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
            client: None,
            state: WorkflowState::Init,
            manifest: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Manifest that ended the last successful [`Workflow::run`].
    ///
    /// Its `status` tells whether the completed translation succeeded.
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Key of the bucket holding the upload for the configured storage region.
    pub fn bucket_key(&self) -> String {
        self.credentials.bucket_key(self.config.storage)
    }

    /// Uploads the input file, requests SVF2 translation and waits for the
    /// manifest to complete.
    ///
    /// Any error leaves the workflow in [`WorkflowState::Failed`].
    ///
    /// # Returns
    ///
    /// The URN under which the translated file can be addressed later.
    pub async fn run(&mut self) -> Result<Urn, ForgeError> {
        match self.execute().await {
            Ok(urn) => {
                info!(
                    "Note urn: {} if you want to delete the manifest with `forgemd clean --urn`",
                    urn
                );
                Ok(urn)
            }
            Err(e) => {
                error!("Workflow failed in state {}: {}", self.state, e);
                self.transition(WorkflowState::Failed);
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<Urn, ForgeError> {
        let input = self.config.input_path.clone();
        if !input.is_file() {
            return Err(ForgeError::Configuration(format!(
                "input file {} does not exist",
                input.display()
            )));
        }
        let object_key = self.config.object_key()?;
        let bucket_key = self.bucket_key();
        let (server, storage, target) =
            (self.config.server, self.config.storage, self.config.target);

        info!("{}/{}", bucket_key, object_key);
        info!(
            "Running Endpoint: {} server - Storage: {} - Derivative Region: {}",
            server, storage, target
        );

        let client = self.client().await?;
        self.transition(WorkflowState::Authenticated);

        client.ensure_bucket(&bucket_key, storage).await?;
        self.transition(WorkflowState::ContainerReady);

        let object = client
            .locate_or_upload(&bucket_key, &object_key, &input)
            .await?;
        self.transition(WorkflowState::Uploaded);

        let urn = Urn::from_object_id(&object.object_id);
        info!("{}", urn);
        self.transition(WorkflowState::UrnBuilt);

        client
            .translate(&urn, &DerivativeFormat::Svf2, server, target, true)
            .await?;
        self.transition(WorkflowState::TranslationRequested);

        self.transition(WorkflowState::Polling);
        let manifest = client
            .wait_for_manifest(&urn, server, &self.config.poll)
            .await?;
        match manifest.status.as_deref() {
            Some(SUCCESS) => {}
            status => warn!(
                "Translation of {} completed with status {}",
                urn,
                status.unwrap_or("unknown")
            ),
        }
        self.manifest = Some(manifest);
        self.transition(WorkflowState::Complete);

        Ok(urn)
    }

    /// Second entry point producing OBJ output for an already translated URN.
    ///
    /// Requests the OBJ translation when the manifest has no OBJ node yet,
    /// and downloads the OBJ resources once that node is complete.
    pub async fn generate_obj(&mut self, urn: &Urn) -> Result<ObjOutcome, ForgeError> {
        let client = self.client().await?;
        let server = self.config.server;
        let manifest = client.manifest(urn, server).await?;

        let Some(node) = find_derivative_node("obj", manifest.as_ref()) else {
            let Some(model_guid) = self.model_guid(&client, urn).await? else {
                return Ok(ObjOutcome::MetadataUnavailable);
            };
            let format = DerivativeFormat::Obj {
                model_guid,
                options: self.config.obj.clone(),
            };
            client
                .translate(urn, &format, server, self.config.target, true)
                .await?;
            info!("Please wait for OBJ translation to complete");
            return Ok(ObjOutcome::TranslationRequested);
        };

        if let DerivativeState::InProgress(progress) = node.state() {
            info!("Translation Failed or Still translating... ({})", progress);
            return Ok(ObjOutcome::Pending(progress));
        }

        let Some(model_guid) = self.model_guid(&client, urn).await? else {
            return Ok(ObjOutcome::MetadataUnavailable);
        };
        let files = client
            .download_artifacts(urn, node, &model_guid, "obj", server, &self.config.output_dir)
            .await?;
        info!(
            "Downloaded {} file(s) to {}",
            files.len(),
            self.config.output_dir.display()
        );
        Ok(ObjOutcome::Downloaded(files))
    }

    /// Requests an additional derivative for an existing URN.
    pub async fn request_format(
        &mut self,
        urn: &Urn,
        format: &DerivativeFormat,
    ) -> Result<JobResponse, ForgeError> {
        let client = self.client().await?;
        client
            .translate(urn, format, self.config.server, self.config.target, true)
            .await
    }

    async fn model_guid(&self, client: &ForgeClient, urn: &Urn) -> Result<Option<String>, ForgeError> {
        let metadata = client.metadata(urn, self.config.server).await?;
        let guid = metadata
            .as_ref()
            .and_then(|m| m.first_guid())
            .map(str::to_string);
        if guid.is_none() {
            warn!("No model view listed in the metadata of {}", urn);
        }
        Ok(guid)
    }

    async fn client(&mut self) -> Result<ForgeClient, ForgeError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = ForgeClient::authenticate(&self.credentials).await?;
        self.client = Some(client.clone());
        Ok(client)
    }

    fn transition(&mut self, next: WorkflowState) {
        info!("{} -> {}", self.state, next);
        self.state = next;
    }
}

impl ForgeClient {
    /// Deletes the manifest of `urn`, then the bucket the URN points into.
    ///
    /// Both steps are attempted regardless of the other's outcome; failures
    /// are logged and reported, not returned.
    pub async fn clean(&self, urn: &Urn, region: Region) -> CleanupReport {
        info!("Running Endpoint: {}", region);
        let mut report = CleanupReport::default();

        match self.delete_manifest(urn, region).await {
            Ok(()) => report.manifest_deleted = true,
            Err(e) => warn!("Failed deleting manifest: {} - {}", urn, e),
        }

        // Deleting the bucket removes the uploaded object as well.
        match urn.keys() {
            Ok((bucket_key, _)) => match self.delete_bucket(&bucket_key).await {
                Ok(()) => report.container_deleted = true,
                Err(e) => warn!("Failed deleting bucket: {} - {}", bucket_key, e),
            },
            Err(e) => warn!("Cannot determine bucket of {}: {}", urn, e),
        }

        report
    }
}

/// Authenticates and runs [`ForgeClient::clean`].
///
/// # Errors
///
/// Only authentication and configuration failures are returned.
pub async fn clean(
    credentials: &Credentials,
    urn: &Urn,
    region: Region,
) -> Result<CleanupReport, ForgeError> {
    let client = ForgeClient::authenticate(credentials).await?;
    Ok(client.clean(urn, region).await)
}
