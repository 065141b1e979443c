use crate::error::ForgeError;
use crate::region::Region;
use crate::types::Unit;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const CLIENT_ID_VAR: &str = "FORGE_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "FORGE_CLIENT_SECRET";
pub const API_PATH_VAR: &str = "FORGE_API_PATH";

/// Scene object ids exported by default when requesting OBJ output.
pub const DEFAULT_OBJ_OBJECT_IDS: [i64; 2] = [1526, 1527];

/// Client identity, secret and API base path used for authentication.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub api_path: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        api_path: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_path: api_path.into(),
        }
    }

    /// Reads `FORGE_CLIENT_ID`, `FORGE_CLIENT_SECRET` and `FORGE_API_PATH`.
    ///
    /// # Errors
    ///
    /// `ForgeError::Configuration` naming the first variable that is unset or empty.
    pub fn from_env() -> Result<Self, ForgeError> {
        Ok(Self::new(
            required_var(CLIENT_ID_VAR)?,
            required_var(CLIENT_SECRET_VAR)?,
            required_var(API_PATH_VAR)?,
        ))
    }

    /// Name of the bucket owned by this client in `region`.
    ///
    /// There is exactly one such bucket per client and region.
    pub fn bucket_key(&self, region: Region) -> String {
        format!(
            "forge_sample_{}-{}",
            self.client_id.to_lowercase(),
            region.as_str()
        )
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_path", &self.api_path)
            .finish()
    }
}

fn required_var(name: &str) -> Result<String, ForgeError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ForgeError::Configuration(format!("{name} is not set"))),
    }
}

/// Controls the manifest polling loop.
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay between two manifest fetches.
    pub interval: Duration,
    /// Give up after this long. `None` polls until completion.
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Some(Duration::from_secs(60 * 60)),
            cancel: CancellationToken::new(),
        }
    }
}

/// OBJ export settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjExportOptions {
    pub unit: Unit,
    /// Internal scene object ids to export.
    pub object_ids: Vec<i64>,
}

impl Default for ObjExportOptions {
    fn default() -> Self {
        Self {
            unit: Unit::Meter,
            object_ids: DEFAULT_OBJ_OBJECT_IDS.to_vec(),
        }
    }
}

/// Inputs of one workflow run. Read-only once built.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub input_path: PathBuf,
    /// Selects the derivative endpoint instance.
    pub server: Region,
    /// Region the bucket is created in.
    pub storage: Region,
    /// Destination region of translated derivatives.
    pub target: Region,
    pub output_dir: PathBuf,
    pub poll: PollOptions,
    pub obj: ObjExportOptions,
}

impl WorkflowConfig {
    /// Resolves all region tokens up front so an invalid one fails before
    /// any remote call is made.
    pub fn new(
        input_path: impl Into<PathBuf>,
        server: &str,
        storage: &str,
        target: &str,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, ForgeError> {
        Ok(Self {
            input_path: input_path.into(),
            server: Region::resolve(server)?,
            storage: Region::resolve(storage)?,
            target: Region::resolve(target)?,
            output_dir: output_dir.into(),
            poll: PollOptions::default(),
            obj: ObjExportOptions::default(),
        })
    }

    /// Configuration for entry points that operate on an already uploaded
    /// file and therefore have no input path.
    pub fn for_existing(
        server: &str,
        target: &str,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, ForgeError> {
        let server = Region::resolve(server)?;
        Ok(Self {
            input_path: PathBuf::new(),
            server,
            storage: server,
            target: Region::resolve(target)?,
            output_dir: output_dir.into(),
            poll: PollOptions::default(),
            obj: ObjExportOptions::default(),
        })
    }

    pub fn with_poll(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_obj(mut self, obj: ObjExportOptions) -> Self {
        self.obj = obj;
        self
    }

    /// Base name of the input file, used as the object key.
    pub fn object_key(&self) -> Result<String, ForgeError> {
        self.input_path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ForgeError::Configuration(format!(
                    "cannot determine file name of {}",
                    self.input_path.display()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_key_is_lowercased_per_region() {
        let credentials = Credentials::new("Client123", "secret", "http://localhost");
        assert_eq!(
            credentials.bucket_key(Region::Us),
            "forge_sample_client123-us"
        );
        assert_eq!(
            credentials.bucket_key(Region::Emea),
            "forge_sample_client123-emea"
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let credentials = Credentials::new("id", "hunter2", "http://localhost");
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }

    #[test]
    fn config_resolves_regions_eagerly() {
        let config = WorkflowConfig::new("/tmp/model.rvt", "US", "emea", "us", ".").unwrap();
        assert_eq!(config.server, Region::Us);
        assert_eq!(config.storage, Region::Emea);
        assert_eq!(config.object_key().unwrap(), "model.rvt");

        let err = WorkflowConfig::new("/tmp/model.rvt", "us", "mars", "us", ".").unwrap_err();
        assert!(matches!(err, ForgeError::InvalidRegion(t) if t == "mars"));
    }

    #[test]
    fn defaults() {
        let poll = PollOptions::default();
        assert_eq!(poll.interval, Duration::from_secs(2));
        let obj = ObjExportOptions::default();
        assert_eq!(obj.object_ids, vec![1526, 1527]);
        assert_eq!(obj.unit, Unit::Meter);
    }
}
