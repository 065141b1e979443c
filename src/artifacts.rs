//! Selection and download of resources produced by a completed translation.

use crate::client::ForgeClient;
use crate::error::ForgeError;
use crate::region::Region;
use crate::types::{DerivativeNode, ManifestChild};
use crate::urn::Urn;
use futures_util::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::pin;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const FALLBACK_FILE_NAME: &str = "derivative.bin";

/// `true` for a successfully produced resource of `model_guid` playing `role`.
pub fn is_downloadable(child: &ManifestChild, model_guid: &str, role: &str) -> bool {
    child.type_.as_deref() == Some("resource")
        && child.status.as_deref() == Some("success")
        && child.model_guid.as_deref() == Some(model_guid)
        && child.role.as_deref() == Some(role)
        && child.urn.is_some()
}

/// Direct children of `node` that pass [`is_downloadable`], in manifest order.
pub fn select_artifacts<'a>(
    node: &'a DerivativeNode,
    model_guid: &'a str,
    role: &'a str,
) -> impl Iterator<Item = &'a ManifestChild> + 'a {
    node.children
        .iter()
        .filter(move |child| is_downloadable(child, model_guid, role))
}

/// Local file name for a derivative: the last `/`-separated segment of its URN.
pub fn file_name(derivative_urn: &str) -> &str {
    match derivative_urn.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => FALLBACK_FILE_NAME,
    }
}

/// Writes `stream` to `file_path` through a `.part` sibling that is renamed
/// on success and removed on failure.
pub(crate) async fn write_stream<S, B, E>(stream: S, file_path: &Path) -> Result<(), ForgeError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    ForgeError: From<E>,
{
    let mut part = file_path.as_os_str().to_owned();
    part.push(".part");
    let part_path = PathBuf::from(part);

    let written = async {
        let mut file = fs::File::create(&part_path).await?;
        let mut stream = pin!(stream);
        while let Some(chunk) = stream.next().await {
            file.write_all(chunk?.as_ref()).await?;
        }
        file.flush().await?;
        Ok::<_, ForgeError>(())
    }
    .await;

    match written {
        Ok(()) => {
            fs::rename(&part_path, file_path).await?;
            Ok(())
        }
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(&part_path).await {
                warn!("Failed removing {}: {}", part_path.display(), remove_err);
            }
            Err(e)
        }
    }
}

impl ForgeClient {
    /// Downloads one derivative resource into `dest_dir`.
    ///
    /// # Returns
    ///
    /// The path of the written file.
    pub async fn download_derivative<P: AsRef<Path>>(
        &self,
        urn: &Urn,
        derivative_urn: &str,
        region: Region,
        dest_dir: P,
    ) -> Result<PathBuf, ForgeError> {
        info!("Downloading derivative: {}", derivative_urn);
        let url = self.derivative_endpoint(region, &[urn.as_str(), "manifest", derivative_urn])?;
        let response = self.send(self.client.get(url)).await?;

        fs::create_dir_all(dest_dir.as_ref()).await?;
        let file_path = dest_dir.as_ref().join(file_name(derivative_urn));
        write_stream(response.bytes_stream(), &file_path).await?;

        Ok(file_path)
    }

    /// Downloads every resource of `node` that passes [`is_downloadable`].
    ///
    /// Resources that fail to download are logged and skipped.
    pub async fn download_artifacts<P: AsRef<Path>>(
        &self,
        urn: &Urn,
        node: &DerivativeNode,
        model_guid: &str,
        role: &str,
        region: Region,
        dest_dir: P,
    ) -> Result<Vec<PathBuf>, ForgeError> {
        let mut downloaded_files = Vec::new();

        for child in select_artifacts(node, model_guid, role) {
            let Some(derivative_urn) = child.urn.as_deref() else {
                continue;
            };
            info!("{}", derivative_urn);

            match self.derivative_headers(urn, derivative_urn, region).await {
                Ok(headers) => match headers.content_length {
                    Some(size) => info!("\t size: {}", size),
                    None => info!("\t size: unknown"),
                },
                Err(e) => warn!("Failed getting derivative headers of {}: {}", derivative_urn, e),
            }

            match self
                .download_derivative(urn, derivative_urn, region, dest_dir.as_ref())
                .await
            {
                Ok(path) => downloaded_files.push(path),
                Err(e) => warn!("Failed downloading {}: {}", derivative_urn, e),
            }
        }

        Ok(downloaded_files)
    }
}
