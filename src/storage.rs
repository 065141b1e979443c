//! Bucket and object operations against the storage service.

use crate::client::ForgeClient;
use crate::error::{found, ForgeError};
use crate::region::Region;
use crate::types::{BucketDetails, CreateBucketRequest, ObjectDetails, PolicyKey};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use std::path::Path;
use tokio::fs::File;
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::{error, info, warn};

const REGION_HEADER: &str = "x-ads-region";

/// How [`ForgeClient::ensure_bucket`] made the bucket usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Existing,
    Created,
}

impl ForgeClient {
    /// Fetches bucket metadata, or `None` if the bucket does not exist.
    pub async fn bucket_details(
        &self,
        bucket_key: &str,
    ) -> Result<Option<BucketDetails>, ForgeError> {
        info!("Getting bucket details for: {}", bucket_key);
        let url = self.endpoint(&["oss", "v2", "buckets", bucket_key, "details"])?;
        found(self.send_json(self.client.get(url)).await)
    }

    /// Creates a bucket in `region`.
    ///
    /// A conflict means the bucket already exists and is reported as
    /// [`ContainerStatus::Existing`].
    pub async fn create_bucket(
        &self,
        bucket_key: &str,
        region: Region,
        policy: PolicyKey,
    ) -> Result<ContainerStatus, ForgeError> {
        info!("Creating bucket: {} in {}", bucket_key, region);
        let url = self.endpoint(&["oss", "v2", "buckets"])?;
        let request = self
            .client
            .post(url)
            .header(REGION_HEADER, region.header_value())
            .json(&CreateBucketRequest {
                bucket_key,
                policy_key: policy,
            });

        match self.send(request).await {
            Ok(_) => Ok(ContainerStatus::Created),
            Err(ForgeError::Api { status, .. }) if status == StatusCode::CONFLICT => {
                warn!("Bucket {} already exists", bucket_key);
                Ok(ContainerStatus::Existing)
            }
            Err(e) => {
                error!("Failed creating bucket: {} - {}", bucket_key, e);
                Err(e)
            }
        }
    }

    /// Makes sure the bucket exists, creating it with a persistent policy if
    /// needed. Safe to call on every run.
    pub async fn ensure_bucket(
        &self,
        bucket_key: &str,
        region: Region,
    ) -> Result<ContainerStatus, ForgeError> {
        match self.bucket_details(bucket_key).await? {
            Some(_) => Ok(ContainerStatus::Existing),
            None => {
                self.create_bucket(bucket_key, region, PolicyKey::Persistent)
                    .await
            }
        }
    }

    /// Deletes the bucket along with every object in it.
    pub async fn delete_bucket(&self, bucket_key: &str) -> Result<(), ForgeError> {
        info!("Deleting bucket: {}", bucket_key);
        let url = self.endpoint(&["oss", "v2", "buckets", bucket_key])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    /// Fetches object metadata, or `None` if no such object is stored.
    pub async fn object_details(
        &self,
        bucket_key: &str,
        object_key: &str,
    ) -> Result<Option<ObjectDetails>, ForgeError> {
        info!("Getting object details: {}", object_key);
        let url = self.endpoint(&[
            "oss", "v2", "buckets", bucket_key, "objects", object_key, "details",
        ])?;
        found(self.send_json(self.client.get(url)).await)
    }

    /// Streams a local file into the bucket as `application/octet-stream`.
    pub async fn upload_object<P: AsRef<Path>>(
        &self,
        bucket_key: &str,
        object_key: &str,
        file_path: P,
    ) -> Result<ObjectDetails, ForgeError> {
        info!("Uploading object: {}", object_key);
        let url = self.endpoint(&["oss", "v2", "buckets", bucket_key, "objects", object_key])?;

        let file = File::open(file_path.as_ref()).await?;
        let length = file.metadata().await?.len();
        let stream = FramedRead::new(file, BytesCodec::new());
        let body = reqwest::Body::wrap_stream(stream);

        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, length)
            .body(body);

        self.send_json(request).await.map_err(|e| {
            error!("Failed to upload file - {}", e);
            e
        })
    }

    /// Returns the stored object, uploading `file_path` only when no object
    /// named `object_key` exists yet.
    pub async fn locate_or_upload<P: AsRef<Path>>(
        &self,
        bucket_key: &str,
        object_key: &str,
        file_path: P,
    ) -> Result<ObjectDetails, ForgeError> {
        if let Some(existing) = self.object_details(bucket_key, object_key).await? {
            info!("Object {} already uploaded, skipping", existing.object_id);
            return Ok(existing);
        }
        self.upload_object(bucket_key, object_key, file_path).await
    }

    pub async fn delete_object(&self, bucket_key: &str, object_key: &str) -> Result<(), ForgeError> {
        info!("Deleting object: {}", object_key);
        let url = self.endpoint(&["oss", "v2", "buckets", bucket_key, "objects", object_key])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
