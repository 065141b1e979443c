//! Interpretation of manifest progress and the polling loop that waits on it.

use crate::client::ForgeClient;
use crate::config::PollOptions;
use crate::error::ForgeError;
use crate::region::Region;
use crate::types::{DerivativeNode, Manifest};
use crate::urn::Urn;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{info, warn};

/// The only progress value that marks a manifest or derivative as finished.
pub const COMPLETE: &str = "complete";

/// Where a derivative of one output type stands in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivativeState {
    /// No node with this output type exists yet.
    NotRequested,
    /// A node exists but has not completed; carries its progress.
    InProgress(String),
    Complete,
}

impl Manifest {
    /// `true` only when progress is exactly `"complete"`.
    ///
    /// Values such as `"99% complete"` or `"Complete"` are still in progress.
    pub fn is_complete(&self) -> bool {
        self.progress.as_deref() == Some(COMPLETE)
    }

    /// First derivative node whose output type equals `output_type`, in list order.
    pub fn find_derivative(&self, output_type: &str) -> Option<&DerivativeNode> {
        self.derivatives
            .iter()
            .find(|node| node.output_type.as_deref() == Some(output_type))
    }

    pub fn derivative_state(&self, output_type: &str) -> DerivativeState {
        derivative_state(output_type, Some(self))
    }
}

/// Looks up a derivative node in a possibly missing manifest.
pub fn find_derivative_node<'a>(
    output_type: &str,
    manifest: Option<&'a Manifest>,
) -> Option<&'a DerivativeNode> {
    manifest?.find_derivative(output_type)
}

/// Progress of the node with `output_type`, or `None` if there is no such node.
pub fn node_status<'a>(output_type: &str, manifest: Option<&'a Manifest>) -> Option<&'a str> {
    find_derivative_node(output_type, manifest)?.progress.as_deref()
}

impl DerivativeNode {
    /// [`DerivativeState::Complete`] or [`DerivativeState::InProgress`]; never `NotRequested`.
    pub fn state(&self) -> DerivativeState {
        match self.progress.as_deref() {
            Some(COMPLETE) => DerivativeState::Complete,
            Some(progress) => DerivativeState::InProgress(progress.to_string()),
            None => DerivativeState::InProgress(self.status.clone().unwrap_or_default()),
        }
    }
}

pub fn derivative_state(output_type: &str, manifest: Option<&Manifest>) -> DerivativeState {
    find_derivative_node(output_type, manifest)
        .map_or(DerivativeState::NotRequested, DerivativeNode::state)
}

impl ForgeClient {
    /// Polls the manifest of `urn` until its progress is `"complete"`.
    ///
    /// A missing manifest or a transient failure counts as "not ready yet";
    /// any other error ends the wait.
    ///
    /// # Errors
    ///
    /// - `ForgeError::PollTimeout` once `options.timeout` has elapsed.
    /// - `ForgeError::Cancelled` when `options.cancel` fires.
    /// - Any non-transient error from fetching the manifest.
    pub async fn wait_for_manifest(
        &self,
        urn: &Urn,
        region: Region,
        options: &PollOptions,
    ) -> Result<Manifest, ForgeError> {
        let started = Instant::now();
        let deadline = options.timeout.map(|timeout| started + timeout);
        let timed_out = || ForgeError::PollTimeout {
            urn: urn.to_string(),
            elapsed: started.elapsed(),
        };
        let mut attempt: u32 = 0;

        loop {
            if options.cancel.is_cancelled() {
                return Err(ForgeError::Cancelled);
            }
            attempt += 1;

            let fetched = tokio::select! {
                biased;
                _ = options.cancel.cancelled() => return Err(ForgeError::Cancelled),
                _ = until(deadline) => return Err(timed_out()),
                fetched = self.manifest(urn, region) => fetched,
            };

            match fetched {
                Ok(Some(manifest)) => {
                    info!(
                        attempt,
                        "{}....",
                        manifest.progress.as_deref().unwrap_or("pending")
                    );
                    if manifest.is_complete() {
                        info!("Done");
                        return Ok(manifest);
                    }
                }
                Ok(None) => info!(attempt, "Manifest not available yet"),
                Err(e) if e.is_transient() => {
                    warn!(attempt, "Failed getting Manifest of {}: {}", urn, e)
                }
                Err(e) => return Err(e),
            }

            tokio::select! {
                biased;
                _ = options.cancel.cancelled() => return Err(ForgeError::Cancelled),
                _ = until(deadline) => return Err(timed_out()),
                _ = sleep(options.interval) => {}
            }
        }
    }
}

/// Resolves at `deadline`, or never when there is none.
async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
