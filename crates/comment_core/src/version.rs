//! Tool version marker stored in the repository.

use crate::error::{CommentError, Result};
use crate::repo::CommentRepo;
use semver::Version;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Outcome of comparing the running tool against the repository marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStatus {
    Equal,
    /// The tool is newer; the marker should be updated.
    UpgradeRepo,
    /// The repository was written by a newer tool.
    UpgradeTool,
}

/// Compares two semantic versions.
///
/// # Errors
///
/// Returns `VersionCorrupted` carrying both raw strings if either side is
/// not a valid semantic version.
///
/// # Examples
///
/// ```
/// use comment_core::{compare_version, VersionStatus};
///
/// assert_eq!(compare_version("2.1.1", "2.1.0").unwrap(), VersionStatus::UpgradeRepo);
/// assert!(compare_version("2..1", "2.1.0").is_err());
/// ```
pub fn compare_version(tool: &str, repo: &str) -> Result<VersionStatus> {
    let corrupted = || CommentError::VersionCorrupted {
        tool: tool.to_string(),
        repo: repo.to_string(),
    };
    let tool_version = Version::parse(tool.trim()).map_err(|_| corrupted())?;
    let repo_version = Version::parse(repo.trim()).map_err(|_| corrupted())?;

    Ok(match tool_version.cmp(&repo_version) {
        Ordering::Less => VersionStatus::UpgradeTool,
        Ordering::Greater => VersionStatus::UpgradeRepo,
        Ordering::Equal => VersionStatus::Equal,
    })
}

impl CommentRepo {
    /// Reads the stored version string, if any.
    pub fn stored_version(&self) -> Result<Option<String>> {
        let Some(id) = self.refs().read_version_ref()? else {
            return Ok(None);
        };
        let data = self.objects().get_blob(id)?;
        Ok(Some(String::from_utf8_lossy(&data).into_owned()))
    }

    /// Checks the running tool against the repository marker.
    ///
    /// A repository without a marker is stamped with `tool_version`.
    ///
    /// # Errors
    ///
    /// Returns `UpgradeTool` or `UpgradeRepo` on a mismatch and
    /// `VersionCorrupted` for unparseable versions.
    pub fn version_check(&self, tool_version: &str) -> Result<VersionStatus> {
        let Some(stored) = self.stored_version()? else {
            debug!(version = tool_version, "no version marker, initializing");
            self.write_version(tool_version)?;
            return Ok(VersionStatus::Equal);
        };

        match compare_version(tool_version, &stored)? {
            VersionStatus::Equal => Ok(VersionStatus::Equal),
            VersionStatus::UpgradeTool => Err(CommentError::UpgradeTool {
                tool: tool_version.to_string(),
                repo: stored,
            }),
            VersionStatus::UpgradeRepo => Err(CommentError::UpgradeRepo {
                tool: tool_version.to_string(),
                repo: stored,
            }),
        }
    }

    /// Overwrites the repository marker with `tool_version`.
    pub fn version_update(&self, tool_version: &str) -> Result<()> {
        Version::parse(tool_version).map_err(|_| CommentError::VersionCorrupted {
            tool: tool_version.to_string(),
            repo: self.stored_version().ok().flatten().unwrap_or_default(),
        })?;
        self.write_version(tool_version)?;
        info!(version = tool_version, "updated repository version");
        Ok(())
    }

    fn write_version(&self, version: &str) -> Result<()> {
        let id = self.objects().put_blob(version.as_bytes())?;
        self.refs().write_version_ref(id)
    }
}
