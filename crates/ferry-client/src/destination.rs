//! Local destination resolution.
//!
//! The directory downloads land in is never typed by the user. It is
//! resolved once at the start of every connection attempt and handed to the
//! backend together with the peer address.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

/// Directory on this machine that receives downloaded content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDestination(PathBuf);

impl LocalDestination {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// The path as the backend receives it. `None` when it is not valid
    /// UTF-8 and could only be sent in a lossy form.
    pub fn to_str(&self) -> Option<&str> {
        self.0.to_str()
    }
}

impl fmt::Display for LocalDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Source of the local destination for a connection attempt.
pub trait DestinationResolver: Send + Sync {
    /// Resolve the destination. Must not fail: every implementation falls
    /// back to some directory.
    fn resolve(&self) -> LocalDestination;
}

/// Resolves the platform's desktop directory.
///
/// Falls back to the home directory, then the working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopDirResolver;

impl DestinationResolver for DesktopDirResolver {
    fn resolve(&self) -> LocalDestination {
        let path = dirs::desktop_dir()
            .or_else(dirs::home_dir)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        LocalDestination(path)
    }
}

/// Always resolves to the same directory.
#[derive(Debug, Clone)]
pub struct FixedDirResolver(PathBuf);

impl FixedDirResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl DestinationResolver for FixedDirResolver {
    fn resolve(&self) -> LocalDestination {
        LocalDestination(self.0.clone())
    }
}

/// Pick the resolver matching `config`: the configured download directory
/// when set, the desktop otherwise.
pub fn resolver_for(config: &ClientConfig) -> Arc<dyn DestinationResolver> {
    match &config.download_dir {
        Some(dir) => Arc::new(FixedDirResolver::new(dir.clone())),
        None => Arc::new(DesktopDirResolver),
    }
}
