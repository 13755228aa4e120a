use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::camera::CameraModel;
use crate::error::Result;
use crate::ReconstructionError;

/// Program name used when no explicit tool path is configured.
pub const DEFAULT_PROGRAM: &str = "colmap";

/// What to do when a COLMAP step exits unsuccessfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing step.
    #[default]
    Abort,
    /// Log the failure and run the remaining steps anyway.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColmapConfig {
    /// Path to the COLMAP executable. When unset, `colmap` is resolved from `PATH`.
    pub colmap_path: Option<PathBuf>,

    /// Share one set of intrinsics across all images (`ImageReader.single_camera`).
    pub share_intrinsics: bool,

    /// Upper bound on SIFT features per image.
    pub num_descriptors: u32,

    pub camera_model: CameraModel,

    pub failure_policy: FailurePolicy,
}

impl Default for ColmapConfig {
    fn default() -> Self {
        Self {
            colmap_path: None,
            share_intrinsics: true,
            num_descriptors: 2048,
            camera_model: CameraModel::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl ColmapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_descriptors == 0 {
            return Err(ReconstructionError::InvalidConfig(
                "num_descriptors must be at least 1".to_string(),
            ));
        }
        if let Some(path) = &self.colmap_path {
            if path.as_os_str().is_empty() {
                return Err(ReconstructionError::InvalidConfig(
                    "colmap_path must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn program(&self) -> PathBuf {
        self.colmap_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM))
    }

    /// Value passed as `ImageReader.single_camera`.
    pub fn single_camera_flag(&self) -> u8 {
        u8::from(self.share_intrinsics)
    }

    pub fn with_colmap_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.colmap_path = Some(path.into());
        self
    }

    pub fn with_share_intrinsics(mut self, share: bool) -> Self {
        self.share_intrinsics = share;
        self
    }

    pub fn with_num_descriptors(mut self, num: u32) -> Self {
        self.num_descriptors = num;
        self
    }

    pub fn with_camera_model(mut self, model: CameraModel) -> Self {
        self.camera_model = model;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}
