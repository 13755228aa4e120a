use std::path::{Path, PathBuf};
use anyhow::Context;
use clap::Parser;
use futures::StreamExt;
use reconstruction::{
    CameraModel, ColmapConfig, FailurePolicy, ModelFormat, PipelineStream, Reconstruction,
    ReconstructionMessage,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// CLI for running a COLMAP sparse reconstruction over a directory of images.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Dataset directory containing an `images` folder
    path: PathBuf,

    /// COLMAP executable. Defaults to `colmap` on PATH
    #[arg(long)]
    colmap_path: Option<PathBuf>,

    /// Share camera intrinsics across all images [default: true]
    #[arg(long)]
    share_intrinsics: Option<bool>,

    /// Max number of SIFT features per image [default: 2048]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    num_descriptors: Option<u32>,

    /// COLMAP camera model, e.g. PINHOLE or OPENCV [default: PINHOLE]
    #[arg(long)]
    camera_model: Option<CameraModel>,

    /// JSON config file. Flags given on the command line take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep running the remaining steps when one fails
    #[arg(long)]
    keep_going: bool,

    /// Print the COLMAP commands without running them
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    async fn colmap_config(&self) -> anyhow::Result<ColmapConfig> {
        let mut config = match &self.config {
            Some(path) => ColmapConfig::load(path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ColmapConfig::new(),
        };

        if let Some(path) = &self.colmap_path {
            config = config.with_colmap_path(path);
        }
        if let Some(share) = self.share_intrinsics {
            config = config.with_share_intrinsics(share);
        }
        if let Some(num) = self.num_descriptors {
            config = config.with_num_descriptors(num);
        }
        if let Some(model) = self.camera_model {
            config = config.with_camera_model(model);
        }
        if self.keep_going {
            config = config.with_failure_policy(FailurePolicy::Continue);
        }
        Ok(config)
    }
}

async fn has_images_dir(path: &Path) -> bool {
    tokio::fs::metadata(path.join("images"))
        .await
        .is_ok_and(|meta| meta.is_dir())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.colmap_config().await?;

    if !has_images_dir(&args.path).await {
        warn!("{} has no images directory, COLMAP will likely fail", args.path.display());
    }

    let mut reconstruction = Reconstruction::new(&args.path, config)?;
    if args.dry_run {
        reconstruction = reconstruction.dry_run();
    }

    let mut failed = Vec::new();
    let mut stream = std::pin::pin!(reconstruction.launch());
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(ReconstructionMessage::StepFinished { step, status, elapsed }) if !status.success => {
                error!("{step} failed after {elapsed:.1?} (exit code {:?})", status.code);
            }
            Ok(ReconstructionMessage::Finished { failed_steps, model }) => {
                failed = failed_steps;
                if let Some(model) = model {
                    let text = model.is_complete(ModelFormat::Text);
                    info!("Sparse model in {} (text model complete: {text})", model.dir.display());
                }
            }
            Ok(_) => {}
            Err(err) => {
                error!("Reconstruction stopped: {err}");
                return Err(err.into());
            }
        }
    }

    if !failed.is_empty() {
        let names: Vec<_> = failed.iter().map(ToString::to_string).collect();
        anyhow::bail!("{} step(s) failed: {}", failed.len(), names.join(", "));
    }

    info!("🚀 Reconstruction finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sfm-cmd").chain(args.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colmap.json");
        tokio::fs::write(&path, r#"{"num_descriptors":512}"#).await.unwrap();
        let path = path.to_str().unwrap();

        let config = parse(&["scene", "--config", path]).colmap_config().await.unwrap();
        assert_eq!(config.num_descriptors, 512);

        let config = parse(&["scene", "--config", path, "--num-descriptors", "64"])
            .colmap_config()
            .await
            .unwrap();
        assert_eq!(config.num_descriptors, 64);
    }

    #[tokio::test]
    async fn test_missing_fields_keep_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colmap.json");
        tokio::fs::write(&path, r#"{"camera_model":"OPENCV"}"#).await.unwrap();

        let config = parse(&["scene", "--config", path.to_str().unwrap(), "--keep-going"])
            .colmap_config()
            .await
            .unwrap();
        assert_eq!(config.camera_model, CameraModel::OpenCV);
        assert_eq!(config.num_descriptors, 2048);
        assert!(config.share_intrinsics);
        assert_eq!(config.colmap_path, None);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
    }

    #[tokio::test]
    async fn test_flags_without_config_file() {
        let config = parse(&[
            "scene",
            "--colmap-path", "/opt/colmap/bin/colmap",
            "--share-intrinsics", "false",
            "--camera-model", "SIMPLE_RADIAL",
        ])
        .colmap_config()
        .await
        .unwrap();

        assert_eq!(config.colmap_path, Some(PathBuf::from("/opt/colmap/bin/colmap")));
        assert!(!config.share_intrinsics);
        assert_eq!(config.camera_model, CameraModel::SimpleRadial);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_zero_descriptors_rejected() {
        assert!(Args::try_parse_from(["sfm-cmd", "scene", "--num-descriptors", "0"]).is_err());
        assert!(Args::try_parse_from(["sfm-cmd", "scene", "--camera-model", "BROWN"]).is_err());
    }

    #[tokio::test]
    async fn test_has_images_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_images_dir(dir.path()).await);

        std::fs::write(dir.path().join("images"), b"").unwrap();
        assert!(!has_images_dir(dir.path()).await);

        std::fs::remove_file(dir.path().join("images")).unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        assert!(has_images_dir(dir.path()).await);
    }
}
