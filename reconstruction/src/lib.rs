mod camera;
mod colmap_stream;
mod command;
mod config;
mod error;
mod layout;
mod message;
mod model;
mod pipeline_stream;
mod runner;
mod step;

pub use camera::CameraModel;
pub use colmap_stream::{run_colmap, Reconstruction, RunSummary};
pub use command::{plan, ColmapCommand};
pub use config::{ColmapConfig, FailurePolicy, DEFAULT_PROGRAM};
pub use error::{ReconstructionError, Result};
pub use layout::DatasetLayout;
pub use message::ReconstructionMessage;
pub use model::{ModelFile, ModelFormat, SparseModel};
pub use pipeline_stream::PipelineStream;
pub use runner::{CommandRunner, DryRunRunner, ProcessRunner, StepStatus};
pub use step::Step;
