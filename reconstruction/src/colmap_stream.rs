use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use async_fn_stream::TryStreamEmitter;
use async_trait::async_trait;
use futures::StreamExt;
use crate::command::{plan, ColmapCommand};
use crate::config::{ColmapConfig, FailurePolicy};
use crate::error::{ReconstructionError, Result};
use crate::layout::DatasetLayout;
use crate::message::ReconstructionMessage;
use crate::model::SparseModel;
use crate::pipeline_stream::PipelineStream;
use crate::runner::{CommandRunner, DryRunRunner, ProcessRunner, StepStatus};
use crate::step::Step;

/// Runs the COLMAP sparse reconstruction steps over one dataset directory.
pub struct Reconstruction {
    layout: DatasetLayout,
    config: ColmapConfig,
    runner: Arc<dyn CommandRunner>,
    dry_run: bool,
}

/// What a finished run did, collected from its message stream.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub steps: Vec<(Step, StepStatus, Duration)>,
    pub sparse_dir_created: bool,
    pub failed_steps: Vec<Step>,
    pub model: Option<SparseModel>,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.failed_steps.is_empty()
    }
}

impl Reconstruction {
    pub fn new(path: impl Into<PathBuf>, config: ColmapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            layout: DatasetLayout::new(path),
            config,
            runner: Arc::new(ProcessRunner),
            dry_run: false,
        })
    }

    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    /// Log the commands instead of running them. Nothing on disk is touched.
    pub fn dry_run(mut self) -> Self {
        self.runner = Arc::new(DryRunRunner);
        self.dry_run = true;
        self
    }

    pub fn commands(&self) -> Vec<ColmapCommand> {
        plan(&self.layout, &self.config)
    }

    /// Drives the stream to completion and collects what happened.
    pub async fn run_to_end(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut stream = std::pin::pin!(self.launch());
        while let Some(msg) = stream.next().await {
            match msg? {
                ReconstructionMessage::StepStarted { .. } => {}
                ReconstructionMessage::StepFinished { step, status, elapsed } => {
                    summary.steps.push((step, status, elapsed));
                }
                ReconstructionMessage::SparseDirReady { created, .. } => {
                    summary.sparse_dir_created = created;
                }
                ReconstructionMessage::Finished { failed_steps, model } => {
                    summary.failed_steps = failed_steps;
                    summary.model = model;
                }
            }
        }
        Ok(summary)
    }

    /// The line logged before each step. Dry runs log the command only once, here.
    fn step_banner(&self, command: &ColmapCommand) -> String {
        let step = command.step();
        if self.dry_run {
            format!("[dry run] {step}: {command}")
        } else {
            format!("Running {step}: {command}")
        }
    }

    async fn prepare_sparse_dir(&self) -> Result<bool> {
        let created = self.layout.ensure_sparse_dir().await?;
        if created {
            log::info!("Created {}", self.layout.sparse().display());
        }
        Ok(created)
    }

    async fn run_step(&self, command: &ColmapCommand) -> Result<StepStatus> {
        match self.runner.run(command).await {
            Ok(status) => Ok(status),
            Err(err @ ReconstructionError::Spawn { .. })
                if self.config.failure_policy == FailurePolicy::Continue =>
            {
                log::warn!("{err}");
                Ok(StepStatus::failed(None))
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl PipelineStream for Reconstruction {
    async fn run(&mut self, emitter: TryStreamEmitter<ReconstructionMessage, ReconstructionError>) -> Result<()> {
        log::info!(
            "Starting sparse reconstruction of {} using {}",
            self.layout.root().display(),
            self.config.program().display()
        );

        let mut sparse_ready = false;
        let mut failed_steps = Vec::new();

        for command in self.commands() {
            let step = command.step();

            if step.uses_sparse_dir() && !sparse_ready {
                if self.dry_run {
                    log::info!("[dry run] would ensure {} exists", self.layout.sparse().display());
                } else {
                    let created = self.prepare_sparse_dir().await?;
                    emitter
                        .emit(ReconstructionMessage::SparseDirReady {
                            path: self.layout.sparse(),
                            created,
                        })
                        .await;
                }
                sparse_ready = true;
            }

            log::info!("{}", self.step_banner(&command));
            emitter
                .emit(ReconstructionMessage::StepStarted {
                    step,
                    command: command.clone(),
                })
                .await;

            let started = Instant::now();
            let status = self.run_step(&command).await?;
            let elapsed = started.elapsed();
            emitter
                .emit(ReconstructionMessage::StepFinished { step, status, elapsed })
                .await;

            if status.success {
                log::info!("Finished {step} in {elapsed:.1?}");
                continue;
            }

            match self.config.failure_policy {
                FailurePolicy::Abort => {
                    return Err(ReconstructionError::StepFailed {
                        step,
                        command: command.to_string(),
                        code: status.code,
                    });
                }
                FailurePolicy::Continue => {
                    log::warn!("{step} failed (exit code {:?}), continuing with the next step", status.code);
                    failed_steps.push(step);
                }
            }
        }

        let model = if self.dry_run {
            None
        } else {
            let model = SparseModel::discover(&self.layout.sparse_model()).await?;
            if model.is_empty() {
                log::warn!("No model files found in {}", model.dir.display());
            }
            Some(model)
        };

        emitter
            .emit(ReconstructionMessage::Finished { failed_steps, model })
            .await;
        Ok(())
    }
}

/// Runs every step over `path` with COLMAP, returning once the last process has exited.
pub async fn run_colmap(path: impl Into<PathBuf>, config: ColmapConfig) -> Result<RunSummary> {
    Reconstruction::new(path, config)?.run_to_end().await
}
