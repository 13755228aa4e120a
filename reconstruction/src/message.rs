use std::path::PathBuf;
use std::time::Duration;
use crate::command::ColmapCommand;
use crate::model::SparseModel;
use crate::runner::StepStatus;
use crate::step::Step;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconstructionMessage {
    /// A COLMAP process is about to be spawned.
    StepStarted {
        step: Step,
        command: ColmapCommand,
    },
    /// The process for `step` exited, successfully or not.
    StepFinished {
        step: Step,
        status: StepStatus,
        elapsed: Duration,
    },
    /// `sparse/` exists now. `created` is false when it was already there. Not sent by dry runs.
    SparseDirReady {
        path: PathBuf,
        created: bool,
    },
    /// All steps ran. `model` is `None` for dry runs.
    Finished {
        failed_steps: Vec<Step>,
        model: Option<SparseModel>,
    },
}
