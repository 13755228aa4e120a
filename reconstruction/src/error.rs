use thiserror::Error;
use crate::step::Step;

pub type Result<T> = std::result::Result<T, ReconstructionError>;

#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("File IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} failed with {} while running `{command}`", exit_code_text(.code))]
    StepFailed {
        step: Step,
        command: String,
        code: Option<i32>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed configuration file: {0}")]
    ConfigFile(#[from] serde_json::Error),
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
