use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use crate::config::ColmapConfig;
use crate::layout::DatasetLayout;
use crate::step::Step;

/// A single COLMAP invocation: `<program> <subcommand> --Key value ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColmapCommand {
    step: Step,
    program: PathBuf,
    options: Vec<(&'static str, OsString)>,
}

impl ColmapCommand {
    pub fn new(step: Step, program: impl Into<PathBuf>) -> Self {
        Self {
            step,
            program: program.into(),
            options: Vec::new(),
        }
    }

    pub fn for_step(step: Step, layout: &DatasetLayout, config: &ColmapConfig) -> Self {
        let command = Self::new(step, config.program());
        match step {
            Step::FeatureExtraction => command
                .option("database_path", layout.database())
                .option("image_path", layout.images())
                .option("ImageReader.camera_model", config.camera_model.name())
                .option("ImageReader.single_camera", config.single_camera_flag().to_string())
                .option("SiftExtraction.max_num_features", config.num_descriptors.to_string()),
            Step::ExhaustiveMatching => command
                .option("database_path", layout.database()),
            Step::Mapping => command
                .option("database_path", layout.database())
                .option("image_path", layout.images())
                .option("output_path", layout.sparse())
                .option("Mapper.extract_colors", "1"),
            Step::BundleAdjustment => command
                .option("input_path", layout.sparse_model())
                .option("output_path", layout.sparse_model())
                .option("BundleAdjustment.refine_principal_point", "1"),
            Step::ModelConversion => command
                .option("input_path", layout.sparse_model())
                .option("output_path", layout.sparse_model())
                .option("output_type", "TXT"),
        }
    }

    pub fn option(mut self, key: &'static str, value: impl Into<OsString>) -> Self {
        self.options.push((key, value.into()));
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_option(&self, key: &str) -> Option<&OsStr> {
        self.options
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Arguments after the program name, each option split into `--Key` and `value`.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(1 + self.options.len() * 2);
        args.push(OsString::from(self.step.subcommand()));
        for (key, value) in &self.options {
            args.push(OsString::from(format!("--{key}")));
            args.push(value.clone());
        }
        args
    }
}

/// The full command sequence for a dataset, in execution order.
pub fn plan(layout: &DatasetLayout, config: &ColmapConfig) -> Vec<ColmapCommand> {
    Step::ALL
        .iter()
        .map(|&step| ColmapCommand::for_step(step, layout, config))
        .collect()
}

impl fmt::Display for ColmapCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote(self.program.as_os_str()))?;
        for arg in self.args() {
            write!(f, " {}", quote(&arg))?;
        }
        Ok(())
    }
}

// POSIX-style quoting, only used for display.
fn quote(arg: &OsStr) -> String {
    let arg = arg.to_string_lossy();
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        arg.into_owned()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
