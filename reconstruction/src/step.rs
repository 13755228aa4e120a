use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    FeatureExtraction,
    ExhaustiveMatching,
    Mapping,
    BundleAdjustment,
    ModelConversion,
}

impl Step {
    /// Every step, in the order they have to run.
    pub const ALL: [Step; 5] = [
        Self::FeatureExtraction,
        Self::ExhaustiveMatching,
        Self::Mapping,
        Self::BundleAdjustment,
        Self::ModelConversion,
    ];

    pub fn subcommand(&self) -> &'static str {
        match self {
            Self::FeatureExtraction => "feature_extractor",
            Self::ExhaustiveMatching => "exhaustive_matcher",
            Self::Mapping => "mapper",
            Self::BundleAdjustment => "bundle_adjuster",
            Self::ModelConversion => "model_converter",
        }
    }

    /// Whether the step reads or writes the `sparse/` output directory.
    pub fn uses_sparse_dir(&self) -> bool {
        matches!(self, Self::Mapping | Self::BundleAdjustment | Self::ModelConversion)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FeatureExtraction => "feature extraction",
            Self::ExhaustiveMatching => "exhaustive matching",
            Self::Mapping => "mapping",
            Self::BundleAdjustment => "bundle adjustment",
            Self::ModelConversion => "model conversion",
        };
        f.write_str(name)
    }
}
