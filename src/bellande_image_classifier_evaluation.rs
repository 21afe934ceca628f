// Copyright (C) 2024 Bellande Artificial Intelligence Computer Vision Research Innovation Center, Ronaldson Bellande

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::path::{Path, PathBuf};

use log::info;

pub mod core;
pub mod data;
pub mod evaluation;
pub mod loss;
pub mod metrics;
pub mod models;
pub mod report;
pub mod utilities;

use crate::core::error::ClassifierError;
use crate::data::dataloader::DataLoader;
use crate::data::dataset::Dataset;
use crate::data::image_folder::ValidationFolder;
use crate::evaluation::evaluator::Evaluator;
use crate::metrics::metrics::classification_report;
use crate::models::classifier::ImageClassifier;
use crate::report::writer::EvaluationReport;
use crate::utilities::config::EvaluationConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const FRAMEWORK_NAME: &str = "Bellande Image Classifier Evaluation";

/// End-to-end evaluation of a trained image classifier: validation stream
/// construction, scoring pass, metric aggregation and report persistence.
///
/// The stages run strictly in sequence and fail fast; on success exactly one
/// well-formed report artifact exists at the configured output path.
pub struct EvaluationPipeline {
    config: EvaluationConfig,
}

impl EvaluationPipeline {
    pub fn new(config: EvaluationConfig) -> Result<Self, ClassifierError> {
        config
            .validate()
            .map_err(ClassifierError::InvalidConfiguration)?;
        Ok(EvaluationPipeline { config })
    }

    pub fn with_config<P: AsRef<Path>>(config_path: P) -> Result<Self, ClassifierError> {
        let config = EvaluationConfig::from_file(config_path)?;
        Ok(EvaluationPipeline { config })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Runs the full pipeline and returns the persisted report.
    pub fn run(&self) -> Result<EvaluationReport, ClassifierError> {
        info!(
            "Building validation stream from {}",
            self.config.training_data_path
        );
        let folder = ValidationFolder::new(
            PathBuf::from(&self.config.training_data_path),
            self.config.image_dimensions(),
            self.config.validation_split,
        )?;
        let class_labels = folder.class_labels().to_vec();
        let num_classes = folder.num_classes();
        let loader = DataLoader::new(
            Box::new(folder),
            self.config.batch_size,
            self.config.num_workers,
        );

        info!("Loading model artifact {}", self.config.model_artifact_path);
        let model = ImageClassifier::load(&self.config.model_artifact_path)?;

        let evaluator = Evaluator::new(Box::new(model));
        let scored = evaluator.score(&loader)?;

        let metrics =
            classification_report(&scored.true_labels, &scored.predicted_labels, num_classes)?;

        let evaluation_report = EvaluationReport::assemble(&scored, metrics, class_labels)?;
        evaluation_report.save(&self.config.report_output_path)?;

        Ok(evaluation_report)
    }

    pub fn get_version() -> &'static str {
        VERSION
    }

    pub fn get_name() -> &'static str {
        FRAMEWORK_NAME
    }
}
