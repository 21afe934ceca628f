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

use crate::core::error::ClassifierError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Inputs of one evaluation run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EvaluationConfig {
    /// Root directory laid out as `root/<class_name>/<image_file>*`.
    pub training_data_path: String,

    /// Serialized model artifact produced by the training side.
    pub model_artifact_path: String,

    /// Target (height, width, channels); images are resized to fit.
    pub image_size: [usize; 3],

    pub batch_size: usize,

    /// Held-out fraction of each class used for evaluation, 0 < f < 1.
    pub validation_split: f32,

    /// Destination of the JSON report artifact.
    pub report_output_path: String,

    #[serde(default = "default_num_workers")]
    pub num_workers: usize,
}

fn default_num_workers() -> usize {
    num_cpus::get()
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            training_data_path: "artifacts/data_ingestion/data".to_string(),
            model_artifact_path: "artifacts/training/model.bin".to_string(),
            image_size: [224, 224, 3],
            batch_size: 16,
            validation_split: 0.2,
            report_output_path: "scores.json".to_string(),
            num_workers: default_num_workers(),
        }
    }
}

impl EvaluationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ClassifierError::InvalidConfiguration(format!(
                "{}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: EvaluationConfig = serde_yaml::from_str(&content)
            .map_err(|e| ClassifierError::InvalidConfiguration(e.to_string()))?;

        config
            .validate()
            .map_err(ClassifierError::InvalidConfiguration)?;

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ClassifierError> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ClassifierError::InvalidConfiguration(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("Batch size must be greater than 0".to_string());
        }

        if !(self.validation_split > 0.0 && self.validation_split < 1.0) {
            return Err("Validation split must be strictly between 0 and 1".to_string());
        }

        let [height, width, channels] = self.image_size;
        if height == 0 || width == 0 {
            return Err("Image height and width must be greater than 0".to_string());
        }
        if channels != 3 {
            return Err("Only 3-channel (RGB) images are supported".to_string());
        }

        if self.training_data_path.is_empty() {
            return Err("Training data path cannot be empty".to_string());
        }

        if self.report_output_path.is_empty() {
            return Err("Report output path cannot be empty".to_string());
        }

        Ok(())
    }

    /// (height, width, channels) as a tuple for the stream builder.
    pub fn image_dimensions(&self) -> (usize, usize, usize) {
        let [height, width, channels] = self.image_size;
        (height, width, channels)
    }
}
