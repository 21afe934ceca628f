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
use crate::evaluation::evaluator::ScoredRun;
use crate::metrics::metrics::{ClassificationReport, ClassMetrics, ConfusionMatrix, OverallMetrics};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The terminal artifact of an evaluation run. Write-once: assembled at the
/// end of a successful run and never mutated after persistence.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub loss: f32,
    pub accuracy: f32,
    pub confusion_matrix: ConfusionMatrix,
    pub class_labels: Vec<String>,
    pub per_class_metrics: BTreeMap<String, ClassMetrics>,
    pub overall_metrics: OverallMetrics,
}

impl EvaluationReport {
    /// Joins the scoring-pass scalars with the metrics-engine output. The
    /// label list must line up with the per-class metrics index-for-index.
    pub fn assemble(
        run: &ScoredRun,
        report: ClassificationReport,
        class_labels: Vec<String>,
    ) -> Result<Self, ClassifierError> {
        if class_labels.len() != report.per_class.len() {
            return Err(ClassifierError::ShapeMismatch(format!(
                "{} class labels for {} per-class metric rows",
                class_labels.len(),
                report.per_class.len()
            )));
        }

        let per_class_metrics = class_labels
            .iter()
            .cloned()
            .zip(report.per_class.into_iter())
            .collect();

        Ok(EvaluationReport {
            loss: run.loss,
            accuracy: run.accuracy,
            confusion_matrix: report.confusion_matrix,
            class_labels,
            per_class_metrics,
            overall_metrics: report.overall,
        })
    }

    /// Persists the report as pretty-printed JSON. The payload is written to
    /// a sibling temporary file, synced, then renamed onto the destination,
    /// so no observer ever sees a half-written report.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ClassifierError> {
        let path = path.as_ref();
        let temp_path = temporary_sibling(path);

        let payload = serde_json::to_string_pretty(self)
            .map_err(|e| ClassifierError::Persistence(format!("Serialization failed: {}", e)))?;

        let write_result = (|| -> std::io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(payload.as_bytes())?;
            file.sync_all()?;
            Ok(())
        })();

        if let Err(e) = write_result {
            let _ = fs::remove_file(&temp_path);
            return Err(ClassifierError::Persistence(format!(
                "Failed to write {}: {}",
                temp_path.display(),
                e
            )));
        }

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ClassifierError::Persistence(format!(
                "Failed to move report into place at {}: {}",
                path.display(),
                e
            ))
        })?;

        info!("Evaluation report saved at {}", path.display());
        Ok(())
    }
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
