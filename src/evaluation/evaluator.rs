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
use crate::data::dataloader::DataLoader;
use crate::loss::{cross_entropy::CrossEntropyLoss, Loss};
use crate::metrics::metrics::{argmax_rows, Accuracy, Metric};
use crate::models::Model;
use log::info;

/// Outcome of one scoring pass over the validation stream.
///
/// The two label vectors are index-aligned with the input stream, which is
/// what makes the downstream confusion matrix valid; they are returned as an
/// explicit record instead of being accumulated in shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRun {
    pub loss: f32,
    pub accuracy: f32,
    pub true_labels: Vec<usize>,
    pub predicted_labels: Vec<usize>,
}

/// Applies a loaded model to the validation stream exactly once, in order,
/// collecting the training-time objective and arg-max predictions.
pub struct Evaluator {
    model: Box<dyn Model>,
    loss: Box<dyn Loss>,
}

impl Evaluator {
    pub fn new(model: Box<dyn Model>) -> Self {
        Evaluator {
            model,
            loss: Box::new(CrossEntropyLoss::new()),
        }
    }

    pub fn with_loss(model: Box<dyn Model>, loss: Box<dyn Loss>) -> Self {
        Evaluator { model, loss }
    }

    pub fn score(&self, loader: &DataLoader) -> Result<ScoredRun, ClassifierError> {
        if self.model.num_classes() != loader.num_classes() {
            return Err(ClassifierError::Inference(format!(
                "Model predicts {} classes but the dataset has {}",
                self.model.num_classes(),
                loader.num_classes()
            )));
        }

        info!(
            "Scoring {} validation samples across {} classes",
            loader.len(),
            loader.num_classes()
        );

        let mut accuracy = Accuracy::new();
        let mut true_labels = Vec::with_capacity(loader.len());
        let mut predicted_labels = Vec::with_capacity(loader.len());
        let mut loss_sum = 0.0f64;

        for batch in loader.iter() {
            let (data, target) = batch?;
            let logits = self.model.forward(&data)?;

            let batch_len = target.len();
            let batch_loss = self.loss.forward(&logits, &target)?;
            loss_sum += f64::from(batch_loss) * batch_len as f64;

            accuracy.update(&logits, &target);
            predicted_labels.extend(argmax_rows(&logits));
            true_labels.extend(target.data().iter().map(|&t| t as usize));
        }

        let total = true_labels.len();
        let loss = if total == 0 {
            0.0
        } else {
            (loss_sum / total as f64) as f32
        };
        let accuracy = accuracy.compute();

        info!(
            "Scoring pass complete: loss {:.4}, accuracy {:.4} ({} samples)",
            loss, accuracy, total
        );

        Ok(ScoredRun {
            loss,
            accuracy,
            true_labels,
            predicted_labels,
        })
    }
}
