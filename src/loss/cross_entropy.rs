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

use crate::core::{error::ClassifierError, tensor::Tensor};
use crate::loss::Loss;

/// Cross entropy over raw logits, the objective the classifier was trained
/// with. The scoring pass reports its mean as the `loss` field of the
/// evaluation report.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    pub fn new() -> Self {
        CrossEntropyLoss
    }

    fn validate_input(&self, prediction: &Tensor, target: &Tensor) -> Result<(), ClassifierError> {
        if prediction.shape().len() != 2 {
            return Err(ClassifierError::ShapeMismatch(
                "Prediction tensor must be 2-dimensional (batch_size, num_classes)".to_string(),
            ));
        }

        if target.shape().len() != 1 {
            return Err(ClassifierError::ShapeMismatch(
                "Target tensor must be 1-dimensional (batch_size)".to_string(),
            ));
        }

        if prediction.shape()[0] != target.shape()[0] {
            return Err(ClassifierError::ShapeMismatch(
                "Batch sizes of prediction and target must match".to_string(),
            ));
        }

        Ok(())
    }

    fn compute_log_softmax(&self, input: &Tensor) -> Vec<f32> {
        let batch_size = input.shape()[0];
        let num_classes = input.shape()[1];

        // Find max values for numerical stability
        let mut max_vals = vec![f32::NEG_INFINITY; batch_size];
        for b in 0..batch_size {
            for c in 0..num_classes {
                let idx = b * num_classes + c;
                max_vals[b] = max_vals[b].max(input.data[idx]);
            }
        }

        // Compute exp(x - max) sums
        let mut exp_sum = vec![0.0f32; batch_size];
        for b in 0..batch_size {
            for c in 0..num_classes {
                let idx = b * num_classes + c;
                exp_sum[b] += (input.data[idx] - max_vals[b]).exp();
            }
        }

        // log_softmax(x) = x - max - ln(sum(exp(x - max)))
        let mut output = vec![0.0f32; input.len()];
        for b in 0..batch_size {
            let log_sum = exp_sum[b].ln();
            for c in 0..num_classes {
                let idx = b * num_classes + c;
                output[idx] = input.data[idx] - max_vals[b] - log_sum;
            }
        }

        output
    }
}

impl Default for CrossEntropyLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl Loss for CrossEntropyLoss {
    fn forward(&self, prediction: &Tensor, target: &Tensor) -> Result<f32, ClassifierError> {
        self.validate_input(prediction, target)?;

        let batch_size = prediction.shape()[0];
        let num_classes = prediction.shape()[1];
        let log_probs = self.compute_log_softmax(prediction);

        let mut total = 0.0f32;
        for b in 0..batch_size {
            let class_idx = target.data[b] as usize;
            if class_idx >= num_classes {
                return Err(ClassifierError::ShapeMismatch(format!(
                    "Target class {} outside 0..{}",
                    class_idx, num_classes
                )));
            }
            total -= log_probs[b * num_classes + class_idx];
        }

        Ok(total / batch_size as f32)
    }

    fn name(&self) -> &str {
        "cross_entropy"
    }
}
