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
use crate::models::Model;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serialized state of one dense layer. Weights are row-major
/// `[out_features, in_features]`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DenseLayerState {
    pub in_features: usize,
    pub out_features: usize,
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
}

/// Serialized classifier state as persisted by the training side:
/// a stack of dense layers with ReLU between hidden layers and raw logits
/// at the output.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ClassifierState {
    pub input_shape: Vec<usize>,
    pub num_classes: usize,
    pub layers: Vec<DenseLayerState>,
}

impl ClassifierState {
    /// Internal consistency checks: chained layer widths, weight and bias
    /// buffer sizes, and the output width against the class count.
    fn validate(&self) -> Result<(), ClassifierError> {
        if self.layers.is_empty() {
            return Err(ClassifierError::ModelLoad(
                "Model artifact has no layers".to_string(),
            ));
        }
        if self.num_classes == 0 {
            return Err(ClassifierError::ModelLoad(
                "Model artifact reports zero classes".to_string(),
            ));
        }

        let input_features: usize = self.input_shape.iter().product();
        if input_features == 0 {
            return Err(ClassifierError::ModelLoad(
                "Model artifact has an empty input shape".to_string(),
            ));
        }

        let mut expected_in = input_features;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.in_features != expected_in {
                return Err(ClassifierError::ModelLoad(format!(
                    "Layer {} expects {} input features but receives {}",
                    i, layer.in_features, expected_in
                )));
            }
            if layer.weights.len() != layer.in_features * layer.out_features {
                return Err(ClassifierError::ModelLoad(format!(
                    "Layer {} weight buffer has {} values, expected {}",
                    i,
                    layer.weights.len(),
                    layer.in_features * layer.out_features
                )));
            }
            if layer.bias.len() != layer.out_features {
                return Err(ClassifierError::ModelLoad(format!(
                    "Layer {} bias buffer has {} values, expected {}",
                    i,
                    layer.bias.len(),
                    layer.out_features
                )));
            }
            expected_in = layer.out_features;
        }

        if expected_in != self.num_classes {
            return Err(ClassifierError::ModelLoad(format!(
                "Output layer produces {} values for {} classes",
                expected_in, self.num_classes
            )));
        }

        Ok(())
    }
}

/// A trained image classifier restored from its persisted artifact.
pub struct ImageClassifier {
    state: ClassifierState,
}

impl ImageClassifier {
    pub fn new(state: ClassifierState) -> Result<Self, ClassifierError> {
        state.validate()?;
        Ok(ImageClassifier { state })
    }

    /// Loads a bincode artifact from disk. A missing file and a corrupt or
    /// inconsistent payload are both `ModelLoad` failures.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let file = File::open(path.as_ref()).map_err(|e| {
            ClassifierError::ModelLoad(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let state: ClassifierState =
            bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
                ClassifierError::ModelLoad(format!(
                    "{} is not a valid classifier artifact: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;
        Self::new(state)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ClassifierError> {
        let file = File::create(path.as_ref())?;
        bincode::serialize_into(BufWriter::new(file), &self.state)
            .map_err(|e| ClassifierError::IOError(format!("Failed to serialize model: {}", e)))?;
        Ok(())
    }

    pub fn input_shape(&self) -> &[usize] {
        &self.state.input_shape
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }
}

impl Model for ImageClassifier {
    fn forward(&self, input: &Tensor) -> Result<Tensor, ClassifierError> {
        if input.shape().is_empty() {
            return Err(ClassifierError::Inference(
                "Input batch has no dimensions".to_string(),
            ));
        }

        let batch_size = input.shape()[0];
        let features: usize = input.shape()[1..].iter().product();
        let expected = self.state.layers[0].in_features;
        if features != expected {
            return Err(ClassifierError::Inference(format!(
                "Batch shape {:?} flattens to {} features but the model expects {}",
                input.shape(),
                features,
                expected
            )));
        }

        let mut current: Vec<f32> = input.data().to_vec();
        let mut width = features;
        let last = self.state.layers.len() - 1;

        for (i, layer) in self.state.layers.iter().enumerate() {
            let mut next = vec![0.0f32; batch_size * layer.out_features];
            for b in 0..batch_size {
                let row = &current[b * width..(b + 1) * width];
                for o in 0..layer.out_features {
                    let weights = &layer.weights[o * layer.in_features..(o + 1) * layer.in_features];
                    let mut acc = layer.bias[o];
                    for (x, w) in row.iter().zip(weights.iter()) {
                        acc += x * w;
                    }
                    // ReLU on hidden layers, raw logits at the output
                    next[b * layer.out_features + o] = if i < last { acc.max(0.0) } else { acc };
                }
            }
            current = next;
            width = layer.out_features;
        }

        Ok(Tensor::new(current, vec![batch_size, width]))
    }

    fn num_classes(&self) -> usize {
        self.state.num_classes
    }
}
