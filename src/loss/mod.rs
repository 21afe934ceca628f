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

pub mod cross_entropy;

/// The Loss trait defines the interface for scoring objectives applied
/// during evaluation. Only the forward direction exists here; evaluation
/// never backpropagates.
pub trait Loss: Send + Sync {
    /// Mean loss over the batch.
    fn forward(&self, output: &Tensor, target: &Tensor) -> Result<f32, ClassifierError>;

    /// Optional method to get the name of the loss function
    fn name(&self) -> &str {
        "GenericLoss"
    }
}
