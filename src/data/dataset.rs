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

/// Trait defining the interface for datasets.
///
/// Sample order is part of the contract: `get(i)` must return the same
/// sample for the same index across calls, because the evaluation pipeline
/// joins true labels with predictions index-for-index.
pub trait Dataset: Send + Sync {
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> Result<(Tensor, Tensor), ClassifierError>;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn num_classes(&self) -> usize;

    /// Class names ordered by their assigned index.
    fn class_labels(&self) -> &[String];

    /// True class index of every sample, in sample order.
    fn targets(&self) -> Vec<usize>;
}
