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

pub mod classifier;

/// Inference-side model interface. A model consumes a `[B,C,H,W]` batch and
/// produces one `[B,K]` row of class logits per sample, in batch order.
pub trait Model: Send + Sync {
    fn forward(&self, input: &Tensor) -> Result<Tensor, ClassifierError>;

    fn num_classes(&self) -> usize;
}
