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
use crate::data::dataset::Dataset;
use rayon::prelude::*;
use std::sync::Arc;

/// Sequential, order-preserving batch loader over a dataset.
///
/// There is no shuffling and no sampling: batch `b` always covers indices
/// `b * batch_size .. (b + 1) * batch_size`, and the final short batch is
/// kept. Workers only parallelize decoding within one batch; the ordered
/// `collect` keeps sample order intact.
pub struct DataLoader {
    dataset: Arc<Box<dyn Dataset>>,
    batch_size: usize,
    num_workers: usize,
}

impl DataLoader {
    pub fn new(dataset: Box<dyn Dataset>, batch_size: usize, num_workers: usize) -> Self {
        DataLoader {
            dataset: Arc::new(dataset),
            batch_size,
            num_workers,
        }
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.dataset.num_classes()
    }

    pub fn class_labels(&self) -> &[String] {
        self.dataset.class_labels()
    }

    pub fn targets(&self) -> Vec<usize> {
        self.dataset.targets()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn iter(&self) -> DataLoaderIterator {
        DataLoaderIterator {
            dataloader: self,
            index: 0,
        }
    }
}

pub struct DataLoaderIterator<'a> {
    dataloader: &'a DataLoader,
    index: usize,
}

impl<'a> Iterator for DataLoaderIterator<'a> {
    type Item = Result<(Tensor, Tensor), ClassifierError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.dataloader.dataset.len() {
            return None;
        }

        let end = (self.index + self.dataloader.batch_size).min(self.dataloader.dataset.len());
        let batch_indices: Vec<usize> = (self.index..end).collect();
        self.index = end;

        let batch: Result<Vec<(Tensor, Tensor)>, ClassifierError> =
            if self.dataloader.num_workers > 1 {
                batch_indices
                    .par_iter()
                    .map(|&idx| self.dataloader.dataset.get(idx))
                    .collect()
            } else {
                batch_indices
                    .iter()
                    .map(|&idx| self.dataloader.dataset.get(idx))
                    .collect()
            };

        match batch {
            Ok(samples) => Some(collate_batch(samples)),
            Err(e) => Some(Err(e)),
        }
    }
}

fn get_batch_shape(tensors: &[Tensor]) -> Result<Vec<usize>, ClassifierError> {
    let base_shape = tensors[0].shape();

    // Verify all tensors have the same shape
    for (i, tensor) in tensors.iter().enumerate().skip(1) {
        if tensor.shape() != base_shape {
            return Err(ClassifierError::ShapeMismatch(format!(
                "tensor 0 has shape {:?} but tensor {} has shape {:?}",
                base_shape,
                i,
                tensor.shape()
            )));
        }
    }

    // Create the batch shape: [batch_size, ...base_shape]
    let mut batch_shape = vec![tensors.len()];
    batch_shape.extend(base_shape);
    Ok(batch_shape)
}

/// Stacks per-sample `[C,H,W]` data into `[B,C,H,W]` and the scalar targets
/// into a flat `[B]` tensor.
fn collate_batch(batch: Vec<(Tensor, Tensor)>) -> Result<(Tensor, Tensor), ClassifierError> {
    if batch.is_empty() {
        return Err(ClassifierError::ShapeMismatch(
            "Empty batch provided".to_string(),
        ));
    }

    let (data_tensors, target_tensors): (Vec<Tensor>, Vec<Tensor>) = batch.into_iter().unzip();

    let data_shape = get_batch_shape(&data_tensors)?;
    let mut batched_data = Tensor::zeros(&data_shape);

    for (i, data) in data_tensors.iter().enumerate() {
        copy_tensor_slice(&mut batched_data, i, data)?;
    }

    let mut target_values = Vec::with_capacity(target_tensors.len());
    for (i, target) in target_tensors.iter().enumerate() {
        if target.len() != 1 {
            return Err(ClassifierError::ShapeMismatch(format!(
                "target {} has {} values, expected a scalar class index",
                i,
                target.len()
            )));
        }
        target_values.push(target.data()[0]);
    }
    let count = target_values.len();
    let batched_targets = Tensor::new(target_values, vec![count]);

    Ok((batched_data, batched_targets))
}

fn copy_tensor_slice(
    dest: &mut Tensor,
    batch_idx: usize,
    source: &Tensor,
) -> Result<(), ClassifierError> {
    let batch_stride = dest.stride()[0];
    let start_idx = batch_idx * batch_stride;
    let end_idx = start_idx + batch_stride;

    if end_idx > dest.len() || source.len() != batch_stride {
        return Err(ClassifierError::ShapeMismatch(format!(
            "sample {} does not fit its batch slot",
            batch_idx
        )));
    }

    let dest_slice = &mut dest.data_mut()[start_idx..end_idx];
    dest_slice.copy_from_slice(source.data());
    Ok(())
}
