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
use image::imageops::FilterType;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The held-out slice of an image folder organized as
/// `root/<class_name>/<image_file>*`.
///
/// Class indices and sample order are deterministic: class directories and
/// the files inside them are sorted by name before indices are assigned, so
/// two scans of an unchanged directory yield the same mapping and the same
/// sample sequence. Shuffling is disabled by construction.
pub struct ValidationFolder {
    root: PathBuf,
    samples: Vec<(PathBuf, usize)>,
    class_to_idx: HashMap<String, usize>,
    class_labels: Vec<String>,
    image_size: (usize, usize, usize),
}

impl ValidationFolder {
    /// Scans `root` and keeps, per class, the first
    /// `floor(n * validation_split)` files of the sorted file list as the
    /// validation subset.
    ///
    /// A class directory left without eligible images by the split still
    /// occupies an index, so its class appears in reports with zero support.
    pub fn new(
        root: PathBuf,
        image_size: (usize, usize, usize),
        validation_split: f32,
    ) -> Result<Self, ClassifierError> {
        let (_, _, channels) = image_size;
        if channels != 3 {
            return Err(ClassifierError::InvalidConfiguration(format!(
                "Only 3-channel (RGB) images are supported, got {} channels",
                channels
            )));
        }

        if !root.exists() || !root.is_dir() {
            return Err(ClassifierError::DataNotFound(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let class_labels = Self::scan_class_names(&root)?;
        if class_labels.is_empty() {
            return Err(ClassifierError::DataNotFound(format!(
                "{} contains no class subdirectories",
                root.display()
            )));
        }

        let mut class_to_idx = HashMap::new();
        let mut samples = Vec::new();

        for (idx, class_name) in class_labels.iter().enumerate() {
            class_to_idx.insert(class_name.clone(), idx);

            let files = Self::scan_images(&root.join(class_name))?;
            let split_index = validation_count(files.len(), validation_split);
            for path in files.into_iter().take(split_index) {
                samples.push((path, idx));
            }
        }

        Ok(ValidationFolder {
            root,
            samples,
            class_to_idx,
            class_labels,
            image_size,
        })
    }

    /// Collects the immediate subdirectory names of `root`, sorted.
    fn scan_class_names(root: &Path) -> Result<Vec<String>, ClassifierError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                let class_name = path
                    .file_name()
                    .ok_or_else(|| {
                        ClassifierError::DataNotFound("Invalid class directory name".to_string())
                    })?
                    .to_string_lossy()
                    .into_owned();
                names.push(class_name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Lists the eligible image files of one class directory, sorted.
    fn scan_images(class_dir: &Path) -> Result<Vec<PathBuf>, ClassifierError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(class_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && Self::is_valid_image(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Checks eligibility by extension; decode errors surface later at `get`.
    fn is_valid_image(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            return matches!(ext.as_str(), "jpg" | "jpeg" | "png");
        }
        false
    }

    /// Decodes one image, resizes it to the configured (height, width) with
    /// bilinear filtering, and lays it out as CHW floats scaled to [0, 1].
    fn load_image_tensor(&self, path: &Path) -> Result<Tensor, ClassifierError> {
        let (height, width, channels) = self.image_size;

        let decoded = image::open(path).map_err(|e| {
            ClassifierError::ImageError(format!("Failed to decode {}: {}", path.display(), e))
        })?;
        let resized = decoded
            .resize_exact(width as u32, height as u32, FilterType::Triangle)
            .to_rgb8();

        let mut data = Vec::with_capacity(channels * height * width);
        for channel in 0..channels {
            data.extend(
                resized
                    .pixels()
                    .map(|pixel| f32::from(pixel[channel]) / 255.0),
            );
        }

        Ok(Tensor::new(data, vec![channels, height, width]))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get_class_to_idx(&self) -> &HashMap<String, usize> {
        &self.class_to_idx
    }

    pub fn get_sample_path(&self, index: usize) -> Option<&PathBuf> {
        self.samples.get(index).map(|(path, _)| path)
    }
}

impl Dataset for ValidationFolder {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn num_classes(&self) -> usize {
        self.class_labels.len()
    }

    fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    fn targets(&self) -> Vec<usize> {
        self.samples.iter().map(|(_, idx)| *idx).collect()
    }

    fn get(&self, index: usize) -> Result<(Tensor, Tensor), ClassifierError> {
        let (path, class_idx) = self.samples.get(index).ok_or_else(|| {
            ClassifierError::ShapeMismatch(format!(
                "Sample index {} out of bounds for {} samples",
                index,
                self.samples.len()
            ))
        })?;

        let input = self.load_image_tensor(path)?;
        let target = Tensor::new(vec![*class_idx as f32], vec![1]);
        Ok((input, target))
    }
}

/// Number of leading sorted files assigned to the validation subset.
pub fn validation_count(total: usize, validation_split: f32) -> usize {
    (total as f32 * validation_split).floor() as usize
}
