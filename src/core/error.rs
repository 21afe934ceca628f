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

use std::error::Error;
use std::fmt;

/// Errors raised across the evaluation pipeline. Every stage fails fast and
/// propagates the first error to the caller; no stage retries internally.
#[derive(Debug)]
pub enum ClassifierError {
    DataNotFound(String),
    ModelLoad(String),
    Inference(String),
    ShapeMismatch(String),
    Persistence(String),
    InvalidConfiguration(String),
    ImageError(String),
    IOError(String),
}

impl Error for ClassifierError {}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClassifierError::DataNotFound(msg) => write!(f, "Validation data not found: {}", msg),
            ClassifierError::ModelLoad(msg) => write!(f, "Failed to load model artifact: {}", msg),
            ClassifierError::Inference(msg) => write!(f, "Inference error: {}", msg),
            ClassifierError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
            ClassifierError::Persistence(msg) => write!(f, "Failed to persist report: {}", msg),
            ClassifierError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            ClassifierError::ImageError(msg) => write!(f, "Image error: {}", msg),
            ClassifierError::IOError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl From<std::io::Error> for ClassifierError {
    fn from(error: std::io::Error) -> Self {
        ClassifierError::IOError(error.to_string())
    }
}
