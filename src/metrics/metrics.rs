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
use serde::Serialize;

/// Streaming metric updated batch by batch during the scoring pass.
pub trait Metric {
    fn reset(&mut self);
    fn update(&mut self, prediction: &Tensor, target: &Tensor);
    fn compute(&self) -> f32;
    fn name(&self) -> &str;
}

pub struct Accuracy {
    correct: usize,
    total: usize,
}

impl Accuracy {
    pub fn new() -> Self {
        Accuracy {
            correct: 0,
            total: 0,
        }
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for Accuracy {
    fn reset(&mut self) {
        self.correct = 0;
        self.total = 0;
    }

    fn update(&mut self, prediction: &Tensor, target: &Tensor) {
        let pred_classes = argmax_rows(prediction);

        for (pred, &true_class) in pred_classes.iter().zip(target.data.iter()) {
            if *pred == true_class as usize {
                self.correct += 1;
            }
            self.total += 1;
        }
    }

    fn compute(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f32 / self.total as f32
    }

    fn name(&self) -> &str {
        "accuracy"
    }
}

/// Arg-max class per row of a `[B,K]` logit tensor. The first maximum wins
/// on ties.
pub fn argmax_rows(prediction: &Tensor) -> Vec<usize> {
    let width = *prediction.shape.last().unwrap_or(&1);
    prediction
        .data
        .chunks(width)
        .map(|chunk| {
            let mut best = 0;
            for (i, &value) in chunk.iter().enumerate() {
                if value > chunk[best] {
                    best = i;
                }
            }
            best
        })
        .collect()
}

/// K x K count table of true class (row) against predicted class (column).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfusionMatrix {
    rows: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Builds the table in one O(N) pass. The two label sequences must have
    /// equal length and every label must fall in `0..num_classes`; anything
    /// else indicates an alignment bug upstream and is rejected.
    pub fn from_labels(
        true_labels: &[usize],
        predicted_labels: &[usize],
        num_classes: usize,
    ) -> Result<Self, ClassifierError> {
        if true_labels.len() != predicted_labels.len() {
            return Err(ClassifierError::ShapeMismatch(format!(
                "{} true labels but {} predicted labels",
                true_labels.len(),
                predicted_labels.len()
            )));
        }
        if num_classes == 0 {
            return Err(ClassifierError::ShapeMismatch(
                "Number of classes must be positive".to_string(),
            ));
        }

        let mut rows = vec![vec![0usize; num_classes]; num_classes];
        for (i, (&t, &p)) in true_labels.iter().zip(predicted_labels.iter()).enumerate() {
            if t >= num_classes || p >= num_classes {
                return Err(ClassifierError::ShapeMismatch(format!(
                    "Sample {} has label pair ({}, {}) outside 0..{}",
                    i, t, p, num_classes
                )));
            }
            rows[t][p] += 1;
        }

        Ok(ConfusionMatrix { rows })
    }

    pub fn num_classes(&self) -> usize {
        self.rows.len()
    }

    /// Count of true instances of class `c` (row sum).
    pub fn support(&self, class: usize) -> usize {
        self.rows[class].iter().sum()
    }

    /// Count of predictions naming class `c` (column sum).
    pub fn predicted_count(&self, class: usize) -> usize {
        self.rows.iter().map(|row| row[class]).sum()
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.rows[class][class]
    }

    pub fn total(&self) -> usize {
        self.rows.iter().map(|row| row.iter().sum::<usize>()).sum()
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }
}

/// Precision, recall and F1 for one class, with its true-instance count.
/// Every field is finite: any metric whose denominator is zero is reported
/// as 0, never NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f32,
    pub recall: f32,
    pub f1_score: f32,
    pub support: usize,
}

/// Macro (unweighted) and support-weighted aggregates across all classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMetrics {
    pub macro_precision: f32,
    pub macro_recall: f32,
    pub macro_f1_score: f32,
    pub weighted_precision: f32,
    pub weighted_recall: f32,
    pub weighted_f1_score: f32,
}

/// Full output of the metrics engine for one evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub confusion_matrix: ConfusionMatrix,
    pub per_class: Vec<ClassMetrics>,
    pub overall: OverallMetrics,
}

fn safe_div(numerator: f32, denominator: f32) -> f32 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Derives per-class and aggregate statistics from aligned true/predicted
/// label sequences.
///
/// Zero-support classes still contribute to the macro means (pulling them
/// toward 0, which is the standard multi-class reporting convention) but
/// carry zero weight in the weighted means.
pub fn classification_report(
    true_labels: &[usize],
    predicted_labels: &[usize],
    num_classes: usize,
) -> Result<ClassificationReport, ClassifierError> {
    let matrix = ConfusionMatrix::from_labels(true_labels, predicted_labels, num_classes)?;

    let mut per_class = Vec::with_capacity(num_classes);
    for c in 0..num_classes {
        let tp = matrix.true_positives(c) as f32;
        let predicted = matrix.predicted_count(c) as f32;
        let support = matrix.support(c);

        let precision = safe_div(tp, predicted);
        let recall = safe_div(tp, support as f32);
        let f1_score = safe_div(2.0 * precision * recall, precision + recall);

        per_class.push(ClassMetrics {
            precision,
            recall,
            f1_score,
            support,
        });
    }

    let k = num_classes as f32;
    let total_support: usize = per_class.iter().map(|m| m.support).sum();
    let weighted = |f: fn(&ClassMetrics) -> f32| -> f32 {
        safe_div(
            per_class
                .iter()
                .map(|m| f(m) * m.support as f32)
                .sum::<f32>(),
            total_support as f32,
        )
    };

    let overall = OverallMetrics {
        macro_precision: per_class.iter().map(|m| m.precision).sum::<f32>() / k,
        macro_recall: per_class.iter().map(|m| m.recall).sum::<f32>() / k,
        macro_f1_score: per_class.iter().map(|m| m.f1_score).sum::<f32>() / k,
        weighted_precision: weighted(|m| m.precision),
        weighted_recall: weighted(|m| m.recall),
        weighted_f1_score: weighted(|m| m.f1_score),
    };

    Ok(ClassificationReport {
        confusion_matrix: matrix,
        per_class,
        overall,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked three-class example: cat/dog/fish
    const TRUE: [usize; 5] = [0, 0, 1, 1, 2];
    const PRED: [usize; 5] = [0, 1, 1, 2, 2];

    #[test]
    fn test_confusion_matrix_counts() {
        let matrix = ConfusionMatrix::from_labels(&TRUE, &PRED, 3).unwrap();
        assert_eq!(
            matrix.rows(),
            &[vec![1, 1, 0], vec![0, 1, 1], vec![0, 0, 1]]
        );
        assert_eq!(matrix.total(), 5);
        for c in 0..3 {
            let expected = TRUE.iter().filter(|&&t| t == c).count();
            assert_eq!(matrix.support(c), expected);
        }
    }

    #[test]
    fn test_per_class_metrics() {
        let report = classification_report(&TRUE, &PRED, 3).unwrap();

        let cat = &report.per_class[0];
        assert_eq!(cat.precision, 1.0);
        assert_eq!(cat.recall, 0.5);
        assert!((cat.f1_score - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(cat.support, 2);

        let dog = &report.per_class[1];
        assert_eq!(dog.precision, 0.5);
        assert_eq!(dog.recall, 0.5);
        assert_eq!(dog.f1_score, 0.5);
        assert_eq!(dog.support, 2);

        let fish = &report.per_class[2];
        assert_eq!(fish.precision, 0.5);
        assert_eq!(fish.recall, 1.0);
        assert!((fish.f1_score - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(fish.support, 1);
    }

    #[test]
    fn test_aggregates() {
        let report = classification_report(&TRUE, &PRED, 3).unwrap();
        assert!((report.overall.macro_precision - 2.0 / 3.0).abs() < 1e-6);
        assert!((report.overall.weighted_precision - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_never_predicted_class_reports_zero_not_nan() {
        // Class 2 never predicted, class 1 has no true instances
        let report = classification_report(&[0, 0, 2], &[0, 1, 1], 3).unwrap();

        let never_predicted = &report.per_class[2];
        assert_eq!(never_predicted.precision, 0.0);
        assert_eq!(never_predicted.recall, 0.0);
        assert_eq!(never_predicted.f1_score, 0.0);

        let zero_support = &report.per_class[1];
        assert_eq!(zero_support.support, 0);
        assert_eq!(zero_support.recall, 0.0);

        for m in &report.per_class {
            assert!(m.precision.is_finite() && m.recall.is_finite() && m.f1_score.is_finite());
        }
        assert!(report.overall.macro_f1_score.is_finite());
        assert!(report.overall.weighted_f1_score.is_finite());
    }

    #[test]
    fn test_weighted_aggregate_matches_definition() {
        let report = classification_report(&TRUE, &PRED, 3).unwrap();
        let total: usize = report.per_class.iter().map(|m| m.support).sum();
        let expected: f32 = report
            .per_class
            .iter()
            .map(|m| m.recall * m.support as f32)
            .sum::<f32>()
            / total as f32;
        assert!((report.overall.weighted_recall - expected).abs() < 1e-6);
    }

    #[test]
    fn test_all_zero_supports_give_zero_aggregates() {
        let report = classification_report(&[], &[], 3).unwrap();

        assert_eq!(report.confusion_matrix.total(), 0);
        assert_eq!(report.overall.macro_precision, 0.0);
        assert_eq!(report.overall.macro_recall, 0.0);
        assert_eq!(report.overall.macro_f1_score, 0.0);
        assert_eq!(report.overall.weighted_precision, 0.0);
        assert_eq!(report.overall.weighted_recall, 0.0);
        assert_eq!(report.overall.weighted_f1_score, 0.0);
    }

    #[test]
    fn test_idempotent() {
        let first = classification_report(&TRUE, &PRED, 3).unwrap();
        let second = classification_report(&TRUE, &PRED, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = classification_report(&[0, 1, 2], &[0, 1], 3);
        assert!(matches!(result, Err(ClassifierError::ShapeMismatch(_))));
    }

    #[test]
    fn test_out_of_range_label_rejected() {
        let result = classification_report(&[0, 3], &[0, 1], 3);
        assert!(matches!(result, Err(ClassifierError::ShapeMismatch(_))));
    }

    #[test]
    fn test_argmax_first_maximum_wins_ties() {
        let logits = Tensor::new(vec![0.5, 0.5, 0.1, 0.0, 0.2, 0.9], vec![2, 3]);
        assert_eq!(argmax_rows(&logits), vec![0, 2]);
    }

    #[test]
    fn test_accuracy_metric() {
        let mut accuracy = Accuracy::new();
        assert_eq!(accuracy.compute(), 0.0);

        let logits = Tensor::new(vec![0.9, 0.1, 0.2, 0.8], vec![2, 2]);
        let targets = Tensor::new(vec![0.0, 0.0], vec![2]);
        accuracy.update(&logits, &targets);
        assert_eq!(accuracy.compute(), 0.5);

        accuracy.reset();
        assert_eq!(accuracy.compute(), 0.0);
    }
}
