// Copyright (C) 2025 Bellande Artificial Intelligence Computer Vision Research Innovation Center, Ronaldson Bellande

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
use std::fs;
use std::path::{Path, PathBuf};

use bellande_image_classifier_evaluation::{
    core::error::ClassifierError,
    data::{dataset::Dataset, image_folder::ValidationFolder},
    models::classifier::{ClassifierState, DenseLayerState, ImageClassifier},
    utilities::config::EvaluationConfig,
    EvaluationPipeline,
};

const SIDE: usize = 4;
const CHANNELS: usize = 3;

fn test_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("classifier_eval_{}_{}", name, std::process::id()))
}

fn write_image(path: &Path, rgb: [u8; 3]) -> Result<(), Box<dyn Error>> {
    let img = image::RgbImage::from_pixel(SIDE as u32, SIDE as u32, image::Rgb(rgb));
    img.save(path)?;
    Ok(())
}

/// Two-class fixture tree. Each class directory holds four images named
/// img_0..img_3; with a 0.5 split the validation subset is img_0 and img_1
/// of each class. cats/img_0 is deliberately blue so the color model below
/// misclassifies exactly one sample.
fn write_fixture_tree(root: &Path) -> Result<(), Box<dyn Error>> {
    let red = [255u8, 0, 0];
    let blue = [0u8, 0, 255];

    let cats = root.join("cats");
    let dogs = root.join("dogs");
    fs::create_dir_all(&cats)?;
    fs::create_dir_all(&dogs)?;

    write_image(&cats.join("img_0.png"), blue)?;
    write_image(&cats.join("img_1.png"), red)?;
    write_image(&cats.join("img_2.png"), red)?;
    write_image(&cats.join("img_3.png"), red)?;

    for i in 0..4 {
        write_image(&dogs.join(format!("img_{}.png", i)), blue)?;
    }

    Ok(())
}

/// A single dense layer that sums the red channel into the "cats" logit and
/// the blue channel into the "dogs" logit.
fn color_model() -> Result<ImageClassifier, ClassifierError> {
    let features = CHANNELS * SIDE * SIDE;
    let plane = SIDE * SIDE;

    let mut weights = vec![0.0f32; 2 * features];
    for i in 0..plane {
        weights[i] = 1.0; // red plane -> class 0
        weights[features + 2 * plane + i] = 1.0; // blue plane -> class 1
    }

    ImageClassifier::new(ClassifierState {
        input_shape: vec![CHANNELS, SIDE, SIDE],
        num_classes: 2,
        layers: vec![DenseLayerState {
            in_features: features,
            out_features: 2,
            weights,
            bias: vec![0.0, 0.0],
        }],
    })
}

fn fixture_config(root: &Path, model_path: &Path, report_path: &Path) -> EvaluationConfig {
    EvaluationConfig {
        training_data_path: root.to_string_lossy().into_owned(),
        model_artifact_path: model_path.to_string_lossy().into_owned(),
        image_size: [SIDE, SIDE, CHANNELS],
        batch_size: 3,
        validation_split: 0.5,
        report_output_path: report_path.to_string_lossy().into_owned(),
        num_workers: 1,
    }
}

#[test]
fn test_full_pipeline_produces_expected_report() -> Result<(), Box<dyn Error>> {
    let dir = test_dir("pipeline");
    let root = dir.join("data");
    write_fixture_tree(&root)?;

    let model_path = dir.join("model.bin");
    color_model()?.save(&model_path)?;

    let report_path = dir.join("scores.json");
    let pipeline = EvaluationPipeline::new(fixture_config(&root, &model_path, &report_path))?;
    let report = pipeline.run()?;

    // Validation subset: cats img_0 (blue, wrong), img_1 (red), dogs img_0
    // and img_1 (blue). One of four misclassified.
    assert_eq!(report.class_labels, vec!["cats", "dogs"]);
    assert!((report.accuracy - 0.75).abs() < 1e-6);
    assert!(report.loss >= 0.0 && report.loss.is_finite());
    assert_eq!(report.confusion_matrix.rows(), &[vec![1, 1], vec![0, 2]]);

    let cats = &report.per_class_metrics["cats"];
    assert_eq!(cats.precision, 1.0);
    assert_eq!(cats.recall, 0.5);
    assert_eq!(cats.support, 2);

    let dogs = &report.per_class_metrics["dogs"];
    assert!((dogs.precision - 2.0 / 3.0).abs() < 1e-6);
    assert_eq!(dogs.recall, 1.0);
    assert_eq!(dogs.support, 2);

    // Persisted artifact matches the returned record
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report_path)?)?;
    assert_eq!(value["class_labels"][0], "cats");
    assert_eq!(value["confusion_matrix"][1][1], 2);
    assert_eq!(value["per_class_metrics"]["dogs"]["support"], 2);
    assert!(value["overall_metrics"]["weighted_f1_score"].is_number());

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_stream_builder_is_deterministic() -> Result<(), Box<dyn Error>> {
    let dir = test_dir("determinism");
    let root = dir.join("data");
    write_fixture_tree(&root)?;

    let size = (SIDE, SIDE, CHANNELS);
    let first = ValidationFolder::new(root.clone(), size, 0.5)?;
    let second = ValidationFolder::new(root.clone(), size, 0.5)?;

    assert_eq!(first.targets(), second.targets());
    assert_eq!(first.class_labels(), second.class_labels());
    assert_eq!(first.get_class_to_idx(), second.get_class_to_idx());
    for i in 0..first.len() {
        assert_eq!(first.get_sample_path(i), second.get_sample_path(i));
    }

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_class_without_validation_samples_keeps_its_index() -> Result<(), Box<dyn Error>> {
    let dir = test_dir("zero_support");
    let root = dir.join("data");
    write_fixture_tree(&root)?;

    // One image only: floor(1 * 0.5) = 0 validation samples
    let birds = root.join("birds");
    fs::create_dir_all(&birds)?;
    write_image(&birds.join("img_0.png"), [0, 255, 0])?;

    let folder = ValidationFolder::new(root.clone(), (SIDE, SIDE, CHANNELS), 0.5)?;
    assert_eq!(folder.class_labels(), &["birds", "cats", "dogs"]);
    assert!(!folder.targets().contains(&0));

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_root_without_class_directories_is_data_not_found() -> Result<(), Box<dyn Error>> {
    let dir = test_dir("empty_root");
    fs::create_dir_all(&dir)?;

    let result = ValidationFolder::new(dir.clone(), (SIDE, SIDE, CHANNELS), 0.5);
    assert!(matches!(result, Err(ClassifierError::DataNotFound(_))));

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_missing_model_fails_without_writing_report() -> Result<(), Box<dyn Error>> {
    let dir = test_dir("missing_model");
    let root = dir.join("data");
    write_fixture_tree(&root)?;

    let report_path = dir.join("scores.json");
    let config = fixture_config(&root, &dir.join("no_model.bin"), &report_path);
    let pipeline = EvaluationPipeline::new(config)?;

    let result = pipeline.run();
    assert!(matches!(result, Err(ClassifierError::ModelLoad(_))));
    assert!(!report_path.exists());

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_corrupt_model_artifact_is_model_load_error() -> Result<(), Box<dyn Error>> {
    let dir = test_dir("corrupt_model");
    fs::create_dir_all(&dir)?;
    let model_path = dir.join("model.bin");
    fs::write(&model_path, b"not a classifier artifact")?;

    let result = ImageClassifier::load(&model_path);
    assert!(matches!(result, Err(ClassifierError::ModelLoad(_))));

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_model_image_size_disagreement_is_inference_error() -> Result<(), Box<dyn Error>> {
    let dir = test_dir("shape_disagreement");
    let root = dir.join("data");
    write_fixture_tree(&root)?;

    let model_path = dir.join("model.bin");
    color_model()?.save(&model_path)?;

    // Model expects 4x4 inputs; configure 8x8 images
    let mut config = fixture_config(&root, &model_path, &dir.join("scores.json"));
    config.image_size = [8, 8, CHANNELS];
    let pipeline = EvaluationPipeline::new(config)?;

    let result = pipeline.run();
    assert!(matches!(result, Err(ClassifierError::Inference(_))));

    fs::remove_dir_all(&dir)?;
    Ok(())
}
