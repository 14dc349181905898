//! Fixtures shared by the unit tests.

use std::io::Cursor;
use std::path::Path;

use decision_tree::{DecisionTree, Node};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use logistic_regression::{LogisticRegression, MultiClass};
use ndarray::{Array1, Array2, ArrayView1, array};
use random_forest::RandomForest;
use svm::{Kernel, Svc};

use crate::bank::ModelBank;
use crate::config::BankConfig;
use crate::error::PredictError;
use crate::features::{FEATURE_LEN, FeatureVector, extract};
use crate::label::ClassLabel;
use crate::model::{Classifier, Model, ModelKind};

/// A model that always answers the same label.
pub struct Fixed(pub i64);

impl Model for Fixed {
    fn predict(&self, _features: ArrayView1<f64>) -> Result<ClassLabel, PredictError> {
        Ok(ClassLabel(self.0))
    }
}

pub fn all_fixed(label: i64) -> ModelBank {
    ModelBank::from_models(
        ModelKind::ALL.map(|kind| (kind, Box::new(Fixed(label)) as Box<dyn Model>)),
    )
    .unwrap()
}

pub fn solid_image(width: u32, height: u32, gray: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([gray, gray, gray])))
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn gray_features() -> FeatureVector {
    extract(&solid_image(300, 200, 128))
}

/// Real models over 4096 features that predict class 1 for every input.
pub fn constant_models() -> Vec<Classifier> {
    let classes = vec![0, 1, 2];

    // Pairs (0,1), (0,2), (1,2): votes go to 1, 0 and 1.
    let svm = Svc::new(
        classes.clone(),
        Kernel::Linear,
        Array2::zeros((3, FEATURE_LEN)),
        vec![1, 1, 1],
        Array2::zeros((2, 3)),
        array![-1.0, 1.0, 1.0],
    )
    .unwrap();

    let tree = DecisionTree::new(
        classes.clone(),
        FEATURE_LEN,
        vec![
            Node::Split {
                feature: 0,
                threshold: 2.0,
                left: 1,
                right: 2,
            },
            Node::Leaf {
                value: vec![1.0, 5.0, 0.0],
            },
            Node::Leaf {
                value: vec![0.0, 0.0, 1.0],
            },
        ],
    )
    .unwrap();

    let logistic = LogisticRegression::new(
        classes.clone(),
        Array2::zeros((3, FEATURE_LEN)),
        array![0.0, 1.0, 0.0],
        MultiClass::Multinomial,
    )
    .unwrap();

    let leaf = |value: Vec<f64>| {
        DecisionTree::new(vec![0, 1, 2], FEATURE_LEN, vec![Node::Leaf { value }]).unwrap()
    };
    let forest = RandomForest::new(
        classes,
        FEATURE_LEN,
        vec![leaf(vec![0.0, 3.0, 1.0]), leaf(vec![1.0, 1.0, 0.0])],
    )
    .unwrap();

    vec![
        Classifier::Svm(svm),
        Classifier::DecisionTree(tree),
        Classifier::LogisticRegression(logistic),
        Classifier::RandomForest(forest),
    ]
}

/// Writes [`constant_models`] into `dir` under the default names and returns
/// the matching config.
pub fn write_artifacts(dir: &Path) -> BankConfig {
    let config = BankConfig::in_dir(dir);
    for model in constant_models() {
        model.save(&config.artifact_path(model.kind())).unwrap();
    }
    config
}

#[test]
fn constant_models_predict_one() {
    let features = FeatureVector::try_from(Array1::from_elem(FEATURE_LEN, 0.5)).unwrap();
    for model in constant_models() {
        assert_eq!(model.predict(features.view()).unwrap(), ClassLabel(1), "{:?}", model.kind());
    }
}
