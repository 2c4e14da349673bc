//! Comprehensive tests for domain_model

use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

use core_kernel::{ColumnData, Scalar};
use domain_model::{
    train, Classifier, Hyperparameters, ModelError, ModelHandle, ModelLoader, SoftmaxRegression,
    TrainingSettings,
};
use test_utils::{training_frame, valid_feature_frame, ArtifactFixtures, ArtifactWorkspace, FrameBuilder};

fn standard_loader(workspace: &ArtifactWorkspace) -> ModelLoader {
    ModelLoader::new(workspace.root(), ArtifactFixtures::MODEL_PATH)
}

fn training_settings() -> TrainingSettings {
    TrainingSettings {
        features: ArtifactFixtures::MODEL_FEATURES.iter().map(|f| f.to_string()).collect(),
        target_column: ArtifactFixtures::TARGET_COLUMN.to_string(),
        test_size: 0.2,
        random_state: 42,
        apply_pipeline: false,
    }
}

// ============================================================================
// Model Loader Tests
// ============================================================================

mod loader_tests {
    use super::*;

    #[test]
    fn test_load_shipped_model() {
        let workspace = ArtifactWorkspace::standard();

        let model = standard_loader(&workspace).load_softmax().unwrap();

        assert_eq!(model.feature_names, ArtifactFixtures::MODEL_FEATURES);
        assert_eq!(model.classes, vec![0, 1]);
        assert!(model.metadata.is_none());
    }

    #[test]
    fn test_missing_model_is_not_found() {
        let workspace = ArtifactWorkspace::empty();

        let err = standard_loader(&workspace).load().unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("model.json"));
    }

    #[test]
    fn test_corrupt_model_is_deserialization_error() {
        let workspace = ArtifactWorkspace::empty();
        workspace.write(ArtifactFixtures::MODEL_PATH, "{ not json");

        let err = standard_loader(&workspace).load().unwrap_err();

        assert!(matches!(err, ModelError::Deserialization { .. }));
    }

    #[test]
    fn test_other_format_version_is_deserialization_error() {
        let workspace = ArtifactWorkspace::empty();
        let bumped = ArtifactFixtures::MODEL.replace("\"format_version\": 1", "\"format_version\": 7");
        workspace.write(ArtifactFixtures::MODEL_PATH, &bumped);

        let err = standard_loader(&workspace).load().unwrap_err();

        assert!(matches!(err, ModelError::Deserialization { ref message, .. } if message.contains('7')));
    }

    #[test]
    fn test_inconsistent_dimensions_are_rejected() {
        let workspace = ArtifactWorkspace::empty();
        let mut model: SoftmaxRegression = serde_json::from_str(ArtifactFixtures::MODEL).unwrap();
        model.coefficients[1].pop();
        workspace.write(ArtifactFixtures::MODEL_PATH, &serde_json::to_string(&model).unwrap());

        let err = standard_loader(&workspace).load().unwrap_err();

        assert!(matches!(err, ModelError::Deserialization { ref message, .. } if message.contains("coefficient row 1")));
    }
}

// ============================================================================
// Classifier Tests
// ============================================================================

mod classifier_tests {
    use super::*;

    #[test]
    fn test_predict_selects_features_by_name() {
        let model: SoftmaxRegression = serde_json::from_str(ArtifactFixtures::MODEL).unwrap();
        let mut frame = valid_feature_frame();
        frame
            .insert("claim_id", ColumnData::Int(vec![Some(99)]))
            .unwrap();

        let labels = model.predict(&frame).unwrap();

        assert_eq!(labels.len(), 1);
        assert!(model.classes.contains(&labels[0]));
        assert_eq!(labels, model.predict(&valid_feature_frame()).unwrap());
    }

    #[test]
    fn test_predict_requires_every_feature() {
        let model: SoftmaxRegression = serde_json::from_str(ArtifactFixtures::MODEL).unwrap();
        let mut frame = valid_feature_frame();
        frame.remove("valor_vehiculo");

        assert!(matches!(model.predict(&frame), Err(ModelError::Features(_))));
    }

    #[test]
    fn test_predict_rejects_missing_cells() {
        let model: SoftmaxRegression = serde_json::from_str(ArtifactFixtures::MODEL).unwrap();
        let mut frame = valid_feature_frame();
        frame.insert("valor_vehiculo", ColumnData::Int(vec![None])).unwrap();

        assert!(model.predict(&frame).is_err());
    }

    #[test]
    fn test_shipped_model_reports_hyperparameters() {
        let model: SoftmaxRegression = serde_json::from_str(ArtifactFixtures::MODEL).unwrap();
        assert_eq!(model.hyperparameters(), Some(Hyperparameters::default()));
        assert!(model.metadata().is_none());
    }

    #[test]
    fn test_retrained_model_exposes_its_run() {
        let report = train(&training_frame(), &training_settings(), None).unwrap();
        let model: Arc<dyn Classifier> = Arc::new(report.model.clone());

        let metadata = model.metadata().unwrap();

        assert_eq!(metadata.test_size, 0.2);
        assert_eq!(metadata.random_state, 42);
        assert_eq!(metadata.test_rows, report.test_rows);
    }
}

// ============================================================================
// Model Handle Tests
// ============================================================================

mod handle_tests {
    use super::*;

    #[test]
    fn test_loads_lazily_once() {
        let workspace = ArtifactWorkspace::standard();
        let handle = ModelHandle::new(standard_loader(&workspace));
        assert!(handle.current().is_none());

        let first = handle.get_or_load().unwrap();
        workspace.remove(ArtifactFixtures::MODEL_PATH);
        let second = handle.get_or_load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_load_is_retried() {
        let workspace = ArtifactWorkspace::empty();
        let handle = ModelHandle::new(standard_loader(&workspace));

        assert!(handle.get_or_load().unwrap_err().is_not_found());

        workspace.write(ArtifactFixtures::MODEL_PATH, ArtifactFixtures::MODEL);
        assert!(handle.get_or_load().is_ok());
    }

    #[test]
    fn test_swap_is_visible_to_new_readers_only() {
        let workspace = ArtifactWorkspace::standard();
        let handle = ModelHandle::new(standard_loader(&workspace));
        let held = handle.get_or_load().unwrap();

        let replacement: Arc<dyn Classifier> = Arc::new(train(&training_frame(), &training_settings(), None).unwrap().model);
        let previous = handle.swap(replacement.clone()).unwrap();

        assert!(Arc::ptr_eq(&previous, &held));
        assert!(Arc::ptr_eq(&handle.get_or_load().unwrap(), &replacement));
        // the reader that took the old model keeps scoring with it
        assert_eq!(held.predict(&valid_feature_frame()).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_first_use_agrees() {
        let workspace = ArtifactWorkspace::standard();
        let handle = Arc::new(ModelHandle::new(standard_loader(&workspace)));

        let models: Vec<Arc<dyn Classifier>> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                thread::spawn(move || handle.get_or_load().unwrap())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|t| t.join().unwrap())
            .collect();

        let served = handle.current().unwrap();
        assert!(models.iter().all(|m| Arc::ptr_eq(m, &served)));
    }
}

// ============================================================================
// Training Tests
// ============================================================================

mod training_tests {
    use super::*;

    #[test]
    fn test_training_on_separable_set() {
        let report = train(&training_frame(), &training_settings(), None).unwrap();

        assert!(report.accuracy >= 0.9, "accuracy {}", report.accuracy);
        assert_eq!(report.test_rows, 40);
        assert_eq!(report.train_rows, 160);
        assert!(report.message().starts_with("Model retrained with accuracy: "));

        let metadata = report.model.metadata.as_ref().unwrap();
        assert_eq!(metadata.training_rows, 160);
        assert_eq!(metadata.accuracy, report.accuracy);
        assert_eq!(metadata.test_size, 0.2);
        assert_eq!(metadata.random_state, 42);
        assert!(report.model.check_dimensions().is_ok());
    }

    #[test]
    fn test_training_is_reproducible() {
        let a = train(&training_frame(), &training_settings(), None).unwrap();
        let b = train(&training_frame(), &training_settings(), None).unwrap();

        assert_eq!(a.accuracy, b.accuracy);
        assert_eq!(a.model.coefficients, b.model.coefficients);
    }

    #[test]
    fn test_base_hyperparameters_are_reused() {
        let base = Hyperparameters {
            alpha: 0.5,
            max_iterations: 50,
            gradient_tolerance: 1e-3,
        };

        let report = train(&training_frame(), &training_settings(), Some(base)).unwrap();

        assert_eq!(report.model.hyperparameters, base);
    }

    #[test]
    fn test_retrained_model_round_trips_through_loader() {
        let workspace = ArtifactWorkspace::empty();
        let report = train(&training_frame(), &training_settings(), None).unwrap();
        workspace.write(
            ArtifactFixtures::RETRAINED_MODEL_PATH,
            &serde_json::to_string_pretty(&report.model).unwrap(),
        );

        let loaded = ModelLoader::new(workspace.root(), ArtifactFixtures::RETRAINED_MODEL_PATH)
            .load_softmax()
            .unwrap();

        assert_eq!(loaded, report.model);
    }

    #[test]
    fn test_missing_target_column() {
        let mut settings = training_settings();
        settings.target_column = "fraude".to_string();

        assert!(matches!(
            train(&training_frame(), &settings, None),
            Err(ModelError::Features(_))
        ));
    }

    #[test]
    fn test_non_integer_target() {
        let frame = FrameBuilder::new()
            .float("x", &[Some(1.0), Some(2.0), Some(3.0)])
            .float("y", &[Some(0.0), Some(0.5), Some(1.0)])
            .build();
        let settings = TrainingSettings {
            features: vec!["x".into()],
            target_column: "y".into(),
            test_size: 0.3,
            random_state: 0,
            apply_pipeline: false,
        };

        let err = train(&frame, &settings, None).unwrap_err();

        assert!(matches!(err, ModelError::InvalidTarget { row: 1, .. }));
    }

    #[test]
    fn test_single_class_is_rejected() {
        let frame = FrameBuilder::new()
            .float("x", &[Some(1.0), Some(2.0), Some(3.0)])
            .int("y", &[Some(1), Some(1), Some(1)])
            .build();
        let settings = TrainingSettings {
            features: vec!["x".into()],
            target_column: "y".into(),
            test_size: 0.3,
            random_state: 0,
            apply_pipeline: false,
        };

        assert!(matches!(train(&frame, &settings, None), Err(ModelError::SingleClass(1))));
    }

    #[test]
    fn test_too_few_rows() {
        let frame = FrameBuilder::new()
            .float("x", &[Some(1.0)])
            .int("y", &[Some(1)])
            .build();
        let settings = TrainingSettings {
            features: vec!["x".into()],
            target_column: "y".into(),
            test_size: 0.3,
            random_state: 0,
            apply_pipeline: false,
        };

        assert!(matches!(
            train(&frame, &settings, None),
            Err(ModelError::InsufficientData { rows: 1 })
        ));
    }

    #[test]
    fn test_invalid_test_size() {
        let mut settings = training_settings();
        settings.test_size = 1.0;

        assert!(matches!(
            train(&training_frame(), &settings, None),
            Err(ModelError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_text_feature_is_rejected() {
        let frame = FrameBuilder::new()
            .text("marca", &[Some("ford"), Some("kia")])
            .int("y", &[Some(0), Some(1)])
            .build();
        let settings = TrainingSettings {
            features: vec!["marca".into()],
            target_column: "y".into(),
            test_size: 0.5,
            random_state: 0,
            apply_pipeline: false,
        };

        assert!(matches!(train(&frame, &settings, None), Err(ModelError::Features(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_split_sizes(seed in any::<u64>(), test_size in 0.05f64..0.8) {
            let settings = TrainingSettings {
                random_state: seed,
                test_size,
                ..training_settings()
            };
            let base = Hyperparameters { max_iterations: 5, ..Hyperparameters::default() };

            let report = train(&training_frame(), &settings, Some(base)).unwrap();

            prop_assert_eq!(report.train_rows + report.test_rows, 200);
            prop_assert!(report.test_rows >= 1 && report.train_rows >= 1);
            prop_assert!((0.0..=1.0).contains(&report.accuracy));
        }
    }

    #[test]
    fn test_scalar_targets_from_floats() {
        let frame = FrameBuilder::new()
            .float("x", &[Some(-2.0), Some(-1.0), Some(1.0), Some(2.0)])
            .float("y", &[Some(0.0), Some(0.0), Some(1.0), Some(1.0)])
            .build();
        let settings = TrainingSettings {
            features: vec!["x".into()],
            target_column: "y".into(),
            test_size: 0.25,
            random_state: 3,
            apply_pipeline: false,
        };

        let report = train(&frame, &settings, None).unwrap();

        assert_eq!(report.model.classes, vec![0, 1]);
        assert_eq!(frame.value("y", 0), Some(Scalar::Float(0.0)));
    }
}
