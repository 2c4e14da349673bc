//! Comprehensive tests for domain_pipeline

use proptest::prelude::*;

use core_kernel::{ArtifactError, ColumnData, DType, Frame, FrameError, Scalar};
use domain_pipeline::{
    impute, run_step, ColumnValidator, ColumnViolation, FullPipeline, ImputationDictionary, Operation,
    PipelineConfig, PipelineError, StepDescriptor, TransformArtifact, TransformError, REQUIRED_COLUMNS,
};
use test_utils::{
    scalar_strategy, sparse_frame_strategy, valid_feature_frame, ArtifactFixtures, ArtifactWorkspace, ClaimBuilder,
    ClaimFixtures, FrameBuilder,
};

fn standard_config() -> PipelineConfig {
    PipelineConfig {
        steps: ArtifactFixtures::STEPS
            .iter()
            .map(|(name, path)| StepDescriptor::new(*name, *path))
            .collect(),
        imputation_path: ArtifactFixtures::IMPUTATION_PATH.to_string(),
    }
}

fn standard_pipeline(workspace: &ArtifactWorkspace) -> FullPipeline {
    FullPipeline::new(workspace.root(), standard_config())
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

mod full_pipeline_tests {
    use super::*;

    #[test]
    fn test_reference_claim_produces_model_features() {
        let workspace = ArtifactWorkspace::standard();
        let frame = ClaimFixtures::ford().to_frame().unwrap();

        let features = standard_pipeline(&workspace).run(frame).unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features.value("marca_vehiculo_encoded", 0), Some(Scalar::Int(1)));
        assert_eq!(features.value("valor_vehiculo", 0), Some(Scalar::Int(18_500)));
        assert_eq!(features.value("valor_por_pieza", 0), Some(Scalar::Int(4_625)));
        assert_eq!(features.value("antiguedad_vehiculo", 0), Some(Scalar::Int(5)));

        let log_total = features.column("log_total_piezas").unwrap().get_f64(0).unwrap();
        assert!((log_total - 5f64.ln()).abs() < 1e-9);

        assert!(!features.contains("valor_base"));
        assert!(!features.contains("depreciacion"));
    }

    #[test]
    fn test_required_columns_carry_expected_types() {
        let workspace = ArtifactWorkspace::standard();
        let frame = ClaimFixtures::ford().to_frame().unwrap();

        let features = standard_pipeline(&workspace).run(frame).unwrap();

        for (column, dtype) in REQUIRED_COLUMNS {
            assert_eq!(features.column(column).unwrap().dtype(), dtype, "column {column}");
        }
    }

    #[test]
    fn test_random_claims_always_validate() {
        let workspace = ArtifactWorkspace::standard();
        let pipeline = standard_pipeline(&workspace);

        for _ in 0..50 {
            let claim = ClaimBuilder::random().build();

            let features = pipeline.run(claim.to_frame().unwrap()).unwrap();

            assert_eq!(features.len(), 1);
            assert!(!features.select(&REQUIRED_COLUMNS.map(|(c, _)| c)[..]).unwrap().has_missing(), "{claim:?}");
        }
    }

    #[test]
    fn test_unknown_brand_is_imputed() {
        let workspace = ArtifactWorkspace::standard();
        let frame = ClaimFixtures::unknown_brand().to_frame().unwrap();

        let features = standard_pipeline(&workspace).run(frame).unwrap();

        assert_eq!(features.value("marca_vehiculo_encoded", 0), Some(Scalar::Int(10)));
        assert_eq!(features.value("valor_vehiculo", 0), Some(Scalar::Int(15_000)));
        assert_eq!(features.value("valor_por_pieza", 0), Some(Scalar::Int(15_000)));
    }

    #[test]
    fn test_claim_without_parts_does_not_divide_by_zero() {
        let workspace = ArtifactWorkspace::standard();
        let frame = ClaimBuilder::new().partes(0, 0).build().to_frame().unwrap();

        let features = standard_pipeline(&workspace).run(frame).unwrap();

        assert_eq!(features.value("log_total_piezas", 0), Some(Scalar::Float(0.0)));
        assert_eq!(features.value("valor_por_pieza", 0), Some(Scalar::Int(15_000)));
    }

    #[test]
    fn test_old_vehicle_value_is_clipped() {
        let workspace = ArtifactWorkspace::standard();
        let frame = ClaimBuilder::new().antiguedad_vehiculo(40).build().to_frame().unwrap();

        let features = standard_pipeline(&workspace).run(frame).unwrap();

        assert_eq!(features.value("valor_vehiculo", 0), Some(Scalar::Int(3_000)));
    }

    #[test]
    fn test_no_steps_still_validates() {
        let workspace = ArtifactWorkspace::standard();
        let config = PipelineConfig {
            steps: Vec::new(),
            imputation_path: ArtifactFixtures::IMPUTATION_PATH.to_string(),
        };

        let features = FullPipeline::new(workspace.root(), config)
            .run(valid_feature_frame())
            .unwrap();

        assert_eq!(features.value("valor_vehiculo", 0), Some(Scalar::Int(18_500)));
    }

    #[test]
    fn test_missing_dictionary_fails_before_validation() {
        let workspace = ArtifactWorkspace::standard();
        workspace.remove(ArtifactFixtures::IMPUTATION_PATH);
        let frame = ClaimFixtures::ford().to_frame().unwrap();

        let err = standard_pipeline(&workspace).run(frame).unwrap_err();

        assert!(matches!(err, PipelineError::ImputationDictionary(ref e) if e.is_not_found()));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_missing_step_artifact() {
        let workspace = ArtifactWorkspace::standard();
        workspace.remove(ArtifactFixtures::STEPS[1].1);
        let frame = ClaimFixtures::ford().to_frame().unwrap();

        let err = standard_pipeline(&workspace).run(frame).unwrap_err();

        assert!(matches!(err, PipelineError::TransformArtifact(ArtifactError::NotFound { .. })));
    }

    #[test]
    fn test_reordered_steps_fail_on_unresolved_column() {
        let workspace = ArtifactWorkspace::standard();
        let mut config = standard_config();
        config.steps.swap(0, 2);
        let frame = ClaimFixtures::ford().to_frame().unwrap();

        let err = FullPipeline::new(workspace.root(), config).run(frame).unwrap_err();

        match err {
            PipelineError::PipelineExecution {
                step,
                operation,
                op,
                source: TransformError::UnresolvedColumn(column),
            } => {
                assert_eq!(step, "valor_vehiculo");
                assert_eq!(operation, 1);
                assert_eq!(op, "arithmetic");
                assert_eq!(column, "valor_base");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_input_column_fails_execution() {
        let workspace = ArtifactWorkspace::standard();
        let mut frame = ClaimFixtures::ford().to_frame().unwrap();
        frame.remove("partes_a_reemplazar");

        let err = standard_pipeline(&workspace).run(frame).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::PipelineExecution { source: TransformError::UnresolvedColumn(ref c), .. }
                if c == "partes_a_reemplazar"
        ));
    }

    #[test]
    fn test_unsupported_artifact_version_is_rejected() {
        let workspace = ArtifactWorkspace::standard();
        let bumped = ArtifactFixtures::TOTAL_PIEZAS.replace("\"format_version\": 1", "\"format_version\": 2");
        workspace.write(ArtifactFixtures::STEPS[0].1, &bumped);
        let frame = ClaimFixtures::ford().to_frame().unwrap();

        let err = standard_pipeline(&workspace).run(frame).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::TransformArtifact(ArtifactError::UnsupportedVersion { found: 2, expected: 1, .. })
        ));
    }

    #[test]
    fn test_pipeline_config_deserializes() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{
                "steps": [{"name": "total_piezas", "pipeline": "artifacts/pipelines/01_total_piezas.json"}],
                "imputation_path": "artifacts/imputation.json"
            }"#,
        )
        .unwrap();

        assert_eq!(config.steps.len(), 1);
        assert_eq!(config.steps[0].name, "total_piezas");
    }
}

// ============================================================================
// Transform Step Tests
// ============================================================================

mod transform_tests {
    use super::*;

    #[test]
    fn test_shipped_artifacts_parse() {
        for contents in [
            ArtifactFixtures::TOTAL_PIEZAS,
            ArtifactFixtures::MARCA_VEHICULO,
            ArtifactFixtures::VALOR_VEHICULO,
        ] {
            let artifact: TransformArtifact = serde_json::from_str(contents).unwrap();
            assert!(!artifact.operations.is_empty());
        }
    }

    #[test]
    fn test_run_step_from_disk() {
        let workspace = ArtifactWorkspace::standard();
        let frame = ClaimFixtures::ford().to_frame().unwrap();

        let frame = run_step(frame, &workspace.resolve(ArtifactFixtures::STEPS[0].1)).unwrap();

        assert_eq!(frame.value("total_piezas", 0), Some(Scalar::Int(4)));
        assert!(frame.contains("log_total_piezas"));
    }

    #[test]
    fn test_malformed_artifact() {
        let workspace = ArtifactWorkspace::empty();
        let path = workspace.write("broken.json", r#"{"format_version": 1, "name": "x", "operations": [{"op": "eval"}]}"#);

        let err = run_step(Frame::new(), &path).unwrap_err();

        assert!(matches!(err, PipelineError::TransformArtifact(ArtifactError::Deserialization { .. })));
    }

    #[test]
    fn test_rename_constant_and_cast() {
        let artifact = TransformArtifact::new(
            "misc",
            vec![
                Operation::Constant {
                    output: "flag".into(),
                    value: Scalar::Float(1.0),
                },
                Operation::Cast {
                    column: "flag".into(),
                    to: DType::Int,
                },
                Operation::Rename {
                    from: "flag".into(),
                    to: "indicador".into(),
                },
            ],
        );
        let frame = FrameBuilder::new().int("a", &[Some(1), Some(2)]).build();

        let frame = artifact.apply(frame).unwrap();

        assert_eq!(frame.column("indicador").unwrap(), &ColumnData::Int(vec![Some(1), Some(1)]));
        assert!(!frame.contains("flag"));
    }

    #[test]
    fn test_fill_operation_on_absent_column() {
        let artifact = TransformArtifact::new(
            "fill",
            vec![Operation::Fill {
                column: "ausente".into(),
                value: Scalar::Int(0),
            }],
        );

        let err = artifact.apply(valid_feature_frame()).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::PipelineExecution { operation: 0, op: "fill", source: TransformError::UnresolvedColumn(_), .. }
        ));
    }

    #[test]
    fn test_drop_is_all_or_nothing() {
        let artifact = TransformArtifact::new(
            "drop",
            vec![Operation::Drop {
                columns: vec!["valor_vehiculo".into(), "ausente".into()],
            }],
        );

        assert!(artifact.apply(valid_feature_frame()).is_err());
    }
}

// ============================================================================
// Imputation Tests
// ============================================================================

mod imputation_tests {
    use super::*;

    #[test]
    fn test_shipped_dictionary_parses() {
        let dictionary: ImputationDictionary = serde_json::from_str(ArtifactFixtures::IMPUTATION).unwrap();

        assert_eq!(dictionary.get("marca_vehiculo_encoded"), Some(&Scalar::Int(10)));
        assert_eq!(dictionary.get("log_total_piezas"), Some(&Scalar::Float(0.0)));
    }

    #[test]
    fn test_absent_dictionary_columns_are_skipped() {
        let frame = FrameBuilder::new().int("valor_vehiculo", &[None]).build();
        let dictionary: ImputationDictionary =
            [("valor_vehiculo", 15_000i64), ("no_existe", 1)].into_iter().collect();

        let frame = impute(frame, &dictionary).unwrap();

        assert_eq!(frame.value("valor_vehiculo", 0), Some(Scalar::Int(15_000)));
        assert!(!frame.contains("no_existe"));
    }

    #[test]
    fn test_text_default_for_numeric_column_fails() {
        let frame = FrameBuilder::new().int("valor_vehiculo", &[None]).build();
        let dictionary: ImputationDictionary = [("valor_vehiculo", "alto")].into_iter().collect();

        assert!(impute(frame, &dictionary).is_err());
    }

    #[test]
    fn test_load_missing_dictionary() {
        let workspace = ArtifactWorkspace::empty();

        let err = ImputationDictionary::load(&workspace.resolve("imputation.json")).unwrap_err();

        assert!(err.is_not_found());
    }

    proptest! {
        #[test]
        fn prop_imputation_is_idempotent(frame in sparse_frame_strategy()) {
            let dictionary: ImputationDictionary = [
                ("entero", Scalar::Int(0)),
                ("decimal", Scalar::Float(0.5)),
                ("texto", Scalar::from("n/a")),
            ]
            .into_iter()
            .collect();

            let once = impute(frame, &dictionary).unwrap();
            let twice = impute(once.clone(), &dictionary).unwrap();

            prop_assert!(!once.has_missing());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_fill_follows_column_type(frame in sparse_frame_strategy(), fill in scalar_strategy()) {
            let text: ImputationDictionary = [("texto", fill.clone())].into_iter().collect();
            let imputed = impute(frame.clone(), &text).unwrap();
            for row in 0..frame.len() {
                let expected = frame.value("texto", row).unwrap_or_else(|| Scalar::Text(fill.to_string()));
                prop_assert_eq!(imputed.value("texto", row), Some(expected));
            }

            let numeric: ImputationDictionary = [("decimal", fill.clone())].into_iter().collect();
            let has_gaps = (0..frame.len()).any(|row| frame.value("decimal", row).is_none());
            let result = impute(frame, &numeric);
            if has_gaps && matches!(fill, Scalar::Text(_)) {
                prop_assert!(result.is_err());
            } else {
                prop_assert_eq!(result.unwrap().column("decimal").unwrap().missing_count(), 0);
            }
        }

        #[test]
        fn prop_imputation_keeps_present_cells(frame in sparse_frame_strategy()) {
            let dictionary: ImputationDictionary = [("entero", Scalar::Int(-999))].into_iter().collect();

            let imputed = impute(frame.clone(), &dictionary).unwrap();

            for row in 0..frame.len() {
                if let Some(value) = frame.value("entero", row) {
                    prop_assert_eq!(imputed.value("entero", row), Some(value));
                }
            }
        }
    }
}

// ============================================================================
// Validation Tests
// ============================================================================

mod validation_tests {
    use super::*;

    #[test]
    fn test_valid_frame_passes() {
        let frame = ColumnValidator::default().validate(valid_feature_frame()).unwrap();
        assert_eq!(frame.width(), REQUIRED_COLUMNS.len());
    }

    #[test]
    fn test_each_missing_required_column_is_reported() {
        for (column, _) in REQUIRED_COLUMNS {
            let mut frame = valid_feature_frame();
            frame.remove(column);

            let err = ColumnValidator::default().validate(frame).unwrap_err();

            assert_eq!(
                err.violations,
                vec![ColumnViolation::MissingColumn {
                    column: column.to_string()
                }]
            );
            assert!(err.to_string().contains(column));
        }
    }

    #[test]
    fn test_all_violations_are_aggregated() {
        let frame = FrameBuilder::new()
            .float("log_total_piezas", &[Some(1.0)])
            .text("valor_vehiculo", &[Some("caro")])
            .build();

        let err = ColumnValidator::default().validate(frame).unwrap_err();

        assert_eq!(err.violations.len(), 4);
        let columns: Vec<&str> = err.violations.iter().map(ColumnViolation::column).collect();
        assert_eq!(
            columns,
            vec!["marca_vehiculo_encoded", "valor_vehiculo", "valor_por_pieza", "antiguedad_vehiculo"]
        );
        assert!(err.to_string().starts_with("Data validation failed: "));
    }

    #[test]
    fn test_float_is_coerced_to_int() {
        let mut frame = valid_feature_frame();
        frame
            .insert("valor_por_pieza", ColumnData::Float(vec![Some(4_625.75)]))
            .unwrap();

        let frame = ColumnValidator::default().validate(frame).unwrap();

        assert_eq!(frame.column("valor_por_pieza").unwrap(), &ColumnData::Int(vec![Some(4_625)]));
    }

    #[test]
    fn test_numeric_text_is_coerced() {
        let mut frame = valid_feature_frame();
        frame
            .insert("antiguedad_vehiculo", ColumnData::Text(vec![Some(" 7 ".into())]))
            .unwrap();

        let frame = ColumnValidator::default().validate(frame).unwrap();

        assert_eq!(frame.value("antiguedad_vehiculo", 0), Some(Scalar::Int(7)));
    }

    #[test]
    fn test_missing_cell_is_a_violation() {
        let mut frame = valid_feature_frame();
        frame.insert("valor_vehiculo", ColumnData::Int(vec![None])).unwrap();

        let err = ColumnValidator::default().validate(frame).unwrap_err();

        assert!(matches!(
            &err.violations[..],
            [ColumnViolation::TypeConversion { source: FrameError::MissingValue { row: 0, .. }, .. }]
        ));
    }

    #[test]
    fn test_custom_validator() {
        let validator = ColumnValidator::new([("a", DType::Float)]);
        let frame = FrameBuilder::new().int("a", &[Some(3)]).build();

        let frame = validator.validate(frame).unwrap();

        assert_eq!(frame.column("a").unwrap().dtype(), DType::Float);
    }

    #[test]
    fn test_pipeline_surfaces_validation_error() {
        let workspace = ArtifactWorkspace::standard();
        let config = PipelineConfig {
            steps: Vec::new(),
            imputation_path: ArtifactFixtures::IMPUTATION_PATH.to_string(),
        };
        let frame = ClaimFixtures::ford().to_frame().unwrap();

        let err = FullPipeline::new(workspace.root(), config).run(frame).unwrap_err();

        match err {
            PipelineError::Validation(validation) => {
                assert_eq!(validation.violations.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
