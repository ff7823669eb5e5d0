use super::*;

#[test]
fn defaults_match_documented_constants() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.grid.columns, 12);
    assert_eq!(cfg.grid.row_height_px, 100.0);
    assert_eq!(cfg.scoring.tolerance.get(DifferenceKind::DimensionMismatch), 10.0);
    assert_eq!(cfg.scoring.tolerance.get(DifferenceKind::TypographyMismatch), 2.0);
    assert_eq!(cfg.scoring.ceiling.get(DifferenceKind::PositionMismatch), 200.0);
    assert_eq!(cfg.scoring.weight.get(DifferenceKind::MissingCandidate), 0.9);
    assert_eq!(cfg.scoring.severity_multiplier.get(Severity::High), 0.7);
    assert_eq!(cfg.overrides.protected_score, 0.95);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_keeps_other_defaults() {
    let json = r#"{
        "grid": { "rowHeightPx": 50 },
        "overrides": { "waiver": null }
    }"#;
    let cfg = EngineConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.grid.row_height_px, 50.0);
    assert_eq!(cfg.grid.columns, 12);
    assert!(cfg.overrides.waiver.is_none());
    assert_eq!(cfg.classifier, ClassifierConfig::default());
}

#[test]
fn invalid_grid_is_rejected() {
    let err = EngineConfig::from_reader(r#"{ "grid": { "columns": 0 } }"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("grid.columns"));

    let err = EngineConfig::from_reader("[1, 2]".as_bytes()).unwrap_err();
    assert!(matches!(err, VisdiffError::Serde(_)));
}

#[test]
fn waiver_respects_kind_score_and_safe_rows() {
    let waiver = ProtectionWaiver {
        safe_rows: Some(RowSpan { start: 100, end: 129 }),
        ..ProtectionWaiver::default()
    };
    assert!(waiver.waives(DifferenceKind::DimensionMismatch, 0.05, 3));
    assert!(!waiver.waives(DifferenceKind::DimensionMismatch, 0.05, 120));
    assert!(!waiver.waives(DifferenceKind::DimensionMismatch, 0.2, 3));
    assert!(!waiver.waives(DifferenceKind::VisualMismatch, 0.05, 3));
}

#[test]
fn partial_scoring_tables_merge_over_their_own_defaults() {
    let json = r#"{
        "scoring": {
            "tolerance": { "dimension": 12 },
            "ceiling": { "typography": 80 },
            "severityMultiplier": { "high": 0.5 },
            "fallback": { "low": 0.9 }
        }
    }"#;
    let cfg = EngineConfig::from_reader(json.as_bytes()).unwrap();
    let defaults = ScoringConfig::default();

    assert_eq!(cfg.scoring.tolerance.dimension, 12.0);
    assert_eq!(cfg.scoring.tolerance.position, defaults.tolerance.position);
    assert_eq!(cfg.scoring.tolerance.typography, 2.0);
    assert_eq!(cfg.scoring.ceiling.typography, 80.0);
    assert_eq!(cfg.scoring.ceiling.dimension, 500.0);
    assert_eq!(cfg.scoring.weight, defaults.weight);
    assert_eq!(cfg.scoring.severity_multiplier.high, 0.5);
    assert_eq!(cfg.scoring.severity_multiplier.medium, 0.9);
    assert_eq!(cfg.scoring.fallback.low, 0.9);
    assert_eq!(cfg.scoring.fallback.high, 0.3);
}

#[test]
fn full_config_round_trips_through_json() {
    let cfg = EngineConfig::default();
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(EngineConfig::from_reader(json.as_bytes()).unwrap(), cfg);
}
