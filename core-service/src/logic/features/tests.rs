//! Integration tests for extraction + standardization together

use super::{extract_features, to_matrix, Session, StandardScaler, FEATURE_COUNT};
use crate::constants::STD_EPSILON;

fn typist(interval: f64, hold: f64, speed: f64) -> Session {
    Session::new()
        .with("avg_interval", interval)
        .with("avg_hold_time", hold)
        .with("typing_speed", speed)
        .with("backspace_count", 2.0)
        .with("total_keys", 40.0)
        .with("mouse_speed", 300.0)
}

#[test]
fn test_partial_session_pads_with_zero() {
    let session = Session::new().with("typing_speed", 4.2);
    let vector = extract_features(&session);
    assert_eq!(vector.values, [0.0, 0.0, 4.2, 0.0, 0.0, 0.0]);
}

#[test]
fn test_standardized_pool_is_centered() {
    let pool = vec![
        typist(100.0, 80.0, 5.0),
        typist(120.0, 90.0, 4.5),
        typist(110.0, 85.0, 4.8),
        typist(130.0, 70.0, 5.2),
    ];
    let matrix = to_matrix(&pool);
    let scaler = StandardScaler::fit(&matrix, STD_EPSILON).unwrap();
    let scaled = scaler.transform(&matrix);

    for col in 0..FEATURE_COUNT {
        let column = scaled.column(col);
        let mean = column.sum() / column.len() as f64;
        assert!(mean.abs() < 1e-9, "column {} mean {}", col, mean);
        assert!(column.iter().all(|v| v.is_finite()));
    }

    // Varying columns end up with unit variance (minus the epsilon effect)
    let std0 = scaled.column(0).std(0.0);
    assert!((std0 - 1.0).abs() < 1e-6);
}

#[test]
fn test_vector_and_matrix_agree() {
    let pool = vec![typist(100.0, 80.0, 5.0), typist(140.0, 60.0, 3.0)];
    let matrix = to_matrix(&pool);
    let scaler = StandardScaler::fit(&matrix, STD_EPSILON).unwrap();

    let via_vector = scaler.transform_vector(&extract_features(&pool[1]));
    let via_matrix = scaler.transform(&matrix);
    for i in 0..FEATURE_COUNT {
        assert_eq!(via_vector[i], via_matrix[[1, i]]);
    }
}
