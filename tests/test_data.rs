//! Integration test: synthetic data generation and labeling

use delivery_eta::data::{
    ground_truth, records_to_dataframe, OrderGenerator, CATEGORICAL_COLUMNS, RAW_COLUMNS,
};
use polars::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn test_generator_reproducible_under_seed() {
    let a = OrderGenerator::new(42).generate(500);
    let b = OrderGenerator::new(42).generate(500);
    assert_eq!(a, b, "same seed must produce identical records");
}

#[test]
fn test_generated_records_respect_bounds() {
    let records = OrderGenerator::new(123).generate(5_000);
    assert_eq!(records.len(), 5_000);
    for r in &records {
        assert!(r.distance_km >= 0.0, "negative distance: {}", r.distance_km);
        assert!(
            r.preparation_time >= 5.0,
            "prep time below floor: {}",
            r.preparation_time
        );
    }
}

#[test]
fn test_labels_respect_minimum_time() {
    let records = OrderGenerator::new(9).generate(3_000);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    for r in &records {
        let t = ground_truth::delivery_time(r, &mut rng);
        assert!(t >= ground_truth::MIN_DELIVERY_TIME, "label below floor: {}", t);
    }
}

#[test]
fn test_labeling_reproducible_under_seed() {
    let records = OrderGenerator::new(4).generate(100);

    let mut rng_a = ChaCha8Rng::seed_from_u64(5);
    let labels_a: Vec<f64> = records
        .iter()
        .map(|r| ground_truth::delivery_time(r, &mut rng_a))
        .collect();

    let mut rng_b = ChaCha8Rng::seed_from_u64(5);
    let labels_b: Vec<f64> = records
        .iter()
        .map(|r| ground_truth::delivery_time(r, &mut rng_b))
        .collect();

    assert_eq!(labels_a, labels_b);
}

#[test]
fn test_raw_table_schema() {
    let records = OrderGenerator::new(0).generate(50);
    let df = records_to_dataframe(&records).unwrap();

    assert_eq!(df.height(), 50);
    assert_eq!(df.width(), RAW_COLUMNS.len());
    for col in CATEGORICAL_COLUMNS {
        let column = df.column(col).unwrap();
        assert!(
            column.as_materialized_series().str().is_ok(),
            "{} should be a string column",
            col
        );
    }
}

#[test]
fn test_single_record_table_matches_batch_schema() {
    let records = OrderGenerator::new(1).generate(3);
    let single = records[0].to_dataframe().unwrap();
    let batch = records_to_dataframe(&records).unwrap();

    assert_eq!(single.height(), 1);
    assert_eq!(single.get_column_names(), batch.get_column_names());
}

#[test]
fn test_weekend_orders_are_faster_on_average() {
    use delivery_eta::data::DayOfWeek;

    let records = OrderGenerator::new(77).generate(4_000);
    let avg = |day: DayOfWeek| {
        let times: Vec<f64> = records
            .iter()
            .filter(|r| r.day_of_week == day)
            .map(ground_truth::expected_delivery_time)
            .collect();
        times.iter().sum::<f64>() / times.len() as f64
    };

    // the weekend factor discounts total time by 10%
    assert!(avg(DayOfWeek::Weekend) < avg(DayOfWeek::Weekday));
}
