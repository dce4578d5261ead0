//! Order data model
//!
//! Defines the raw order record consumed by training and inference,
//! the categorical vocabularies, and conversions into the tabular
//! representation the preprocessing pipeline operates on.

mod generator;
pub mod ground_truth;

pub use generator::OrderGenerator;

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Courier vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Bike,
    Bicycle,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Bike => "bike",
            VehicleType::Bicycle => "bicycle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bike" => Some(VehicleType::Bike),
            "bicycle" => Some(VehicleType::Bicycle),
            _ => None,
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order handling class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Normal,
    Delicate,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Normal => "normal",
            OrderType::Delicate => "delicate",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather at dispatch time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    LightRain,
    HeavyRain,
    Storm,
}

impl WeatherCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "clear",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::LightRain => "light_rain",
            WeatherCondition::HeavyRain => "heavy_rain",
            WeatherCondition::Storm => "storm",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "clear" => Some(WeatherCondition::Clear),
            "cloudy" => Some(WeatherCondition::Cloudy),
            "light_rain" => Some(WeatherCondition::LightRain),
            "heavy_rain" => Some(WeatherCondition::HeavyRain),
            "storm" => Some(WeatherCondition::Storm),
            _ => None,
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch time slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weekday vs weekend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Weekday,
    Weekend,
}

impl DayOfWeek {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Weekday => "weekday",
            DayOfWeek::Weekend => "weekend",
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single delivery order observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Courier rating on a 1-5 scale
    pub delivery_person_rating: f64,
    /// Route distance in kilometres, non-negative
    pub distance_km: f64,
    /// Restaurant preparation time in minutes, at least 5
    pub preparation_time: f64,
    pub vehicle_type: VehicleType,
    pub order_type: OrderType,
    pub weather_condition: WeatherCondition,
    pub time_of_day: TimeOfDay,
    pub day_of_week: DayOfWeek,
}

/// Raw column names, in the order the generator emits them
pub const RAW_COLUMNS: [&str; 8] = [
    "delivery_person_rating",
    "distance_km",
    "preparation_time",
    "vehicle_type",
    "order_type",
    "weather_condition",
    "time_of_day",
    "day_of_week",
];

/// Categorical columns that get label-encoded
pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    "vehicle_type",
    "order_type",
    "weather_condition",
    "time_of_day",
    "day_of_week",
];

/// Convert a batch of records into the raw 8-column table
pub fn records_to_dataframe(records: &[OrderRecord]) -> Result<DataFrame> {
    let ratings: Vec<f64> = records.iter().map(|r| r.delivery_person_rating).collect();
    let distances: Vec<f64> = records.iter().map(|r| r.distance_km).collect();
    let prep_times: Vec<f64> = records.iter().map(|r| r.preparation_time).collect();
    let vehicles: Vec<&str> = records.iter().map(|r| r.vehicle_type.as_str()).collect();
    let orders: Vec<&str> = records.iter().map(|r| r.order_type.as_str()).collect();
    let weather: Vec<&str> = records.iter().map(|r| r.weather_condition.as_str()).collect();
    let times: Vec<&str> = records.iter().map(|r| r.time_of_day.as_str()).collect();
    let days: Vec<&str> = records.iter().map(|r| r.day_of_week.as_str()).collect();

    let df = DataFrame::new(vec![
        Series::new("delivery_person_rating".into(), ratings).into(),
        Series::new("distance_km".into(), distances).into(),
        Series::new("preparation_time".into(), prep_times).into(),
        Series::new("vehicle_type".into(), vehicles).into(),
        Series::new("order_type".into(), orders).into(),
        Series::new("weather_condition".into(), weather).into(),
        Series::new("time_of_day".into(), times).into(),
        Series::new("day_of_week".into(), days).into(),
    ])?;

    Ok(df)
}

impl OrderRecord {
    /// Single-row table form, used for one-off predictions
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        records_to_dataframe(std::slice::from_ref(self))
    }
}

/// Loosely-typed order input, e.g. parsed from a JSON request.
///
/// Categorical fields stay plain strings so values outside the training
/// vocabulary reach the encoder, which downgrades them to the default
/// code instead of rejecting the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub delivery_person_rating: f64,
    pub distance_km: f64,
    pub preparation_time: f64,
    pub vehicle_type: String,
    pub order_type: String,
    pub weather_condition: String,
    pub time_of_day: String,
    pub day_of_week: String,
}

impl OrderRequest {
    /// Single-row table form matching the raw training schema
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Series::new("delivery_person_rating".into(), vec![self.delivery_person_rating]).into(),
            Series::new("distance_km".into(), vec![self.distance_km]).into(),
            Series::new("preparation_time".into(), vec![self.preparation_time]).into(),
            Series::new("vehicle_type".into(), vec![self.vehicle_type.as_str()]).into(),
            Series::new("order_type".into(), vec![self.order_type.as_str()]).into(),
            Series::new("weather_condition".into(), vec![self.weather_condition.as_str()]).into(),
            Series::new("time_of_day".into(), vec![self.time_of_day.as_str()]).into(),
            Series::new("day_of_week".into(), vec![self.day_of_week.as_str()]).into(),
        ])?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> OrderRecord {
        OrderRecord {
            delivery_person_rating: 4.2,
            distance_km: 3.5,
            preparation_time: 15.0,
            vehicle_type: VehicleType::Bike,
            order_type: OrderType::Normal,
            weather_condition: WeatherCondition::Clear,
            time_of_day: TimeOfDay::Evening,
            day_of_week: DayOfWeek::Weekday,
        }
    }

    #[test]
    fn test_records_to_dataframe_shape() {
        let records = vec![sample_record(), sample_record()];
        let df = records_to_dataframe(&records).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 8);
        for col in RAW_COLUMNS {
            assert!(df.column(col).is_ok(), "missing column {}", col);
        }
    }

    #[test]
    fn test_categorical_wire_names() {
        assert_eq!(WeatherCondition::LightRain.as_str(), "light_rain");
        assert_eq!(TimeOfDay::Night.as_str(), "night");
        assert_eq!(VehicleType::Bicycle.as_str(), "bicycle");
    }

    #[test]
    fn test_order_request_roundtrip_json() {
        let json = r#"{
            "delivery_person_rating": 4.2,
            "distance_km": 3.5,
            "preparation_time": 15,
            "vehicle_type": "bike",
            "order_type": "normal",
            "weather_condition": "clear",
            "time_of_day": "evening",
            "day_of_week": "weekday"
        }"#;
        let req: OrderRequest = serde_json::from_str(json).unwrap();
        let df = req.to_dataframe().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 8);
    }
}
