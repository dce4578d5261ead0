//! Synthetic order generation
//!
//! Draws order records from fixed distributions so a known ground-truth
//! formula can label them for supervised training. Fully deterministic
//! under a fixed seed.

use super::{DayOfWeek, OrderRecord, OrderType, TimeOfDay, VehicleType, WeatherCondition};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Minimum preparation time in minutes
const MIN_PREPARATION_TIME: f64 = 5.0;

/// Seeded generator of synthetic order records
#[derive(Debug)]
pub struct OrderGenerator {
    rng: ChaCha8Rng,
}

impl OrderGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate `n` order records.
    ///
    /// Distances are exponentially distributed (most deliveries are short)
    /// and preparation times are normal around 15 minutes, floored at 5.
    pub fn generate(&mut self, n: usize) -> Vec<OrderRecord> {
        (0..n).map(|_| self.generate_one()).collect()
    }

    fn generate_one(&mut self) -> OrderRecord {
        let rating = self.rng.gen_range(1.0..5.0);
        let distance = sample_exponential(&mut self.rng, 3.0).abs();
        let prep = sample_normal(&mut self.rng, 15.0, 5.0).max(MIN_PREPARATION_TIME);

        let vehicle = if self.rng.gen::<f64>() < 0.7 {
            VehicleType::Bike
        } else {
            VehicleType::Bicycle
        };

        let order = if self.rng.gen::<f64>() < 0.8 {
            OrderType::Normal
        } else {
            OrderType::Delicate
        };

        let weather = {
            let weights = [
                (WeatherCondition::Clear, 0.40),
                (WeatherCondition::Cloudy, 0.30),
                (WeatherCondition::LightRain, 0.15),
                (WeatherCondition::HeavyRain, 0.10),
                (WeatherCondition::Storm, 0.05),
            ];
            weighted_choice(&mut self.rng, &weights)
        };

        let time_of_day = match self.rng.gen_range(0..4) {
            0 => TimeOfDay::Morning,
            1 => TimeOfDay::Afternoon,
            2 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        };

        let day = if self.rng.gen::<f64>() < 0.7 {
            DayOfWeek::Weekday
        } else {
            DayOfWeek::Weekend
        };

        OrderRecord {
            delivery_person_rating: rating,
            distance_km: distance,
            preparation_time: prep,
            vehicle_type: vehicle,
            order_type: order,
            weather_condition: weather,
            time_of_day,
            day_of_week: day,
        }
    }
}

/// Sample from N(mean, std) via Box-Muller
pub(crate) fn sample_normal<R: Rng>(rng: &mut R, mean: f64, std: f64) -> f64 {
    // avoid ln(0)
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + std * z
}

/// Sample from Exp(1/mean) via inverse CDF
fn sample_exponential<R: Rng>(rng: &mut R, mean: f64) -> f64 {
    let u: f64 = rng.gen();
    -mean * (1.0 - u).ln()
}

fn weighted_choice<T: Copy, R: Rng>(rng: &mut R, weights: &[(T, f64)]) -> T {
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let mut draw = rng.gen::<f64>() * total;
    for (item, w) in weights {
        if draw < *w {
            return *item;
        }
        draw -= w;
    }
    weights[weights.len() - 1].0
}
