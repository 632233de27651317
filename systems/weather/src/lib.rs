#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Daily stochastic weather gate for the spread kernel.
//!
//! Each day draws whether conditions favour spread inside cells. Only when
//! they do is adjacent spread drawn, and only when both favour spread is
//! landscape-wide spread drawn. A locally unfavourable day therefore never
//! triggers larger-scale dispersal and consumes a single random draw.

use clr_landscape_core::{WeatherGate, WeatherParameters};
use rand::Rng;
use tracing::trace;

/// Pure system that samples the day's [`WeatherGate`].
#[derive(Clone, Debug)]
pub struct WeatherProcess {
    parameters: WeatherParameters,
}

impl Default for WeatherProcess {
    fn default() -> Self {
        Self::new(WeatherParameters::default())
    }
}

impl WeatherProcess {
    /// Creates a weather process using the provided seasonal probabilities.
    #[must_use]
    pub fn new(parameters: WeatherParameters) -> Self {
        Self { parameters }
    }

    /// Seasonal probabilities in use.
    #[must_use]
    pub fn parameters(&self) -> &WeatherParameters {
        &self.parameters
    }

    /// Samples which spread scopes are open on `day`.
    pub fn weather_effects<R: Rng + ?Sized>(&self, day: u32, rng: &mut R) -> WeatherGate {
        let probabilities = self.parameters.for_day(day);

        let within_cell = draw(rng, probabilities.within_cell);
        let adjacent = within_cell && draw(rng, probabilities.adjacent);
        let global = adjacent && draw(rng, probabilities.global);

        trace!(day, within_cell, adjacent, global, "weather sampled");
        WeatherGate::new(within_cell, adjacent, global)
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}
