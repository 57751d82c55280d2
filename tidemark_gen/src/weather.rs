// Weather input → water level.
//
// The weather lookup itself happens outside the generator; only its scalar
// result arrives here. Hot weather lowers the sea (more land), heavy rain
// raises it. Condition codes follow the OpenWeather numbering, where 502–504
// and 522 are the heavy and extreme rain bands. When a sample is both hot
// and rainy, hot wins.

use serde::{Deserialize, Serialize};

pub const HOT_THRESHOLD_C: f64 = 30.0;
pub const HEAVY_RAIN_CODES: [u32; 4] = [502, 503, 504, 522];

pub const HOT_WATER_LEVEL: f64 = 0.15;
pub const RAIN_WATER_LEVEL: f64 = 0.35;
pub const DEFAULT_WATER_LEVEL: f64 = 0.25;

/// One weather observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub temperature_c: f64,
    pub condition_code: u32,
}

impl WeatherSample {
    pub fn is_hot(&self) -> bool {
        self.temperature_c >= HOT_THRESHOLD_C
    }

    pub fn is_heavy_rain(&self) -> bool {
        HEAVY_RAIN_CODES.contains(&self.condition_code)
    }
}

/// Water level for the heightmap threshold. No sample means the default.
pub fn water_level_for(sample: Option<&WeatherSample>) -> f64 {
    match sample {
        Some(s) if s.is_hot() => HOT_WATER_LEVEL,
        Some(s) if s.is_heavy_rain() => RAIN_WATER_LEVEL,
        _ => DEFAULT_WATER_LEVEL,
    }
}
