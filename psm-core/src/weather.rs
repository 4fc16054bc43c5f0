//! Weather condition mapping for dashboards.
//!
//! Live provider integrations live outside this crate. What remains here
//! is the single mapping from provider icon codes to conditions, the
//! active-spell override, and the demo generator. The generator is only
//! used when [`WeatherSource::Demo`] is configured explicitly.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Cloudy,
    Rainy,
    Thunderstorm,
    Snow,
    Fog,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 9] = [
        WeatherCondition::ClearDay,
        WeatherCondition::ClearNight,
        WeatherCondition::PartlyCloudyDay,
        WeatherCondition::PartlyCloudyNight,
        WeatherCondition::Cloudy,
        WeatherCondition::Rainy,
        WeatherCondition::Thunderstorm,
        WeatherCondition::Snow,
        WeatherCondition::Fog,
    ];

    /// Map an OpenWeatherMap-style icon code (`"10d"`, `"01n"`, ...).
    /// Unknown codes fall back to `ClearDay`.
    pub fn from_icon_code(code: &str) -> WeatherCondition {
        match code.trim() {
            "01d" => WeatherCondition::ClearDay,
            "01n" => WeatherCondition::ClearNight,
            "02d" => WeatherCondition::PartlyCloudyDay,
            "02n" => WeatherCondition::PartlyCloudyNight,
            "03d" | "03n" | "04d" | "04n" => WeatherCondition::Cloudy,
            "09d" | "09n" | "10d" | "10n" => WeatherCondition::Rainy,
            "11d" | "11n" => WeatherCondition::Thunderstorm,
            "13d" | "13n" => WeatherCondition::Snow,
            "50d" | "50n" => WeatherCondition::Fog,
            _ => WeatherCondition::ClearDay,
        }
    }

    /// Precipitating conditions.
    pub fn is_wet(&self) -> bool {
        matches!(
            self,
            WeatherCondition::Rainy | WeatherCondition::Thunderstorm | WeatherCondition::Snow
        )
    }

    /// An active spell means it is raining, whatever the provider says.
    pub fn with_spell(self, spell_active: bool) -> WeatherCondition {
        if spell_active && !self.is_wet() {
            WeatherCondition::Rainy
        } else {
            self
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WeatherCondition::ClearDay => "Clear",
            WeatherCondition::ClearNight => "Clear (night)",
            WeatherCondition::PartlyCloudyDay => "Partly cloudy",
            WeatherCondition::PartlyCloudyNight => "Partly cloudy (night)",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Rainy => "Rainy",
            WeatherCondition::Thunderstorm => "Thunderstorm",
            WeatherCondition::Snow => "Snow",
            WeatherCondition::Fog => "Fog",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    pub city: String,
    pub condition: WeatherCondition,
    /// Degrees Celsius.
    pub temperature: i32,
}

/// Where dashboard weather comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    /// No weather shown.
    #[default]
    None,
    /// Randomly generated conditions, for demos and local development.
    Demo,
}

impl WeatherSource {
    /// Reading for `city`, with the active-spell override applied.
    pub fn reading(&self, city: &str, spell_active: bool) -> Option<WeatherReading> {
        match self {
            WeatherSource::None => None,
            WeatherSource::Demo => {
                let mut reading = demo_reading(city, &mut rand::thread_rng());
                reading.condition = reading.condition.with_spell(spell_active);
                Some(reading)
            }
        }
    }
}

impl FromStr for WeatherSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(WeatherSource::None),
            "demo" => Ok(WeatherSource::Demo),
            other => anyhow::bail!("unknown weather source: {other} (expected none or demo)"),
        }
    }
}

/// Random condition and a temperature in 15..40 °C.
pub fn demo_reading<R: Rng>(city: &str, rng: &mut R) -> WeatherReading {
    let condition = *WeatherCondition::ALL
        .choose(rng)
        .unwrap_or(&WeatherCondition::ClearDay);
    WeatherReading {
        city: city.to_string(),
        condition,
        temperature: rng.gen_range(15..40),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn icon_codes_map_to_conditions() {
        let cases = [
            ("01d", WeatherCondition::ClearDay),
            ("01n", WeatherCondition::ClearNight),
            ("02d", WeatherCondition::PartlyCloudyDay),
            ("02n", WeatherCondition::PartlyCloudyNight),
            ("03d", WeatherCondition::Cloudy),
            ("04n", WeatherCondition::Cloudy),
            ("09d", WeatherCondition::Rainy),
            ("10n", WeatherCondition::Rainy),
            ("11d", WeatherCondition::Thunderstorm),
            ("13n", WeatherCondition::Snow),
            ("50d", WeatherCondition::Fog),
        ];
        for (code, expected) in cases {
            assert_eq!(WeatherCondition::from_icon_code(code), expected, "{code}");
        }
    }

    #[test]
    fn unknown_codes_fall_back_to_clear_day() {
        assert_eq!(WeatherCondition::from_icon_code("99x"), WeatherCondition::ClearDay);
        assert_eq!(WeatherCondition::from_icon_code(""), WeatherCondition::ClearDay);
    }

    #[test]
    fn partial_codes_are_unknown() {
        for code in ["10x", "10", "1", "01dn", "13N"] {
            assert_eq!(WeatherCondition::from_icon_code(code), WeatherCondition::ClearDay, "{code}");
        }
        assert_eq!(WeatherCondition::from_icon_code(" 11n "), WeatherCondition::Thunderstorm);
    }

    #[test]
    fn spell_override() {
        assert_eq!(
            WeatherCondition::from_icon_code("10n").with_spell(false),
            WeatherCondition::Rainy
        );
        assert_eq!(
            WeatherCondition::from_icon_code("01d").with_spell(true),
            WeatherCondition::Rainy
        );
        assert_eq!(
            WeatherCondition::from_icon_code("13d").with_spell(true),
            WeatherCondition::Snow
        );
        assert_eq!(
            WeatherCondition::Fog.with_spell(false),
            WeatherCondition::Fog
        );
    }

    #[test]
    fn demo_readings_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let reading = demo_reading("Lahore", &mut rng);
            assert!((15..40).contains(&reading.temperature));
        }
    }

    #[test]
    fn sources() {
        assert_eq!(WeatherSource::default(), WeatherSource::None);
        assert!(WeatherSource::None.reading("Lahore", true).is_none());
        let reading = WeatherSource::Demo.reading("Lahore", true).unwrap();
        assert!(reading.condition.is_wet());
        assert_eq!("Demo".parse::<WeatherSource>().unwrap(), WeatherSource::Demo);
        assert!("live".parse::<WeatherSource>().is_err());
    }
}
