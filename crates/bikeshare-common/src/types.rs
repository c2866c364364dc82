//! Categorical domain types shared by the loader, filters and charts.

use crate::{BikeshareError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

/// Rider category as recorded in the `member_casual` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Registered annual or monthly member.
    Member,
    /// Single-ride or day-pass rider.
    Casual,
}

impl UserType {
    /// Every user type in display order.
    pub const ALL: [UserType; 2] = [UserType::Member, UserType::Casual];

    /// Raw value used in the source data.
    pub const fn as_str(self) -> &'static str {
        match self {
            UserType::Member => "member",
            UserType::Casual => "casual",
        }
    }

    /// Position in [`UserType::ALL`].
    pub const fn index(self) -> usize {
        match self {
            UserType::Member => 0,
            UserType::Casual => 1,
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "member" => Ok(UserType::Member),
            "casual" => Ok(UserType::Casual),
            _ => Err(BikeshareError::parse_field(
                format!("unknown user type '{}'", s.trim()),
                "member_casual",
            )),
        }
    }
}

/// Vehicle category as recorded in the `rideable_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BikeType {
    /// Pedal bike docked at a station.
    ClassicBike,
    /// Pedal-assist e-bike.
    ElectricBike,
    /// Legacy category used in older exports.
    DockedBike,
    /// Stand-up electric scooter.
    ElectricScooter,
}

impl BikeType {
    /// Every bike type in display order.
    pub const ALL: [BikeType; 4] = [
        BikeType::ClassicBike,
        BikeType::ElectricBike,
        BikeType::DockedBike,
        BikeType::ElectricScooter,
    ];

    /// Raw value used in the source data.
    pub const fn as_str(self) -> &'static str {
        match self {
            BikeType::ClassicBike => "classic_bike",
            BikeType::ElectricBike => "electric_bike",
            BikeType::DockedBike => "docked_bike",
            BikeType::ElectricScooter => "electric_scooter",
        }
    }

    /// Whether the vehicle has a motor.
    pub const fn is_electric(self) -> bool {
        matches!(self, BikeType::ElectricBike | BikeType::ElectricScooter)
    }
}

impl fmt::Display for BikeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BikeType {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "classic_bike" | "classic" => Ok(BikeType::ClassicBike),
            "electric_bike" | "electric" => Ok(BikeType::ElectricBike),
            "docked_bike" | "docked" => Ok(BikeType::DockedBike),
            "electric_scooter" | "scooter" => Ok(BikeType::ElectricScooter),
            _ => Err(BikeshareError::parse_field(
                format!("unknown bike type '{}'", s.trim()),
                "rideable_type",
            )),
        }
    }
}

/// Six-hour bucket of the ride start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 00:00 - 05:59
    EarlyMorning,
    /// 06:00 - 11:59
    Morning,
    /// 12:00 - 17:59
    Afternoon,
    /// 18:00 - 23:59
    Evening,
}

impl TimeOfDay {
    /// Every bucket in chronological order.
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::EarlyMorning,
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
    ];

    /// Bucket for an hour of day (0-23).
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeOfDay::EarlyMorning,
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }

    /// Human readable label.
    pub const fn label(self) -> &'static str {
        match self {
            TimeOfDay::EarlyMorning => "Early Morning (12-6am)",
            TimeOfDay::Morning => "Morning (6-12pm)",
            TimeOfDay::Afternoon => "Afternoon (12-6pm)",
            TimeOfDay::Evening => "Evening (6-12am)",
        }
    }

    /// Identifier accepted on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::EarlyMorning => "early_morning",
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeOfDay {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = normalize(s);
        TimeOfDay::ALL
            .into_iter()
            .find(|bucket| {
                normalized == bucket.as_str() || s.trim().eq_ignore_ascii_case(bucket.label())
            })
            .ok_or_else(|| {
                BikeshareError::parse_field(
                    format!("unknown time of day '{}'", s.trim()),
                    "time_of_day",
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::EarlyMorning);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::EarlyMorning);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Evening);
    }

    #[test]
    fn test_categorical_parsing_normalizes() {
        assert_eq!(" Member ".parse::<UserType>().unwrap(), UserType::Member);
        assert_eq!("CASUAL".parse::<UserType>().unwrap(), UserType::Casual);
        assert!("subscriber".parse::<UserType>().is_err());

        assert_eq!("electric_bike".parse::<BikeType>().unwrap(), BikeType::ElectricBike);
        assert_eq!("Classic Bike".parse::<BikeType>().unwrap(), BikeType::ClassicBike);
        assert!("unicycle".parse::<BikeType>().is_err());

        assert_eq!("evening".parse::<TimeOfDay>().unwrap(), TimeOfDay::Evening);
        assert_eq!("Early Morning".parse::<TimeOfDay>().unwrap(), TimeOfDay::EarlyMorning);
        assert_eq!("Morning (6-12pm)".parse::<TimeOfDay>().unwrap(), TimeOfDay::Morning);
        assert!("noon".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_serde_uses_source_values() {
        assert_eq!(serde_json::to_string(&UserType::Member).unwrap(), "\"member\"");
        assert_eq!(
            serde_json::to_string(&BikeType::ElectricScooter).unwrap(),
            "\"electric_scooter\""
        );
        let parsed: BikeType = serde_json::from_str("\"docked_bike\"").unwrap();
        assert_eq!(parsed, BikeType::DockedBike);
    }

    #[test]
    fn test_electric_flag() {
        assert!(BikeType::ElectricBike.is_electric());
        assert!(BikeType::ElectricScooter.is_electric());
        assert!(!BikeType::ClassicBike.is_electric());
    }
}
