use std::fmt;

use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form is also the serde wire form.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(
    /// Urgency of a symptom report. Ordered from least to most urgent.
    SeverityLevel {
        Low => "Low",
        Moderate => "Moderate",
        High => "High",
    }
);

str_enum!(
    /// How long the reported symptoms have persisted.
    DurationFlag {
        LessThanWeek => "<1 week",
        OneWeekOrMore => "1 week+",
    }
);

str_enum!(MetricKind {
    BloodPressure => "blood_pressure",
    HeartRate => "heart_rate",
    BloodSugar => "blood_sugar",
    Weight => "weight",
    Temperature => "temperature",
});

impl SeverityLevel {
    fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Moderate => 1,
            Self::High => 2,
        }
    }
}

impl PartialOrd for SeverityLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SeverityLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl DurationFlag {
    pub fn is_persistent(self) -> bool {
        matches!(self, Self::OneWeekOrMore)
    }
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        Self::BloodPressure,
        Self::HeartRate,
        Self::BloodSugar,
        Self::Weight,
        Self::Temperature,
    ];

    pub fn unit(self) -> &'static str {
        match self {
            Self::BloodPressure => "mmHg",
            Self::HeartRate => "bpm",
            Self::BloodSugar => "mg/dL",
            Self::Weight => "kg",
            Self::Temperature => "°C",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn severity_levels_parse_from_display_form() {
        for level in [SeverityLevel::Low, SeverityLevel::Moderate, SeverityLevel::High] {
            assert_eq!(SeverityLevel::from_str(&level.to_string()).unwrap(), level);
        }
    }

    #[test]
    fn severity_levels_are_ordered() {
        assert!(SeverityLevel::Low < SeverityLevel::Moderate);
        assert!(SeverityLevel::Moderate < SeverityLevel::High);
    }

    #[test]
    fn duration_flag_wire_form() {
        let json = serde_json::to_string(&DurationFlag::OneWeekOrMore).unwrap();
        assert_eq!(json, "\"1 week+\"");
        let parsed: DurationFlag = serde_json::from_str("\"<1 week\"").unwrap();
        assert_eq!(parsed, DurationFlag::LessThanWeek);
        assert!(!parsed.is_persistent());
    }

    #[test]
    fn metric_kind_units() {
        assert_eq!(MetricKind::BloodPressure.unit(), "mmHg");
        assert_eq!(MetricKind::from_str("heart_rate").unwrap(), MetricKind::HeartRate);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(SeverityLevel::from_str("low").is_err());
        assert!(MetricKind::from_str("").is_err());
        assert!(DurationFlag::from_str("forever").is_err());
    }
}
