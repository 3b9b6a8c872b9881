//! Airport selector keys.
//!
//! The search forms submit origins and destinations as `#`-delimited keys:
//! a whole continent (`con#EU`), country (`cou#CH`), region (`reg#CH-ZH`),
//! municipality (`mun#CH#CH-ZH#Zurich`) or a single airport (`air#ZRH`).
//! A selector resolves to the set of large/medium scheduled-service airport
//! idents it covers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirportSelector {
    Continent(String),
    Country(String),
    Region(String),
    Municipality {
        iso_country: String,
        iso_region: String,
        municipality: String,
    },
    /// Single airport by IATA code.
    Airport(String),
}

impl FromStr for AirportSelector {
    type Err = String;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = key.split('#').collect();
        match parts.as_slice() {
            ["con", value] if !value.is_empty() => Ok(Self::Continent(value.to_string())),
            ["cou", value] if !value.is_empty() => Ok(Self::Country(value.to_string())),
            ["reg", value] if !value.is_empty() => Ok(Self::Region(value.to_string())),
            ["mun", country, region, municipality] if !municipality.is_empty() => {
                Ok(Self::Municipality {
                    iso_country: country.to_string(),
                    iso_region: region.to_string(),
                    municipality: municipality.to_string(),
                })
            }
            ["air", value] if !value.is_empty() => Ok(Self::Airport(value.to_string())),
            _ => Err(format!("Invalid airport selector key: {}", key)),
        }
    }
}

impl fmt::Display for AirportSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continent(v) => write!(f, "con#{}", v),
            Self::Country(v) => write!(f, "cou#{}", v),
            Self::Region(v) => write!(f, "reg#{}", v),
            Self::Municipality {
                iso_country,
                iso_region,
                municipality,
            } => write!(f, "mun#{}#{}#{}", iso_country, iso_region, municipality),
            Self::Airport(v) => write!(f, "air#{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_keys() {
        assert_eq!(
            "con#EU".parse::<AirportSelector>().unwrap(),
            AirportSelector::Continent("EU".to_string())
        );
        assert_eq!(
            "cou#CH".parse::<AirportSelector>().unwrap(),
            AirportSelector::Country("CH".to_string())
        );
        assert_eq!(
            "reg#CH-ZH".parse::<AirportSelector>().unwrap(),
            AirportSelector::Region("CH-ZH".to_string())
        );
        assert_eq!(
            "mun#CH#CH-ZH#Zurich".parse::<AirportSelector>().unwrap(),
            AirportSelector::Municipality {
                iso_country: "CH".to_string(),
                iso_region: "CH-ZH".to_string(),
                municipality: "Zurich".to_string(),
            }
        );
        assert_eq!(
            "air#ZRH".parse::<AirportSelector>().unwrap(),
            AirportSelector::Airport("ZRH".to_string())
        );
    }

    #[test]
    fn test_parse_invalid_keys() {
        assert!("".parse::<AirportSelector>().is_err());
        assert!("air#".parse::<AirportSelector>().is_err());
        assert!("xyz#ZRH".parse::<AirportSelector>().is_err());
        assert!("mun#CH#CH-ZH".parse::<AirportSelector>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for key in ["con#EU", "cou#CH", "reg#CH-ZH", "mun#CH#CH-ZH#Zurich", "air#ZRH"] {
            let selector: AirportSelector = key.parse().unwrap();
            assert_eq!(selector.to_string(), key);
        }
    }
}
