//! Dropdown options for the search forms.
//!
//! The origin selector offers grouped entries at five granularities
//! (continent, country, region, municipality, single airport); the
//! destination selector offers single airports only. Option values are
//! selector keys that [`AirportSelector`](crate::models::AirportSelector)
//! parses back on the way in.

use std::collections::HashMap;

use crate::api::AirportOption;
use crate::db::repository::FullRepository;
use crate::services::ServiceResult;

/// Grouped options for the origin dropdown, sorted by (group, label).
pub async fn airport_options(repository: &dyn FullRepository) -> ServiceResult<Vec<AirportOption>> {
    let airports = repository.list_selectable_airports().await?;
    let countries = repository.resolve_countries().await?;
    let regions = repository.resolve_regions().await?;

    let country_names: HashMap<&str, &str> = countries
        .iter()
        .map(|country| (country.code.as_str(), country.name.as_str()))
        .collect();
    let region_names: HashMap<&str, &str> = regions
        .iter()
        .map(|region| (region.code.as_str(), region.name.as_str()))
        .collect();

    let mut options: Vec<AirportOption> = Vec::new();
    let mut seen: HashMap<String, ()> = HashMap::new();
    let mut push_unique = |options: &mut Vec<AirportOption>, option: AirportOption| {
        if seen.insert(option.value.clone(), ()).is_none() {
            options.push(option);
        }
    };

    for airport in &airports {
        push_unique(
            &mut options,
            AirportOption {
                label: format!("{} (All airports)", airport.continent),
                value: format!("con#{}", airport.continent),
                group: "Continent".to_string(),
            },
        );

        let country_name = country_names
            .get(airport.iso_country.as_str())
            .copied()
            .unwrap_or(airport.iso_country.as_str());
        push_unique(
            &mut options,
            AirportOption {
                label: format!("{} (All airports)", country_name),
                value: format!("cou#{}", airport.iso_country),
                group: "Country".to_string(),
            },
        );

        let region_name = region_names
            .get(airport.iso_region.as_str())
            .copied()
            .unwrap_or(airport.iso_region.as_str());
        push_unique(
            &mut options,
            AirportOption {
                label: format!("{}, {} (All airports)", region_name, country_name),
                value: format!("reg#{}", airport.iso_region),
                group: "Region".to_string(),
            },
        );

        if let Some(municipality) = &airport.municipality {
            push_unique(
                &mut options,
                AirportOption {
                    label: format!(
                        "{}, {}, {} (All airports)",
                        municipality, region_name, airport.iso_country
                    ),
                    value: format!(
                        "mun#{}#{}#{}",
                        airport.iso_country, airport.iso_region, municipality
                    ),
                    group: "Municipality".to_string(),
                },
            );
        }

        if let Some(iata) = &airport.iata_code {
            push_unique(
                &mut options,
                AirportOption {
                    label: format!("{} ({})", airport.name, iata),
                    value: format!("air#{}", iata),
                    group: "Airport".to_string(),
                },
            );
        }
    }

    options.sort_by(|a, b| a.group.cmp(&b.group).then(a.label.cmp(&b.label)));
    Ok(options)
}

/// Flat single-airport options for the destination dropdown, sorted by
/// label. Airports without an IATA code are not directly selectable.
pub async fn destination_options(
    repository: &dyn FullRepository,
) -> ServiceResult<Vec<AirportOption>> {
    let airports = repository.list_selectable_airports().await?;

    let mut options: Vec<AirportOption> = airports
        .iter()
        .filter_map(|airport| {
            let iata = airport.iata_code.as_ref()?;
            Some(AirportOption {
                label: format!("{} ({})", airport.name, iata),
                value: format!("air#{}", iata),
                group: "Airport".to_string(),
            })
        })
        .collect();

    options.sort_by(|a, b| a.label.cmp(&b.label));
    options.dedup_by(|a, b| a.value == b.value);
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::models::{AirportRef, AirportType, CountryRef, RegionRef};

    fn airport(ident: &str, iata: &str, name: &str) -> AirportRef {
        AirportRef {
            ident: ident.to_string(),
            iata_code: Some(iata.to_string()),
            name: name.to_string(),
            airport_type: AirportType::LargeAirport,
            latitude_deg: 47.46,
            longitude_deg: 8.55,
            continent: "EU".to_string(),
            iso_country: "CH".to_string(),
            iso_region: "CH-ZH".to_string(),
            municipality: Some("Zurich".to_string()),
            scheduled_service: true,
        }
    }

    fn seeded_repo() -> LocalRepository {
        let repo = LocalRepository::new();
        repo.insert_airport(airport("LSZH", "ZRH", "Zurich Airport"));
        repo.insert_country(CountryRef {
            code: "CH".to_string(),
            name: "Switzerland".to_string(),
            continent: "EU".to_string(),
        });
        repo.insert_region(RegionRef {
            code: "CH-ZH".to_string(),
            name: "Canton of Zurich".to_string(),
            iso_country: "CH".to_string(),
        });
        repo
    }

    #[tokio::test]
    async fn test_origin_options_cover_all_granularities() {
        let repo = seeded_repo();
        let options = airport_options(&repo).await.unwrap();

        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert!(values.contains(&"con#EU"));
        assert!(values.contains(&"cou#CH"));
        assert!(values.contains(&"reg#CH-ZH"));
        assert!(values.contains(&"mun#CH#CH-ZH#Zurich"));
        assert!(values.contains(&"air#ZRH"));

        let country = options.iter().find(|o| o.value == "cou#CH").unwrap();
        assert_eq!(country.label, "Switzerland (All airports)");
        let region = options.iter().find(|o| o.value == "reg#CH-ZH").unwrap();
        assert_eq!(region.label, "Canton of Zurich, Switzerland (All airports)");
        let single = options.iter().find(|o| o.value == "air#ZRH").unwrap();
        assert_eq!(single.label, "Zurich Airport (ZRH)");
    }

    #[tokio::test]
    async fn test_destination_options_are_airports_only() {
        let repo = seeded_repo();
        let options = destination_options(&repo).await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, "air#ZRH");
    }

    #[tokio::test]
    async fn test_duplicate_group_values_collapse() {
        let repo = seeded_repo();
        let mut second = airport("LSGG", "GVA", "Geneva Airport");
        second.iso_region = "CH-GE".to_string();
        second.municipality = Some("Geneva".to_string());
        repo.insert_airport(second);

        let options = airport_options(&repo).await.unwrap();
        let country_entries = options.iter().filter(|o| o.value == "cou#CH").count();
        assert_eq!(country_entries, 1);
    }
}
