// Country → continent / DXCC entity table
//
// Country names come from the prefix table source, so
// the common CTY.DAT spellings are listed next to the short names. A
// country that is not listed resolves to no continent and no entity:
// nothing here is guessed.

use std::collections::HashMap;
use std::sync::OnceLock;

/// DXCC entity code of mainland China
pub const CHINA_DXCC: u16 = 318;
/// DXCC entity code of Taiwan
pub const TAIWAN_DXCC: u16 = 386;
/// DXCC entity code of Hong Kong
pub const HONG_KONG_DXCC: u16 = 321;
/// DXCC entity code of Macao
pub const MACAU_DXCC: u16 = 152;

/// Country name as it appears in the prefix table
pub const CHINA_COUNTRY: &str = "china";

#[derive(Debug, Clone)]
pub struct CountryEntity {
    /// Country name (matched case-insensitively)
    pub name: &'static str,
    /// Two-letter continent code
    pub continent: &'static str,
    /// DXCC entity number
    pub entity_id: u16,
}

pub const COUNTRY_ENTITIES: &[CountryEntity] = &[
    // North America
    CountryEntity { name: "USA", continent: "NA", entity_id: 291 },
    CountryEntity { name: "United States", continent: "NA", entity_id: 291 },
    CountryEntity { name: "Canada", continent: "NA", entity_id: 1 },
    CountryEntity { name: "Mexico", continent: "NA", entity_id: 50 },
    // Europe
    CountryEntity { name: "United Kingdom", continent: "EU", entity_id: 223 },
    CountryEntity { name: "England", continent: "EU", entity_id: 223 },
    CountryEntity { name: "France", continent: "EU", entity_id: 227 },
    CountryEntity { name: "Italy", continent: "EU", entity_id: 248 },
    CountryEntity { name: "Germany", continent: "EU", entity_id: 230 },
    CountryEntity { name: "Fed. Rep. of Germany", continent: "EU", entity_id: 230 },
    CountryEntity { name: "Russia", continent: "EU", entity_id: 15 },
    // Asia
    CountryEntity { name: "Japan", continent: "AS", entity_id: 339 },
    CountryEntity { name: "China", continent: "AS", entity_id: CHINA_DXCC },
    CountryEntity { name: "Taiwan", continent: "AS", entity_id: TAIWAN_DXCC },
    CountryEntity { name: "Hong Kong", continent: "AS", entity_id: HONG_KONG_DXCC },
    CountryEntity { name: "Macau", continent: "AS", entity_id: MACAU_DXCC },
    CountryEntity { name: "Macao", continent: "AS", entity_id: MACAU_DXCC },
    CountryEntity { name: "India", continent: "AS", entity_id: 324 },
    // Oceania
    CountryEntity { name: "Australia", continent: "OC", entity_id: 150 },
    CountryEntity { name: "New Zealand", continent: "OC", entity_id: 170 },
    // South America
    CountryEntity { name: "Brazil", continent: "SA", entity_id: 108 },
    CountryEntity { name: "Argentina", continent: "SA", entity_id: 100 },
    CountryEntity { name: "Chile", continent: "SA", entity_id: 112 },
];

// Countries whose continent is known but whose entity number is not kept
const CONTINENT_ONLY: &[(&str, &str)] = &[
    ("Spain", "EU"),
    ("Netherlands", "EU"),
    ("Belgium", "EU"),
];

/// Lowercase name → (continent, entity)
static COUNTRY_MAP: OnceLock<HashMap<String, (&'static str, Option<u16>)>> = OnceLock::new();

fn get_country_map() -> &'static HashMap<String, (&'static str, Option<u16>)> {
    COUNTRY_MAP.get_or_init(|| {
        let mut map = HashMap::with_capacity(COUNTRY_ENTITIES.len() + CONTINENT_ONLY.len());
        for entity in COUNTRY_ENTITIES {
            map.insert(entity.name.to_lowercase(), (entity.continent, Some(entity.entity_id)));
        }
        for (name, continent) in CONTINENT_ONLY {
            map.insert(name.to_lowercase(), (*continent, None));
        }
        map
    })
}

/// Continent code for a country name
pub fn continent_for(country: &str) -> Option<&'static str> {
    get_country_map()
        .get(&country.trim().to_lowercase())
        .map(|(continent, _)| *continent)
}

/// DXCC entity number for a country name
pub fn entity_for(country: &str) -> Option<u16> {
    get_country_map()
        .get(&country.trim().to_lowercase())
        .and_then(|(_, entity)| *entity)
}

/// Two-letter region code carried by the special Chinese territories
pub fn special_region_for_entity(entity_id: u16) -> Option<&'static str> {
    match entity_id {
        TAIWAN_DXCC => Some("TW"),
        HONG_KONG_DXCC => Some("HK"),
        MACAU_DXCC => Some("MO"),
        _ => None,
    }
}
