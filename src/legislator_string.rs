use std::sync::LazyLock;

use log::{debug, error};
use regex::Regex;

use crate::text_manipulators::normalize_whitespace;

// "<town> - District <n> - <member> (<party>)". The party group is greedy so a
// home-municipality suffix like "R - Dover-Foxcroft" stays inside it.
static LEGISLATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\W\w\s()-]+)\s*-\s*District\s+(\d+)\s*-\s*(.+?)\s*\((.+)\)").unwrap()
});

/// The four fields carried by one row of the municipality listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MunicipalityEntry {
    pub district: String,
    pub town: String,
    pub member: String,
    pub party: String,
}

impl MunicipalityEntry {
    pub fn is_empty(&self) -> bool {
        self.district.is_empty()
            && self.town.is_empty()
            && self.member.is_empty()
            && self.party.is_empty()
    }
}

/// Splits a listing string such as
/// `"Allagash - District 1 - Lucien J.B. Daigle (R - Fort Kent)"` into its
/// district, town, member and party. Anything that doesn't fit yields an
/// all-empty entry.
pub fn extract_legislator_from_string(text: &str) -> MunicipalityEntry {
    if !text.contains("District") {
        return MunicipalityEntry::default();
    }

    let formatted_text = normalize_whitespace(text);
    debug!("Extracting data from legislator string: {formatted_text}");

    let Some(caps) = LEGISLATOR_PATTERN.captures(&formatted_text) else {
        error!("Regex match not found, can't extract legislator district data from: {formatted_text}");
        return MunicipalityEntry::default();
    };

    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str()).trim().to_string();
    MunicipalityEntry {
        town: group(1),
        district: group(2),
        member: group(3),
        party: group(4),
    }
}
