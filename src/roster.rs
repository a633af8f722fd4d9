use std::collections::HashMap;

use log::info;

use crate::{
    config::ScrapingConfig,
    detail_scraper::{DetailInfo, scrape_detailed_legislator_info},
    export::LegislatorRecord,
    listing_scraper::{ListingRow, collect_municipality_data},
    pagination::get_pagination,
    requests::PageSource,
};

/// Every listing occurrence of one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberOccurrences {
    pub member: String,
    pub detail_paths: Vec<String>,
    /// (district, town, party) per occurrence.
    pub seats: Vec<(String, String, String)>,
}

/// Picks the most frequent URL. Ties go to whichever was seen first; an empty
/// list gives an empty string.
pub fn get_most_common_url(urls: &[String]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for url in urls {
        *counts.entry(url.as_str()).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for url in urls {
        let count = counts[url.as_str()];
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((url.as_str(), count));
        }
    }
    best.map(|(url, _)| url.to_string()).unwrap_or_default()
}

/// Groups rows by member name, in the order members first appear. Rows whose
/// name couldn't be parsed are left out.
pub fn group_by_member(rows: &[ListingRow]) -> Vec<MemberOccurrences> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<MemberOccurrences> = vec![];

    for row in rows.iter().filter(|row| !row.entry.member.is_empty()) {
        let i = *index.entry(row.entry.member.as_str()).or_insert_with(|| {
            groups.push(MemberOccurrences {
                member: row.entry.member.clone(),
                ..Default::default()
            });
            groups.len() - 1
        });
        let group = &mut groups[i];
        group.detail_paths.push(row.detail_path.clone());
        group.seats.push((
            row.entry.district.clone(),
            row.entry.town.clone(),
            row.entry.party.clone(),
        ));
    }
    groups
}

/// Fetches one profile per member, at that member's most-linked profile path.
/// Members with no profile link at all are skipped.
pub async fn resolve_details(
    source: &impl PageSource,
    config: &ScrapingConfig,
    groups: &[MemberOccurrences],
) -> anyhow::Result<HashMap<String, DetailInfo>> {
    let resolvable: Vec<(&MemberOccurrences, String)> = groups
        .iter()
        .filter_map(|group| {
            let linked: Vec<String> = group
                .detail_paths
                .iter()
                .filter(|path| !path.is_empty())
                .cloned()
                .collect();
            let path = get_most_common_url(&linked);
            (!path.is_empty()).then_some((group, path))
        })
        .collect();
    info!(
        "Fetching profiles for {} of {} members",
        resolvable.len(),
        groups.len()
    );

    let mut details = HashMap::new();
    for (i, (group, path)) in resolvable.iter().enumerate() {
        info!(
            "Profile {}/{}: {} ({} municipalities)",
            i + 1,
            resolvable.len(),
            group.member,
            group.seats.len()
        );
        let info = scrape_detailed_legislator_info(source, config, path, &group.member).await?;
        details.insert(group.member.clone(), info);
    }
    Ok(details)
}

/// One record per listing row, with its member's profile attached.
pub fn build_records(
    rows: &[ListingRow],
    details: &HashMap<String, DetailInfo>,
) -> Vec<LegislatorRecord> {
    let unresolved = DetailInfo::default();
    rows.iter()
        .map(|row| {
            let info = details.get(&row.entry.member).unwrap_or(&unresolved);
            LegislatorRecord {
                district: row.entry.district.clone(),
                town: row.entry.town.clone(),
                member: row.entry.member.clone(),
                party: row.entry.party.clone(),
                email: info.email.clone(),
                phone: info.phone.clone(),
                committees: info.committees.clone(),
            }
        })
        .collect()
}

/// Walks every listing page, then every distinct member's profile.
pub async fn scrape_roster(
    source: &impl PageSource,
    config: &ScrapingConfig,
) -> anyhow::Result<Vec<LegislatorRecord>> {
    let letters = get_pagination(source, config).await?;

    let mut rows = vec![];
    for (i, letter) in letters.iter().enumerate() {
        info!("Listing page {}/{}: {letter}", i + 1, letters.len());
        rows.extend(collect_municipality_data(source, config, letter).await?);
    }
    info!("Collected {} municipality rows", rows.len());

    let groups = group_by_member(&rows);
    let details = resolve_details(source, config, &groups).await?;
    Ok(build_records(&rows, &details))
}
