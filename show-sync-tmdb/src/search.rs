use std::cmp::Ordering;

use show_sync_core::ProviderError;

use crate::client::TmdbClient;
use crate::types::SearchResult;

/// Search TV shows by name, draining every result page.
///
/// Results come back sorted by vote average, then by first air date, both
/// descending, so the strongest recent match is first. An empty query
/// returns an empty list without a request.
pub fn search_tv(client: &TmdbClient, query: &str) -> Result<Vec<SearchResult>, ProviderError> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut results = Vec::new();
    let mut page = 1;
    loop {
        let resp = client.search_tv_page(query, page)?;
        results.extend(resp.results);
        if resp.total_pages == 0 || page >= resp.total_pages {
            break;
        }
        page += 1;
    }

    sort_results(&mut results);
    Ok(results)
}

fn sort_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.vote_average
            .partial_cmp(&a.vote_average)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.first_air_date.cmp(&a.first_air_date))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, vote: f64, date: Option<&str>) -> SearchResult {
        SearchResult {
            id: 0,
            name: name.to_string(),
            first_air_date: date.map(str::to_string),
            vote_average: vote,
            overview: String::new(),
        }
    }

    #[test]
    fn sorts_by_vote_then_recency() {
        let mut results = vec![
            result("old classic", 8.5, Some("1999-01-01")),
            result("new hit", 8.5, Some("2020-01-01")),
            result("weak", 5.0, Some("2024-01-01")),
            result("undated", 8.5, None),
        ];
        sort_results(&mut results);
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["new hit", "old classic", "undated", "weak"]);
    }
}
