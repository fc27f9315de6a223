//! Filtering, ranking and paging of public postings.
//!
//! Everything here is pure: the posting client fetches the live postings from the
//! store, hands them to [`rank`] and enriches only the returned page.

use std::cmp::Reverse;

use percent_encoding::percent_decode_str;

use crate::domain::{Posting, SearchPage, SearchParams};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 50;

/// Decodes a query-string value (`+` as space, `%XX` escapes).
///
/// Values that do not decode to valid UTF-8 are returned unchanged.
pub fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match percent_decode_str(&spaced).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Lower-cases, trims and collapses whitespace runs to a single space.
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    /// Title matches first, then most recently updated.
    Relevance,
    Price { descending: bool },
}

impl SortKey {
    /// `rating` is accepted but ranks like relevance.
    fn parse(sort: &str, order: &str) -> Self {
        match sort.trim().to_lowercase().as_str() {
            "price" => SortKey::Price {
                descending: order.trim().eq_ignore_ascii_case("desc"),
            },
            _ => SortKey::Relevance,
        }
    }
}

#[derive(Debug, Clone)]
struct Criteria {
    query: String,
    category: String,
    city: String,
    district: String,
    price_min: i64,
    price_max: i64,
}

impl Criteria {
    fn from_params(params: &SearchParams) -> Self {
        Self {
            query: normalize(&decode(&params.query)),
            category: normalize(&decode(&params.category)),
            city: normalize(&decode(&params.city)),
            district: normalize(&decode(&params.district)),
            price_min: params.price_min,
            price_max: params.price_max,
        }
    }

    fn matches(&self, posting: &Posting) -> bool {
        if !self.query.is_empty() {
            let haystack = normalize(&format!("{} {}", posting.title, posting.description));
            if !haystack.contains(&self.query) {
                return false;
            }
        }
        exact(&self.category, &posting.category)
            && exact(&self.city, &posting.city)
            && exact(&self.district, &posting.district)
            && (self.price_min <= 0 || posting.price >= self.price_min)
            && (self.price_max <= 0 || posting.price <= self.price_max)
    }

    fn title_hit(&self, posting: &Posting) -> bool {
        !self.query.is_empty() && normalize(&posting.title).contains(&self.query)
    }
}

fn exact(wanted: &str, actual: &str) -> bool {
    wanted.is_empty() || normalize(actual) == wanted
}

/// Resolves the requested page window.
///
/// A missing or out-of-range limit falls back to [`DEFAULT_LIMIT`]; a missing or
/// negative offset starts at zero.
pub fn page_window(limit: Option<i64>, offset: Option<i64>) -> (usize, usize) {
    let limit = limit
        .and_then(|l| usize::try_from(l).ok())
        .filter(|l| (1..=MAX_LIMIT).contains(l))
        .unwrap_or(DEFAULT_LIMIT);
    let offset = offset.and_then(|o| usize::try_from(o).ok()).unwrap_or(0);
    (limit, offset)
}

/// Filters out archived and non-matching postings, sorts the rest and cuts one page.
///
/// Sorting is stable, so postings that compare equal keep the order they came in.
pub fn rank(postings: Vec<Posting>, params: &SearchParams) -> SearchPage {
    let criteria = Criteria::from_params(params);
    let mut filtered: Vec<Posting> = postings
        .into_iter()
        .filter(|p| !p.archived && criteria.matches(p))
        .collect();

    match SortKey::parse(&params.sort, &params.order) {
        SortKey::Price { descending: false } => filtered.sort_by_key(|p| p.price),
        SortKey::Price { descending: true } => filtered.sort_by_key(|p| Reverse(p.price)),
        SortKey::Relevance => {
            filtered.sort_by_key(|p| (Reverse(criteria.title_hit(p)), Reverse(p.updated_at)))
        }
    }

    let (limit, offset) = page_window(params.limit, params.offset);
    if offset >= filtered.len() {
        return SearchPage {
            items: Vec::new(),
            next_offset: None,
        };
    }
    let end = (offset + limit).min(filtered.len());
    let next_offset = (end < filtered.len()).then_some(end);
    let items = filtered.drain(offset..end).collect();

    SearchPage { items, next_offset }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rstest::rstest;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn posting(id: &str, title: &str, category: &str, price: i64, minutes: i64) -> Posting {
        let at = base() + Duration::minutes(minutes);
        Posting {
            id: id.into(),
            provider_id: "p1".into(),
            provider_name: "Paula".into(),
            title: title.into(),
            description: format!("{title} service"),
            price,
            category: category.into(),
            city: "Recife".into(),
            district: "Boa Viagem".into(),
            archived: false,
            created_at: at,
            updated_at: at,
            provider_avg: None,
        }
    }

    fn ids(page: &SearchPage) -> Vec<&str> {
        page.items.iter().map(|p| p.id.as_str()).collect()
    }

    fn catalogue() -> Vec<Posting> {
        vec![
            posting("a", "House cleaning", "cleaning", 2000, 1),
            posting("b", "Garden care", "gardening", 3000, 2),
            posting("c", "Office cleaning", "Cleaning", 4500, 3),
            posting("d", "Window cleaning", "cleaning", 1200, 4),
            posting("e", "Pool cleaning", "cleaning", 9000, 5),
        ]
    }

    #[test]
    fn decode_handles_plus_and_escapes() {
        assert_eq!(decode("S%C3%A3o+Paulo"), "São Paulo");
        assert_eq!(decode("100%"), "100%");
        assert_eq!(decode("%FF%FE"), "%FF%FE");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  Boa \t  VIAGEM  "), "boa viagem");
    }

    #[test]
    fn category_price_band_pages_one_at_a_time() {
        let mut params = SearchParams {
            category: "cleaning".into(),
            price_min: 1000,
            price_max: 5000,
            limit: Some(1),
            ..SearchParams::default()
        };

        let first = rank(catalogue(), &params);
        assert_eq!(first.items.len(), 1);
        assert_eq!(first.next_offset, Some(1));

        params.offset = Some(1);
        let second = rank(catalogue(), &params);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.next_offset, Some(2));
        assert_ne!(first.items[0].id, second.items[0].id);

        params.offset = Some(3);
        let past_end = rank(catalogue(), &params);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.next_offset, None);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(50)]
    fn following_next_offset_visits_everything_once(#[case] limit: i64) {
        let full = rank(
            catalogue(),
            &SearchParams {
                limit: Some(50),
                ..SearchParams::default()
            },
        );

        let mut seen = Vec::new();
        let mut offset = Some(0);
        while let Some(start) = offset {
            let page = rank(
                catalogue(),
                &SearchParams {
                    limit: Some(limit),
                    offset: Some(i64::try_from(start).unwrap()),
                    ..SearchParams::default()
                },
            );
            seen.extend(page.items.into_iter().map(|p| p.id));
            offset = page.next_offset;
        }

        let expected: Vec<String> = full.items.into_iter().map(|p| p.id).collect();
        assert_eq!(seen, expected);
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn relevance_prefers_title_hits_then_recency() {
        let mut postings = catalogue();
        postings[1].description = "Also does window cleaning".into();

        let page = rank(
            postings,
            &SearchParams {
                query: "CLEANING".into(),
                ..SearchParams::default()
            },
        );
        assert_eq!(ids(&page), vec!["e", "d", "c", "a", "b"]);
    }

    #[test]
    fn rating_sort_ranks_like_relevance() {
        let params = SearchParams {
            query: "cleaning".into(),
            sort: "rating".into(),
            ..SearchParams::default()
        };
        let relevance = SearchParams {
            sort: String::new(),
            ..params.clone()
        };
        assert_eq!(rank(catalogue(), &params), rank(catalogue(), &relevance));
    }

    #[rstest]
    #[case("asc", vec!["d", "a", "b", "c", "e"])]
    #[case("DESC", vec!["e", "c", "b", "a", "d"])]
    fn price_sort(#[case] order: &str, #[case] expected: Vec<&str>) {
        let page = rank(
            catalogue(),
            &SearchParams {
                sort: "price".into(),
                order: order.into(),
                ..SearchParams::default()
            },
        );
        assert_eq!(ids(&page), expected);
    }

    #[test]
    fn location_filters_are_exact_after_normalizing() {
        let params = SearchParams {
            district: "boa%20%20viagem".into(),
            city: "recif".into(),
            ..SearchParams::default()
        };
        assert!(rank(catalogue(), &params).items.is_empty());

        let params = SearchParams {
            city: "  RECIFE ".into(),
            district: "Boa+Viagem".into(),
            ..SearchParams::default()
        };
        assert_eq!(rank(catalogue(), &params).items.len(), 5);
    }

    #[test]
    fn archived_postings_never_match() {
        let mut postings = catalogue();
        postings[0].archived = true;
        let page = rank(postings, &SearchParams::default());
        assert!(!ids(&page).contains(&"a"));
    }

    #[rstest]
    #[case(None, None, (20, 0))]
    #[case(Some(0), Some(-4), (20, 0))]
    #[case(Some(51), Some(3), (20, 3))]
    #[case(Some(50), Some(0), (50, 0))]
    #[case(Some(7), None, (7, 0))]
    fn window_defaults(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] expected: (usize, usize),
    ) {
        assert_eq!(page_window(limit, offset), expected);
    }
}
