//! Fuzzy search over a [`Catalog`].
//!
//! A search runs in a fixed order:
//!
//! 1. Empty text with no filters is "no search active" and yields nothing.
//! 2. Every item is scored against the configured fields; items at or
//!    below `min_score` are dropped.
//! 3. Hits are sorted by relevance or by a field.
//! 4. Structured filters are applied (AND).
//! 5. The list is truncated to `max_results`.
//! 6. Non-empty results of a non-empty query are recorded in the history.
//!
//! Results are cached per query and dropped whenever the catalog version
//! changes.

use log::debug;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Range;

use crate::config::SearchConfig;
use crate::matcher::{FuzzyMatcher, lowered};
use crate::model::{Catalog, FieldKind, Item, ItemField};
use crate::sources::history::SearchHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortSpec {
    #[default]
    Relevance,
    Field { field: ItemField, direction: SortDirection },
}

impl std::str::FromStr for SortSpec {
    type Err = String;

    /// `relevance`, `price`, `price:desc`, `name:asc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("relevance") {
            return Ok(SortSpec::Relevance);
        }
        let (field, direction) = match s.split_once(':') {
            Some((field, dir)) => {
                let direction = match dir.to_ascii_lowercase().as_str() {
                    "asc" => SortDirection::Asc,
                    "desc" => SortDirection::Desc,
                    other => return Err(format!("unknown sort direction '{}'", other)),
                };
                (field, direction)
            }
            None => (s, SortDirection::Asc),
        };
        Ok(SortSpec::Field { field: field.parse()?, direction })
    }
}

/// Structured predicates, combined with AND. Unset predicates pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub category: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub in_stock_only: bool,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.status.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_stock.is_none()
            && self.max_stock.is_none()
            && !self.in_stock_only
    }

    pub fn matches(&self, item: &Item) -> bool {
        if let Some(category) = &self.category {
            if !item.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if !item.status.eq_ignore_ascii_case(status) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| item.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| item.price > max) {
            return false;
        }
        if self.min_stock.is_some_and(|min| item.quantity < min) {
            return false;
        }
        if self.max_stock.is_some_and(|max| item.quantity > max) {
            return false;
        }
        !self.in_stock_only || item.is_in_stock()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub filters: Filters,
    pub sort: SortSpec,
}

impl SearchQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// False when the text is blank and no filter is set.
    pub fn is_active(&self) -> bool {
        !self.text.trim().is_empty() || !self.filters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub field: ItemField,
    pub score: f64,
    pub spans: Vec<Range<usize>>,
}

/// Outcome of scoring a single item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemMatch {
    pub score: f64,
    pub fields: Vec<FieldMatch>,
}

#[derive(Debug, Clone, PartialEq)]
struct Hit {
    index: usize,
    score: f64,
    fields: Vec<FieldMatch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch<'a> {
    pub item: &'a Item,
    pub index: usize,          // Position in the catalog
    pub score: f64,
    pub fields: Vec<FieldMatch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuickMatch<'a> {
    pub item: &'a Item,
    pub index: usize,
    pub score: f64,
    pub exact: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text: String,
    category: Option<String>,
    status: Option<String>,
    min_price: Option<u64>,
    max_price: Option<u64>,
    min_stock: Option<i64>,
    max_stock: Option<i64>,
    in_stock_only: bool,
    sort: SortSpec,
}

impl CacheKey {
    fn new(query: &SearchQuery) -> Self {
        let f = &query.filters;
        Self {
            text: lowered(query.text.trim()).into_iter().collect(),
            category: f.category.as_ref().map(|c| c.to_ascii_lowercase()),
            status: f.status.as_ref().map(|s| s.to_ascii_lowercase()),
            min_price: f.min_price.map(f64::to_bits),
            max_price: f.max_price.map(f64::to_bits),
            min_stock: f.min_stock,
            max_stock: f.max_stock,
            in_stock_only: f.in_stock_only,
            sort: query.sort,
        }
    }
}

/// Distinct queries kept per catalog version before the cache starts over.
const CACHE_CAPACITY: usize = 64;

pub struct SearchEngine {
    config: SearchConfig,
    matcher: FuzzyMatcher,
    history: SearchHistory,
    cache: HashMap<CacheKey, Vec<Hit>>,
    cache_version: Option<u64>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            matcher: FuzzyMatcher::new(config.fuzzy_match, config.weights),
            history: SearchHistory::with_capacity(config.history_size),
            cache: HashMap::new(),
            cache_version: None,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_fuzzy_match(&mut self, fuzzy: bool) {
        self.config.fuzzy_match = fuzzy;
        self.matcher.fuzzy = fuzzy;
        self.clear_cache();
    }

    pub fn set_min_score(&mut self, min_score: f64) {
        self.config.min_score = min_score;
        self.clear_cache();
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    /// Replaces the history, e.g. with one loaded from disk. The configured
    /// capacity still applies.
    pub fn set_history(&mut self, mut history: SearchHistory) {
        history.set_capacity(self.config.history_size);
        self.history = history;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Scores one field of an item; 0 when it does not match.
    pub fn score(&self, item: &Item, field: ItemField, text: &str) -> f64 {
        self.matcher.score(&field.text(item), text)
    }

    /// Averages the scores of fields that beat `min_score`. Fields below the
    /// threshold are left out of the average rather than counted as zero.
    pub fn search_in_item(&self, item: &Item, text: &str) -> ItemMatch {
        let fields: Vec<FieldMatch> = self
            .config
            .fields
            .iter()
            .filter_map(|&field| {
                let hit = self.matcher.score_field(&field.text(item), text)?;
                (hit.score > self.config.min_score).then_some(FieldMatch {
                    field,
                    score: hit.score,
                    spans: hit.spans,
                })
            })
            .collect();

        if fields.is_empty() {
            return ItemMatch::default();
        }
        let score = fields.iter().map(|f| f.score).sum::<f64>() / fields.len() as f64;
        ItemMatch { score, fields }
    }

    pub fn search<'a>(&mut self, catalog: &'a Catalog, query: &SearchQuery) -> Vec<ScoredMatch<'a>> {
        if !query.is_active() {
            return Vec::new();
        }
        self.sync_catalog(catalog);

        let key = CacheKey::new(query);
        let hits = match self.cache.get(&key) {
            Some(hits) => {
                debug!("SearchEngine: cache hit for '{}'", key.text);
                hits.clone()
            }
            None => {
                let hits = self.compute(catalog, query);
                if self.cache.len() >= CACHE_CAPACITY {
                    debug!("SearchEngine: cache full, dropping {} entries", self.cache.len());
                    self.cache.clear();
                }
                self.cache.insert(key, hits.clone());
                hits
            }
        };

        let text = query.text.trim();
        if !hits.is_empty() && !text.is_empty() {
            self.history.record(text, hits.len());
        }

        let items = catalog.items();
        hits.into_iter()
            .map(|hit| ScoredMatch {
                item: &items[hit.index],
                index: hit.index,
                score: hit.score,
                fields: hit.fields,
            })
            .collect()
    }

    fn sync_catalog(&mut self, catalog: &Catalog) {
        if self.cache_version != Some(catalog.version()) {
            if !self.cache.is_empty() {
                debug!("SearchEngine: catalog changed, dropping {} cached results", self.cache.len());
            }
            self.cache.clear();
            self.cache_version = Some(catalog.version());
        }
    }

    fn compute(&self, catalog: &Catalog, query: &SearchQuery) -> Vec<Hit> {
        let items = catalog.items();
        let text = query.text.trim();

        let mut hits: Vec<Hit> = if text.is_empty() {
            // Filter-only browse: everything is equally relevant.
            (0..items.len())
                .map(|index| Hit { index, score: 1.0, fields: Vec::new() })
                .collect()
        } else {
            items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    let m = self.search_in_item(item, text);
                    (m.score > self.config.min_score).then_some(Hit {
                        index,
                        score: m.score,
                        fields: m.fields,
                    })
                })
                .collect()
        };

        match query.sort {
            SortSpec::Relevance => hits.sort_by(|a, b| b.score.total_cmp(&a.score)),
            SortSpec::Field { field, direction } => hits.sort_by(|a, b| {
                let ord = compare_field(field, &items[a.index], &items[b.index]);
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }),
        }

        hits.retain(|hit| query.filters.matches(&items[hit.index]));
        hits.truncate(self.config.max_results);

        debug!("SearchEngine: query='{}', hits={}", text, hits.len());
        hits
    }

    /// Exact identifier lookup for scanner input: SKU, then barcode, then
    /// numeric id. Only when none of them hits is a fuzzy match attempted.
    pub fn quick_search<'a>(&self, catalog: &'a Catalog, identifier: &str) -> Option<QuickMatch<'a>> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return None;
        }
        let items = catalog.items();
        let exact = |index: usize| QuickMatch {
            item: &items[index],
            index,
            score: 1.0,
            exact: true,
        };

        let lowered = identifier.to_lowercase();
        if let Some(index) = items
            .iter()
            .position(|i| !i.sku.is_empty() && i.sku.to_lowercase() == lowered)
        {
            return Some(exact(index));
        }
        if let Some(index) = items.iter().position(|i| !i.barcode.is_empty() && i.barcode == identifier) {
            return Some(exact(index));
        }
        if let Ok(id) = identifier.parse::<u64>() {
            if let Some(index) = items.iter().position(|i| i.id == id) {
                return Some(exact(index));
            }
        }

        let mut best: Option<QuickMatch<'a>> = None;
        for (index, item) in items.iter().enumerate() {
            let haystack = format!("{} {} {}", item.name, item.sku, item.barcode);
            let score = self.matcher.score(&haystack, identifier);
            if score > self.config.min_score && best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(QuickMatch { item, index, score, exact: false });
            }
        }
        best
    }

    /// Plain substring completions from history first, then item fields.
    pub fn suggestions(&self, catalog: &Catalog, partial: &str, limit: usize) -> Vec<String> {
        let needle = partial.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        let from_history = self.history.queries().map(str::to_string);
        let from_items = catalog.items().iter().flat_map(|item| {
            [&item.name, &item.category, &item.sku, &item.supplier]
                .into_iter()
                .map(|s| s.to_string())
        });

        for candidate in from_history.chain(from_items) {
            if candidate.is_empty() || !candidate.to_lowercase().contains(&needle) {
                continue;
            }
            if seen.insert(candidate.to_lowercase()) {
                out.push(candidate);
                if out.len() >= limit {
                    break;
                }
            }
        }
        out
    }
}

fn compare_field(field: ItemField, a: &Item, b: &Item) -> Ordering {
    match field.kind() {
        FieldKind::Number => {
            let (x, y) = (field.number(a).unwrap_or(0.0), field.number(b).unwrap_or(0.0));
            x.total_cmp(&y)
        }
        FieldKind::Text => field.text(a).to_lowercase().cmp(&field.text(b).to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, name: &str, category: &str, price: f64, quantity: i64) -> Item {
        let mut item = Item::new(id, name);
        item.category = category.to_string();
        item.price = price;
        item.quantity = quantity;
        item
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            item(1, "Laptop HP Pavilion", "Electronics", 899.0, 5),
            item(2, "Mouse Logitech", "Electronics", 25.0, 0),
            item(3, "Office Chair", "Furniture", 149.0, 12),
            item(4, "Laptop Stand", "Accessories", 39.0, 30),
        ])
    }

    fn names<'a>(matches: &[ScoredMatch<'a>]) -> Vec<&'a str> {
        matches.iter().map(|m| m.item.name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_without_filters_returns_nothing() {
        let mut engine = SearchEngine::default();
        let cat = catalog();
        assert!(engine.search(&cat, &SearchQuery::text("   ")).is_empty());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_relevance_orders_best_match_first() {
        let mut engine = SearchEngine::default();
        let cat = catalog();
        let results = engine.search(&cat, &SearchQuery::text("laptop s"));
        assert_eq!(names(&results)[0], "Laptop Stand");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_fields_below_threshold_are_not_averaged_in() {
        let mut engine = SearchEngine::default();
        engine.config.fields = vec![ItemField::Name, ItemField::Category];
        let it = item(9, "Chair", "Furniture", 10.0, 1);
        let m = engine.search_in_item(&it, "chair");
        assert_eq!(m.fields.len(), 1);
        assert_eq!(m.fields[0].field, ItemField::Name);
        assert!((m.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sort_by_price_descending() {
        let mut engine = SearchEngine::default();
        let cat = catalog();
        let query = SearchQuery {
            text: "laptop".into(),
            sort: "price:desc".parse().unwrap(),
            ..Default::default()
        };
        assert_eq!(names(&engine.search(&cat, &query)), vec!["Laptop HP Pavilion", "Laptop Stand"]);
    }

    #[test]
    fn test_sort_by_name_is_case_insensitive() {
        let mut engine = SearchEngine::default();
        let cat = Catalog::new(vec![item(1, "banana box", "", 1.0, 1), item(2, "Apple box", "", 1.0, 1)]);
        let query = SearchQuery {
            text: "box".into(),
            sort: "name".parse().unwrap(),
            ..Default::default()
        };
        assert_eq!(names(&engine.search(&cat, &query)), vec!["Apple box", "banana box"]);
    }

    #[test]
    fn test_filters_are_anded() {
        let mut engine = SearchEngine::default();
        let cat = catalog();
        let mut query = SearchQuery::text("o");
        query.filters.category = Some("electronics".into());
        query.filters.in_stock_only = true;
        assert_eq!(names(&engine.search(&cat, &query)), vec!["Laptop HP Pavilion"]);
    }

    #[test]
    fn test_filter_only_browse_keeps_catalog_order() {
        let mut engine = SearchEngine::default();
        let cat = catalog();
        let mut query = SearchQuery::default();
        query.filters.max_price = Some(100.0);
        assert_eq!(names(&engine.search(&cat, &query)), vec!["Mouse Logitech", "Laptop Stand"]);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_results_are_truncated() {
        let mut engine = SearchEngine::new(SearchConfig { max_results: 1, ..Default::default() });
        let cat = catalog();
        assert_eq!(engine.search(&cat, &SearchQuery::text("laptop")).len(), 1);
    }

    #[test]
    fn test_history_only_records_non_empty_results() {
        let mut engine = SearchEngine::default();
        let cat = catalog();
        engine.search(&cat, &SearchQuery::text("zzzz"));
        engine.search(&cat, &SearchQuery::text("chair"));
        assert_eq!(engine.history().queries().collect::<Vec<_>>(), vec!["chair"]);
        assert_eq!(engine.history().entries().next().unwrap().result_count, 1);
    }

    #[test]
    fn test_cache_is_dropped_when_catalog_changes() {
        let mut engine = SearchEngine::default();
        let mut cat = catalog();
        assert_eq!(engine.search(&cat, &SearchQuery::text("chair")).len(), 1);
        cat.replace(vec![item(1, "Chair", "", 1.0, 1), item(2, "Armchair", "", 1.0, 1)]);
        assert_eq!(engine.search(&cat, &SearchQuery::text("chair")).len(), 2);
    }

    #[test]
    fn test_cache_stays_bounded() {
        let mut engine = SearchEngine::default();
        let cat = catalog();
        for i in 0..(CACHE_CAPACITY * 3) {
            engine.search(&cat, &SearchQuery::text(format!("lap {}", i)));
            assert!(engine.cache.len() <= CACHE_CAPACITY);
        }
        assert_eq!(engine.search(&cat, &SearchQuery::text("chair")).len(), 1);
    }

    #[test]
    fn test_cache_key_uses_matcher_lowercasing() {
        let mut engine = SearchEngine::default();
        let cat = Catalog::new(vec![item(1, "ας", "", 1.0, 1)]);
        // Char-wise lowering keeps "ΑΣ" as "ασ", which differs from "ας".
        assert!(engine.search(&cat, &SearchQuery::text("ΑΣ")).is_empty());
        assert_eq!(engine.search(&cat, &SearchQuery::text("ας")).len(), 1);
    }

    #[test]
    fn test_repeated_search_is_identical() {
        let mut engine = SearchEngine::default();
        let cat = catalog();
        let first = engine.search(&cat, &SearchQuery::text("lap"));
        let second = engine.search(&cat, &SearchQuery::text("lap"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_quick_search_prefers_exact_identifiers() {
        let engine = SearchEngine::default();
        let mut items = catalog().items().to_vec();
        items[3].sku = "LAP-001".into();
        items[0].name = "LAP-001 Laptop".into();
        items[1].barcode = "7501234567890".into();
        let cat = Catalog::new(items);

        let hit = engine.quick_search(&cat, "lap-001").unwrap();
        assert!(hit.exact);
        assert_eq!(hit.item.id, 4);

        let hit = engine.quick_search(&cat, "7501234567890").unwrap();
        assert!(hit.exact);
        assert_eq!(hit.item.id, 2);

        let hit = engine.quick_search(&cat, "3").unwrap();
        assert!(hit.exact);
        assert_eq!(hit.item.id, 3);
    }

    #[test]
    fn test_quick_search_falls_back_to_fuzzy() {
        let engine = SearchEngine::default();
        let cat = catalog();
        let hit = engine.quick_search(&cat, "office chair").unwrap();
        assert!(!hit.exact);
        assert_eq!(hit.item.id, 3);
        assert!(engine.quick_search(&cat, "qqqqqq").is_none());
    }

    #[test]
    fn test_suggestions_mix_history_and_fields() {
        let mut engine = SearchEngine::default();
        let cat = catalog();
        engine.search(&cat, &SearchQuery::text("lapt"));
        let got = engine.suggestions(&cat, "LAP", 10);
        assert_eq!(got, vec!["lapt", "Laptop HP Pavilion", "Laptop Stand"]);
        assert_eq!(engine.suggestions(&cat, "lap", 1).len(), 1);
        assert!(engine.suggestions(&cat, "", 10).is_empty());
    }

    #[test]
    fn test_sort_spec_parsing() {
        assert_eq!("relevance".parse::<SortSpec>().unwrap(), SortSpec::Relevance);
        assert_eq!(
            "quantity:desc".parse::<SortSpec>().unwrap(),
            SortSpec::Field { field: ItemField::Quantity, direction: SortDirection::Desc }
        );
        assert!("price:sideways".parse::<SortSpec>().is_err());
    }
}
