use crate::config::Config;
use crate::error::{PaginationError, Result};
use crate::model::{Catalog, Item};
use crate::pagination::{PageItem, Pagination};
use crate::search::{FieldMatch, Filters, QuickMatch, ScoredMatch, SearchEngine, SearchQuery, SortSpec};

#[derive(Debug, Clone, PartialEq)]
struct ResultRow {
    index: usize,
    score: f64,
    fields: Vec<FieldMatch>,
}

/// One search session: the catalog, the active query, its results and the
/// page window over them.
pub struct AppState {

    pub config: Config,

    catalog: Catalog,

    pub engine: SearchEngine,

    pub query: SearchQuery,

    pub pagination: Pagination,

    results: Vec<ResultRow>,

}

impl AppState {

    pub fn new(config: Config) -> Result<Self> {
        let pagination = Pagination::new(config.pagination.page_size, 0)?;
        Ok(Self {
            engine: SearchEngine::new(config.search.clone()),
            config,
            catalog: Catalog::default(),
            query: SearchQuery::default(),
            pagination,
            results: Vec::new(),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Replaces the catalog. Cached results die with the old version and the
    /// current page is re-clamped against the new result count.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.catalog.replace(items);
        self.refresh();
    }

    pub fn apply_query(&mut self, text: &str) {
        self.query.text = text.to_string();
        self.refresh();
        self.pagination.first_page();
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.query.filters = filters;
        self.refresh();
        self.pagination.first_page();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.query.sort = sort;
        self.refresh();
    }

    /// Whether the results come from a search rather than the plain catalog.
    pub fn search_active(&self) -> bool {
        self.query.is_active()
    }

    pub fn refresh(&mut self) {
        self.results = if self.query.is_active() {
            self.engine
                .search(&self.catalog, &self.query)
                .into_iter()
                .map(|m| ResultRow {
                    index: m.index,
                    score: m.score,
                    fields: m.fields,
                })
                .collect()
        } else {
            (0..self.catalog.len())
                .map(|index| ResultRow { index, score: 0.0, fields: Vec::new() })
                .collect()
        };
        self.pagination.set_total_items(self.results.len());

        log::info!("AppState: query='{}', result_count={}", self.query.text, self.results.len());
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Current page of results.
    pub fn visible(&self) -> Vec<ScoredMatch<'_>> {
        let items = self.catalog.items();
        self.pagination
            .slice(&self.results)
            .iter()
            .filter_map(|row| {
                Some(ScoredMatch {
                    item: items.get(row.index)?,
                    index: row.index,
                    score: row.score,
                    fields: row.fields.clone(),
                })
            })
            .collect()
    }

    pub fn page_bar(&self) -> Vec<PageItem> {
        self.pagination.page_numbers(self.config.pagination.max_pages_to_show)
    }

    pub fn go_to_page(&mut self, page: i64) -> usize {
        self.pagination.go_to_page(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.next_page()
    }

    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev_page()
    }

    pub fn first_page(&mut self) -> bool {
        self.pagination.first_page()
    }

    pub fn last_page(&mut self) -> bool {
        self.pagination.last_page()
    }

    pub fn change_page_size(&mut self, page_size: usize) -> std::result::Result<(), PaginationError> {
        if !self.config.pagination.page_size_options.contains(&page_size) {
            log::warn!(
                "AppState: page size {} is not one of {:?}",
                page_size,
                self.config.pagination.page_size_options
            );
        }
        self.pagination.change_page_size(page_size)
    }

    pub fn lookup(&self, identifier: &str) -> Option<QuickMatch<'_>> {
        self.engine.quick_search(&self.catalog, identifier)
    }

    pub fn suggestions(&self, partial: &str, limit: usize) -> Vec<String> {
        self.engine.suggestions(&self.catalog, partial, limit)
    }

}
