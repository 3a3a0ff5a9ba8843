use thiserror::Error;

/// Invalid pagination input. These are programmer errors; out-of-range
/// page numbers are clamped instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("page size must be at least 1")]
    ZeroPageSize,
    #[error("total item count cannot be negative (got {0})")]
    NegativeTotal(i64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("pagination.page_size must be at least 1")]
    ZeroPageSize,
    #[error("pagination.page_size_options must not be empty or contain 0")]
    BadPageSizeOptions,
    #[error("pagination.page_size {0} is not one of page_size_options")]
    PageSizeNotOffered(usize),
    #[error("search.min_score must be within [0, 1] (got {0})")]
    MinScoreOutOfRange(f64),
    #[error("search.max_results must be at least 1")]
    ZeroMaxResults,
    #[error("search.fields must name at least one field")]
    NoSearchFields,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse items: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event loop error: {0}")]
    EventLoop(#[from] calloop::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
