use serde::Deserialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Raw query; values are kept as strings so junk falls back to defaults
/// instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

fn positive_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

impl From<&PageQuery> for Pagination {
    fn from(q: &PageQuery) -> Self {
        Self {
            page: positive_or(q.page.as_deref(), DEFAULT_PAGE),
            limit: positive_or(q.limit.as_deref(), DEFAULT_LIMIT),
        }
    }
}

impl Pagination {
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total - 1) / self.limit + 1
    }
}
