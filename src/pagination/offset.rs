use axum::http::header::HeaderMap;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use utoipa::openapi::{RefOr, schema::Schema};
use utoipa::{PartialSchema, ToSchema};

/// Placeholder shown for a run of hidden page numbers.
pub const GAP: &str = "...";

/// One entry of a windowed page list: a page number or a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u64),
    Gap,
}

impl PageItem {
    #[must_use]
    pub const fn is_gap(self) -> bool {
        matches!(self, Self::Gap)
    }
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{n}"),
            Self::Gap => f.write_str(GAP),
        }
    }
}

/// Pages serialize as numbers, gaps as `"..."`.
impl Serialize for PageItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Page(n) => serializer.serialize_u64(*n),
            Self::Gap => serializer.serialize_str(GAP),
        }
    }
}

impl ToSchema for PageItem {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("PageItem")
    }
}

// Either a page number or the gap marker string
impl PartialSchema for PageItem {
    fn schema() -> RefOr<Schema> {
        use utoipa::openapi::schema::{ObjectBuilder, OneOfBuilder, Type};

        RefOr::T(Schema::OneOf(
            OneOfBuilder::new()
                .item(Schema::Object(
                    ObjectBuilder::new().schema_type(Type::Integer).into(),
                ))
                .item(Schema::Object(
                    ObjectBuilder::new()
                        .schema_type(Type::String)
                        .enum_values(Some([GAP]))
                        .into(),
                ))
                .into(),
        ))
    }
}

/// Pagination metadata for a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_prev: bool,
    pub prev_page: u64,
    pub has_next: bool,
    pub next_page: u64,
}

/// Offset pagination over `count` rows, `limit` per page, starting at row `skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    skip: u64,
    page: u64,
    limit: u64,
    count: u64,
    total_pages: u64,
}

impl Paginator {
    /// Negative `skip` and `count` clamp to zero and a negative `limit` counts by its
    /// absolute value. A zero limit yields a single page.
    #[must_use]
    pub fn new(skip: i64, limit: i64, count: i64) -> Self {
        let skip = skip.max(0).unsigned_abs();
        let limit = limit.unsigned_abs();
        let count = count.max(0).unsigned_abs();

        let page = if limit > 0 { skip / limit + 1 } else { 1 };
        let total_pages = if count == 0 || limit == 0 {
            1
        } else {
            count.div_ceil(limit)
        };

        Self {
            skip,
            page,
            limit,
            count,
            total_pages,
        }
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Previous page number, or the current one on the first page.
    #[must_use]
    pub const fn prev_page(&self) -> u64 {
        if self.has_prev() { self.page - 1 } else { self.page }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Next page number, or the current one on the last page.
    #[must_use]
    pub const fn next_page(&self) -> u64 {
        if self.has_next() { self.page + 1 } else { self.page }
    }

    /// Page numbers for a pager widget.
    ///
    /// Keeps the first `left_edge` pages, `left_current` pages before and `right_current`
    /// pages after the current one, and the last `right_edge` pages. Runs of skipped
    /// numbers become a single [`PageItem::Gap`], including any run before the first kept
    /// page.
    ///
    /// With 17 pages, page 9 and `(2, 5, 5, 2)`: `1 2 ... 4 5 6 7 8 9 10 11 12 13 14 ... 16 17`.
    #[must_use]
    pub fn iter_range(
        &self,
        left_edge: u64,
        left_current: u64,
        right_current: u64,
        right_edge: u64,
    ) -> Vec<PageItem> {
        let total = self.total_pages;
        let mut pages = BTreeSet::new();

        pages.extend(1..=left_edge.min(total));

        let start = self.page.saturating_sub(left_current).max(1);
        let end = self.page.saturating_add(right_current).min(total);
        pages.extend(start..=end);

        let tail = total.saturating_sub(right_edge).saturating_add(1).max(1);
        if right_edge > 0 {
            pages.extend(tail..=total);
        }

        let mut items = Vec::with_capacity(pages.len() * 2);
        let mut last = 0;
        for page in pages {
            if page != last + 1 {
                items.push(PageItem::Gap);
            }
            items.push(PageItem::Page(page));
            last = page;
        }
        items
    }

    /// Snapshot of the pagination state.
    #[must_use]
    pub const fn info(&self) -> PageInfo {
        PageInfo {
            page: self.page,
            limit: self.limit,
            total_items: self.count,
            total_pages: self.total_pages,
            has_prev: self.has_prev(),
            prev_page: self.prev_page(),
            has_next: self.has_next(),
            next_page: self.next_page(),
        }
    }

    /// `Content-Range: <resource> <first>-<last>/<total>` for the current window, with
    /// zero-based inclusive indexes.
    ///
    /// A window holding no rows (empty collection, zero limit or a page past the end)
    /// is written as `<resource> */<total>`. Control and non-ASCII characters are
    /// stripped from `resource` so the value is always a valid header.
    #[must_use]
    pub fn content_range(&self, resource: &str) -> HeaderMap {
        let end = self.skip.saturating_add(self.limit).min(self.count);
        let safe_name = sanitize_resource_name(resource);
        let value = if end > self.skip {
            format!("{safe_name} {}-{}/{}", self.skip, end - 1, self.count)
        } else {
            format!("{safe_name} */{}", self.count)
        };

        let mut headers = HeaderMap::new();
        if let Ok(value) = value.parse() {
            headers.insert("Content-Range", value);
        }
        headers
    }
}

/// Strip characters that are not allowed in a header value
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}
