//! Page-number pagination: `?page=N&limit=M`.

use crate::error::PageError;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// A malformed `limit` falls back to the default size; a malformed `page`
    /// is an error.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Result<Self, PageError> {
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map(|l| l.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let page = match page.map(str::trim).filter(|p| !p.is_empty()) {
            None => 1,
            Some(p) => match p.parse::<i64>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(PageError::InvalidPage),
            },
        };

        Ok(Self { page, limit })
    }

    /// Reads `page` and `limit` from query pairs, ignoring everything else.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, PageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut page = None;
        let mut limit = None;
        for (key, value) in pairs {
            match key.as_ref() {
                "page" => page = Some(value.as_ref().to_string()),
                "limit" => limit = Some(value.as_ref().to_string()),
                _ => {}
            }
        }
        Self::from_params(page.as_deref(), limit.as_deref())
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn num_pages(&self, count: i64) -> i64 {
        if count <= 0 {
            1
        } else {
            (count + self.limit - 1) / self.limit
        }
    }

    /// The first page is always valid, even when empty.
    pub fn check_in_range(&self, count: i64) -> Result<(), PageError> {
        if self.page == 1 || self.page <= self.num_pages(count) {
            Ok(())
        } else {
            Err(PageError::InvalidPage)
        }
    }
}

/// One page of results with links to its neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// `query` is the request's own query pairs; links keep them and only
    /// swap the page number.
    pub fn new(
        request: PageRequest,
        count: i64,
        results: Vec<T>,
        path: &str,
        query: &[(String, String)],
    ) -> Self {
        let last = request.num_pages(count);
        let next = (request.page < last).then(|| page_link(path, query, Some(request.page + 1)));
        let previous = match request.page {
            1 => None,
            // the first page drops the parameter entirely
            2 => Some(page_link(path, query, None)),
            p => Some(page_link(path, query, Some(p - 1))),
        };
        Self {
            count,
            next,
            previous,
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

fn page_link(path: &str, query: &[(String, String)], page: Option<i64>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in query.iter().filter(|(k, _)| k != "page") {
        serializer.append_pair(key, value);
    }
    if let Some(page) = page {
        serializer.append_pair("page", &page.to_string());
    }
    let encoded = serializer.finish();
    if encoded.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let req = PageRequest::from_params(None, None).unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.limit, 6);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_limit_override_and_cap() {
        assert_eq!(PageRequest::from_params(None, Some("10")).unwrap().limit, 10);
        assert_eq!(
            PageRequest::from_params(None, Some("100000")).unwrap().limit,
            MAX_PAGE_SIZE
        );
        assert_eq!(
            PageRequest::from_params(None, Some("abc")).unwrap().limit,
            DEFAULT_PAGE_SIZE
        );
        assert_eq!(
            PageRequest::from_params(None, Some("0")).unwrap().limit,
            DEFAULT_PAGE_SIZE
        );
    }

    #[test]
    fn test_bad_page() {
        assert_eq!(
            PageRequest::from_params(Some("zero"), None),
            Err(PageError::InvalidPage)
        );
        assert_eq!(
            PageRequest::from_params(Some("0"), None),
            Err(PageError::InvalidPage)
        );
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::from_params(Some("3"), Some("4")).unwrap();
        assert_eq!(req.offset(), 8);
    }

    #[test]
    fn test_range_check() {
        let req = PageRequest { page: 3, limit: 6 };
        assert!(req.check_in_range(13).is_ok());
        assert_eq!(req.check_in_range(12), Err(PageError::InvalidPage));
        assert!(PageRequest::default().check_in_range(0).is_ok());
    }

    #[test]
    fn test_links_keep_filters() {
        let query = pairs(&[("tags", "lunch"), ("page", "2"), ("limit", "2")]);
        let req = PageRequest::from_pairs(query.clone()).unwrap();
        let page = Page::new(req, 5, vec![3, 4], "/api/recipes/", &query);

        assert_eq!(page.count, 5);
        assert_eq!(
            page.next.as_deref(),
            Some("/api/recipes/?tags=lunch&limit=2&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("/api/recipes/?tags=lunch&limit=2")
        );
    }

    #[test]
    fn test_single_page_has_no_links() {
        let page = Page::new(PageRequest::default(), 2, vec!["a", "b"], "/api/users/", &[]);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[test]
    fn test_previous_from_page_three() {
        let req = PageRequest { page: 3, limit: 1 };
        let page = Page::new(req, 3, vec![()], "/api/users/", &[]);
        assert_eq!(page.previous.as_deref(), Some("/api/users/?page=2"));
        assert!(page.next.is_none());
    }
}
