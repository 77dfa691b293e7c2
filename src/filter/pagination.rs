use axum::http::Uri;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::database::Listing;
use crate::error::ApiError;

pub const PAGE_PARAM: &str = "page";

/// LIMIT/OFFSET pair handed to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

/// Validated `?page=&page_size=` parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Parse raw query values. A malformed page number is a 404, a
    /// malformed page size falls back to the default.
    pub fn from_params(page: Option<&str>, page_size: Option<&str>, api: &ApiConfig) -> Result<Self, ApiError> {
        let page = match page.map(str::trim).filter(|p| !p.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(invalid_page()),
            },
        };

        let page_size = page_size
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|&n| n >= 1)
            .map(|n| n.min(api.max_page_size))
            .unwrap_or(api.default_page_size);

        Ok(Self { page, page_size })
    }

    pub fn window(&self) -> PageWindow {
        let limit = i64::from(self.page_size);
        PageWindow {
            limit,
            offset: (i64::from(self.page) - 1) * limit,
        }
    }
}

/// Paginated response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page from a store listing. Pages past the end are a 404;
    /// the first page of an empty listing is an empty page.
    pub fn build<S>(request: PageRequest, listing: Listing<S>, uri: &Uri) -> Result<Self, ApiError>
    where
        S: Into<T>,
    {
        let window = request.window();
        if request.page > 1 && window.offset >= listing.total {
            return Err(invalid_page());
        }

        let has_next = window.offset + window.limit < listing.total;
        let next = has_next.then(|| page_link(uri, request.page + 1));
        let previous = (request.page > 1).then(|| page_link(uri, request.page - 1));

        Ok(Self {
            count: listing.total,
            next,
            previous,
            results: listing.items.into_iter().map(Into::into).collect(),
        })
    }
}

fn invalid_page() -> ApiError {
    ApiError::not_found("Invalid page.")
}

/// Same path and query with the page number replaced; page 1 drops the parameter
fn page_link(uri: &Uri, page: u32) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;

    if let Some(raw) = uri.query() {
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            if key == PAGE_PARAM {
                continue;
            }
            query.append_pair(&key, &value);
            any = true;
        }
    }
    if page > 1 {
        query.append_pair(PAGE_PARAM, &page.to_string());
        any = true;
    }

    let query = query.finish();
    if any {
        format!("{}?{}", uri.path(), query)
    } else {
        uri.path().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn api() -> ApiConfig {
        ApiConfig {
            default_page_size: 2,
            max_page_size: 5,
            max_request_size_bytes: 1024,
            allow_registration: true,
        }
    }

    fn listing(total: i64, items: Vec<i64>) -> Listing<i64> {
        Listing { items, total }
    }

    #[test]
    fn defaults_and_caps_page_size() {
        let req = PageRequest::from_params(None, None, &api()).unwrap();
        assert_eq!(req, PageRequest { page: 1, page_size: 2 });

        let req = PageRequest::from_params(Some("3"), Some("50"), &api()).unwrap();
        assert_eq!(req.page_size, 5);
        assert_eq!(req.window(), PageWindow { limit: 5, offset: 10 });

        let req = PageRequest::from_params(None, Some("zero"), &api()).unwrap();
        assert_eq!(req.page_size, 2);
    }

    #[test]
    fn rejects_malformed_page_numbers() {
        assert!(PageRequest::from_params(Some("0"), None, &api()).is_err());
        assert!(PageRequest::from_params(Some("-1"), None, &api()).is_err());
        assert!(PageRequest::from_params(Some("last"), None, &api()).is_err());
    }

    #[test]
    fn builds_links_preserving_other_params() {
        let uri: Uri = "/kittens/?search=sia&page=2&page_size=2".parse().unwrap();
        let req = PageRequest::from_params(Some("2"), Some("2"), &api()).unwrap();
        let page: Page<i64> = Page::build(req, listing(5, vec![3, 4]), &uri).unwrap();

        assert_eq!(page.count, 5);
        assert_eq!(page.results, vec![3, 4]);
        assert_eq!(page.next.as_deref(), Some("/kittens/?search=sia&page_size=2&page=3"));
        assert_eq!(page.previous.as_deref(), Some("/kittens/?search=sia&page_size=2"));
    }

    #[test]
    fn empty_first_page_is_fine_but_overshoot_is_not() {
        let uri: Uri = "/kittens/".parse().unwrap();
        let req = PageRequest::from_params(None, None, &api()).unwrap();
        let page: Page<i64> = Page::build(req, listing(0, vec![]), &uri).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.next.is_none() && page.previous.is_none());

        let req = PageRequest::from_params(Some("2"), None, &api()).unwrap();
        let err = Page::<i64>::build(req, listing(2, vec![]), &uri).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn config_defaults_fit_the_window() {
        let config = AppConfig::from_env();
        assert!(config.api.default_page_size <= config.api.max_page_size);
    }
}
