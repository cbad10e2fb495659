use catalog_models::CatalogItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// One page out of a paginated catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PagedResult {
    pub page: u32,
    pub results: Vec<CatalogItem>,
    pub total_pages: u32,
}

impl PagedResult {
    /// Page to request next, `None` once the last page has been seen.
    pub fn next_page(&self) -> Option<u32> {
        (self.page < self.total_pages).then(|| self.page + 1)
    }
}

/// A catalog response body, classified once at the API boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogResponse {
    /// Bare array of items with no paging information
    FlatList(Vec<CatalogItem>),
    PagedResult(PagedResult),
    /// Neither shape; carries the reason for logging
    Malformed(String),
}

impl CatalogResponse {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => match parse_items(items) {
                Ok(items) => CatalogResponse::FlatList(items),
                Err(reason) => malformed(reason),
            },
            Value::Object(mut object) => {
                let results = match object.remove("results") {
                    Some(Value::Array(results)) => results,
                    Some(_) => return malformed("`results` is not an array".to_string()),
                    None => return malformed("object has no `results`".to_string()),
                };
                let page = match object.get("page").and_then(Value::as_u64).map(u32::try_from) {
                    Some(Ok(page)) if page >= 1 => page,
                    _ => return malformed("missing or invalid `page`".to_string()),
                };
                // A missing total means there is nothing past this page
                let total_pages = match object.get("total_pages").and_then(Value::as_u64).map(u32::try_from) {
                    None => page,
                    Some(Ok(total)) => total,
                    Some(Err(_)) => return malformed("`total_pages` out of range".to_string()),
                };

                match parse_items(results) {
                    Ok(results) => CatalogResponse::PagedResult(PagedResult { page, results, total_pages }),
                    Err(reason) => malformed(reason),
                }
            }
            other => malformed(format!("unsupported JSON type: {}", json_type(&other))),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, CatalogResponse::Malformed(_))
    }
}

fn malformed(reason: String) -> CatalogResponse {
    warn!("Malformed catalog response: {}", reason);
    CatalogResponse::Malformed(reason)
}

fn parse_items(values: Vec<Value>) -> Result<Vec<CatalogItem>, String> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|e| format!("item {}: {}", index, e))
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn movie(id: u64) -> Value {
        json!({ "id": id, "title": format!("Movie {}", id), "overview": "", "release_date": "2001-01-01" })
    }

    #[test]
    fn test_flat_array_is_flat_list() {
        let response = CatalogResponse::classify(json!([movie(1), movie(2)]));
        match response {
            CatalogResponse::FlatList(items) => {
                assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
            }
            other => panic!("expected flat list, got {:?}", other),
        }
    }

    #[test]
    fn test_paged_object() {
        let response = CatalogResponse::classify(json!({
            "page": 2,
            "results": [movie(3)],
            "total_pages": 5,
            "total_results": 100
        }));
        let CatalogResponse::PagedResult(paged) = response else {
            panic!("expected paged result");
        };
        assert_eq!(paged.page, 2);
        assert_eq!(paged.total_pages, 5);
        assert_eq!(paged.results.len(), 1);
        assert_eq!(paged.next_page(), Some(3));
    }

    #[test]
    fn test_missing_total_pages_means_last_page() {
        let response = CatalogResponse::classify(json!({ "page": 4, "results": [] }));
        let CatalogResponse::PagedResult(paged) = response else {
            panic!("expected paged result");
        };
        assert_eq!(paged.next_page(), None);
    }

    #[test]
    fn test_unknown_shapes_are_malformed() {
        assert!(CatalogResponse::classify(json!({ "status_code": 7, "status_message": "Invalid API key" })).is_malformed());
        assert!(CatalogResponse::classify(json!({ "page": 1, "results": "nope" })).is_malformed());
        assert!(CatalogResponse::classify(json!({ "page": 0, "results": [] })).is_malformed());
        assert!(CatalogResponse::classify(json!("hello")).is_malformed());
        assert!(CatalogResponse::classify(Value::Null).is_malformed());
    }

    #[test]
    fn test_item_without_id_is_malformed() {
        let response = CatalogResponse::classify(json!([movie(1), { "title": "no id" }]));
        assert!(response.is_malformed());
    }

    #[test]
    fn test_page_numbers_beyond_u32_are_malformed() {
        let too_big = u64::from(u32::MAX) + 1;
        assert!(CatalogResponse::classify(json!({ "page": too_big, "results": [] })).is_malformed());
        assert!(CatalogResponse::classify(json!({ "page": 1, "results": [], "total_pages": too_big })).is_malformed());

        let response = CatalogResponse::classify(json!({ "page": 1, "results": [], "total_pages": u32::MAX }));
        let CatalogResponse::PagedResult(paged) = response else {
            panic!("expected a paged result");
        };
        assert_eq!(paged.total_pages, u32::MAX);
        assert_eq!(paged.next_page(), Some(2));
    }
}
