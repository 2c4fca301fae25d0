use bson::{Document, doc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{models::OrderStatus, repository::ListOptions};

pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_direction(&self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Query string shared by the list endpoints. Each endpoint reads only the
/// filters that apply to it.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Field to sort by, e.g. `price` or `createdAt`. Defaults to insertion order.
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
    /// Products: category id.
    pub category: Option<String>,
    /// Products: case-insensitive match on name or description.
    pub q: Option<String>,
    pub featured: Option<bool>,
    /// Homepage content: only active (or inactive) entries.
    pub active: Option<bool>,
    /// Orders: status filter.
    pub status: Option<OrderStatus>,
    /// Reviews: product filter.
    pub product_id: Option<String>,
}

impl ListQuery {
    /// Only plain field names are accepted so a query string cannot smuggle
    /// operators into the sort document.
    fn sort_field(&self) -> Option<String> {
        let field = self.sort_by.as_deref()?.trim();
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some(if field == "id" { "_id".to_string() } else { field.to_string() })
    }

    pub fn list_options(&self, default_sort: Option<Document>) -> ListOptions {
        let direction = self.sort_order.unwrap_or(SortOrder::Asc).as_direction();
        let sort = match self.sort_field() {
            Some(field) => Some(doc! { field: direction }),
            None => default_sort,
        };
        ListOptions {
            sort,
            limit: self.limit.map(|l| l.clamp(1, MAX_LIMIT)),
            skip: self.skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_operator_sort_fields() {
        let query = ListQuery {
            sort_by: Some("$where".into()),
            ..ListQuery::default()
        };
        assert_eq!(query.list_options(None).sort, None);
    }

    #[test]
    fn maps_public_id_and_direction() {
        let query = ListQuery {
            sort_by: Some("id".into()),
            sort_order: Some(SortOrder::Desc),
            limit: Some(1000),
            ..ListQuery::default()
        };
        let options = query.list_options(None);
        assert_eq!(options.sort, Some(doc! { "_id": -1 }));
        assert_eq!(options.limit, Some(MAX_LIMIT));
    }

    #[test]
    fn falls_back_to_default_sort() {
        let options = ListQuery::default().list_options(Some(doc! { "order": 1 }));
        assert_eq!(options.sort, Some(doc! { "order": 1 }));
    }
}
