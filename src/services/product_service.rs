use bson::{Document, doc};

use crate::{
    db::Collection,
    error::AppResult,
    models::Product,
    repository::{self, Availability},
    routes::params::ListQuery,
    state::AppState,
};

/// Unlike the other lists this one checks the connection first and fails
/// loudly, so a storefront with no catalog is distinguishable from an
/// empty one.
pub async fn list_products(state: &AppState, query: &ListQuery) -> AppResult<Vec<Product>> {
    state.db.ping().await?;

    let options = query.list_options(None);
    Ok(repository::list::<Product>(&state.db, product_filter(query), options)
        .await
        .or_empty(Collection::Products))
}

pub async fn featured_products(state: &AppState, query: &ListQuery) -> Vec<Product> {
    let mut filter = product_filter(query);
    filter.insert("featured", true);
    repository::list::<Product>(&state.db, filter, query.list_options(None))
        .await
        .or_empty(Collection::Products)
}

pub fn product_filter(query: &ListQuery) -> Document {
    let mut filter = Document::new();

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        filter.insert("category", category.as_str());
    }

    if let Some(featured) = query.featured {
        filter.insert("featured", featured);
    }

    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = escape_regex(search);
        filter.insert(
            "$or",
            vec![
                doc! { "name": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "description": { "$regex": pattern.as_str(), "$options": "i" } },
            ],
        );
    }

    filter
}

fn escape_regex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if r"\^$.|?*+()[]{}".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_is_escaped_and_case_insensitive() {
        let query = ListQuery {
            q: Some(" c++ (2nd) ".into()),
            category: Some("665f00000000000000000001".into()),
            ..ListQuery::default()
        };
        let filter = product_filter(&query);

        assert_eq!(filter.get_str("category").unwrap(), "665f00000000000000000001");
        let clauses = filter.get_array("$or").unwrap();
        let name = clauses[0].as_document().unwrap().get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"c\+\+ \(2nd\)");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(product_filter(&ListQuery::default()).is_empty());
    }
}
