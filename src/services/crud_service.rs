//! Admin-guarded CRUD shared by every collection: products, categories and
//! the homepage content collections use it as is.

use bson::{Document, doc};

use crate::{
    db::Collection,
    dto::Payload,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    repository::{self, Availability, Record},
    routes::params::ListQuery,
    state::AppState,
};

/// Lists never fail towards the caller; a store error renders as empty.
pub async fn list<R: Record>(state: &AppState, filter: Document, query: &ListQuery) -> Vec<R> {
    let options = query.list_options(default_sort(R::COLLECTION));
    repository::list::<R>(&state.db, filter, options)
        .await
        .or_empty(R::COLLECTION)
}

fn is_homepage_content(collection: Collection) -> bool {
    matches!(
        collection,
        Collection::Advertisements
            | Collection::HeroSlides
            | Collection::Testimonials
            | Collection::Offers
            | Collection::SplitCards
            | Collection::AnimatedBanners
    )
}

/// `?active=` only applies to homepage content.
pub fn list_filter(collection: Collection, query: &ListQuery) -> Document {
    match query.active {
        Some(active) if is_homepage_content(collection) => doc! { "active": active },
        _ => doc! {},
    }
}

/// Homepage content is shown in its configured `order`.
fn default_sort(collection: Collection) -> Option<Document> {
    is_homepage_content(collection).then(|| doc! { "order": 1, "_id": 1 })
}

pub async fn get<R: Record>(state: &AppState, id: &str) -> AppResult<R> {
    repository::find::<R>(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(R::LABEL))
}

pub async fn create<R: Record, P: Payload>(
    state: &AppState,
    user: &AuthUser,
    payload: P,
) -> AppResult<R> {
    ensure_admin(user)?;
    payload.validate_create()?;
    let record = repository::insert::<R>(&state.db, payload.to_document()?).await?;
    tracing::info!(collection = %R::COLLECTION, admin = %user.user_id, "record created");
    Ok(record)
}

pub async fn update<R: Record, P: Payload>(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: P,
) -> AppResult<R> {
    ensure_admin(user)?;
    payload.validate_update()?;
    let record = repository::patch::<R>(&state.db, id, payload.to_document()?)
        .await
        .map_err(|err| AppError::from_store(err, R::LABEL))?;
    tracing::info!(collection = %R::COLLECTION, id = %id, admin = %user.user_id, "record updated");
    Ok(record)
}

pub async fn delete<R: Record>(state: &AppState, user: &AuthUser, id: &str) -> AppResult<()> {
    ensure_admin(user)?;
    repository::delete::<R>(&state.db, id)
        .await
        .map_err(|err| AppError::from_store(err, R::LABEL))?;
    tracing::info!(collection = %R::COLLECTION, id = %id, admin = %user.user_id, "record deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_filter_only_when_asked() {
        assert_eq!(
            list_filter(Collection::Offers, &ListQuery::default()),
            doc! {}
        );
        let query = ListQuery {
            active: Some(true),
            ..ListQuery::default()
        };
        assert_eq!(
            list_filter(Collection::Offers, &query),
            doc! { "active": true }
        );
        assert_eq!(list_filter(Collection::Categories, &query), doc! {});
    }

    #[test]
    fn content_sorts_by_display_order() {
        assert_eq!(
            default_sort(Collection::HeroSlides),
            Some(doc! { "order": 1, "_id": 1 })
        );
        assert_eq!(default_sort(Collection::Categories), None);
    }
}
