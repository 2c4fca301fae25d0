use bson::doc;

use crate::{
    db::Collection,
    dto::orders::{CreateOrderRequest, GUEST_USER, UpdateOrderStatusRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    repository::{self, Availability},
    routes::params::ListQuery,
    services::cart_service,
    state::AppState,
};

/// Admins see every order; everyone else only their own.
pub async fn list_orders(state: &AppState, user: &AuthUser, query: &ListQuery) -> Vec<Order> {
    let mut filter = doc! {};
    if !user.is_admin() {
        filter.insert("userId", user.user_id.as_str());
    }
    if let Some(status) = &query.status {
        filter.insert("status", status.as_str());
    }

    let options = query.list_options(Some(doc! { "createdAt": -1 }));
    repository::list::<Order>(&state.db, filter, options)
        .await
        .or_empty(Collection::Orders)
}

/// Someone else's order is reported as missing rather than forbidden.
pub async fn get_order(state: &AppState, user: &AuthUser, id: &str) -> AppResult<Order> {
    let order = repository::find::<Order>(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    if !user.can_access(&order.user_id) {
        return Err(AppError::NotFound("Order"));
    }
    Ok(order)
}

/// Writes the order, then clears the mirrored cart and sends notifications.
/// The last two are best effort: a failure is logged and the order stands.
pub async fn create_order(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: CreateOrderRequest,
) -> AppResult<Order> {
    let new_order = payload.into_new_order(user.map(|u| u.user_id.clone()))?;
    let order: Order = repository::insert(&state.db, repository::encode(&new_order)?).await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %order.user_id,
        total = order.totals.total,
        "order placed"
    );

    // Only the signed-in caller's mirror is cleared.
    if let Some(user) = user.filter(|u| u.user_id != GUEST_USER) {
        if let Err(err) = cart_service::clear_for_user(state, &user.user_id).await {
            tracing::warn!(
                error = %err,
                user_id = %user.user_id,
                "cart clear after checkout failed"
            );
        }
    }

    if let Err(err) = state.notifier.order_placed(&order).await {
        tracing::warn!(error = %err, order_id = %order.id, "order notification failed");
    }

    Ok(order)
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateOrderStatusRequest,
) -> AppResult<Order> {
    ensure_admin(user)?;
    let status = payload.into_status()?;

    let order = repository::patch::<Order>(&state.db, id, doc! { "status": status.as_str() })
        .await
        .map_err(|err| AppError::from_store(err, "Order"))?;

    tracing::info!(
        order_id = %order.id,
        status = status.as_str(),
        admin = %user.user_id,
        "order status updated"
    );
    Ok(order)
}

pub async fn delete_order(state: &AppState, user: &AuthUser, id: &str) -> AppResult<()> {
    ensure_admin(user)?;
    repository::delete::<Order>(&state.db, id)
        .await
        .map_err(|err| AppError::from_store(err, "Order"))?;
    tracing::info!(order_id = %id, admin = %user.user_id, "order deleted");
    Ok(())
}

/// Record a verified gateway payment against a store order.
pub async fn mark_paid(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payment_id: &str,
) -> AppResult<Order> {
    let order = get_order(state, user, id).await?;
    let order = repository::patch::<Order>(
        &state.db,
        &order.id,
        doc! { "paymentId": payment_id, "paymentStatus": "paid" },
    )
    .await
    .map_err(|err| AppError::from_store(err, "Order"))?;

    tracing::info!(order_id = %order.id, payment_id = %payment_id, "order paid");
    Ok(order)
}
