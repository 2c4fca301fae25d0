//! The cart of record: kept in the local store under `cart_<userId>`
//! (`cart_guest` when signed out) and mirrored for signed-in users.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    client::{
        cart_sync::CartMirrorHandle,
        local_store::{LocalStore, LocalStoreError, get_json, set_json},
    },
    dto::orders::GUEST_USER,
    models::{CartItem, Order},
};

pub fn cart_key(user_id: Option<&str>) -> String {
    format!("cart_{}", user_id.unwrap_or(GUEST_USER))
}

pub fn orders_key(user_id: Option<&str>) -> String {
    format!("orders_{}", user_id.unwrap_or(GUEST_USER))
}

/// Lines are unique on product id, color and size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new(items: Vec<CartItem>) -> Self {
        let mut cart = Cart::default();
        for item in items {
            cart.add(item);
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merges into an existing line when one matches, otherwise appends.
    /// Non-positive quantities are ignored.
    pub fn add(&mut self, item: CartItem) {
        if item.quantity <= 0 {
            return;
        }
        match self.items.iter_mut().find(|line| line.same_line(&item)) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, id: &str, color: Option<&str>, size: Option<&str>) -> bool {
        let before = self.items.len();
        self.items.retain(|line| !matches_line(line, id, color, size));
        self.items.len() != before
    }

    /// A quantity of zero or less removes the line.
    pub fn set_quantity(
        &mut self,
        id: &str,
        color: Option<&str>,
        size: Option<&str>,
        quantity: i64,
    ) {
        if quantity <= 0 {
            self.remove(id, color, size);
            return;
        }
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| matches_line(line, id, color, size))
        {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|line| line.price * line.quantity as f64)
            .sum()
    }

    /// Total number of units, not lines.
    pub fn count(&self) -> i64 {
        self.items
            .iter()
            .fold(0_i64, |total, line| total.saturating_add(line.quantity))
    }
}

fn matches_line(line: &CartItem, id: &str, color: Option<&str>, size: Option<&str>) -> bool {
    line.id == id && line.color.as_deref() == color && line.size.as_deref() == size
}

/// One user's cart and order history in the local store.
pub struct CartStore {
    store: Arc<dyn LocalStore>,
    user_id: Option<String>,
    mirror: Option<CartMirrorHandle>,
}

impl CartStore {
    pub fn guest(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            user_id: None,
            mirror: None,
        }
    }

    /// Changes are also queued on `mirror` when one is given.
    pub fn for_user(
        store: Arc<dyn LocalStore>,
        user_id: impl Into<String>,
        mirror: Option<CartMirrorHandle>,
    ) -> Self {
        Self {
            store,
            user_id: Some(user_id.into()),
            mirror,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn load(&self) -> Cart {
        get_json(self.store.as_ref(), &cart_key(self.user_id())).unwrap_or_default()
    }

    pub fn save(&self, cart: &Cart) -> Result<(), LocalStoreError> {
        set_json(self.store.as_ref(), &cart_key(self.user_id()), cart)?;
        if let (Some(user_id), Some(mirror)) = (self.user_id(), &self.mirror) {
            if !mirror.push(user_id, cart.items()) {
                tracing::warn!(user_id, "cart mirror is not running");
            }
        }
        Ok(())
    }

    fn modify(&self, change: impl FnOnce(&mut Cart)) -> Result<Cart, LocalStoreError> {
        let mut cart = self.load();
        change(&mut cart);
        self.save(&cart)?;
        Ok(cart)
    }

    pub fn add_item(&self, item: CartItem) -> Result<Cart, LocalStoreError> {
        self.modify(|cart| cart.add(item))
    }

    pub fn remove_item(
        &self,
        id: &str,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Result<Cart, LocalStoreError> {
        self.modify(|cart| {
            cart.remove(id, color, size);
        })
    }

    pub fn update_quantity(
        &self,
        id: &str,
        color: Option<&str>,
        size: Option<&str>,
        quantity: i64,
    ) -> Result<Cart, LocalStoreError> {
        self.modify(|cart| cart.set_quantity(id, color, size, quantity))
    }

    pub fn clear(&self) -> Result<(), LocalStoreError> {
        self.save(&Cart::default())
    }

    /// Local order history, newest first.
    pub fn orders(&self) -> Vec<Order> {
        get_json(self.store.as_ref(), &orders_key(self.user_id())).unwrap_or_default()
    }

    pub fn record_order(&self, order: Order) -> Result<(), LocalStoreError> {
        let mut orders = self.orders();
        orders.retain(|existing| existing.id != order.id);
        orders.insert(0, order);
        set_json(self.store.as_ref(), &orders_key(self.user_id()), &orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::local_store::MemoryStore;

    fn line(id: &str, quantity: i64) -> CartItem {
        CartItem {
            id: id.into(),
            name: format!("Product {id}"),
            price: 10.0,
            image: None,
            quantity,
            color: None,
            size: None,
        }
    }

    #[test]
    fn adding_same_product_merges_quantity() {
        let store = CartStore::guest(Arc::new(MemoryStore::new()));
        store.add_item(line("p1", 1)).unwrap();
        let cart = store.add_item(line("p1", 2)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(store.load(), cart);
    }

    #[test]
    fn variants_are_separate_lines() {
        let mut cart = Cart::default();
        cart.add(CartItem {
            size: Some("M".into()),
            ..line("shirt", 1)
        });
        cart.add(CartItem {
            size: Some("L".into()),
            ..line("shirt", 1)
        });
        assert_eq!(cart.items().len(), 2);

        assert!(cart.remove("shirt", None, Some("M")));
        assert_eq!(cart.items()[0].size.as_deref(), Some("L"));
    }

    #[test]
    fn totals_and_quantity_updates() {
        let mut cart = Cart::new(vec![line("a", 2), line("b", 1)]);
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.subtotal(), 30.0);

        cart.set_quantity("a", None, None, 5);
        assert_eq!(cart.count(), 6);

        cart.set_quantity("a", None, None, 0);
        assert_eq!(cart.items().len(), 1);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn quantities_saturate_instead_of_overflowing() {
        let mut cart = Cart::default();
        cart.add(line("a", i64::MAX));
        cart.add(line("a", 1));
        assert_eq!(cart.items()[0].quantity, i64::MAX);

        cart.add(line("b", 5));
        assert_eq!(cart.count(), i64::MAX);
    }

    #[test]
    fn carts_are_keyed_per_user() {
        let shared: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let guest = CartStore::guest(shared.clone());
        let user = CartStore::for_user(shared.clone(), "u1", None);

        guest.add_item(line("a", 1)).unwrap();
        assert!(user.load().is_empty());
        assert!(shared.get("cart_guest").is_some());
        assert!(shared.get("cart_u1").is_none());
    }
}
