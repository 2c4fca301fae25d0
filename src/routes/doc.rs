use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{CartList, ReplaceCartRequest},
        catalog::{CategoryRequest, ProductRequest},
        content::{
            AdvertisementRequest, AnimatedBannerRequest, HeroSlideRequest, OfferRequest,
            ReviewRequest, SplitCardRequest, TestimonialRequest, WishlistRequest,
        },
        orders::{CreateOrderRequest, CustomerInput, UpdateOrderStatusRequest},
        payments::{
            CreatePaymentRequest, PaymentOrderResponse, PaymentVerification, VerifyPaymentRequest,
        },
    },
    error::ErrorBody,
    models::{
        Advertisement, AnimatedBanner, CartItem, Category, Customer, HeroSlide, Offer, Order,
        OrderItem, OrderStatus, OrderTotals, Product, Review, Role, SplitCard, Testimonial, User,
        WishlistEntry,
    },
    response::{ApiResponse, Deleted},
    routes::{auth, cart, health, orders, params, payments, products, reviews, users, wishlist},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

// Categories and homepage content share one generic router and are
// documented through their schemas only.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        users::list_users,
        products::list_products,
        products::featured_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order_status,
        orders::delete_order,
        cart::get_cart,
        cart::replace_cart,
        cart::clear_cart,
        reviews::list_reviews,
        reviews::create_review,
        reviews::delete_review,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        payments::create_payment_order,
        payments::verify_payment
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            Category,
            Order,
            OrderItem,
            OrderStatus,
            OrderTotals,
            Customer,
            CartItem,
            Review,
            WishlistEntry,
            Advertisement,
            HeroSlide,
            Testimonial,
            Offer,
            SplitCard,
            AnimatedBanner,
            ProductRequest,
            CategoryRequest,
            AdvertisementRequest,
            HeroSlideRequest,
            TestimonialRequest,
            OfferRequest,
            SplitCardRequest,
            AnimatedBannerRequest,
            ReviewRequest,
            WishlistRequest,
            CreateOrderRequest,
            CustomerInput,
            UpdateOrderStatusRequest,
            ReplaceCartRequest,
            CartList,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreatePaymentRequest,
            PaymentOrderResponse,
            VerifyPaymentRequest,
            PaymentVerification,
            params::ListQuery,
            params::SortOrder,
            health::HealthData,
            ErrorBody,
            Deleted,
            ApiResponse<User>,
            ApiResponse<LoginResponse>,
            ApiResponse<PaymentOrderResponse>,
            ApiResponse<PaymentVerification>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Product catalog"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Cart", description = "Remote mirror of the client cart"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Wishlist", description = "Per-user wishlist"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "User administration"),
        (name = "Payments", description = "Payment gateway checkout"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/products"));
        assert!(doc.paths.paths.contains_key("/api/orders/{id}"));
        assert!(doc.paths.paths.contains_key("/api/cart/{user_id}"));
    }
}
