//! Built-in content shown when neither the server nor the cache has any.

use chrono::{DateTime, Utc};

use crate::models::{Advertisement, Category, HeroSlide, Product, Testimonial};

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn category(id: &str, name: &str, description: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        image: None,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub fn categories() -> Vec<Category> {
    vec![
        category("default-electronics", "Electronics", "Phones, audio and accessories"),
        category("default-fashion", "Fashion", "Clothing, shoes and bags"),
        category("default-home", "Home & Living", "Furniture, decor and kitchen"),
        category("default-beauty", "Beauty", "Skincare, makeup and fragrance"),
    ]
}

pub fn hero_slides() -> Vec<HeroSlide> {
    vec![HeroSlide {
        id: "default-hero".to_string(),
        title: "New season, new arrivals".to_string(),
        subtitle: Some("Fresh picks every week".to_string()),
        description: None,
        image: None,
        button_text: Some("Shop now".to_string()),
        button_link: Some("/products".to_string()),
        active: true,
        order: 0,
        created_at: epoch(),
        updated_at: epoch(),
    }]
}

pub fn advertisements() -> Vec<Advertisement> {
    vec![Advertisement {
        id: "default-ad".to_string(),
        title: "Free shipping on your first order".to_string(),
        description: None,
        image: None,
        button_text: Some("Start shopping".to_string()),
        button_link: Some("/products".to_string()),
        background_color: Some("#111827".to_string()),
        text_color: Some("#ffffff".to_string()),
        active: true,
        order: 0,
        created_at: epoch(),
        updated_at: epoch(),
    }]
}

/// There are no placeholder products.
pub fn featured_products() -> Vec<Product> {
    Vec::new()
}

pub fn testimonials() -> Vec<Testimonial> {
    vec![Testimonial {
        id: "default-testimonial".to_string(),
        name: "A happy customer".to_string(),
        role: None,
        content: "Quick delivery and exactly as described.".to_string(),
        image: None,
        rating: Some(5),
        active: true,
        order: 0,
        created_at: epoch(),
        updated_at: epoch(),
    }]
}
