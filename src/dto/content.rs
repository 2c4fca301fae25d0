use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    codec::lenient,
    dto::{Payload, present, require},
    error::{AppError, AppResult},
};

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<i64>,
}

impl Payload for AdvertisementRequest {
    fn validate_create(&self) -> AppResult<()> {
        require(present(&self.title))
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlideRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<i64>,
}

impl Payload for HeroSlideRequest {
    fn validate_create(&self) -> AppResult<()> {
        require(present(&self.title) && present(&self.image))
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<i64>,
}

impl Payload for TestimonialRequest {
    fn validate_create(&self) -> AppResult<()> {
        require(present(&self.name) && present(&self.content))?;
        self.validate_update()
    }

    fn validate_update(&self) -> AppResult<()> {
        match self.rating {
            Some(rating) if !(1..=5).contains(&rating) => Err(AppError::BadRequest(
                "rating must be between 1 and 5".into(),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<i64>,
}

impl Payload for OfferRequest {
    fn validate_create(&self) -> AppResult<()> {
        require(present(&self.title))
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SplitCardRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<i64>,
}

impl Payload for SplitCardRequest {
    fn validate_create(&self) -> AppResult<()> {
        require(present(&self.title))
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimatedBannerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<i64>,
}

impl Payload for AnimatedBannerRequest {
    fn validate_create(&self) -> AppResult<()> {
        require(present(&self.text))
    }
}

/// The author is taken from the token, never from the body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ReviewRequest {
    pub fn validate(&self) -> AppResult<()> {
        require(present(&self.product_id) && self.rating.is_some())?;
        match self.rating {
            Some(rating) if (1..=5).contains(&rating) => Ok(()),
            _ => Err(AppError::BadRequest("rating must be between 1 and 5".into())),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    #[serde(default)]
    pub product_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slides_need_title_and_image() {
        let req: HeroSlideRequest = serde_json::from_str(r#"{"title":"Summer"}"#).unwrap();
        assert!(req.validate_create().is_err());
        let req: HeroSlideRequest =
            serde_json::from_str(r#"{"title":"Summer","image":"/img/s.jpg","order":"2"}"#).unwrap();
        assert!(req.validate_create().is_ok());
        assert_eq!(req.to_document().unwrap().get_i64("order").unwrap(), 2);
    }

    #[test]
    fn review_rating_is_bounded() {
        let req: ReviewRequest = serde_json::from_str(r#"{"productId":"p","rating":6}"#).unwrap();
        assert!(req.validate().is_err());
        let req: ReviewRequest = serde_json::from_str(r#"{"productId":"p","rating":"4"}"#).unwrap();
        assert!(req.validate().is_ok());
        let req: ReviewRequest = serde_json::from_str(r#"{"rating":4}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn testimonial_update_checks_rating_only() {
        let req: TestimonialRequest = serde_json::from_str(r#"{"rating":0}"#).unwrap();
        assert!(req.validate_update().is_err());
        let req: TestimonialRequest = serde_json::from_str(r#"{"active":false}"#).unwrap();
        assert!(req.validate_update().is_ok());
    }
}
