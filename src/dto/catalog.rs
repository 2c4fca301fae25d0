use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    codec::lenient,
    dto::{Payload, present, require},
    error::AppResult,
};

/// Create and update body for products. On create `name` and `price` are
/// required; on update every field is optional.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl Payload for ProductRequest {
    fn validate_create(&self) -> AppResult<()> {
        require(present(&self.name) && self.price.is_some())
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Payload for CategoryRequest {
    fn validate_create(&self) -> AppResult<()> {
        require(present(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_patch_only_carries_given_fields() {
        let req: ProductRequest = serde_json::from_str(r#"{"price":"19.5"}"#).unwrap();
        let doc = req.to_document().unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get_f64("price").unwrap(), 19.5);
        assert!(req.validate_create().is_err());
        assert!(req.validate_update().is_ok());
    }

    #[test]
    fn product_create_needs_name_and_price() {
        let req: ProductRequest =
            serde_json::from_str(r#"{"name":"Test","description":"d","price":10,"stock":5}"#)
                .unwrap();
        assert!(req.validate_create().is_ok());
        let doc = req.to_document().unwrap();
        assert_eq!(doc.get_i64("stock").unwrap(), 5);

        let blank: ProductRequest = serde_json::from_str(r#"{"name":"  ","price":1}"#).unwrap();
        assert!(blank.validate_create().is_err());
    }
}
