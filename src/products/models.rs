use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    #[schema(example = "8b7c4f1e-2d3a-4b5c-9d8e-7f6a5b4c3d2e")]
    pub id: String,
    #[schema(example = "https://cdn.example.com/products/kettle.jpg")]
    pub image: String,
    #[schema(example = "Electric Kettle")]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "appliance")]
    pub product_type: String,
    pub description: String,
    #[schema(value_type = String, example = "49.99")]
    pub price: Decimal,
    #[schema(example = 12)]
    pub quantity: i32,
    pub availability: bool,
}
