use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Row of the `inventory` table, image bytes included.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub unit: String,
    pub category: String,
    pub image: Option<Vec<u8>>,
}

/// Path under which a product's image is served.
pub fn image_url(id: i64) -> String {
    format!("/image/{}", id)
}

// ── Response shapes ───────────────────────────────────────────────────────────

/// Full product with the image inlined as base64.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub unit: String,
    pub category: String,
    pub image: Option<String>,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            stock: p.stock,
            unit: p.unit,
            category: p.category,
            image: p.image.map(|bytes| STANDARD.encode(bytes)),
        }
    }
}

/// Inventory listing row. The blob itself is never loaded, only whether it exists.
#[derive(Debug, sqlx::FromRow)]
pub struct InventoryRow {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub unit: String,
    pub category: String,
    pub has_image: i64,
}

/// Product summary whose `image` is a URL to fetch the bytes from.
#[derive(Debug, Serialize)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub unit: String,
    pub category: String,
    pub image: Option<String>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        Self {
            image: (row.has_image != 0).then(|| image_url(row.id)),
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            unit: row.unit,
            category: row.category,
        }
    }
}

/// Echo of a freshly inserted product.
#[derive(Debug, Serialize)]
pub struct CreatedProduct {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub unit: String,
    pub category: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl CreatedProduct {
    pub fn new(id: i64, input: ProductInput, has_image: bool) -> Self {
        Self {
            id,
            name: input.name,
            price: input.price,
            stock: input.stock,
            unit: input.unit,
            category: input.category,
            image_url: has_image.then(|| image_url(id)),
        }
    }
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// The five writable product columns, parsed from a create/update body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub unit: String,
    pub category: String,
}

impl ProductInput {
    pub fn from_fields(fields: &HashMap<String, String>) -> AppResult<Self> {
        let price = required(fields, "price")?;
        let price: f64 = price
            .trim()
            .parse()
            .ok()
            .filter(|p: &f64| p.is_finite())
            .ok_or_else(|| AppError::BadRequest("price must be a number".to_string()))?;

        let stock = required(fields, "stock")?;
        let stock: i64 = stock
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest("stock must be an integer".to_string()))?;

        Ok(Self {
            name: required(fields, "name")?.to_string(),
            price,
            stock,
            unit: required(fields, "unit")?.to_string(),
            category: required(fields, "category")?.to_string(),
        })
    }
}

fn required<'a>(fields: &'a HashMap<String, String>, key: &str) -> AppResult<&'a str> {
    fields
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", key)))
}

// ── Query parameters ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ProductFilters {
    pub category: Option<String>,
}

impl ProductFilters {
    /// Category to filter on; an empty parameter means no filter.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn rice() -> HashMap<String, String> {
        fields(&[
            ("name", "Rice"),
            ("price", "50"),
            ("stock", "100"),
            ("unit", "kg"),
            ("category", "grains"),
        ])
    }

    #[test]
    fn parses_complete_fields() {
        let input = ProductInput::from_fields(&rice()).unwrap();
        assert_eq!(
            input,
            ProductInput {
                name: "Rice".into(),
                price: 50.0,
                stock: 100,
                unit: "kg".into(),
                category: "grains".into(),
            }
        );
    }

    #[test]
    fn missing_field_is_named_in_error() {
        let mut f = rice();
        f.remove("unit");
        let err = ProductInput::from_fields(&f).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "unit is required"));
    }

    #[test]
    fn rejects_non_numeric_price_and_stock() {
        let mut f = rice();
        f.insert("price".into(), "cheap".into());
        assert!(ProductInput::from_fields(&f).is_err());

        let mut f = rice();
        f.insert("price".into(), "NaN".into());
        assert!(ProductInput::from_fields(&f).is_err());

        let mut f = rice();
        f.insert("stock".into(), "4.5".into());
        assert!(ProductInput::from_fields(&f).is_err());
    }

    #[test]
    fn view_encodes_image_as_base64() {
        let product = Product {
            id: 7,
            name: "Tea".into(),
            price: 3.5,
            stock: 2,
            unit: "box".into(),
            category: "drinks".into(),
            image: Some(vec![0xff, 0xd8, 0xff]),
        };
        let view = ProductView::from(product);
        assert_eq!(view.image.as_deref(), Some("/9j/"));
    }

    #[test]
    fn inventory_item_links_image_only_when_present() {
        let row = |has_image| InventoryRow {
            id: 3,
            name: "Salt".into(),
            price: 1.0,
            stock: 9,
            unit: "kg".into(),
            category: "spices".into(),
            has_image,
        };
        assert_eq!(InventoryItem::from(row(1)).image.as_deref(), Some("/image/3"));
        assert_eq!(InventoryItem::from(row(0)).image, None);
    }

    #[test]
    fn created_product_serializes_image_url_key() {
        let input = ProductInput::from_fields(&rice()).unwrap();
        let json = serde_json::to_value(CreatedProduct::new(1, input, false)).unwrap();
        assert_eq!(json["imageUrl"], serde_json::Value::Null);
        assert_eq!(json["name"], "Rice");
    }

    #[test]
    fn empty_category_means_no_filter() {
        let filters = ProductFilters { category: Some(String::new()) };
        assert_eq!(filters.category(), None);
        let filters = ProductFilters { category: Some("grains".into()) };
        assert_eq!(filters.category(), Some("grains"));
    }
}
