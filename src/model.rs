use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u64,                 // Numeric identifier from the data source
    pub name: String,            // Display name
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sku: String,             // Stock keeping unit, matched case-insensitively
    #[serde(default)]
    pub barcode: String,         // Scanner payload, matched case-sensitively
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,           // Units currently in stock
    #[serde(default = "default_status")]
    pub status: String,          // e.g. "active", "discontinued"
    #[serde(default, alias = "min_stock")]
    pub min_stock: i64,          // Reorder threshold
}

fn default_status() -> String { "active".to_string() }

impl Item {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            sku: String::new(),
            barcode: String::new(),
            category: String::new(),
            supplier: String::new(),
            location: String::new(),
            price: 0.0,
            quantity: 0,
            status: default_status(),
            min_stock: 0,
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// A named, readable field of an [`Item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ItemField {
    Id,
    Name,
    Description,
    Sku,
    Barcode,
    Category,
    Supplier,
    Location,
    Price,
    Quantity,
    Status,
    MinStock,
}

impl ItemField {
    pub fn kind(self) -> FieldKind {
        match self {
            ItemField::Id | ItemField::Price | ItemField::Quantity | ItemField::MinStock => {
                FieldKind::Number
            }
            _ => FieldKind::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemField::Id => "id",
            ItemField::Name => "name",
            ItemField::Description => "description",
            ItemField::Sku => "sku",
            ItemField::Barcode => "barcode",
            ItemField::Category => "category",
            ItemField::Supplier => "supplier",
            ItemField::Location => "location",
            ItemField::Price => "price",
            ItemField::Quantity => "quantity",
            ItemField::Status => "status",
            ItemField::MinStock => "minStock",
        }
    }

    /// Text form of the field, used for matching.
    pub fn text<'a>(self, item: &'a Item) -> Cow<'a, str> {
        match self {
            ItemField::Id => Cow::Owned(item.id.to_string()),
            ItemField::Name => Cow::Borrowed(&item.name),
            ItemField::Description => Cow::Borrowed(&item.description),
            ItemField::Sku => Cow::Borrowed(&item.sku),
            ItemField::Barcode => Cow::Borrowed(&item.barcode),
            ItemField::Category => Cow::Borrowed(&item.category),
            ItemField::Supplier => Cow::Borrowed(&item.supplier),
            ItemField::Location => Cow::Borrowed(&item.location),
            ItemField::Price => Cow::Owned(item.price.to_string()),
            ItemField::Quantity => Cow::Owned(item.quantity.to_string()),
            ItemField::Status => Cow::Borrowed(&item.status),
            ItemField::MinStock => Cow::Owned(item.min_stock.to_string()),
        }
    }

    /// Numeric value for number fields, `None` for text fields.
    pub fn number(self, item: &Item) -> Option<f64> {
        match self {
            ItemField::Id => Some(item.id as f64),
            ItemField::Price => Some(item.price),
            ItemField::Quantity => Some(item.quantity as f64),
            ItemField::MinStock => Some(item.min_stock as f64),
            _ => None,
        }
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], "");
        match normalized.as_str() {
            "id" => Ok(ItemField::Id),
            "name" => Ok(ItemField::Name),
            "description" => Ok(ItemField::Description),
            "sku" => Ok(ItemField::Sku),
            "barcode" => Ok(ItemField::Barcode),
            "category" => Ok(ItemField::Category),
            "supplier" => Ok(ItemField::Supplier),
            "location" => Ok(ItemField::Location),
            "price" => Ok(ItemField::Price),
            "quantity" | "stock" => Ok(ItemField::Quantity),
            "status" => Ok(ItemField::Status),
            "minstock" => Ok(ItemField::MinStock),
            _ => Err(format!("unknown item field '{}'", s)),
        }
    }
}

impl TryFrom<String> for ItemField {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemField> for String {
    fn from(field: ItemField) -> Self {
        field.as_str().to_string()
    }
}

static NEXT_CATALOG_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_CATALOG_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// The item list handed to the search core.
///
/// Every construction or replacement gets a fresh version, which stands in
/// for list identity: cached search results are only reused while the
/// version is unchanged.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    version: u64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            version: next_version(),
        }
    }

    pub fn replace(&mut self, items: Vec<Item>) {
        self.items = items;
        self.version = next_version();
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<Item>> for Catalog {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parsing_accepts_camel_and_snake_case() {
        assert_eq!("minStock".parse::<ItemField>().unwrap(), ItemField::MinStock);
        assert_eq!("min_stock".parse::<ItemField>().unwrap(), ItemField::MinStock);
        assert_eq!("stock".parse::<ItemField>().unwrap(), ItemField::Quantity);
        assert!("colour".parse::<ItemField>().is_err());
    }

    #[test]
    fn test_item_deserializes_with_defaults() {
        let item: Item =
            serde_json::from_str(r#"{"id": 7, "name": "Desk Lamp", "minStock": 3}"#).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.min_stock, 3);
        assert_eq!(item.sku, "");
        assert_eq!(item.quantity, 0);
        assert_eq!(item.status, Item::new(7, "Desk Lamp").status);
    }

    #[test]
    fn test_catalog_replace_changes_version() {
        let mut catalog = Catalog::new(vec![Item::new(1, "a")]);
        let before = catalog.version();
        catalog.replace(vec![Item::new(1, "a")]);
        assert_ne!(before, catalog.version());
    }
}
