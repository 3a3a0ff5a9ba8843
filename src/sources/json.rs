use crate::error::Result;
use crate::model::Item;
use crate::sources::Source;
use log::info;
use std::fs;
use std::path::PathBuf;

/// Items exported from the inventory API as a JSON array.
pub struct JsonSource {
    pub path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Source for JsonSource {
    fn scan(&self) -> Result<Vec<Item>> {
        let content = fs::read_to_string(&self.path)?;
        let items: Vec<Item> = serde_json::from_str(&content)?;
        info!("JsonSource: loaded {} items from {:?}", items.len(), self.path);
        Ok(items)
    }
}
