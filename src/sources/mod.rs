use crate::error::Result;
use crate::model::Item;

/// Supplies the item list the search core reads.
pub trait Source {
    fn scan(&self) -> Result<Vec<Item>>;
}

pub mod history;
pub mod json;
pub mod sample;
