use crate::error::Result;
use crate::model::Item;
use crate::sources::Source;
use log::info;

/// Built-in demo inventory, used when no items file is given.
pub struct SampleSource;

// id, name, sku, barcode, category, supplier, location, price, quantity, min_stock, status
type Row = (u64, &'static str, &'static str, &'static str, &'static str, &'static str, &'static str, f64, i64, i64, &'static str);

const ROWS: &[Row] = &[
    (1, "Laptop HP Pavilion", "LAP-001", "7501031311309", "Electronics", "HP Inc.", "Warehouse A", 899.99, 15, 5, "active"),
    (2, "Mouse Logitech", "MOU-002", "7501031311316", "Electronics", "Logitech", "Warehouse A", 25.50, 50, 10, "active"),
    (3, "Office Chair", "CHA-003", "7501031311323", "Furniture", "OfficePro", "Warehouse B", 149.00, 8, 3, "active"),
    (4, "Standing Desk", "DSK-004", "7501031311330", "Furniture", "OfficePro", "Warehouse B", 399.00, 2, 4, "active"),
    (5, "USB-C Hub", "HUB-005", "7501031311347", "Accessories", "Anker", "Warehouse A", 45.99, 0, 10, "active"),
    (6, "Monitor Dell 27\"", "MON-006", "7501031311354", "Electronics", "Dell", "Warehouse A", 329.00, 12, 4, "active"),
    (7, "Mechanical Keyboard", "KEY-007", "7501031311361", "Electronics", "Keychron", "Warehouse A", 89.00, 25, 5, "active"),
    (8, "Printer Paper A4", "PAP-008", "7501031311378", "Office Supplies", "Staples", "Storage Room", 6.49, 200, 50, "active"),
    (9, "Ballpoint Pens (12)", "PEN-009", "7501031311385", "Office Supplies", "Bic", "Storage Room", 3.99, 120, 30, "active"),
    (10, "Laptop Stand", "STD-010", "7501031311392", "Accessories", "Rain Design", "Warehouse A", 39.00, 30, 5, "active"),
    (11, "Webcam Logitech C920", "CAM-011", "7501031311408", "Electronics", "Logitech", "Warehouse A", 79.99, 9, 5, "active"),
    (12, "Filing Cabinet", "CAB-012", "7501031311415", "Furniture", "OfficePro", "Warehouse B", 189.00, 3, 2, "active"),
    (13, "Whiteboard Markers", "MRK-013", "7501031311422", "Office Supplies", "Expo", "Storage Room", 12.99, 40, 10, "active"),
    (14, "Laser Printer Brother", "PRT-014", "7501031311439", "Electronics", "Brother", "Warehouse A", 219.00, 4, 2, "active"),
    (15, "Desk Lamp LED", "LMP-015", "7501031311446", "Furniture", "IKEA", "Warehouse B", 29.99, 18, 5, "active"),
    (16, "HDMI Cable 2m", "CBL-016", "7501031311453", "Accessories", "Amazon Basics", "Warehouse A", 8.99, 75, 20, "active"),
    (17, "Wireless Headset", "HDS-017", "7501031311460", "Electronics", "Jabra", "Warehouse A", 129.00, 0, 3, "discontinued"),
    (18, "Label Printer", "LBL-018", "7501031311477", "Electronics", "Dymo", "Warehouse A", 99.00, 6, 2, "active"),
    (19, "Barcode Scanner", "SCN-019", "7501031311484", "Electronics", "Zebra", "Warehouse A", 159.00, 7, 2, "active"),
    (20, "Stapler", "STP-020", "7501031311491", "Office Supplies", "Swingline", "Storage Room", 14.50, 22, 5, "active"),
    (21, "Conference Table", "TBL-021", "7501031311507", "Furniture", "OfficePro", "Warehouse B", 749.00, 1, 1, "active"),
    (22, "External SSD 1TB", "SSD-022", "7501031311514", "Electronics", "Samsung", "Warehouse A", 109.99, 14, 4, "active"),
    (23, "Surge Protector", "SRG-023", "7501031311521", "Accessories", "Belkin", "Warehouse A", 24.99, 0, 6, "inactive"),
];

impl Source for SampleSource {
    fn scan(&self) -> Result<Vec<Item>> {
        let items: Vec<Item> = ROWS
            .iter()
            .map(|&(id, name, sku, barcode, category, supplier, location, price, quantity, min_stock, status)| {
                let mut item = Item::new(id, name);
                item.description = format!("{} from {}", name, supplier);
                item.sku = sku.to_string();
                item.barcode = barcode.to_string();
                item.category = category.to_string();
                item.supplier = supplier.to_string();
                item.location = location.to_string();
                item.price = price;
                item.quantity = quantity;
                item.min_stock = min_stock;
                item.status = status.to_string();
                item
            })
            .collect();
        info!("SampleSource: {} items", items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_identifiers_are_unique() {
        let items = SampleSource.scan().unwrap();
        let skus: HashSet<_> = items.iter().map(|i| i.sku.as_str()).collect();
        let barcodes: HashSet<_> = items.iter().map(|i| i.barcode.as_str()).collect();
        assert_eq!(skus.len(), items.len());
        assert_eq!(barcodes.len(), items.len());
    }
}
