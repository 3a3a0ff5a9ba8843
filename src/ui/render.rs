use std::fmt::Write;
use std::ops::Range;

use crate::model::ItemField;
use crate::pagination::PageItem;
use crate::search::{QuickMatch, ScoredMatch};
use crate::state::AppState;

/// Renders the current page of `state` as plain text.
pub fn render_page(state: &AppState) -> String {
    let mut out = String::new();

    let header = if state.query.text.trim().is_empty() {
        "Search items...".to_string()
    } else {
        format!("> {}", state.query.text)
    };
    let _ = writeln!(out, "{}", header);

    let visible = state.visible();
    if visible.is_empty() {
        let _ = writeln!(out, "No results found");
        return out;
    }

    let first = state.pagination.range().map(|(start, _)| start).unwrap_or(1);
    for (i, m) in visible.iter().enumerate() {
        let _ = writeln!(out, "{}", render_row(first + i, m, state.search_active()));
    }

    if let Some((start, end)) = state.pagination.range() {
        let _ = writeln!(out, "Showing {}-{} of {}", start, end, state.result_count());
    }
    let _ = writeln!(out, "{}", render_page_bar(&state.page_bar(), state.pagination.current_page()));
    out
}

fn render_row(number: usize, m: &ScoredMatch<'_>, with_score: bool) -> String {
    let item = m.item;
    let name_spans = m
        .fields
        .iter()
        .find(|f| f.field == ItemField::Name)
        .map(|f| f.spans.as_slice())
        .unwrap_or(&[]);

    let mut row = format!(
        "{:>3}. {:<10} {}  [{}]  qty {}  {:.2}",
        number,
        item.sku,
        highlight(&item.name, name_spans),
        item.category,
        item.quantity,
        item.price,
    );
    if item.is_low_stock() {
        row.push_str("  (low stock)");
    }
    if with_score && m.score > 0.0 {
        let _ = write!(row, "  score {:.2}", m.score);
    }
    row
}

/// Wraps matched character spans in `*`.
pub fn highlight(text: &str, spans: &[Range<usize>]) -> String {
    if spans.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + spans.len() * 2);
    for (i, c) in text.chars().enumerate() {
        if spans.iter().any(|s| s.start == i) {
            out.push('*');
        }
        out.push(c);
        if spans.iter().any(|s| s.end == i + 1) {
            out.push('*');
        }
    }
    out
}

pub fn render_page_bar(pages: &[PageItem], current: usize) -> String {
    pages
        .iter()
        .map(|p| match *p {
            PageItem::Page(n) if n == current => format!("[{}]", n),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_lookup(hit: Option<&QuickMatch<'_>>) -> String {
    match hit {
        Some(hit) => format!(
            "{} {} ({}) - {} in stock at {}{}",
            if hit.exact { "Found" } else { "Closest match:" },
            hit.item.name,
            hit.item.sku,
            hit.item.quantity,
            hit.item.location,
            if hit.exact { String::new() } else { format!(", score {:.2}", hit.score) },
        ),
        None => "No item matches that code".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::Item;

    #[test]
    fn test_highlight_marks_spans() {
        assert_eq!(highlight("Laptop HP", &[0..3, 7..9]), "*Lap*top *HP*");
        assert_eq!(highlight("Desk", &[]), "Desk");
    }

    #[test]
    fn test_page_bar_marks_current_page() {
        let bar = render_page_bar(&[PageItem::Page(1), PageItem::Ellipsis, PageItem::Page(4), PageItem::Page(5)], 4);
        assert_eq!(bar, "1 ... [4] 5");
    }

    #[test]
    fn test_render_empty_results() {
        let mut state = AppState::new(Config::default()).unwrap();
        state.set_items(vec![Item::new(1, "Desk")]);
        state.apply_query("zebra");
        let text = render_page(&state);
        assert!(text.starts_with("> zebra\n"));
        assert!(text.contains("No results found"));
    }

    #[test]
    fn test_render_page_shows_range() {
        let mut state = AppState::new(Config::default()).unwrap();
        state.set_items((1..=23).map(|i| Item::new(i, format!("Box {}", i))).collect());
        state.last_page();
        let text = render_page(&state);
        assert!(text.contains("Showing 21-23 of 23"));
        assert!(text.contains("1 2 [3]"));
    }
}
