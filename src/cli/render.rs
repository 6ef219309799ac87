use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use model::catalog::{field_label, filter_value_label, sort_label, FILTER_FIELDS, PAGE_SIZE_OPTIONS, SORT_OPTIONS};
use model::{Criteria, Transaction};
use store::FetchState;

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn status_cell(row: &Transaction) -> Cell {
    let label = row.status_label();
    let color = match label.as_str() {
        "Approved" => Color::Green,
        "Denied" => Color::Red,
        "Pending" => Color::Yellow,
        _ => Color::Grey,
    };
    Cell::new(label).fg(color)
}

/// The current page as a table.
pub fn transactions_table(rows: &[Transaction]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header_cell("Operation"),
            header_cell("Date"),
            header_cell("Email"),
            header_cell("Merchant"),
            header_cell("Card"),
            header_cell("Amount"),
            header_cell("Status"),
        ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(row.row_id()),
            Cell::new(row.formatted_date()),
            Cell::new(&row.email),
            Cell::new(&row.merchant_name),
            Cell::new(&row.display_card_num),
            Cell::new(row.amount).set_alignment(CellAlignment::Right),
            status_cell(row),
        ]);
    }
    table
}

/// `Page x/y (n total)`, one-based.
pub fn page_footer(state: &FetchState) -> String {
    let pages = state.total_pages().max(1);
    format!(
        "Page {}/{} ({} total)",
        u64::from(state.criteria.page) + 1,
        pages,
        state.total
    )
}

/// Active sort and filters, one per line. Field filters show their id so
/// they can be removed.
pub fn criteria_summary(criteria: &Criteria) -> Vec<String> {
    let mut lines = Vec::new();
    match &criteria.order_by {
        Some(order_by) => {
            let key = order_by.to_string();
            lines.push(format!("Sort: {} ({})", sort_label(&key), key));
        }
        None => lines.push("Sort: server order".to_string()),
    }
    lines.push(format!("Page size: {}", criteria.page_size));

    if let Some(text) = criteria.search_text() {
        lines.push(format!("Search: {}", text));
    }
    for filter in &criteria.field_filters {
        lines.push(format!(
            "Filter [{}]: {} contains {}",
            filter.id,
            field_label(&filter.field),
            filter_value_label(&filter.field, &filter.value)
        ));
    }
    if let Some(range) = &criteria.amount_range {
        lines.push(format!("Amount: {} to {}", range.min(), range.max()));
    }
    if let Some(range) = &criteria.date_range {
        lines.push(format!("Dates: {} to {}", range.start(), range.end()));
    }
    lines
}

/// Full view of a state: criteria, table, footer and error. A failed page
/// load shows the error in place of the table.
pub fn render_state(state: &FetchState) -> String {
    let mut out = criteria_summary(&state.criteria).join("\n");
    out.push('\n');

    if state.data_track.is_failed() {
        let error = state.error.as_deref().unwrap_or("Failed to load transactions");
        out.push_str(&format!("Error: {}", error));
        return out;
    }

    let result = state.result();
    if state.loading() {
        out.push_str("Loading...\n");
    } else if result.rows.is_empty() {
        out.push_str("No transactions found\n");
    } else {
        out.push_str(&transactions_table(&result.rows).to_string());
        out.push('\n');
    }

    if state.count_loading() {
        out.push_str("Counting...");
    } else {
        out.push_str(&page_footer(state));
    }
    if let Some(error) = &state.error {
        out.push_str(&format!("\nError: {}", error));
    }
    out
}

/// Filterable fields, sort keys and page sizes.
pub fn catalog_listing() -> String {
    let mut fields = Table::new();
    fields
        .load_preset(UTF8_FULL_CONDENSED)
        .set_header(vec![header_cell("Filter field"), header_cell("Label")]);
    for option in FILTER_FIELDS {
        fields.add_row(vec![option.field, option.label]);
    }

    let mut sorts = Table::new();
    sorts
        .load_preset(UTF8_FULL_CONDENSED)
        .set_header(vec![header_cell("Sort key"), header_cell("Label")]);
    for option in SORT_OPTIONS {
        sorts.add_row(vec![option.column, option.label]);
    }

    let sizes: Vec<String> = PAGE_SIZE_OPTIONS.iter().map(u32::to_string).collect();
    format!("{}\n{}\nPage sizes: {}", fields, sorts, sizes.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::FieldFilter;
    use rust_decimal::Decimal;
    use store::TrackStatus;

    fn settled_state(total: u64, page: u32) -> FetchState {
        let mut state = FetchState::default();
        state.criteria.page = page;
        state.total = total;
        state.data_track = TrackStatus::Success;
        state.count_track = TrackStatus::Success;
        state
    }

    #[test]
    fn test_page_footer() {
        assert_eq!(page_footer(&settled_state(42, 1)), "Page 2/5 (42 total)");
        assert_eq!(page_footer(&settled_state(0, 0)), "Page 1/1 (0 total)");
    }

    #[test]
    fn test_table_lists_rows() {
        let row = Transaction {
            cod_oper: "OP-7".to_string(),
            email: "buyer@shop.test".to_string(),
            amount: Decimal::new(1999, 2),
            ..Transaction::default()
        };
        let rendered = transactions_table(&[row]).to_string();
        assert!(rendered.contains("OP-7"));
        assert!(rendered.contains("buyer@shop.test"));
        assert!(rendered.contains("19.99"));
    }

    #[test]
    fn test_summary_shows_filter_ids_and_status_labels() {
        let mut criteria = Criteria::default();
        criteria.field_filters.push(FieldFilter::with_id("status", "1", "status-1"));

        let lines = criteria_summary(&criteria);

        assert_eq!(lines[0], "Sort: Oldest first (dateTms)");
        assert!(lines.contains(&"Filter [status-1]: Status contains Approved".to_string()));
    }

    #[test]
    fn test_failed_page_replaces_table_with_error() {
        let mut state = settled_state(0, 0);
        state.data_track = TrackStatus::Failed;
        state.error = Some("DB down".to_string());

        let rendered = render_state(&state);

        assert!(rendered.ends_with("Error: DB down"));
        assert!(!rendered.contains("No transactions found"));
        assert!(!rendered.contains("Page 1/1"));
    }

    #[test]
    fn test_failed_count_keeps_rows() {
        let mut state = settled_state(0, 0);
        state.rows.push(Transaction {
            cod_oper: "OP-3".to_string(),
            ..Transaction::default()
        });
        state.count_track = TrackStatus::Failed;
        state.error = Some("HTTP 503".to_string());

        let rendered = render_state(&state);

        assert!(rendered.contains("OP-3"));
        assert!(rendered.ends_with("Error: HTTP 503"));
    }
}
