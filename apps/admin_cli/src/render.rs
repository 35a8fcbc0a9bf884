//! Terminal rendering of the product table, pagination footer and notices.

use client_core::{FormField, ListState, Notice, NoticeKind, ProductForm};
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL_CONDENSED, Cell, CellAlignment,
    ContentArrangement, Table,
};
use shared::domain::Product;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

pub fn product_table(products: &[Product]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Price", "Description"]);
    apply_table_style(&mut table);
    for product in products {
        table.add_row(vec![
            Cell::new(product.id).set_alignment(CellAlignment::Right),
            Cell::new(&product.name),
            Cell::new(format_price(product.price)).set_alignment(CellAlignment::Right),
            Cell::new(product.description.as_deref().unwrap_or("")),
        ]);
    }
    table
}

pub fn format_price(price: f64) -> String {
    format!("${price}")
}

pub fn page_footer(state: &ListState) -> String {
    let prev = if state.has_previous() { "[p]rev" } else { "-" };
    let next = if state.has_next() { "[n]ext" } else { "-" };
    format!(
        "{prev}  Page {} of {}  {next}   ({} products, {} per page)",
        state.page_index + 1,
        state.total_pages(),
        state.total_elements,
        state.page_size
    )
}

pub fn render_list(state: &ListState) -> String {
    if state.is_loading {
        return "Loading...".to_string();
    }
    if state.items.is_empty() {
        return format!("No products.\n{}", page_footer(state));
    }
    format!("{}\n{}", product_table(&state.items), page_footer(state))
}

pub fn render_form(form: &ProductForm) -> String {
    let mut lines = vec![form.title().to_string()];
    for field in FormField::ALL {
        lines.push(format!("  {:<11} = {}", field.as_str(), form.field_text(field)));
    }
    for err in form.field_errors() {
        lines.push(format!("  ! {}: {}", err.field, err.message));
    }
    lines.join("\n")
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::Success => format!("ok: {}", notice.message),
        NoticeKind::Failure => {
            let mut text = format!("error: {}", notice.message);
            if let Some(detail) = &notice.detail {
                text.push_str(&format!(" ({detail})"));
            }
            for err in &notice.field_errors {
                text.push_str(&format!("\n  {}: {}", err.field, err.message));
            }
            text
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
