use super::*;

use client_core::ClientError;
use shared::{domain::ProductId, error::FieldError};

fn state(items: Vec<Product>, page_index: u32, total_elements: u64) -> ListState {
    ListState {
        page_index,
        page_size: 5,
        items,
        total_elements,
        is_loading: false,
    }
}

fn widget() -> Product {
    Product {
        id: ProductId(3),
        name: "Widget".into(),
        price: 9.99,
        description: Some("blue".into()),
    }
}

#[test]
fn empty_catalog_renders_single_page_without_navigation() {
    let rendered = render_list(&state(Vec::new(), 0, 0));
    assert!(rendered.starts_with("No products."));
    assert!(rendered.contains("-  Page 1 of 1  -"));
}

#[test]
fn table_lists_every_column() {
    let rendered = product_table(&[widget()]).to_string();
    for expected in ["ID", "Name", "Price", "Description", "Widget", "$9.99", "blue"] {
        assert!(rendered.contains(expected), "missing {expected} in\n{rendered}");
    }
}

#[test]
fn footer_offers_only_available_directions() {
    let footer = page_footer(&state(vec![widget()], 1, 12));
    assert!(footer.starts_with("[p]rev  Page 2 of 3  [n]ext"));

    let footer = page_footer(&state(vec![widget()], 2, 12));
    assert!(footer.contains("Page 3 of 3  -"));
}

#[test]
fn loading_state_hides_rows() {
    let mut loading = state(vec![widget()], 0, 1);
    loading.is_loading = true;
    assert_eq!(render_list(&loading), "Loading...");
}

#[test]
fn failure_notice_includes_detail_and_field_errors() {
    let err = ClientError::Validation {
        status: 400,
        message: "invalid product".into(),
        field_errors: vec![FieldError::new("price", "must be >= 0")],
    };
    let text = render_notice(&Notice::failure("Failed to save product", &err));
    assert!(text.starts_with("error: Failed to save product (request rejected (400): invalid product)"));
    assert!(text.ends_with("\n  price: must be >= 0"));
}

#[test]
fn form_shows_title_and_draft_values() {
    let form = ProductForm::edit(widget());
    let text = render_form(&form);
    assert!(text.starts_with("Edit Product"));
    assert!(text.contains("price       = 9.99"));
}
