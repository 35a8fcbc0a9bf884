use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ProductId);

/// A product the server has persisted. The server owns every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Create body: a product without an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One server page of products.
///
/// `page_size` is the requested capacity; `content` may be shorter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub content: Vec<Product>,
    pub page_index: u32,
    pub page_size: u32,
    pub total_elements: u64,
}

impl Page {
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_elements, self.page_size)
    }
}

/// `max(1, ceil(total_elements / page_size))`; a zero page size counts as 1.
pub fn total_pages(total_elements: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = total_elements.div_ceil(size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
