use async_trait::async_trait;
use shared::{
    domain::{NewProduct, Page, Product, ProductId},
    error::{ErrorCode, FieldError},
};

pub mod error;
pub mod form;
pub mod pagination;
pub mod retry;
pub mod screen;
pub mod transport;

pub use error::ClientError;
pub use form::{FormError, FormField, FormMode, ProductDraft, ProductForm, SubmitError, Submission};
pub use pagination::{ListState, PageController, RefreshOutcome};
pub use retry::RetryPolicy;
pub use screen::{CatalogScreen, ScreenOptions};
pub use transport::{ClientOptions, HttpProductClient, DEFAULT_API_BASE_URL};

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Server capabilities of the product resource, one method per endpoint.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn list_paged(&self, page_index: u32, page_size: u32) -> ClientResult<Page>;
    async fn get_all(&self) -> ClientResult<Vec<Product>>;
    async fn get_by_id(&self, id: ProductId) -> ClientResult<Product>;
    async fn get_by_price(&self, price: f64) -> ClientResult<Vec<Product>>;
    async fn create(&self, draft: &NewProduct) -> ClientResult<Product>;
    async fn update(&self, id: ProductId, product: &Product) -> ClientResult<Product>;
    async fn delete(&self, id: ProductId) -> ClientResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// User-facing notification. Replaces blocking alert dialogs.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub code: Option<ErrorCode>,
    pub detail: Option<String>,
    pub field_errors: Vec<FieldError>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            code: None,
            detail: None,
            field_errors: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>, err: &ClientError) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
            code: Some(err.code()),
            detail: Some(err.to_string()),
            field_errors: err.field_errors().to_vec(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.kind == NoticeKind::Failure
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    PageLoaded {
        page_index: u32,
        total_pages: u32,
        total_elements: u64,
    },
    Notice(Notice),
    FormClosed,
    ConfirmDelete {
        id: ProductId,
    },
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
