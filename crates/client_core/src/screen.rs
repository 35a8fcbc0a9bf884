//! Per-screen state container: the product list, the open form (if any)
//! and the pending delete confirmation.

use std::sync::Arc;

use shared::domain::{Product, ProductId};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    pagination::DEFAULT_PAGE_SIZE, CatalogEvent, ClientResult, FormError, FormField, Notice,
    PageController, ProductApi, ProductForm, RefreshOutcome, RetryPolicy, SubmitError,
};

#[derive(Debug, Clone)]
pub struct ScreenOptions {
    pub page_size: u32,
    pub retry: RetryPolicy,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct CatalogScreen {
    api: Arc<dyn ProductApi>,
    list: PageController,
    form: Option<ProductForm>,
    pending_delete: Option<ProductId>,
    events: broadcast::Sender<CatalogEvent>,
}

impl CatalogScreen {
    pub fn new(api: Arc<dyn ProductApi>, options: ScreenOptions) -> Self {
        let (events, _) = broadcast::channel(256);
        let list = PageController::new(
            Arc::clone(&api),
            options.page_size,
            options.retry,
            events.clone(),
        );
        Self {
            api,
            list,
            form: None,
            pending_delete: None,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub fn api(&self) -> &Arc<dyn ProductApi> {
        &self.api
    }

    pub fn list(&self) -> &PageController {
        &self.list
    }

    pub fn form(&self) -> Option<&ProductForm> {
        self.form.as_ref()
    }

    pub fn is_form_open(&self) -> bool {
        self.form.is_some()
    }

    pub fn open_create(&mut self) {
        self.form = Some(ProductForm::create());
    }

    pub fn open_edit(&mut self, product: Product) {
        self.form = Some(ProductForm::edit(product));
    }

    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), FormError> {
        self.form
            .as_mut()
            .ok_or(FormError::NotOpen)?
            .set_field(field, value)
    }

    /// Sends the open form. On success the form closes and the list refreshes;
    /// on failure the form stays open with its draft untouched.
    pub async fn submit_form(&mut self) -> Result<Product, SubmitError> {
        let form = self.form.as_ref().ok_or(FormError::NotOpen)?;
        let is_edit = form.is_edit();

        match form.submit(self.api.as_ref()).await {
            Ok(saved) => {
                let message = if is_edit {
                    "Product updated successfully"
                } else {
                    "Product created successfully"
                };
                self.notify(Notice::success(message));
                self.close_form();
                self.list.refresh().await;
                Ok(saved)
            }
            Err(SubmitError::Rejected(err)) => {
                warn!(error = %err, "failed to save product");
                self.notify(Notice::failure("Failed to save product", &err));
                if let Some(form) = self.form.as_mut() {
                    form.set_field_errors(err.field_errors().to_vec());
                }
                Err(SubmitError::Rejected(err))
            }
            Err(err) => Err(err),
        }
    }

    pub fn cancel_form(&mut self) {
        self.close_form();
    }

    /// Deleting needs an explicit confirmation; this only records the request.
    pub fn request_delete(&mut self, id: ProductId) {
        self.pending_delete = Some(id);
        let _ = self.events.send(CatalogEvent::ConfirmDelete { id });
    }

    pub fn pending_delete(&self) -> Option<ProductId> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Performs the pending delete. Returns `Ok(None)` when nothing was pending.
    pub async fn confirm_delete(&mut self) -> ClientResult<Option<RefreshOutcome>> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(None);
        };

        match self.api.delete(id).await {
            Ok(()) => {
                info!(%id, "product deleted");
                self.notify(Notice::success("Product deleted successfully"));
                Ok(Some(self.list.notify_item_removed().await))
            }
            Err(err) => {
                warn!(%id, error = %err, "failed to delete product");
                self.notify(Notice::failure("Failed to delete product", &err));
                Err(err)
            }
        }
    }

    fn close_form(&mut self) {
        if self.form.take().is_some() {
            let _ = self.events.send(CatalogEvent::FormClosed);
        }
    }

    fn notify(&self, notice: Notice) {
        let _ = self.events.send(CatalogEvent::Notice(notice));
    }
}

#[cfg(test)]
#[path = "tests/screen_tests.rs"]
mod tests;
