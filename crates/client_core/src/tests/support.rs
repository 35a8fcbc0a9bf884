//! In-memory `ProductApi` used by controller tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::domain::{NewProduct, Page, Product, ProductId};
use tokio::sync::{broadcast, oneshot};

use crate::{CatalogEvent, ClientError, ClientResult, Notice, ProductApi};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListPaged { page_index: u32, page_size: u32 },
    GetAll,
    GetById(ProductId),
    GetByPrice(f64),
    Create(NewProduct),
    Update(ProductId, Product),
    Delete(ProductId),
}

#[derive(Default)]
struct FakeState {
    products: Vec<Product>,
    next_id: i64,
    calls: Vec<Call>,
    list_failures: VecDeque<ClientError>,
    write_failures: VecDeque<ClientError>,
    page_gates: HashMap<u32, oneshot::Receiver<()>>,
}

#[derive(Clone, Default)]
pub struct FakeProductApi {
    state: Arc<Mutex<FakeState>>,
}

pub fn product(id: i64, name: &str, price: f64) -> Product {
    Product {
        id: ProductId(id),
        name: name.to_string(),
        price,
        description: None,
    }
}

impl FakeProductApi {
    pub fn with_products(count: i64) -> Self {
        let products = (1..=count)
            .map(|id| product(id, &format!("item-{id}"), id as f64))
            .collect();
        Self::from_products(products)
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        let next_id = products.iter().map(|p| p.id.0).max().unwrap_or(0) + 1;
        let fake = Self::default();
        {
            let mut state = fake.state.lock().expect("fake state");
            state.products = products;
            state.next_id = next_id;
        }
        fake
    }

    pub fn fail_next_list(&self, err: ClientError) {
        self.state
            .lock()
            .expect("fake state")
            .list_failures
            .push_back(err);
    }

    pub fn fail_next_write(&self, err: ClientError) {
        self.state
            .lock()
            .expect("fake state")
            .write_failures
            .push_back(err);
    }

    /// Holds the next `list_paged` for `page_index` until the sender fires.
    pub fn gate_page(&self, page_index: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state
            .lock()
            .expect("fake state")
            .page_gates
            .insert(page_index, rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().expect("fake state").calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::ListPaged { .. }))
            .count()
    }

    pub fn products(&self) -> Vec<Product> {
        self.state.lock().expect("fake state").products.clone()
    }

    fn record(&self, call: Call) {
        self.state.lock().expect("fake state").calls.push(call);
    }

    fn take_write_failure(&self) -> Option<ClientError> {
        self.state
            .lock()
            .expect("fake state")
            .write_failures
            .pop_front()
    }
}

#[async_trait]
impl ProductApi for FakeProductApi {
    async fn list_paged(&self, page_index: u32, page_size: u32) -> ClientResult<Page> {
        let gate = {
            let mut state = self.state.lock().expect("fake state");
            state.calls.push(Call::ListPaged {
                page_index,
                page_size,
            });
            if let Some(err) = state.list_failures.pop_front() {
                return Err(err);
            }
            state.page_gates.remove(&page_index)
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let state = self.state.lock().expect("fake state");
        let start = page_index as usize * page_size as usize;
        let content = state
            .products
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok(Page {
            content,
            page_index,
            page_size,
            total_elements: state.products.len() as u64,
        })
    }

    async fn get_all(&self) -> ClientResult<Vec<Product>> {
        self.record(Call::GetAll);
        Ok(self.products())
    }

    async fn get_by_id(&self, id: ProductId) -> ClientResult<Product> {
        self.record(Call::GetById(id));
        self.products()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("product {id}")))
    }

    async fn get_by_price(&self, price: f64) -> ClientResult<Vec<Product>> {
        self.record(Call::GetByPrice(price));
        Ok(self
            .products()
            .into_iter()
            .filter(|p| p.price == price)
            .collect())
    }

    async fn create(&self, draft: &NewProduct) -> ClientResult<Product> {
        self.record(Call::Create(draft.clone()));
        if let Some(err) = self.take_write_failure() {
            return Err(err);
        }
        let mut state = self.state.lock().expect("fake state");
        let created = Product {
            id: ProductId(state.next_id),
            name: draft.name.clone(),
            price: draft.price,
            description: draft.description.clone(),
        };
        state.next_id += 1;
        state.products.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: ProductId, product: &Product) -> ClientResult<Product> {
        self.record(Call::Update(id, product.clone()));
        if let Some(err) = self.take_write_failure() {
            return Err(err);
        }
        let mut state = self.state.lock().expect("fake state");
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("product {id}")))?;
        *slot = product.clone();
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> ClientResult<()> {
        self.record(Call::Delete(id));
        if let Some(err) = self.take_write_failure() {
            return Err(err);
        }
        let mut state = self.state.lock().expect("fake state");
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(ClientError::NotFound(format!("product {id}")));
        }
        Ok(())
    }
}

pub fn drain_notices(rx: &mut broadcast::Receiver<CatalogEvent>) -> Vec<Notice> {
    drain_events(rx)
        .into_iter()
        .filter_map(|event| match event {
            CatalogEvent::Notice(notice) => Some(notice),
            _ => None,
        })
        .collect()
}

pub fn drain_events(rx: &mut broadcast::Receiver<CatalogEvent>) -> Vec<CatalogEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
