use std::sync::Arc;
use crate::server::database::store::OrderStore;

/// Shared by every worker, the store is injected at startup
#[derive(Clone)]
pub(crate) struct AppState {
    store: Arc<dyn OrderStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn OrderStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::server::database::memory::MemoryOrderStore;

    #[actix_web::test]
    async fn clones_share_the_store() {
        let state = AppState::new(Arc::new(MemoryOrderStore::new()));
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.store, &cloned.store));
        assert!(cloned.store().list_orders().await.unwrap().is_empty());
    }
}
