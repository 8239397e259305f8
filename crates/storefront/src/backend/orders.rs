//! Core collaborator contracts implemented over the REST client.
//!
//! The checkout engine depends on [`OrderGateway`] and [`CatalogReader`],
//! not on this client, so tests drive it with in-memory stand-ins while
//! production threads the real backend through unchanged.

use kurohana_core::{
    CatalogReader, DeviceId, GatewayError, NewOrder, Order, OrderGateway, OrderId, OrderStatus,
    ProductId, ProductSnapshot,
};

use crate::backend::BackendClient;
use crate::backend::types::ProductRow;

impl OrderGateway for BackendClient {
    async fn create_order(&self, order: NewOrder) -> Result<Order, GatewayError> {
        self.insert_order(&order).await.map_err(Into::into)
    }

    async fn orders_for_device(&self, device: &DeviceId) -> Result<Vec<Order>, GatewayError> {
        self.orders_by_device(device).await.map_err(Into::into)
    }

    async fn all_orders(&self) -> Result<Vec<Order>, GatewayError> {
        self.list_all_orders().await.map_err(Into::into)
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, GatewayError> {
        self.update_order_status(id, status).await.map_err(Into::into)
    }
}

impl CatalogReader for BackendClient {
    async fn product(&self, id: &ProductId) -> Result<Option<ProductSnapshot>, GatewayError> {
        let row = self.catalog_product(id.as_str()).await?;
        Ok(row.map(|r| r.snapshot()))
    }

    async fn products(&self) -> Result<Vec<ProductSnapshot>, GatewayError> {
        let rows = self.catalog().await?;
        Ok(rows.iter().map(ProductRow::snapshot).collect())
    }
}
