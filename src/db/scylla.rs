use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use scylla::client::session::Session;
use scylla::statement::batch::Batch;
use uuid::Uuid;

use crate::domain::common::{CustomerId, Money, ProductId};
use crate::domain::customer::Customer;
use crate::domain::order::{
    CustomerRepository, Order, OrderRepository, RepositoryError, RestaurantRepository,
    Transaction, TransactionManager,
};
use crate::domain::restaurant::{Product, Restaurant, RestaurantQuery};

// ============================================================================
// ScyllaDB Store
// ============================================================================
//
// Reads go straight to the session. Orders saved in a transaction are
// staged and written as ONE logged batch on commit, so either every staged
// row lands or none does. Dropping the transaction discards the stage.
//
// Prices are stored as decimal text; order items as a JSON column.
//
// ============================================================================

const INSERT_ORDER: &str = "INSERT INTO orders (
        id, tracking_id, customer_id, restaurant_id,
        address_id, street, postal_code, city,
        price, status, items, created_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

type OrderRow = (
    Uuid,
    Uuid,
    Uuid,
    Uuid,
    Uuid,
    String,
    String,
    String,
    String,
    String,
    String,
    DateTime<Utc>,
);

#[derive(Clone)]
pub struct ScyllaStore {
    session: Arc<Session>,
}

impl ScyllaStore {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Create keyspace and tables if they do not exist, and switch to the keyspace
    pub async fn ensure_schema(&self, keyspace: &str) -> Result<(), RepositoryError> {
        self.session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                    keyspace
                ),
                &[],
            )
            .await
            .map_err(RepositoryError::backend)?;

        self.session
            .use_keyspace(keyspace, false)
            .await
            .map_err(RepositoryError::backend)?;

        let tables = [
            "CREATE TABLE IF NOT EXISTS customers (id uuid PRIMARY KEY)",
            "CREATE TABLE IF NOT EXISTS restaurants (id uuid PRIMARY KEY, active boolean)",
            "CREATE TABLE IF NOT EXISTS restaurant_products (
                restaurant_id uuid,
                product_id uuid,
                name text,
                price text,
                available boolean,
                PRIMARY KEY (restaurant_id, product_id)
            )",
            "CREATE TABLE IF NOT EXISTS orders (
                id uuid PRIMARY KEY,
                tracking_id uuid,
                customer_id uuid,
                restaurant_id uuid,
                address_id uuid,
                street text,
                postal_code text,
                city text,
                price text,
                status text,
                items text,
                created_at timestamp
            )",
        ];

        for statement in tables {
            self.session
                .query_unpaged(statement, &[])
                .await
                .map_err(RepositoryError::backend)?;
        }

        tracing::info!(keyspace = %keyspace, "Order store schema ready");
        Ok(())
    }

    pub async fn register_customer(&self, customer: &Customer) -> Result<(), RepositoryError> {
        self.session
            .query_unpaged("INSERT INTO customers (id) VALUES (?)", (customer.id.value(),))
            .await
            .map_err(RepositoryError::backend)?;
        Ok(())
    }

    /// Register a restaurant with its full catalog
    pub async fn register_restaurant(&self, restaurant: &Restaurant) -> Result<(), RepositoryError> {
        self.session
            .query_unpaged(
                "INSERT INTO restaurants (id, active) VALUES (?, ?)",
                (restaurant.id.value(), restaurant.active),
            )
            .await
            .map_err(RepositoryError::backend)?;

        if restaurant.products.is_empty() {
            return Ok(());
        }

        let mut batch = Batch::default();
        let mut product_rows = Vec::with_capacity(restaurant.products.len());
        for product in &restaurant.products {
            batch.append_statement(
                "INSERT INTO restaurant_products (restaurant_id, product_id, name, price, available)
                 VALUES (?, ?, ?, ?, ?)",
            );
            product_rows.push((
                restaurant.id.value(),
                product.id.value(),
                product.name.clone(),
                product.price.amount().to_string(),
                product.available,
            ));
        }

        self.session
            .batch(&batch, product_rows)
            .await
            .map_err(RepositoryError::backend)?;

        Ok(())
    }
}

#[async_trait]
impl TransactionManager for ScyllaStore {
    type Transaction = ScyllaTransaction;

    async fn begin(&self) -> Result<Self::Transaction, RepositoryError> {
        Ok(ScyllaTransaction {
            session: self.session.clone(),
            staged: Vec::new(),
            finished: false,
        })
    }
}

pub struct ScyllaTransaction {
    session: Arc<Session>,
    staged: Vec<OrderRow>,
    finished: bool,
}

#[async_trait]
impl CustomerRepository for ScyllaTransaction {
    async fn find_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let result = self
            .session
            .query_unpaged("SELECT id FROM customers WHERE id = ?", (customer_id.value(),))
            .await
            .map_err(RepositoryError::backend)?;

        let rows_result = result.into_rows_result().map_err(RepositoryError::backend)?;

        let row = rows_result
            .maybe_first_row::<(Uuid,)>()
            .map_err(RepositoryError::corrupt)?;

        Ok(row.map(|(id,)| Customer::new(CustomerId::new(id))))
    }
}

#[async_trait]
impl RestaurantRepository for ScyllaTransaction {
    async fn find_restaurant_information(
        &mut self,
        query: &RestaurantQuery,
    ) -> Result<Option<Restaurant>, RepositoryError> {
        let restaurant_id = query.restaurant_id.value();

        let result = self
            .session
            .query_unpaged("SELECT active FROM restaurants WHERE id = ?", (restaurant_id,))
            .await
            .map_err(RepositoryError::backend)?;

        let active = match result
            .into_rows_result()
            .map_err(RepositoryError::backend)?
            .maybe_first_row::<(Option<bool>,)>()
            .map_err(RepositoryError::corrupt)?
        {
            Some((active,)) => active.unwrap_or(false),
            None => return Ok(None),
        };

        let mut products = Vec::new();

        if !query.product_ids.is_empty() {
            let product_ids: Vec<Uuid> = query.product_ids.iter().map(|id| id.value()).collect();

            let result = self
                .session
                .query_unpaged(
                    "SELECT product_id, name, price, available FROM restaurant_products
                     WHERE restaurant_id = ? AND product_id IN ?",
                    (restaurant_id, product_ids),
                )
                .await
                .map_err(RepositoryError::backend)?;

            let rows_result = result.into_rows_result().map_err(RepositoryError::backend)?;

            for row in rows_result
                .rows::<(Uuid, String, String, bool)>()
                .map_err(RepositoryError::corrupt)?
            {
                let (product_id, name, price, available) = row.map_err(RepositoryError::corrupt)?;
                let price = Decimal::from_str(&price).map_err(|e| {
                    RepositoryError::Corrupt(format!("price of product {}: {}", product_id, e))
                })?;

                products.push(Product::new(
                    ProductId::new(product_id),
                    name,
                    Money::new(price),
                    available,
                ));
            }
        }

        tracing::debug!(
            restaurant_id = %restaurant_id,
            product_count = products.len(),
            "Loaded restaurant information"
        );

        Ok(Some(Restaurant::new(query.restaurant_id, active, products)))
    }
}

#[async_trait]
impl OrderRepository for ScyllaTransaction {
    async fn save(&mut self, order: &Order) -> Result<Option<Order>, RepositoryError> {
        let items = serde_json::to_string(&order.items).map_err(RepositoryError::backend)?;

        self.staged.push((
            order.id.value(),
            order.tracking_id.value(),
            order.customer_id.value(),
            order.restaurant_id.value(),
            order.delivery_address.id,
            order.delivery_address.street.clone(),
            order.delivery_address.postal_code.clone(),
            order.delivery_address.city.clone(),
            order.price.amount().to_string(),
            order.status.as_str().to_string(),
            items,
            Utc::now(),
        ));

        Ok(Some(order.clone()))
    }
}

#[async_trait]
impl Transaction for ScyllaTransaction {
    async fn commit(mut self) -> Result<(), RepositoryError> {
        let rows = std::mem::take(&mut self.staged);
        self.finished = true;

        if rows.is_empty() {
            return Ok(());
        }

        let mut batch = Batch::default();
        for _ in &rows {
            batch.append_statement(INSERT_ORDER);
        }

        let order_count = rows.len();
        self.session
            .batch(&batch, rows)
            .await
            .map_err(RepositoryError::backend)?;

        tracing::info!(order_count = order_count, "✅ Committed orders batch");
        Ok(())
    }
}

impl Drop for ScyllaTransaction {
    fn drop(&mut self) {
        if !self.finished && !self.staged.is_empty() {
            tracing::debug!(
                discarded_orders = self.staged.len(),
                "Rolled back ScyllaDB transaction"
            );
        }
    }
}
