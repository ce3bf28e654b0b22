//! Shared test fixtures: a Customer/Orders schema, a three-level variant and
//! a cyclic pair of tables.

use refdel_api::prelude::{
    DeletePolicy, PolicyConfig, Record, RecordId, SchemaDef,
};

use crate::engine::DeleteEngine;
use crate::memory::MemoryStorage;

pub const CUSTOMER: RecordId = RecordId(1);
pub const ORDER_1: RecordId = RecordId(10);
pub const ORDER_2: RecordId = RecordId(11);

/// Customers owning many orders through a nullable foreign key.
pub fn customers_orders_schema() -> SchemaDef {
    SchemaDef::builder()
        .table("customers")
        .table("orders")
        .relationship("orders_customer", "customers", "orders", "customer_id", true)
        .build()
        .expect("schema should build")
}

/// Same shape, non-nullable foreign key.
pub fn customers_orders_schema_non_nullable() -> SchemaDef {
    SchemaDef::builder()
        .table("customers")
        .table("orders")
        .relationship("orders_customer", "customers", "orders", "customer_id", false)
        .build()
        .expect("schema should build")
}

/// Customers → orders → order items, both levels cascading in tests.
pub fn deep_schema() -> SchemaDef {
    SchemaDef::builder()
        .table("customers")
        .table("orders")
        .table("order_items")
        .relationship("orders_customer", "customers", "orders", "customer_id", true)
        .relationship("items_order", "orders", "order_items", "order_id", true)
        .build()
        .expect("schema should build")
}

/// Teams reference employees (their lead) and employees reference teams:
/// a cyclic relationship graph.
pub fn cyclic_schema() -> SchemaDef {
    SchemaDef::builder()
        .table("teams")
        .table("employees")
        .relationship("team_members", "teams", "employees", "team_id", true)
        .relationship("team_lead", "employees", "teams", "lead_id", true)
        .build()
        .expect("schema should build")
}

/// One customer with two orders.
pub fn seeded_storage(schema: &SchemaDef) -> MemoryStorage {
    let mut storage = MemoryStorage::new(schema.clone());
    storage
        .insert("customers", Record::new(CUSTOMER.0))
        .expect("customer should insert");
    for order in [ORDER_1, ORDER_2] {
        storage
            .insert(
                "orders",
                Record::new(order.0).with_foreign_key("customer_id", Some(CUSTOMER)),
            )
            .expect("order should insert");
    }
    storage
}

/// Engine over the seeded Customer/Orders storage with a single policy on
/// the orders relationship.
pub fn customers_orders_engine(policy: DeletePolicy) -> DeleteEngine<MemoryStorage> {
    let schema = customers_orders_schema();
    let storage = seeded_storage(&schema);
    let config = PolicyConfig::new().with_policy("orders_customer", policy);
    DeleteEngine::new(schema, &config, storage).expect("engine should build")
}
