pub mod api;
pub mod storage;

pub use api::{College, DeliveryPerson, Id, Order, OrderStatus, Review, User, Vendor};
