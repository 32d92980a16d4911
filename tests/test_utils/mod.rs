#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;

use sosika_admin::model::{College, DeliveryPerson, Order, OrderStatus, Review, User, Vendor};
use sosika_admin::{AdminApi, ApiError, OrderFilter};

// In-memory stand-in for the remote API
#[derive(Default)]
pub struct FakeApi {
    pub users: Vec<User>,
    pub orders: Vec<Order>,
    pub vendors: Vec<Vendor>,
    pub delivery_persons: Vec<DeliveryPerson>,
    pub colleges: Vec<College>,
    pub reviews: Vec<Review>,
    pub failing_vendors: bool,
    pub password: String,
    pub seen_filters: Mutex<Vec<OrderFilter>>,
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        if password == self.password {
            Ok(format!("token-for-{}", email))
        } else {
            Err(ApiError::Status {
                status: 401,
                message: "Invalid credentials".to_owned(),
            })
        }
    }

    async fn users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.users.clone())
    }

    async fn orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, ApiError> {
        self.seen_filters.lock().unwrap().push(filter.clone());
        Ok(self.orders.clone())
    }

    async fn vendors(&self) -> Result<Vec<Vendor>, ApiError> {
        if self.failing_vendors {
            return Err(ApiError::Status {
                status: 503,
                message: "unavailable".to_owned(),
            });
        }
        Ok(self.vendors.clone())
    }

    async fn delivery_persons(&self) -> Result<Vec<DeliveryPerson>, ApiError> {
        Ok(self.delivery_persons.clone())
    }

    async fn colleges(&self) -> Result<Vec<College>, ApiError> {
        Ok(self.colleges.clone())
    }

    async fn reviews(&self) -> Result<Vec<Review>, ApiError> {
        Ok(self.reviews.clone())
    }
}

pub fn user(id: i64, name: &str, college_id: i64) -> User {
    User {
        id,
        full_name: name.to_owned(),
        email: format!("{}@campus.edu", name.to_lowercase()),
        phone_number: "0700000000".to_owned(),
        college_id: Some(college_id),
        college_registration_number: format!("REG-{}", id),
        created_at: "2024-01-15T08:00:00Z".to_owned(),
    }
}

pub fn order(id: i64, status: OrderStatus, amount: &str, when: &str) -> Order {
    Order {
        id,
        user_id: Some(1),
        vendor_id: Some(1),
        delivery_person_id: Some(1),
        order_status: status,
        order_datetime: when.to_owned(),
        total_amount: amount.to_owned(),
        items: None,
        vendor_rating: None,
        delivery_rating: None,
    }
}

pub fn college(id: i64, name: &str) -> College {
    College {
        id,
        name: name.to_owned(),
        address: format!("{} Road", name),
    }
}

pub fn vendor(id: i64, name: &str, college_id: i64) -> Vendor {
    Vendor {
        id,
        name: name.to_owned(),
        owner_name: "Owner".to_owned(),
        college_id: Some(college_id),
        is_open: true,
    }
}

pub fn rider(id: i64, name: &str, college_id: i64) -> DeliveryPerson {
    DeliveryPerson {
        id,
        full_name: name.to_owned(),
        phone_number: "0711111111".to_owned(),
        email: None,
        college_id: Some(college_id),
        transport_type: "bicycle".to_owned(),
        is_active: true,
        is_verified: false,
    }
}
