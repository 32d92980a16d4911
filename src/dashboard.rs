use log::*;
use serde::Serialize;

use crate::api::{AdminApi, ApiError};
use crate::filter::OrderFilter;
use crate::model::{College, DeliveryPerson, Order, Review, User, Vendor};

/// One fetched collection. Replaced wholesale on every fetch.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Resource<T> {
    pub items: Vec<T>,
    #[serde(skip)]
    pub loading: bool,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Resource {
            items: vec![],
            loading: false,
        }
    }
}

impl<T> Resource<T> {
    pub fn loaded(items: Vec<T>) -> Self {
        Resource {
            items,
            loading: false,
        }
    }

    // A failure leaves the slot empty; the error only goes to the log
    fn settle(&mut self, what: &str, result: Result<Vec<T>, ApiError>) {
        self.loading = false;
        match result {
            Ok(items) => {
                debug!("Fetched {} {}", items.len(), what);
                self.items = items;
            }
            Err(e) => {
                match e.status() {
                    Some(status) => error!(
                        "Error fetching {} (HTTP {}): {:#}",
                        what,
                        status,
                        anyhow::Error::new(e)
                    ),
                    None => error!("Error fetching {}: {:#}", what, anyhow::Error::new(e)),
                }
                self.items = vec![];
            }
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct Dashboard {
    pub users: Resource<User>,
    pub orders: Resource<Order>,
    pub vendors: Resource<Vendor>,
    pub delivery_persons: Resource<DeliveryPerson>,
    pub colleges: Resource<College>,
    pub reviews: Resource<Review>,
    #[serde(skip)]
    pub order_filter: OrderFilter,
}

impl Dashboard {
    pub fn new(order_filter: OrderFilter) -> Self {
        Dashboard {
            order_filter,
            ..Dashboard::default()
        }
    }

    /// Fetches all six collections at once. Each one lands in its own slot
    /// so one failing never touches the others.
    pub async fn refresh_all<A: AdminApi + ?Sized>(&mut self, api: &A) {
        self.users.loading = true;
        self.orders.loading = true;
        self.vendors.loading = true;
        self.delivery_persons.loading = true;
        self.colleges.loading = true;
        self.reviews.loading = true;

        let (users, orders, vendors, delivery_persons, colleges, reviews) = tokio::join!(
            api.users(),
            api.orders(&self.order_filter),
            api.vendors(),
            api.delivery_persons(),
            api.colleges(),
            api.reviews(),
        );

        self.users.settle("users", users);
        self.orders.settle("orders", orders);
        self.vendors.settle("vendors", vendors);
        self.delivery_persons.settle("delivery persons", delivery_persons);
        self.colleges.settle("colleges", colleges);
        self.reviews.settle("reviews", reviews);
    }

    /// Re-issues only the orders request with the current filter
    pub async fn refresh_orders<A: AdminApi + ?Sized>(&mut self, api: &A) {
        self.orders.loading = true;
        let orders = api.orders(&self.order_filter).await;
        self.orders.settle("orders", orders);
    }

    pub async fn apply_filter<A: AdminApi + ?Sized>(&mut self, api: &A, filter: OrderFilter) {
        self.order_filter = filter;
        self.refresh_orders(api).await;
    }

    pub async fn reset_filter<A: AdminApi + ?Sized>(&mut self, api: &A) {
        self.order_filter.reset();
        self.refresh_orders(api).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockAdminApi;
    use crate::model::OrderStatus;

    fn order(id: i64) -> Order {
        Order {
            id,
            user_id: Some(1),
            vendor_id: Some(1),
            delivery_person_id: None,
            order_status: OrderStatus::Pending,
            order_datetime: "2024-03-01T10:00:00Z".to_owned(),
            total_amount: "5.00".to_owned(),
            items: None,
            vendor_rating: None,
            delivery_rating: None,
        }
    }

    fn happy_api() -> MockAdminApi {
        let mut api = MockAdminApi::new();
        api.expect_users().returning(|| Ok(vec![]));
        api.expect_vendors().returning(|| Ok(vec![]));
        api.expect_delivery_persons().returning(|| Ok(vec![]));
        api.expect_colleges().returning(|| {
            Ok(vec![College {
                id: 1,
                name: "Main".to_owned(),
                address: "Road 1".to_owned(),
            }])
        });
        api.expect_reviews().returning(|| Ok(vec![]));
        api
    }

    #[tokio::test]
    async fn failed_fetch_only_empties_its_own_slot() {
        let mut api = happy_api();
        api.expect_orders().returning(|_| {
            Err(ApiError::Status {
                status: 500,
                message: "boom".to_owned(),
            })
        });

        let mut dashboard = Dashboard::default();
        dashboard.orders = Resource::loaded(vec![order(9)]);
        dashboard.refresh_all(&api).await;

        assert!(dashboard.orders.items.is_empty());
        assert!(!dashboard.orders.loading);
        assert_eq!(dashboard.colleges.items.len(), 1);
        assert!(!dashboard.colleges.loading);
    }

    #[tokio::test]
    async fn filter_is_passed_to_orders_fetch() {
        let mut api = MockAdminApi::new();
        api.expect_orders()
            .withf(|f: &OrderFilter| f.status.as_deref() == Some("completed"))
            .times(1)
            .returning(|_| Ok(vec![order(1), order(2)]));

        let mut dashboard = Dashboard::default();
        dashboard
            .apply_filter(
                &api,
                OrderFilter {
                    status: Some("completed".to_owned()),
                    ..OrderFilter::default()
                },
            )
            .await;
        assert_eq!(dashboard.orders.items.len(), 2);
    }

    #[tokio::test]
    async fn reset_refetches_unfiltered() {
        let mut api = MockAdminApi::new();
        api.expect_orders()
            .withf(|f: &OrderFilter| f.is_empty())
            .times(1)
            .returning(|_| Ok(vec![order(1)]));

        let mut dashboard = Dashboard::new(OrderFilter {
            vendor_id: Some("4".to_owned()),
            ..OrderFilter::default()
        });
        dashboard.reset_filter(&api).await;
        assert!(dashboard.order_filter.is_empty());
        assert_eq!(dashboard.orders.items.len(), 1);
    }
}
