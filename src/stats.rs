//! Figures derived from the fetched collections. Everything here is a pure
//! pass over in-memory slices and is recomputed on every render.

use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::BTreeMap;

use crate::model::{College, DeliveryPerson, Id, Order, OrderStatus, User, Vendor};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts(BTreeMap<OrderStatus, usize>);

impl StatusCounts {
    pub fn of(orders: &[Order]) -> Self {
        StatusCounts(orders.iter().map(|o| o.order_status).counts().into_iter().collect())
    }

    pub fn get(&self, status: OrderStatus) -> usize {
        self.0.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Percentage of all orders in `status`, zero for an empty list
    pub fn share(&self, status: OrderStatus) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(status) as f64 * 100.0 / total as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_users: usize,
    pub total_orders: usize,
    pub total_vendors: usize,
    pub total_delivery_persons: usize,
    pub total_colleges: usize,
    pub by_status: StatusCounts,
    pub total_revenue: f64,
    pub avg_order_value: f64,
    pub avg_delivery_rating: Option<f64>,
    pub avg_vendor_rating: Option<f64>,
}

impl Statistics {
    pub fn compute(
        users: &[User],
        orders: &[Order],
        vendors: &[Vendor],
        delivery_persons: &[DeliveryPerson],
        colleges: &[College],
    ) -> Self {
        Statistics {
            total_users: users.len(),
            total_orders: orders.len(),
            total_vendors: vendors.len(),
            total_delivery_persons: delivery_persons.len(),
            total_colleges: colleges.len(),
            by_status: StatusCounts::of(orders),
            total_revenue: total_revenue(orders),
            avg_order_value: avg_order_value(orders),
            avg_delivery_rating: average_rating(orders.iter().map(Order::delivery_rating)),
            avg_vendor_rating: average_rating(orders.iter().map(Order::vendor_rating)),
        }
    }
}

/// Revenue only counts completed orders
pub fn total_revenue(orders: &[Order]) -> f64 {
    orders
        .iter()
        .filter(|o| o.order_status == OrderStatus::Completed)
        .map(Order::amount)
        .sum()
}

/// Mean over every order whatever its status
pub fn avg_order_value(orders: &[Order]) -> f64 {
    if orders.is_empty() {
        return 0.0;
    }
    orders.iter().map(Order::amount).sum::<f64>() / orders.len() as f64
}

/// Mean of the ratings that are present; `None` when nothing was rated
pub fn average_rating<I: IntoIterator<Item = Option<f64>>>(ratings: I) -> Option<f64> {
    let (sum, count) = ratings
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), r| (sum + r, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// One entry per calendar date, oldest first. Orders without a readable
/// timestamp are left out.
pub fn orders_by_date(orders: &[Order]) -> Vec<(NaiveDate, usize)> {
    orders
        .iter()
        .filter_map(Order::placed_on)
        .counts()
        .into_iter()
        .sorted()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollegeCount {
    pub college_id: Option<Id>,
    pub name: String,
    pub count: usize,
}

/// Users per college id, by ascending id with users lacking one last. Ids with
/// no college get a placeholder name.
pub fn users_by_college(users: &[User], colleges: &[College]) -> Vec<CollegeCount> {
    users
        .iter()
        .map(|u| u.college_id)
        .counts()
        .into_iter()
        .sorted_by_key(|(id, _)| (id.is_none(), *id))
        .map(|(college_id, count)| CollegeCount {
            college_id,
            name: college_name(colleges, college_id),
            count,
        })
        .collect()
}

pub fn college_name(colleges: &[College], id: Option<Id>) -> String {
    match id {
        None => "No college".to_owned(),
        Some(id) => colleges
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("College {}", id)),
    }
}

pub fn user_name(users: &[User], id: Option<Id>) -> String {
    match id {
        None => "Unknown user".to_owned(),
        Some(id) => users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.full_name.clone())
            .unwrap_or_else(|| format!("User #{}", id)),
    }
}

pub fn vendor_name(vendors: &[Vendor], id: Option<Id>) -> String {
    match id {
        None => "Unknown vendor".to_owned(),
        Some(id) => vendors
            .iter()
            .find(|v| v.id == id)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| format!("Vendor #{}", id)),
    }
}

pub fn delivery_person_name(delivery_persons: &[DeliveryPerson], id: Option<Id>) -> String {
    match id {
        None => "Unassigned".to_owned(),
        Some(id) => delivery_persons
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.full_name.clone())
            .unwrap_or_else(|| format!("Delivery #{}", id)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorSummary {
    pub orders: usize,
    pub avg_rating: Option<f64>,
}

pub fn vendor_summary(vendor: &Vendor, orders: &[Order]) -> VendorSummary {
    let own = orders.iter().filter(|o| o.vendor_id == Some(vendor.id)).collect_vec();
    VendorSummary {
        orders: own.len(),
        avg_rating: average_rating(own.iter().map(|o| o.vendor_rating())),
    }
}

pub fn delivery_rating(person: &DeliveryPerson, orders: &[Order]) -> Option<f64> {
    average_rating(
        orders
            .iter()
            .filter(|o| o.delivery_person_id == Some(person.id))
            .map(Order::delivery_rating),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollegeSummary {
    pub users: usize,
    pub vendors: usize,
    pub delivery_persons: usize,
}

pub fn college_summary(
    college: &College,
    users: &[User],
    vendors: &[Vendor],
    delivery_persons: &[DeliveryPerson],
) -> CollegeSummary {
    CollegeSummary {
        users: users.iter().filter(|u| u.college_id == Some(college.id)).count(),
        vendors: vendors.iter().filter(|v| v.college_id == Some(college.id)).count(),
        delivery_persons: delivery_persons
            .iter()
            .filter(|d| d.college_id == Some(college.id))
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status: OrderStatus, amount: &str) -> Order {
        Order {
            id: 1,
            user_id: Some(1),
            vendor_id: Some(1),
            delivery_person_id: Some(1),
            order_status: status,
            order_datetime: String::new(),
            total_amount: amount.to_owned(),
            items: None,
            vendor_rating: None,
            delivery_rating: None,
        }
    }

    #[test]
    fn revenue_and_average_order_value() {
        let orders = vec![
            order(OrderStatus::Completed, "10.00"),
            order(OrderStatus::Pending, "5.00"),
        ];
        assert_eq!(format!("{:.2}", total_revenue(&orders)), "10.00");
        assert_eq!(format!("{:.2}", avg_order_value(&orders)), "7.50");
    }

    #[test]
    fn empty_orders_have_zero_average() {
        assert_eq!(avg_order_value(&[]), 0.0);
        assert_eq!(total_revenue(&[]), 0.0);
    }

    #[test]
    fn average_rating_skips_unrated() {
        assert_eq!(average_rating(vec![Some(4.0), None, Some(5.0), None]), Some(4.5));
        assert_eq!(average_rating(vec![None, None]), None);
        assert_eq!(average_rating(Vec::new()), None);
    }

    #[test]
    fn share_of_empty_counts_is_zero() {
        let counts = StatusCounts::of(&[]);
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.share(OrderStatus::Completed), 0.0);
    }

    #[test]
    fn fractional_ratings_average() {
        assert_eq!(average_rating(vec![Some(4.5), Some(3.5)]), Some(4.0));
    }

    #[test]
    fn missing_foreign_keys_get_labels() {
        assert_eq!(college_name(&[], None), "No college");
        assert_eq!(user_name(&[], None), "Unknown user");
        assert_eq!(vendor_name(&[], None), "Unknown vendor");
    }

    #[test]
    fn dangling_delivery_person() {
        assert_eq!(delivery_person_name(&[], None), "Unassigned");
        assert_eq!(delivery_person_name(&[], Some(3)), "Delivery #3");
    }
}
