use itertools::Itertools;
use std::fmt::Write;
use std::str::FromStr;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::dashboard::{Dashboard, Resource};
use crate::model::api::parse_timestamp;
use crate::model::{Order, OrderStatus};
use crate::stats::{self, Statistics};

const BAR_WIDTH: usize = 40;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Overview,
    Users,
    Orders,
    Vendors,
    Delivery,
    Colleges,
    Reviews,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Overview,
        Tab::Users,
        Tab::Orders,
        Tab::Vendors,
        Tab::Delivery,
        Tab::Colleges,
        Tab::Reviews,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Users => "users",
            Tab::Orders => "orders",
            Tab::Vendors => "vendors",
            Tab::Delivery => "delivery",
            Tab::Colleges => "colleges",
            Tab::Reviews => "reviews",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "Dashboard Overview",
            Tab::Users => "Users",
            Tab::Orders => "Orders",
            Tab::Vendors => "Vendors",
            Tab::Delivery => "Delivery Persons",
            Tab::Colleges => "Colleges",
            Tab::Reviews => "User Reviews",
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Tab::ALL
            .iter()
            .find(|t| t.key() == wanted)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown tab {:?}, expected one of: {}",
                    s,
                    Tab::ALL.iter().map(Tab::key).join(", ")
                )
            })
    }
}

/// Renders one tab of the dashboard. `search` narrows the table tabs to rows
/// whose text columns contain it, ignoring case.
pub fn render(dashboard: &Dashboard, tab: Tab, search: Option<&str>) -> String {
    let search = Search::new(search);
    let body = match tab {
        Tab::Overview => overview(dashboard),
        Tab::Users => users(dashboard, &search),
        Tab::Orders => orders(dashboard),
        Tab::Vendors => vendors(dashboard, &search),
        Tab::Delivery => delivery(dashboard, &search),
        Tab::Colleges => colleges(dashboard, &search),
        Tab::Reviews => reviews(dashboard, &search),
    };
    format!("{}\n\n{}", tab.title(), body)
}

struct Search(Option<String>);

impl Search {
    fn new(term: Option<&str>) -> Self {
        Search(
            term.map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        )
    }

    fn matches(&self, fields: &[&str]) -> bool {
        match &self.0 {
            None => true,
            Some(term) => fields.iter().any(|f| f.to_lowercase().contains(term.as_str())),
        }
    }
}

fn table<R: Tabled>(rows: Vec<R>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

// Shared empty/loading handling for the list tabs
fn listing<T, R: Tabled>(
    resource: &Resource<T>,
    noun: &str,
    rows: impl FnOnce(&[T]) -> Vec<R>,
) -> String {
    if resource.loading {
        return format!("Loading {}...", noun);
    }
    let rows = rows(&resource.items);
    if rows.is_empty() {
        format!("No {} found.", noun)
    } else {
        table(rows)
    }
}

pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_owned())
}

pub fn format_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_owned())
}

pub fn format_amount(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub fn format_rating(rating: Option<f64>) -> String {
    rating
        .map(|r| format!("{:.1}/5", r))
        .unwrap_or_else(|| "N/A".to_owned())
}

pub fn format_order_ratings(order: &Order) -> String {
    match (order.vendor_rating(), order.delivery_rating()) {
        (Some(v), Some(d)) => format!("V: {}/5, D: {}/5", v, d),
        (Some(v), None) => format!("V: {}/5", v),
        (None, Some(d)) => format!("D: {}/5", d),
        (None, None) => "Not rated".to_owned(),
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let width = (count * BAR_WIDTH + max - 1) / max;
    "█".repeat(width.max(1))
}

#[derive(Tabled)]
struct CardRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct ChartRow {
    #[tabled(rename = "")]
    label: String,
    #[tabled(rename = "Count")]
    count: String,
    #[tabled(rename = "")]
    bar: String,
}

// Points are (label, count as shown, count)
fn chart(points: Vec<(String, String, usize)>) -> String {
    if points.is_empty() {
        return "No data.".to_owned();
    }
    let max = points.iter().map(|(_, _, c)| *c).max().unwrap_or(0);
    table(
        points
            .into_iter()
            .map(|(label, shown, count)| ChartRow {
                label,
                count: shown,
                bar: bar(count, max),
            })
            .collect_vec(),
    )
}

fn overview(d: &Dashboard) -> String {
    let s = Statistics::compute(
        &d.users.items,
        &d.orders.items,
        &d.vendors.items,
        &d.delivery_persons.items,
        &d.colleges.items,
    );

    let cards = vec![
        CardRow { metric: "Total Users", value: s.total_users.to_string() },
        CardRow { metric: "Total Orders", value: s.total_orders.to_string() },
        CardRow { metric: "Total Vendors", value: s.total_vendors.to_string() },
        CardRow { metric: "Delivery Persons", value: s.total_delivery_persons.to_string() },
        CardRow { metric: "Colleges", value: s.total_colleges.to_string() },
        CardRow { metric: "Total Revenue", value: format_amount(s.total_revenue) },
        CardRow { metric: "Avg Order Value", value: format_amount(s.avg_order_value) },
        CardRow {
            metric: "Avg Delivery Rating",
            value: format!("{:.1}/5", s.avg_delivery_rating.unwrap_or(0.0)),
        },
        CardRow {
            metric: "Avg Vendor Rating",
            value: format!("{:.1}/5", s.avg_vendor_rating.unwrap_or(0.0)),
        },
    ];

    // Unknown statuses only show up when there are some
    let by_status = OrderStatus::ALL
        .iter()
        .filter(|st| **st != OrderStatus::Unknown || s.by_status.get(**st) > 0)
        .map(|st| {
            let count = s.by_status.get(*st);
            let shown = format!("{} ({:.0}%)", count, s.by_status.share(*st));
            (st.label(), shown, count)
        })
        .collect_vec();

    let timeline = stats::orders_by_date(&d.orders.items)
        .into_iter()
        .map(|(date, count)| (date.format("%Y-%m-%d").to_string(), count.to_string(), count))
        .collect_vec();

    let by_college = stats::users_by_college(&d.users.items, &d.colleges.items)
        .into_iter()
        .map(|c| (c.name, c.count.to_string(), c.count))
        .collect_vec();

    let mut out = String::new();
    let _ = writeln!(out, "{}", table(cards));
    let _ = writeln!(out, "\nOrders by Status\n{}", chart(by_status));
    let _ = writeln!(out, "\nOrders Timeline\n{}", chart(timeline));
    let _ = write!(out, "\nUsers by College\n{}", chart(by_college));
    out
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "College")]
    college: String,
    #[tabled(rename = "Registration #")]
    registration: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn users(d: &Dashboard, search: &Search) -> String {
    listing(&d.users, "users", |users| {
        users
            .iter()
            .filter(|u| {
                search.matches(&[
                    u.full_name.as_str(),
                    u.email.as_str(),
                    u.phone_number.as_str(),
                    u.college_registration_number.as_str(),
                ])
            })
            .map(|u| UserRow {
                id: u.id,
                name: u.full_name.clone(),
                email: u.email.clone(),
                phone: u.phone_number.clone(),
                college: stats::college_name(&d.colleges.items, u.college_id),
                registration: u.college_registration_number.clone(),
                created: format_timestamp(&u.created_at),
            })
            .collect()
    })
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Delivery")]
    delivery: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Date & Time")]
    placed: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Items")]
    items: String,
    #[tabled(rename = "Ratings")]
    ratings: String,
}

fn orders(d: &Dashboard) -> String {
    let mut out = String::new();
    let filter = d.order_filter.query_pairs();
    if !filter.is_empty() {
        let _ = writeln!(
            out,
            "Filters: {}\n",
            filter.iter().map(|(k, v)| format!("{}={}", k, v)).join(", ")
        );
    }
    out.push_str(&listing(&d.orders, "orders", |orders| {
        orders
            .iter()
            .map(|o| OrderRow {
                id: o.id,
                user: stats::user_name(&d.users.items, o.user_id),
                vendor: stats::vendor_name(&d.vendors.items, o.vendor_id),
                delivery: stats::delivery_person_name(
                    &d.delivery_persons.items,
                    o.delivery_person_id,
                ),
                status: o.order_status.label(),
                placed: format_timestamp(&o.order_datetime),
                amount: format_amount(o.amount()),
                items: o
                    .item_count()
                    .map(|n| format!("{} items", n))
                    .unwrap_or_else(|| "N/A".to_owned()),
                ratings: format_order_ratings(o),
            })
            .collect()
    }));
    out
}

#[derive(Tabled)]
struct VendorRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "College")]
    college: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Total Orders")]
    orders: usize,
    #[tabled(rename = "Avg. Rating")]
    rating: String,
}

fn vendors(d: &Dashboard, search: &Search) -> String {
    listing(&d.vendors, "vendors", |vendors| {
        vendors
            .iter()
            .filter(|v| search.matches(&[v.name.as_str(), v.owner_name.as_str()]))
            .map(|v| {
                let summary = stats::vendor_summary(v, &d.orders.items);
                VendorRow {
                    id: v.id,
                    name: v.name.clone(),
                    owner: v.owner_name.clone(),
                    college: stats::college_name(&d.colleges.items, v.college_id),
                    status: if v.is_open { "Open" } else { "Closed" },
                    orders: summary.orders,
                    rating: format_rating(summary.avg_rating),
                }
            })
            .collect()
    })
}

#[derive(Tabled)]
struct DeliveryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "College")]
    college: String,
    #[tabled(rename = "Transport")]
    transport: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Verification")]
    verification: &'static str,
    #[tabled(rename = "Avg. Rating")]
    rating: String,
}

fn delivery(d: &Dashboard, search: &Search) -> String {
    listing(&d.delivery_persons, "delivery persons", |persons| {
        persons
            .iter()
            .filter(|p| {
                search.matches(&[
                    p.full_name.as_str(),
                    p.phone_number.as_str(),
                    p.email.as_deref().unwrap_or(""),
                ])
            })
            .map(|p| DeliveryRow {
                id: p.id,
                name: p.full_name.clone(),
                phone: p.phone_number.clone(),
                email: p
                    .email
                    .clone()
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "N/A".to_owned()),
                college: stats::college_name(&d.colleges.items, p.college_id),
                transport: capitalize(&p.transport_type),
                status: if p.is_active { "Active" } else { "Inactive" },
                verification: if p.is_verified { "Verified" } else { "Pending" },
                rating: format_rating(stats::delivery_rating(p, &d.orders.items)),
            })
            .collect()
    })
}

#[derive(Tabled)]
struct CollegeRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Users")]
    users: usize,
    #[tabled(rename = "Vendors")]
    vendors: usize,
    #[tabled(rename = "Delivery Personnel")]
    delivery_persons: usize,
}

fn colleges(d: &Dashboard, search: &Search) -> String {
    listing(&d.colleges, "colleges", |colleges| {
        colleges
            .iter()
            .filter(|c| search.matches(&[c.name.as_str(), c.address.as_str()]))
            .map(|c| {
                let summary = stats::college_summary(
                    c,
                    &d.users.items,
                    &d.vendors.items,
                    &d.delivery_persons.items,
                );
                CollegeRow {
                    id: c.id,
                    name: c.name.clone(),
                    address: c.address.clone(),
                    users: summary.users,
                    vendors: summary.vendors,
                    delivery_persons: summary.delivery_persons,
                }
            })
            .collect()
    })
}

#[derive(Tabled)]
struct ReviewRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Review")]
    text: String,
    #[tabled(rename = "Posted on")]
    posted: String,
}

fn reviews(d: &Dashboard, search: &Search) -> String {
    listing(&d.reviews, "reviews", |reviews| {
        reviews
            .iter()
            .filter(|r| search.matches(&[r.review_text.as_str()]))
            .map(|r| ReviewRow {
                id: r.id,
                user: stats::user_name(&d.users.items, r.user_id),
                text: r.review_text.clone(),
                posted: format_date(&r.created_at),
            })
            .collect()
    })
}
