use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

pub type Id = i64;

// Records as the remote API returns them. Apart from the primary `id`, any
// column may be null or malformed without failing the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "id::deserialize_option")]
    pub college_id: Option<Id>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub college_registration_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default, deserialize_with = "id::deserialize_option")]
    pub user_id: Option<Id>,
    #[serde(default, deserialize_with = "id::deserialize_option")]
    pub vendor_id: Option<Id>,
    #[serde(default, deserialize_with = "id::deserialize_option")]
    pub delivery_person_id: Option<Id>,
    #[serde(default = "OrderStatus::unknown", deserialize_with = "status::deserialize")]
    pub order_status: OrderStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_datetime: String,
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub total_amount: String,
    #[serde(default, deserialize_with = "items::deserialize")]
    pub items: Option<Vec<serde_json::Value>>,
    #[serde(default, deserialize_with = "rating::deserialize")]
    pub vendor_rating: Option<f64>,
    #[serde(default, deserialize_with = "rating::deserialize")]
    pub delivery_rating: Option<f64>,
}

impl Order {
    /// Amount as a number. Anything that does not parse counts as zero.
    pub fn amount(&self) -> f64 {
        match self.total_amount.trim().parse::<f64>() {
            Ok(a) if a.is_finite() => a,
            _ => {
                warn!("Order {} has unparseable total amount {:?}", self.id, self.total_amount);
                0.0
            }
        }
    }

    pub fn placed_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.order_datetime)
    }

    pub fn placed_on(&self) -> Option<NaiveDate> {
        self.placed_at().map(|t| t.date())
    }

    pub fn item_count(&self) -> Option<usize> {
        self.items.as_ref().map(Vec::len)
    }

    // A zero rating is the same as no rating
    pub fn vendor_rating(&self) -> Option<f64> {
        self.vendor_rating.filter(|r| *r > 0.0)
    }

    pub fn delivery_rating(&self) -> Option<f64> {
        self.delivery_rating.filter(|r| *r > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner_name: String,
    #[serde(default, deserialize_with = "id::deserialize_option")]
    pub college_id: Option<Id>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPerson {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "id::deserialize_option")]
    pub college_id: Option<Id>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transport_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct College {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: Id,
    #[serde(default, deserialize_with = "id::deserialize_option")]
    pub user_id: Option<Id>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub review_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Assigned,
    VendorConfirmed,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    fn unknown() -> Self {
        OrderStatus::Unknown
    }

    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Assigned,
        OrderStatus::VendorConfirmed,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Assigned => "assigned",
            OrderStatus::VendorConfirmed => "vendor_confirmed",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }

    /// `in_progress` reads as `In progress`
    pub fn label(&self) -> String {
        let spaced = self.as_str().replacen('_', " ", 1);
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => spaced,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
}

/// Accepts RFC 3339, a naive `YYYY-MM-DD HH:MM:SS` (either separator) or a bare date.
/// Offset timestamps are normalised to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(t);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// Null reads the same as a missing column
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

// The API is loose about ids: some come back as numeric strings
mod id {
    use super::Id;
    use log::warn;
    use serde::de::{Error, IgnoredAny};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(Id),
        Text(String),
        Other(IgnoredAny),
    }

    impl Raw {
        fn parse(self) -> Option<Id> {
            match self {
                Raw::Number(n) => Some(n),
                Raw::Text(s) => s.trim().parse().ok(),
                Raw::Other(_) => None,
            }
        }
    }

    // A record is useless without its own id, so that one stays strict
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Id, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            Some(Raw::Number(n)) => Ok(n),
            Some(Raw::Text(s)) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid id {:?}", s))),
            _ => Err(D::Error::custom("missing id")),
        }
    }

    /// Foreign keys: null or garbage become `None`
    pub fn deserialize_option<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Id>, D::Error> {
        let raw = Option::<Raw>::deserialize(d)?;
        let present = matches!(raw, Some(Raw::Text(_)) | Some(Raw::Other(_)));
        let id = raw.and_then(Raw::parse);
        if id.is_none() && present {
            warn!("Ignoring unreadable foreign key");
        }
        Ok(id)
    }
}

// Postgres numerics arrive as strings, but take plain numbers too
mod amount {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    // Anything else is kept empty and counts as zero later on
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Option::<Raw>::deserialize(d)? {
            Some(Raw::Number(n)) => n.to_string(),
            Some(Raw::Text(s)) => s,
            Some(Raw::Other(_)) | None => String::new(),
        })
    }
}

mod rating {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let rating = match Option::<Raw>::deserialize(d)? {
            Some(Raw::Number(n)) => Some(n),
            Some(Raw::Text(s)) => s.trim().parse().ok(),
            Some(Raw::Other(_)) | None => None,
        };
        Ok(rating.filter(|r: &f64| r.is_finite()))
    }
}

mod status {
    use super::OrderStatus;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<OrderStatus, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(d)?;
        Ok(raw
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or(OrderStatus::Unknown))
    }
}

mod items {
    use serde::{Deserialize, Deserializer};

    // Only a JSON array counts as a list of items
    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Vec<serde_json::Value>>, D::Error> {
        Ok(match Option::<serde_json::Value>::deserialize(d)? {
            Some(serde_json::Value::Array(items)) => Some(items),
            _ => None,
        })
    }
}
