use url::Url;

/// Query parameters for the orders endpoint. Fields are free text and go
/// out unvalidated; blank ones are left off the query entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub user_id: Option<String>,
    pub vendor_id: Option<String>,
    pub delivery_person_id: Option<String>,
    pub status: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl OrderFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("user_id", &self.user_id),
            ("vendor_id", &self.vendor_id),
            ("delivery_person_id", &self.delivery_person_id),
            ("status", &self.status),
            ("from_date", &self.from_date),
            ("to_date", &self.to_date),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (name, v))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    pub fn reset(&mut self) {
        *self = OrderFilter::default();
    }
}

pub fn orders_url(base: &Url, filter: &OrderFilter) -> Url {
    let mut url = base.clone();
    url.set_path("/api/orders");
    url.set_query(None);
    let pairs = filter.query_pairs();
    // No bare `?` when there is nothing to send
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.example.com").unwrap()
    }

    #[test]
    fn empty_filter_has_no_query() {
        let url = orders_url(&base(), &OrderFilter::default());
        assert_eq!(url.as_str(), "https://api.example.com/api/orders");
    }

    #[test]
    fn blank_fields_are_omitted() {
        let filter = OrderFilter {
            user_id: Some("12".to_owned()),
            vendor_id: Some("   ".to_owned()),
            status: Some("in_progress".to_owned()),
            to_date: Some("2024-03-31".to_owned()),
            ..OrderFilter::default()
        };
        let url = orders_url(&base(), &filter);
        assert_eq!(
            url.query(),
            Some("user_id=12&status=in_progress&to_date=2024-03-31")
        );
    }

    #[test]
    fn values_are_not_validated() {
        let filter = OrderFilter {
            from_date: Some("next tuesday".to_owned()),
            ..OrderFilter::default()
        };
        assert_eq!(filter.query_pairs(), vec![("from_date", "next tuesday")]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut filter = OrderFilter {
            delivery_person_id: Some("3".to_owned()),
            ..OrderFilter::default()
        };
        assert!(!filter.is_empty());
        filter.reset();
        assert!(filter.is_empty());
        assert_eq!(filter, OrderFilter::default());
    }
}
