//! Read models served by the order service.

use serde::Serialize;

use quickcart_core::{BadgeColor, Order};

/// An order as the admin dashboard lists it: the order row plus the
/// customer's profile and how many lines it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub item_count: u32,
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub badge: BadgeColor,
}

impl AdminOrder {
    #[must_use]
    pub fn new(
        order: Order,
        item_count: u32,
        customer_name: Option<String>,
        phone: Option<String>,
    ) -> Self {
        let badge = order.status.badge();
        Self {
            order,
            item_count,
            customer_name,
            phone,
            badge,
        }
    }

    /// Case-insensitive substring match over id, customer name, status,
    /// phone, address and postal code. A blank query matches everything.
    #[must_use]
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let haystacks = [
            Some(self.order.id.as_str()),
            self.customer_name.as_deref(),
            Some(self.order.status.as_str()),
            self.phone.as_deref(),
            self.order.address.as_deref(),
            self.order.postal_code.as_deref(),
        ];

        haystacks
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use quickcart_core::{Money, OrderId, OrderStatus, UserId};

    use super::*;

    fn admin_order() -> AdminOrder {
        AdminOrder::new(
            Order {
                id: OrderId::new("8f14e45f-ceea"),
                user_id: UserId::new("u1"),
                total: Money::from_units(1499),
                status: OrderStatus::Shipped,
                address: Some("12 MG Road".to_string()),
                postal_code: Some("560001".to_string()),
                created_at: Utc::now(),
            },
            2,
            Some("Asha Rao".to_string()),
            None,
        )
    }

    #[test]
    fn test_search_fields() {
        let order = admin_order();
        for query in ["8F14", "asha", "shipped", "mg road", "560001", "  "] {
            assert!(order.matches_search(query), "{query:?}");
        }
        assert!(!order.matches_search("delivered"));
        assert!(!order.matches_search("98765"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(admin_order()).unwrap();
        assert_eq!(json["id"], "8f14e45f-ceea");
        assert_eq!(json["status"], "Shipped");
        assert_eq!(json["badge"], "yellow");
        assert_eq!(json["item_count"], 2);
        assert_eq!(json["pincode"], "560001");
    }
}
