//! Centralized authorization checks.
//!
//! Every operation that depends on who the actor is *relative to an order* resolves that
//! relationship here, once, and consults a single permitted-transition table. Call sites never
//! compare role strings or user ids directly.

use crate::db_types::{Order, OrderStatus, Principal};

/// The actor's relationship to a specific order. Admins always resolve to `Admin`, regardless of
/// whether they also happen to be the buyer or seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderCapability {
    Buyer,
    Seller,
    Admin,
    None,
}

/// Resolve the capability an actor holds on an order.
pub fn capability_for(actor: &Principal, order: &Order) -> OrderCapability {
    if actor.is_admin() {
        OrderCapability::Admin
    } else if actor.id == order.buyer_id {
        OrderCapability::Buyer
    } else if actor.id == order.seller_id {
        OrderCapability::Seller
    } else {
        OrderCapability::None
    }
}

impl OrderCapability {
    /// Participants (and admins) may read the order and its chat.
    pub fn may_view(&self) -> bool {
        !matches!(self, OrderCapability::None)
    }

    /// The permitted-transition table:
    ///
    /// | Target      | Permitted actor          |
    /// |-------------|--------------------------|
    /// | Cancelled   | buyer, seller, or admin  |
    /// | Completed   | buyer or admin           |
    /// | Processing  | seller or admin          |
    /// | Refunded    | admin only               |
    ///
    /// `Pending` is the placement state and is never a transition target. Note that the table is
    /// keyed on the *target* status only; the legality of the prior state is not checked.
    pub fn may_transition_to(&self, target: OrderStatus) -> bool {
        match target {
            OrderStatus::Cancelled => self.may_view(),
            OrderStatus::Completed => matches!(self, OrderCapability::Buyer | OrderCapability::Admin),
            OrderStatus::Processing => matches!(self, OrderCapability::Seller | OrderCapability::Admin),
            OrderStatus::Refunded => matches!(self, OrderCapability::Admin),
            OrderStatus::Pending => false,
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;
    use crate::db_types::{Money, Role};

    fn order() -> Order {
        Order {
            id: 1,
            buyer_id: 10,
            seller_id: 20,
            status: OrderStatus::Pending,
            total_amount: Money::from_cents(1000),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    fn principal(id: i64, role: Role) -> Principal {
        Principal { id, username: format!("u{id}"), role, active: true }
    }

    #[test]
    fn capability_resolution() {
        let order = order();
        assert_eq!(capability_for(&principal(10, Role::User), &order), OrderCapability::Buyer);
        assert_eq!(capability_for(&principal(20, Role::Seller), &order), OrderCapability::Seller);
        assert_eq!(capability_for(&principal(99, Role::Admin), &order), OrderCapability::Admin);
        assert_eq!(capability_for(&principal(30, Role::User), &order), OrderCapability::None);
        // An admin who is also the buyer still acts as admin
        assert_eq!(capability_for(&principal(10, Role::Admin), &order), OrderCapability::Admin);
    }

    #[test]
    fn transition_table() {
        use OrderCapability::*;
        use OrderStatus::*;
        for cap in [Buyer, Seller, Admin] {
            assert!(cap.may_transition_to(Cancelled), "{cap:?} may cancel");
        }
        assert!(!None.may_transition_to(Cancelled));

        assert!(Buyer.may_transition_to(Completed));
        assert!(Admin.may_transition_to(Completed));
        assert!(!Seller.may_transition_to(Completed));

        assert!(Seller.may_transition_to(Processing));
        assert!(Admin.may_transition_to(Processing));
        assert!(!Buyer.may_transition_to(Processing));

        assert!(Admin.may_transition_to(Refunded));
        assert!(!Buyer.may_transition_to(Refunded));
        assert!(!Seller.may_transition_to(Refunded));

        for cap in [Buyer, Seller, Admin, None] {
            assert!(!cap.may_transition_to(Pending), "{cap:?} may not reset to pending");
        }
    }
}
