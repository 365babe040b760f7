use std::fmt::Debug;

use log::*;

use crate::{
    api::errors::OrderFlowError,
    authz::capability_for,
    db_types::{Chat, NewOrder, Order, Principal},
    order_objects::{OrderDetail, OrderQueryFilter, Pagination},
    traits::{ChatManagement, ModifyOrderRequest, OrderManagement},
};

/// `OrderFlowApi` is the primary API for the order lifecycle: placing orders, reading them back
/// with role-scoped visibility, and driving status transitions.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement + ChatManagement
{
    /// Place a new order on behalf of `buyer`.
    ///
    /// The buyer id on the order is always taken from the acting principal. Validation and stock
    /// adjustment happen atomically in the backend; after the order commits, the 1:1 chat for the
    /// order is created as a separate, idempotent step.
    pub async fn place_order(&self, buyer: &Principal, order: NewOrder) -> Result<OrderDetail, OrderFlowError> {
        let order = NewOrder { buyer_id: buyer.id, ..order };
        let order = self.db.insert_order(order).await?;
        let chat = self.db.create_chat_for_order(order.id).await?;
        debug!("🔄️📦️ Order #{} placed by {} with chat {}", order.id, buyer.username, chat.id);
        let items = self.db.fetch_order_items(order.id).await?;
        Ok(OrderDetail { order, items })
    }

    /// The chat bound to the given order, created lazily if the order predates its chat.
    pub async fn chat_for_order(&self, order_id: i64) -> Result<Chat, OrderFlowError> {
        let chat = self.db.create_chat_for_order(order_id).await?;
        Ok(chat)
    }

    /// Fetch a single order with its items. Only participants of the order and admins may see it.
    pub async fn fetch_order(&self, actor: &Principal, id: i64) -> Result<OrderDetail, OrderFlowError> {
        let order = self.db.fetch_order(id).await?.ok_or(OrderFlowError::OrderNotFound(id))?;
        if !capability_for(actor, &order).may_view() {
            return Err(OrderFlowError::NotPermitted("Only participants of an order may view it".into()));
        }
        let items = self.db.fetch_order_items(id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Role-scoped order listing: admins see every order, everyone else only the orders they are a
    /// party to.
    pub async fn fetch_orders(&self, actor: &Principal, pagination: Pagination) -> Result<Vec<Order>, OrderFlowError> {
        let query = if actor.is_admin() {
            OrderQueryFilter::default().with_pagination(pagination)
        } else {
            OrderQueryFilter::for_participant(actor.id).with_pagination(pagination)
        };
        let orders = self.db.fetch_orders(query).await?;
        Ok(orders)
    }

    /// Applies a status and/or notes update to an order, enforcing the permitted-transition table.
    ///
    /// The actor must be a participant of the order or an admin; a requested status additionally
    /// requires the capability listed for that status. The legality of the *prior* state is not
    /// checked.
    pub async fn update_order(
        &self,
        actor: &Principal,
        id: i64,
        update: ModifyOrderRequest,
    ) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order(id).await?.ok_or(OrderFlowError::OrderNotFound(id))?;
        let capability = capability_for(actor, &order);
        if !capability.may_view() {
            return Err(OrderFlowError::NotPermitted("Only participants of an order may update it".into()));
        }
        if let Some(status) = update.new_status {
            if !capability.may_transition_to(status) {
                debug!("🔄️📦️ {} ({capability:?}) may not move order #{id} to {status}", actor.username);
                return Err(OrderFlowError::NotPermitted(format!(
                    "You are not permitted to move this order to {status}"
                )));
            }
        }
        let order = self.db.update_order(id, update).await?;
        debug!("🔄️📦️ Order #{id} updated. Status is now {}", order.status);
        Ok(order)
    }
}
