use bazaar_engine::{
    chat_objects::ChatQueryFilter,
    db_types::{Chat, Message, NewMessage, NewOrder, NewReview, Order, OrderItem, Principal, Review},
    order_objects::{OrderQueryFilter, Pagination},
    traits::{
        ChatManagement,
        ChatManagementError,
        IdentityError,
        IdentityManagement,
        ModifyOrderRequest,
        OrderManagement,
        OrderManagementError,
        ReviewManagement,
        ReviewManagementError,
    },
};
use mockall::mock;

mock! {
    pub Backend {}

    impl Clone for Backend {
        fn clone(&self) -> Self;
    }

    impl OrderManagement for Backend {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError>;
        async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderManagementError>;
        async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError>;
        async fn fetch_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderManagementError>;
        async fn update_order(&self, id: i64, update: ModifyOrderRequest) -> Result<Order, OrderManagementError>;
    }

    impl ChatManagement for Backend {
        async fn create_chat_for_order(&self, order_id: i64) -> Result<Chat, ChatManagementError>;
        async fn fetch_chat(&self, id: i64) -> Result<Option<Chat>, ChatManagementError>;
        async fn fetch_chat_for_order(&self, order_id: i64) -> Result<Option<Chat>, ChatManagementError>;
        async fn fetch_chats(&self, query: ChatQueryFilter) -> Result<Vec<Chat>, ChatManagementError>;
        async fn fetch_messages(&self, chat_id: i64) -> Result<Vec<Message>, ChatManagementError>;
        async fn fetch_message(&self, id: i64) -> Result<Option<Message>, ChatManagementError>;
        async fn insert_message(&self, message: NewMessage) -> Result<Message, ChatManagementError>;
        async fn mark_message_read(&self, id: i64) -> Result<Message, ChatManagementError>;
    }

    impl ReviewManagement for Backend {
        async fn insert_review(&self, review: NewReview) -> Result<Review, ReviewManagementError>;
        async fn review_exists(&self, reviewer_id: i64, product_id: i64, seller_id: i64) -> Result<bool, ReviewManagementError>;
        async fn fetch_reviews_for_product(&self, product_id: i64, pagination: &Pagination) -> Result<Vec<Review>, ReviewManagementError>;
        async fn seller_rating(&self, seller_id: i64) -> Result<Option<f64>, ReviewManagementError>;
    }

    impl IdentityManagement for Backend {
        async fn resolve_credential(&self, credential: &str) -> Result<Option<Principal>, IdentityError>;
        async fn fetch_principal(&self, user_id: i64) -> Result<Option<Principal>, IdentityError>;
    }
}
