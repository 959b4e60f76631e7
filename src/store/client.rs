use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::domain::{
    MenuItem, MenuItemCreate, Order, OrderDraft, OrderStatus, PaymentMethod, User, UserCreate,
};
use crate::error::StoreError;
use crate::store::StoreRequest;

/// Generate client methods with the oneshot channel boilerplate and
/// automatic tracing.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident) => {
        impl $client {
            #[instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, StoreError> {
                debug!("Sending request");
                let (respond_to, response) = oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| StoreError::ActorClosed("store closed".to_string()))?;

                response.await.map_err(|_| StoreError::ActorClosed("store dropped".to_string()))?
            }
        }
    };
}

/// Cloneable handle to the store actor; the only contract the rendering
/// layer may use.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    /// Manual method: shutdown carries no response channel.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("Sending shutdown request");
        self.sender
            .send(StoreRequest::Shutdown)
            .await
            .map_err(|_| StoreError::ActorClosed("store closed".to_string()))
    }

    /// Manual method: the password must stay out of the span fields.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, username: String, password: String) -> Result<User, StoreError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::SignIn {
                username,
                password,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::ActorClosed("store closed".to_string()))?;

        response
            .await
            .map_err(|_| StoreError::ActorClosed("store dropped".to_string()))?
    }
}

client_method!(StoreClient => fn place_order(draft: OrderDraft) -> Order as StoreRequest::PlaceOrder);
client_method!(StoreClient => fn advance_status(order_id: String, target: OrderStatus, payment: Option<PaymentMethod>) -> Order as StoreRequest::AdvanceStatus);
client_method!(StoreClient => fn fetch_orders() -> () as StoreRequest::FetchOrders);
client_method!(StoreClient => fn fetch_menu_items() -> () as StoreRequest::FetchMenuItems);
client_method!(StoreClient => fn orders() -> Vec<Order> as StoreRequest::Orders);
client_method!(StoreClient => fn menu_items() -> Vec<MenuItem> as StoreRequest::MenuItems);
client_method!(StoreClient => fn add_menu_item(create: MenuItemCreate) -> MenuItem as StoreRequest::AddMenuItem);
client_method!(StoreClient => fn update_menu_item(item: MenuItem) -> MenuItem as StoreRequest::UpdateMenuItem);
client_method!(StoreClient => fn delete_menu_item(item_id: String) -> () as StoreRequest::DeleteMenuItem);
client_method!(StoreClient => fn add_user(create: UserCreate) -> User as StoreRequest::AddUser);
client_method!(StoreClient => fn users() -> Vec<User> as StoreRequest::Users);
client_method!(StoreClient => fn sign_out() -> () as StoreRequest::SignOut);
client_method!(StoreClient => fn current_user() -> Option<User> as StoreRequest::CurrentUser);
