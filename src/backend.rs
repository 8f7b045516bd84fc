use serde::de::DeserializeOwned;

use crate::api::{HealthReport, MenuEntry, OrderRequest, OrderResult};
use crate::errors::{Error, Result};
use crate::http::HttpClient;
use crate::routes::paths;

/// What the storefront needs from the ordering service
///
/// The HTTP implementation is used by the client binary, tests plug in a scripted one.
pub trait Backend {
    /// Fetch the whole menu
    fn fetch_menu(&self) -> Result<Vec<MenuEntry>>;

    /// Submit an order and return the server's confirmation
    fn submit_order(&self, order: &OrderRequest) -> Result<OrderResult>;

    fn health(&self) -> Result<HealthReport>;
}

/// Talks to the server over HTTP, one connection per call
#[derive(Debug, Clone)]
pub struct HttpBackend {
    target: String,
}

impl HttpBackend {
    /// `target` is a `<host>:<port>` address
    pub fn new(target: &str) -> HttpBackend {
        HttpBackend {
            target: target.to_string(),
        }
    }

    fn request<T: DeserializeOwned>(&self, method: &str, path: &str, body: &str) -> Result<T> {
        let mut client = HttpClient::new(&self.target)?;
        let response = client.send(method, path, body)?;
        match response.status {
            Some(200) => Ok(serde_json::from_slice(&response.body)?),
            Some(404) => Err(Error::NotFound(path.to_string())),
            Some(code) => {
                // Failures carry an OrderResult-shaped body, use its message when there is one
                let message = serde_json::from_slice::<OrderResult>(&response.body)
                    .map(|result| result.message)
                    .unwrap_or_else(|_| format!("server answered {}", code));
                Err(Error::BadRequest(message))
            }
            None => Err(Error::NoResponse),
        }
    }
}

impl Backend for HttpBackend {
    fn fetch_menu(&self) -> Result<Vec<MenuEntry>> {
        self.request("GET", paths::MENU, "")
    }

    fn submit_order(&self, order: &OrderRequest) -> Result<OrderResult> {
        let body = serde_json::to_string(order)?;
        self.request("POST", paths::ORDER, &body)
    }

    fn health(&self) -> Result<HealthReport> {
        self.request("GET", paths::HEALTH, "")
    }
}

pub mod mock {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::menu::Catalog;

    /// Serves the standard menu and accepts orders, remembering them.
    ///
    /// Each failure flag makes the matching call return a connection error instead.
    #[derive(Debug, Default)]
    pub struct MockBackend {
        pub fail_menu: bool,
        pub fail_orders: bool,
        submitted: RefCell<Vec<OrderRequest>>,
        next_id: Cell<u32>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// A backend whose menu requests fail, as if the server were down
        pub fn failing_menu() -> Self {
            MockBackend {
                fail_menu: true,
                ..Self::default()
            }
        }

        /// Serves the menu but drops every order
        pub fn failing_orders() -> Self {
            MockBackend {
                fail_orders: true,
                ..Self::default()
            }
        }

        pub fn submitted(&self) -> Vec<OrderRequest> {
            self.submitted.borrow().clone()
        }
    }

    impl Backend for MockBackend {
        fn fetch_menu(&self) -> Result<Vec<MenuEntry>> {
            if self.fail_menu {
                return Err(Error::ConnectionReset);
            }
            Ok(Catalog::standard().entries().to_vec())
        }

        fn submit_order(&self, order: &OrderRequest) -> Result<OrderResult> {
            if self.fail_orders {
                return Err(Error::ConnectionReset);
            }
            self.submitted.borrow_mut().push(order.clone());
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            Ok(OrderResult::accepted(format!("ORD{}", id), order.total.clone()))
        }

        fn health(&self) -> Result<HealthReport> {
            Err(Error::NoResponse)
        }
    }
}
