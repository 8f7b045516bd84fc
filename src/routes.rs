use std::collections::HashMap;

use matchit::Router;
use tracing::warn;

use crate::api::OrderResult;
use crate::errors::{Error, Result};
use crate::http::{Request, Response};
use crate::state::AppState;

/// Utility macro generating a constant for the HTTP endpoint, and associate it with
/// an identifier. Matchit requires both
macro_rules! make_paths {
    ($($name:ident: $path:expr,)*) => {
        pub mod paths {
            $(
                pub const $name: &str = $path;
            )*
        }
        pub mod endpoints {
            $(
                pub const $name: &str = stringify!($name);
            )*
        }
    }
}

make_paths! {
    INDEX: "/",
    MENU: "/api/menu",
    ORDER: "/api/order",
    HEALTH: "/health",
}

/// Utility to add a list of paths to the router automatically
macro_rules! add_path {
    ($router:ident $(, $path:ident)*) => {
        $(
            $router.insert(paths::$path, endpoints::$path)?;
        )*
    }
}

/// Names of the parameters passed to handlers, used to extract them
pub mod params {
    /// Path of the requested file, relative to the static directory. Only set for the fallback
    /// handler.
    pub const ASSET: &str = "asset";
}

// spurious warning, I am using this in tests
#[allow(unused_macros)]
/// Utility to create easily hashmaps of parameters for testing
macro_rules! make_params {
    () => {
        std::collections::HashMap::new()
    };
    ($name:ident: $value:expr $(, $name2:ident: $value2:expr)* ) => {
        {
            let mut map = std::collections::HashMap::new();
            map.insert(params::$name.to_string(), $value.to_string());
            $(
                map.insert(params::$name2.to_string(), $value2.to_string());
            )*
            map
        }
    }
}

#[allow(unused_imports)]
pub(crate) use make_params;

/// Create a new router with the paths defined in this module
///
/// Errors from this functions are programming errors, most likely steming from a
/// misuse of matchit
fn new_router() -> Result<Router<&'static str>> {
    let mut router = Router::new();
    add_path!(router, INDEX, MENU, ORDER, HEALTH);
    Ok(router)
}

/// Type of the object containing the parameters passed to handlers
pub type HttpParams = HashMap<String, String>;
/// Type of the function that handles HTTP requests
pub type HttpHandler = fn(Request, HttpParams, &AppState) -> Result<Response>;

/// The router is in charge of taking in raw HTTP requests and to dispatch them to
/// the appropriate handler function.
pub struct HttpRouter {
    routes: Router<&'static str>,
    handlers: HashMap<&'static str, HashMap<&'static str, HttpHandler>>,
    /// Handler for GET requests matching none of the routes
    fallback: Option<HttpHandler>,
}

impl HttpRouter {
    /// Creates a new empty router
    ///
    /// Although the matchit router is not empty, there are no methods associated
    /// to the routes yet, so no request can be processed
    /// Errors in this function are programming errors.
    pub fn new() -> Result<Self> {
        let routes = new_router()?;
        Ok(HttpRouter {
            routes,
            handlers: HashMap::new(),
            fallback: None,
        })
    }

    /// Add a new route to the router
    pub fn add_route(&mut self, method: &'static str, route: &'static str, handler: HttpHandler) {
        let method_to_handler = self.handlers.entry(route).or_default();
        method_to_handler.insert(method, handler);
    }

    /// Set the handler for GET requests that match no route.
    ///
    /// It receives the request path, without its leading `/`, as the `asset` parameter.
    pub fn set_fallback(&mut self, handler: HttpHandler) {
        self.fallback = Some(handler);
    }

    /// Sends a request to the appropriate handler if it exists
    ///
    /// If there is a route matching the request, its handler will be called and the result of the
    /// function will be the result of the handler. If no route is defined for this request,
    /// return Error::NotFound
    ///
    /// Checking that all parameters are presents and that the body is correct is the
    /// responsibility of the handler
    pub fn route(&self, request: Request, state: &AppState) -> Result<Response> {
        let path = request.route_path().to_string();
        let route = match self.routes.at(&path) {
            Ok(route) => route,
            Err(err) => {
                return match self.fallback {
                    Some(fallback) if request.method == "GET" => {
                        let mut asset = HttpParams::new();
                        asset.insert(
                            params::ASSET.to_string(),
                            path.trim_start_matches('/').to_string(),
                        );
                        fallback(request, asset, state)
                    }
                    _ => Err(Error::NotFound(format!("{}: {}", path, err))),
                };
            }
        };
        let method_to_handler = self.handlers.get(route.value).ok_or_else(|| {
            Error::NotFound(format!(
                "No method associated to this route: {}",
                route.value
            ))
        })?;
        let handler = method_to_handler
            .get(request.method.as_str())
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No handler for {} {}",
                    request.method.as_str(),
                    route.value
                ))
            })?;

        let params: HttpParams = route
            .params
            .iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        handler(request, params, state)
    }

    /// Route a request and turn any error into an HTTP error response
    pub fn handle(&self, request: Request, state: &AppState) -> Response {
        let method = request.method.clone();
        let path = request.path.clone();
        self.route(request, state).unwrap_or_else(|err| {
            let code = err.status_code();
            if code >= 500 {
                warn!(%method, %path, "Request failed: {}", err);
            }
            error_response(code, &err)
        })
    }
}

/// JSON body describing a failure, in the same shape as order results
fn error_response(code: u16, err: &Error) -> Response {
    Response::json(code, &OrderResult::rejected(err.to_string()))
        .unwrap_or_else(|_| Response::error(code))
}
