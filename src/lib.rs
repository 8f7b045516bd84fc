//! Fast food ordering: a menu served over HTTP, a cart built on the client side and an order
//! endpoint that logs what it receives.

pub mod api;
pub mod assets;
pub mod backend;
pub mod cart;
pub mod cli;
pub mod config;
pub mod endpoints;
pub mod errors;
pub mod http;
pub mod logging;
pub mod menu;
pub mod orders;
pub mod routes;
pub mod state;
pub mod storefront;
pub mod threadpool;
