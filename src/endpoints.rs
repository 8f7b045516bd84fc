use chrono::Utc;
use tracing::warn;

use crate::api::{HealthReport, OrderRequest, OrderResult};
use crate::assets;
use crate::errors::{Error, Result};
use crate::http::{Request, Response};
use crate::orders::validate_order;
use crate::routes::*;
use crate::state::AppState;

pub const HEALTH_VERSION: &str = "1.0";
pub const HEALTH_MESSAGE: &str = "Fast Food App is running smoothly!";

/// Router with every endpoint of the ordering service, static files as fallback
pub fn create_http_router() -> Result<HttpRouter> {
    let mut router = HttpRouter::new()?;

    router.add_route("GET", endpoints::INDEX, get_index);
    router.add_route("GET", endpoints::MENU, get_menu);
    router.add_route("POST", endpoints::ORDER, post_order);
    router.add_route("GET", endpoints::HEALTH, get_health);
    router.set_fallback(get_asset);

    Ok(router)
}

fn get_menu(_: Request, _: HttpParams, state: &AppState) -> Result<Response> {
    Response::json(200, &state.catalog.entries())
}

fn post_order(request: Request, _: HttpParams, state: &AppState) -> Result<Response> {
    let order: OrderRequest = serde_json::from_str(&request.body)?;

    let problems = validate_order(&order);
    if !problems.is_empty() {
        if state.config.strict_orders {
            return Response::json(400, &OrderResult::rejected(problems.join(", ")));
        }
        warn!(problems = %problems.join(", "), "Accepting order with problems");
    }

    let order_id = state.order_ids.next_id();
    state.order_log.record(&order_id, &order)?;

    Response::json(200, &OrderResult::accepted(order_id, order.total))
}

fn get_health(_: Request, _: HttpParams, state: &AppState) -> Result<Response> {
    let report = HealthReport {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: HEALTH_VERSION.to_string(),
        menu_items: state.catalog.len(),
        message: HEALTH_MESSAGE.to_string(),
    };
    Response::json(200, &report)
}

fn get_index(request: Request, _: HttpParams, state: &AppState) -> Result<Response> {
    let mut index = HttpParams::new();
    index.insert(params::ASSET.to_string(), "index.html".to_string());
    get_asset(request, index, state)
}

fn get_asset(_: Request, params: HttpParams, state: &AppState) -> Result<Response> {
    let asset = params
        .get(params::ASSET)
        .ok_or_else(|| Error::NotFound("Missing asset".to_string()))?;
    let (content_type, bytes) = assets::load(&state.config.static_dir, asset)?;
    Ok(Response::content(content_type, bytes))
}
