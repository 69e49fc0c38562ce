use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, guard, http::Method, web};

use crate::error::AppError;
use crate::gpio::GpioManager;
use crate::pin::{Direction, EdgeTrigger, PinNumber};

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<GpioManager>,
}

pub fn api_scope(base_path: &str) -> actix_web::Scope {
    web::scope(base_path)
        .service(
            web::resource("/gpios")
                .route(web::get().to(list_gpios))
                .route(not_allowed(&[Method::GET])),
        )
        .service(
            web::resource("/gpio/{pin_id}")
                .route(web::get().to(pin_descriptor))
                .route(not_allowed(&[Method::GET])),
        )
        .service(
            web::resource("/gpio/{pin_id}/export")
                .route(web::post().to(export))
                .route(not_allowed(&[Method::POST])),
        )
        .service(
            web::resource("/gpio/{pin_id}/unexport")
                .route(web::post().to(unexport))
                .route(not_allowed(&[Method::POST])),
        )
        .service(
            web::resource("/gpio/{pin_id}/direction")
                .route(web::post().to(set_direction))
                .route(not_allowed(&[Method::POST])),
        )
        .service(
            web::resource("/gpio/{pin_id}/edge")
                .route(web::post().to(set_edge))
                .route(not_allowed(&[Method::POST])),
        )
        .service(
            web::resource("/gpio/{pin_id}/value")
                .route(web::get().to(get_value))
                .route(web::post().to(set_value))
                .route(not_allowed(&[Method::GET, Method::POST])),
        )
}

async fn list_gpios(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    Ok(web::Json(state.manager.list_pins()))
}

async fn pin_descriptor(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let pin_id = parse_pin_id(&req)?;
    let desc = state.manager.get_pin_descriptor(pin_id)?;

    Ok(web::Json(desc))
}

async fn export(req: HttpRequest, state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let pin_id = parse_pin_id(&req)?;
    state.manager.export(pin_id)?;

    Ok(HttpResponse::Ok())
}

async fn unexport(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let pin_id = parse_pin_id(&req)?;
    state.manager.unexport(pin_id)?;

    Ok(HttpResponse::Ok())
}

async fn set_direction(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let pin_id = parse_pin_id(&req)?;
    let direction: Direction = payload_text(&body)?.parse()?;
    state.manager.set_direction(pin_id, direction)?;

    Ok(HttpResponse::Ok())
}

async fn set_edge(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let pin_id = parse_pin_id(&req)?;
    let edge: EdgeTrigger = payload_text(&body)?.parse()?;
    state.manager.set_edge(pin_id, edge)?;

    Ok(HttpResponse::Ok())
}

async fn get_value(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let pin_id = parse_pin_id(&req)?;
    let value = state.manager.read_value(pin_id)?;

    Ok(web::Json(value))
}

async fn set_value(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let pin_id = parse_pin_id(&req)?;
    let value = payload_text(&body)?
        .parse::<u8>()
        .map_err(|_| AppError::InvalidValue("Value must be an integer".into()))?;
    state.manager.write_value(pin_id, value)?;

    Ok(HttpResponse::Ok())
}

fn payload_text(body: &[u8]) -> Result<&str, AppError> {
    if body.is_empty() {
        return Err(AppError::InvalidValue("Empty payload".into()));
    }

    std::str::from_utf8(body)
        .map(str::trim)
        .map_err(|_| AppError::InvalidValue("Payload must be valid UTF-8".into()))
}

fn parse_pin_id(req: &HttpRequest) -> Result<PinNumber, AppError> {
    let pin_id = req
        .match_info()
        .get("pin_id")
        .ok_or_else(|| AppError::InvalidValue("Missing pin id".into()))?;
    let pin_id = pin_id
        .parse::<PinNumber>()
        .map_err(|_| AppError::InvalidValue("Invalid pin id".into()))?;

    Ok(pin_id)
}

fn not_allowed(methods: &[Method]) -> actix_web::Route {
    web::route()
        .guard(guard_not_methods(methods))
        .to(method_not_allowed)
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().finish()
}

fn guard_not_methods(methods: &[Method]) -> impl guard::Guard + use<> {
    let allowed: Vec<Method> = methods.to_vec();
    guard::fn_guard(move |ctx| !allowed.iter().any(|m| m == ctx.head().method))
}
