use actix_web::dev::HttpServiceFactory;
use actix_web::http::Method;
use actix_web::{middleware, web, HttpRequest, Responder};
use log::warn;
use confstore::deadline::Deadline;
use confstore::error::Error;
use confstore::ops::{self, Reply};
use crate::server;

pub const OPERATIONS: &str = "operations";

const WRONG_METHOD: &str = "use POST to access the configuration service";

/// The single operations endpoint, at `path`.
pub fn service(path: &str) -> impl HttpServiceFactory {
    web::resource(path).name(OPERATIONS).to(operation)
}

/// Allow browser clients from any origin.
pub fn cors() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
}

/// Every outcome, including errors, the wrong method and oversized bodies,
/// is a `200 OK` with a [`Reply`] body.
///
/// Also serves every path outside the configured endpoint.
pub async fn operation(
    req: HttpRequest,
    data: web::Data<server::State>,
    payload: web::Payload,
) -> actix_web::Result<impl Responder> {
    if *req.method() != Method::POST {
        let error = Error::Validation(WRONG_METHOD.to_owned());
        return Ok(web::Json(Reply::error(&error)));
    }

    let body = match payload.to_bytes_limited(data.max_body).await {
        Ok(Ok(body)) => body,
        Ok(Err(_)) => {
            let error = Error::Validation(format!(
                "request body exceeds the limit of {} bytes", data.max_body));
            warn!("refused request to {}: {error}", req.path());
            return Ok(web::Json(Reply::error(&error)));
        }
        Err(e) => {
            let error = Error::Validation(
                format!("error reading request body: {e}"));
            warn!("refused request to {}: {error}", req.path());
            return Ok(web::Json(Reply::error(&error)));
        }
    };

    let deadline = Deadline::after(data.request_timeout);
    let reply = web::block(move || {
        ops::dispatch(&data.manager, &body, &deadline)
    }).await?;
    Ok(web::Json(reply))
}
