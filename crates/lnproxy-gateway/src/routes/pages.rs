use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::GatewayError;
use crate::metrics::REDIRECTS_TOTAL;
use crate::normalize::{redirect_location, WrapForm};
use crate::render::OutputFormat;
use crate::state::AppState;

/// GET / - Landing page with the invoice form
pub async fn landing(state: web::Data<AppState>) -> Result<HttpResponse, GatewayError> {
    let html = state.formatter.landing_page()?;
    Ok(HttpResponse::Ok()
        .content_type(OutputFormat::Html.content_type())
        .body(html))
}

/// GET /wrap - Form submitted through the query string
pub async fn submit_query(req: HttpRequest, form: web::Query<WrapForm>) -> HttpResponse {
    see_other(&req, &form)
}

/// POST /wrap - Form submitted as a urlencoded body
pub async fn submit_form(req: HttpRequest, form: web::Form<WrapForm>) -> HttpResponse {
    see_other(&req, &form)
}

fn see_other(req: &HttpRequest, form: &WrapForm) -> HttpResponse {
    let location = redirect_location(form, req.query_string());
    tracing::debug!(location = %location, "redirecting form submission");
    REDIRECTS_TOTAL.inc();
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(landing)).service(
        web::resource("/wrap")
            .route(web::get().to(submit_query))
            .route(web::post().to(submit_form)),
    );
}
