//! Voice callback fetched by Twilio when a verification call connects

use actix_web::{http::header::ContentType, web, HttpResponse};

use tfa_infra::sms::twiml::say_response;

/// `<Response><Say>{text}</Say></Response>`
pub async fn say(text: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::xml())
        .body(say_response(&text))
}
