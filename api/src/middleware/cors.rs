//! CORS middleware configuration for cross-origin requests.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use fc_shared::CorsConfig;

/// Creates a CORS middleware instance from configuration.
///
/// `*` in the allowed origins accepts any origin; otherwise only the listed
/// origins are allowed.
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .expose_headers(vec![header::WWW_AUTHENTICATE])
        .max_age(config.max_age);

    if config.allows_any_origin() {
        tracing::info!("Configuring permissive CORS");
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allowed_origins {
            tracing::info!("Adding allowed origin: {}", origin);
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    #[actix_web::test]
    async fn test_allowed_origin_gets_cors_headers() {
        let config = CorsConfig {
            allowed_origins: vec!["https://fitclub.example".to_string()],
            max_age: 60,
        };
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://fitclub.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://fitclub.example"
        );
    }

    #[actix_web::test]
    async fn test_unknown_origin_is_refused() {
        let config = CorsConfig {
            allowed_origins: vec!["https://fitclub.example".to_string()],
            max_age: 60,
        };
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://evil.example"))
            .to_request();
        let resp = test::try_call_service(&app, req).await;

        match resp {
            Ok(resp) => assert!(resp
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()),
            Err(_) => {}
        }
    }
}
