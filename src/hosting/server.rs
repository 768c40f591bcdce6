use super::*;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;

pub struct Server;

impl Server {
    pub async fn run(bind: String, registry: Arc<Registry>) -> Result<(), std::io::Error> {
        let state = web::Data::from(registry);
        log::info!("starting hosting server on {}", bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(state.clone())
                .route("/join", web::get().to(join))
                .route("/rooms", web::get().to(rooms))
                .route("/health", web::get().to(health))
        })
        .workers(4)
        .bind(bind)?
        .run()
        .await
    }
}

async fn join(registry: web::Data<Registry>, body: web::Payload, req: HttpRequest) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => match registry.bridge(session, stream).await {
            Ok(()) => response.map_into_left_body(),
            Err(e) => HttpResponse::InternalServerError()
                .body(e.to_string())
                .map_into_right_body(),
        },
        Err(e) => HttpResponse::BadRequest()
            .body(e.to_string())
            .map_into_right_body(),
    }
}

async fn rooms(registry: web::Data<Registry>) -> impl Responder {
    HttpResponse::Ok().json(registry.statuses().await)
}

async fn health(registry: web::Data<Registry>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "rooms": registry.len().await,
    }))
}
