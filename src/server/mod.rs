//! main file for the server

pub mod model;
mod controller;
mod database;
mod openapi;
mod state;
mod util;

use std::sync::Arc;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use crate::server::controller::error::CustomError;
use crate::server::controller::orders::{create_order, delete_order, get_order, get_orders, update_order};
use crate::server::database::connection::PgConnector;
use crate::server::database::memory::MemoryOrderStore;
use crate::server::database::pool::Pool;
use crate::server::database::postgres::PgOrderStore;
use crate::server::database::store::OrderStore;
use crate::server::model::config::{ServerConfig, StoreKind};
use crate::server::openapi::{ApiDoc, OPENAPI_JSON_PATH};
use crate::server::state::AppState;

/// Run the server
pub async fn run(config: ServerConfig) -> Result<(), anyhow::Error> {
    let store = build_store(&config).await?;
    let data = web::Data::new(AppState::new(store));

    info!("listening on {}", config.addr);
    HttpServer::new(move || {
        let data = data.clone();
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| configure(cfg, data))
    })
        .bind(config.addr)?
        .run()
        .await?;
    Ok(())
}

async fn build_store(config: &ServerConfig) -> Result<Arc<dyn OrderStore>, anyhow::Error> {
    info!("using {} order store", config.store);
    match config.store {
        StoreKind::Memory => Ok(Arc::new(MemoryOrderStore::new())),
        StoreKind::Postgres => {
            let read_pool = Pool::new("db-read", PgConnector::new(config.db_read_conn_str.as_str()));
            let write_pool = Pool::new("db-write", PgConnector::new(config.db_write_conn_str.as_str()));
            read_pool.init(config.pool_size).await.context("failed to open read pool")?;
            write_pool.init(config.pool_size).await.context("failed to open write pool")?;

            let store = PgOrderStore::new(read_pool, write_pool, config.db_timeout);
            store.migrate().await.context("failed to migrate database")?;
            Ok(Arc::new(store))
        }
    }
}

/// Register the order routes and the api docs
pub(crate) fn configure(cfg: &mut web::ServiceConfig, data: web::Data<AppState>) {
    cfg.app_data(data)
        .app_data(web::JsonConfig::default().error_handler(|err, _req| CustomError::bad_request(err).into()))
        .app_data(web::PathConfig::default().error_handler(|_err, _req| CustomError::ResourceNotFound.into()))
        .service(get_orders)
        .service(get_order)
        .service(create_order)
        .service(update_order)
        .service(delete_order)
        .service(SwaggerUi::new("/swagger/{_:.*}").url(OPENAPI_JSON_PATH, ApiDoc::openapi()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_web::test]
    async fn api_docs_are_served() {
        let data = web::Data::new(AppState::new(Arc::new(MemoryOrderStore::new())));
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, data))).await;

        let req = test::TestRequest::get().uri(OPENAPI_JSON_PATH).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["info"]["title"], "Orders API");

        let req = test::TestRequest::get().uri("/swagger/").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
