pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};

use crate::application::catalog_service::CatalogService;
use crate::application::order_service::OrderService;
use crate::domain::order::{Purchase, Sales};
use crate::errors::AppError;
use crate::handlers::{customers, products, purchase_orders, sales_orders, suppliers};
use crate::infrastructure::memory::InMemoryStore;

pub use config::Config;

/// Services sharing one record store.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService<InMemoryStore>,
    pub purchase_orders: OrderService<InMemoryStore, Purchase>,
    pub sales_orders: OrderService<InMemoryStore, Sales>,
}

impl AppState {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self {
            catalog: CatalogService::new(Arc::clone(&store)),
            purchase_orders: OrderService::new(Arc::clone(&store)),
            sales_orders: OrderService::new(store),
        }
    }
}

/// Register every route and the services they use.
pub fn configure_app(state: &AppState, cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::Data::new(state.catalog.clone()))
        .app_data(web::Data::new(state.purchase_orders.clone()))
        .app_data(web::Data::new(state.sales_orders.clone()))
        .app_data(web::JsonConfig::default().error_handler(|err, _| {
            AppError::BadRequest(format!("Invalid request body: {}", err)).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, _| {
            AppError::BadRequest(format!("Invalid query string: {}", err)).into()
        }))
        .route("/api-docs/openapi.json", web::get().to(openapi::openapi_json))
        .service(
            web::scope("/products")
                .route("", web::post().to(products::create_product))
                .route("", web::get().to(products::list_products))
                .route("/{id}", web::get().to(products::get_product))
                .route("/{id}", web::patch().to(products::update_product))
                .route("/{id}", web::delete().to(products::delete_product)),
        )
        .service(
            web::scope("/suppliers")
                .route("", web::post().to(suppliers::create_supplier))
                .route("", web::get().to(suppliers::list_suppliers))
                .route("/{id}", web::get().to(suppliers::get_supplier))
                .route("/{id}", web::patch().to(suppliers::update_supplier))
                .route("/{id}", web::delete().to(suppliers::delete_supplier)),
        )
        .service(
            web::scope("/customers")
                .route("", web::post().to(customers::create_customer))
                .route("", web::get().to(customers::list_customers))
                .route("/{id}", web::get().to(customers::get_customer))
                .route("/{id}", web::patch().to(customers::update_customer))
                .route("/{id}", web::delete().to(customers::delete_customer)),
        )
        .service(
            web::scope("/purchase-orders")
                .route("", web::post().to(purchase_orders::create_purchase_order))
                .route("", web::get().to(purchase_orders::list_purchase_orders))
                .route("/{id}", web::get().to(purchase_orders::get_purchase_order))
                .route("/{id}", web::patch().to(purchase_orders::update_purchase_order))
                .route("/{id}", web::delete().to(purchase_orders::delete_purchase_order))
                .route(
                    "/{id}/items",
                    web::put().to(purchase_orders::replace_purchase_order_items),
                )
                .route(
                    "/{id}/status",
                    web::post().to(purchase_orders::transition_purchase_order),
                ),
        )
        .service(
            web::scope("/sales-orders")
                .route("", web::post().to(sales_orders::create_sales_order))
                .route("", web::get().to(sales_orders::list_sales_orders))
                .route("/{id}", web::get().to(sales_orders::get_sales_order))
                .route("/{id}", web::patch().to(sales_orders::update_sales_order))
                .route("/{id}", web::delete().to(sales_orders::delete_sales_order))
                .route("/{id}/items", web::put().to(sales_orders::replace_sales_order_items))
                .route("/{id}/status", web::post().to(sales_orders::transition_sales_order)),
        );
}

/// Build and return an actix-web `Server` accepting on `listener`.
///
/// The caller is responsible for `.await`-ing (or spawning) the returned
/// server.
pub fn build_server(
    state: AppState,
    listener: TcpListener,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| configure_app(&state, cfg))
    })
    .listen(listener)?
    .run())
}
