use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog_service::CatalogService;
use crate::domain::catalog::{Product, ProductInput, ProductPatch};
use crate::errors::AppError;
use crate::handlers::{ListParams, ListResponse};
use crate::infrastructure::memory::InMemoryStore;

type Catalog = web::Data<CatalogService<InMemoryStore>>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: u32,
    pub location: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub stock: Option<u32>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub batch_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub expiry_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub stock: u32,
    pub location: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            sku: p.sku.clone(),
            category: p.category.clone(),
            stock: p.stock,
            location: p.location.clone(),
            batch_number: p.batch_number.clone(),
            expiry_date: p.expiry_date,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

impl From<CreateProductRequest> for ProductInput {
    fn from(r: CreateProductRequest) -> Self {
        Self {
            name: r.name,
            sku: r.sku,
            category: r.category,
            stock: r.stock,
            location: r.location,
            batch_number: r.batch_number,
            expiry_date: r.expiry_date,
        }
    }
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(r: UpdateProductRequest) -> Self {
        Self {
            name: r.name,
            sku: r.sku,
            category: r.category,
            stock: r.stock,
            location: r.location,
            batch_number: r.batch_number,
            expiry_date: r.expiry_date,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing name or sku, or sku already used"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn create_product(
    catalog: Catalog,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let input = ProductInput::from(body.into_inner());
    let product = web::block(move || catalog.create_product(input)).await??;
    Ok(HttpResponse::Created().json(ProductResponse::from(&product)))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    catalog: Catalog,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = web::block(move || catalog.get_product(id)).await??;
    match product {
        Some(product) => Ok(HttpResponse::Ok().json(ProductResponse::from(&product))),
        None => Err(AppError::NotFound(format!("product {} not found", id))),
    }
}

/// GET /products
///
/// Filter example: `?filter=stock:lt:10;category:eq:parts&order_by=name`.
#[utoipa::path(
    get,
    path = "/products",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of products", body = ListResponse<ProductResponse>),
        (status = 400, description = "Malformed filter or order_by"),
    ),
    tag = "products"
)]
pub async fn list_products(
    catalog: Catalog,
    query: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let query = query.to_query()?;
    let page = web::block(move || catalog.list_products(&query)).await??;
    Ok(HttpResponse::Ok().json(ListResponse::from_page(page, |p| ProductResponse::from(p))))
}

/// PATCH /products/{id}
///
/// Setting `stock` here is a manual stock correction.
#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid field value"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    catalog: Catalog,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let patch = ProductPatch::from(body.into_inner());
    let product = web::block(move || catalog.update_product(id, patch)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(&product)))
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    catalog: Catalog,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    web::block(move || catalog.delete_product(id)).await??;
    Ok(HttpResponse::NoContent().finish())
}
