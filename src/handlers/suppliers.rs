use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog_service::CatalogService;
use crate::domain::catalog::{ContactInput, ContactPatch, Supplier};
use crate::errors::AppError;
use crate::handlers::{ListParams, ListResponse};
use crate::infrastructure::memory::InMemoryStore;

type Catalog = web::Data<CatalogService<InMemoryStore>>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub contact_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierResponse {
    pub id: Uuid,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Supplier> for SupplierResponse {
    fn from(s: &Supplier) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            contact_name: s.contact_name.clone(),
            email: s.email.clone(),
            phone: s.phone.clone(),
            address: s.address.clone(),
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

impl From<CreateSupplierRequest> for ContactInput {
    fn from(r: CreateSupplierRequest) -> Self {
        Self {
            name: r.name,
            contact_name: r.contact_name,
            email: r.email,
            phone: r.phone,
            address: r.address,
        }
    }
}

impl From<UpdateSupplierRequest> for ContactPatch {
    fn from(r: UpdateSupplierRequest) -> Self {
        Self {
            name: r.name,
            contact_name: r.contact_name,
            email: r.email,
            phone: r.phone,
            address: r.address,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /suppliers
#[utoipa::path(
    post,
    path = "/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = SupplierResponse),
        (status = 400, description = "Missing name"),
    ),
    tag = "suppliers"
)]
pub async fn create_supplier(
    catalog: Catalog,
    body: web::Json<CreateSupplierRequest>,
) -> Result<HttpResponse, AppError> {
    let input = ContactInput::from(body.into_inner());
    let supplier = web::block(move || catalog.create_supplier(input)).await??;
    Ok(HttpResponse::Created().json(SupplierResponse::from(&supplier)))
}

/// GET /suppliers/{id}
#[utoipa::path(
    get,
    path = "/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier UUID")),
    responses(
        (status = 200, description = "Supplier found", body = SupplierResponse),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "suppliers"
)]
pub async fn get_supplier(
    catalog: Catalog,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    match web::block(move || catalog.get_supplier(id)).await?? {
        Some(supplier) => Ok(HttpResponse::Ok().json(SupplierResponse::from(&supplier))),
        None => Err(AppError::NotFound(format!("supplier {} not found", id))),
    }
}

/// GET /suppliers
#[utoipa::path(
    get,
    path = "/suppliers",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of suppliers", body = ListResponse<SupplierResponse>),
        (status = 400, description = "Malformed filter or order_by"),
    ),
    tag = "suppliers"
)]
pub async fn list_suppliers(
    catalog: Catalog,
    query: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let query = query.to_query()?;
    let page = web::block(move || catalog.list_suppliers(&query)).await??;
    Ok(HttpResponse::Ok().json(ListResponse::from_page(page, |s| SupplierResponse::from(s))))
}

/// PATCH /suppliers/{id}
#[utoipa::path(
    patch,
    path = "/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier UUID")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Supplier updated", body = SupplierResponse),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "suppliers"
)]
pub async fn update_supplier(
    catalog: Catalog,
    path: web::Path<Uuid>,
    body: web::Json<UpdateSupplierRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let patch = ContactPatch::from(body.into_inner());
    let supplier = web::block(move || catalog.update_supplier(id, patch)).await??;
    Ok(HttpResponse::Ok().json(SupplierResponse::from(&supplier)))
}

/// DELETE /suppliers/{id}
///
/// Orders keep their embedded supplier snapshot.
#[utoipa::path(
    delete,
    path = "/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier UUID")),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "suppliers"
)]
pub async fn delete_supplier(
    catalog: Catalog,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    web::block(move || catalog.delete_supplier(id)).await??;
    Ok(HttpResponse::NoContent().finish())
}
