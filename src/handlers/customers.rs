use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog_service::CatalogService;
use crate::domain::catalog::{ContactInput, ContactPatch, Customer};
use crate::errors::AppError;
use crate::handlers::{ListParams, ListResponse};
use crate::infrastructure::memory::InMemoryStore;

type Catalog = web::Data<CatalogService<InMemoryStore>>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
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
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Customer> for CustomerResponse {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            address: c.address.clone(),
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

impl From<CreateCustomerRequest> for ContactInput {
    fn from(r: CreateCustomerRequest) -> Self {
        Self {
            name: r.name,
            contact_name: None,
            email: r.email,
            phone: r.phone,
            address: r.address,
        }
    }
}

impl From<UpdateCustomerRequest> for ContactPatch {
    fn from(r: UpdateCustomerRequest) -> Self {
        Self {
            name: r.name,
            contact_name: None,
            email: r.email,
            phone: r.phone,
            address: r.address,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /customers
#[utoipa::path(
    post,
    path = "/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Missing name"),
    ),
    tag = "customers"
)]
pub async fn create_customer(
    catalog: Catalog,
    body: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let input = ContactInput::from(body.into_inner());
    let customer = web::block(move || catalog.create_customer(input)).await??;
    Ok(HttpResponse::Created().json(CustomerResponse::from(&customer)))
}

/// GET /customers/{id}
#[utoipa::path(
    get,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer UUID")),
    responses(
        (status = 200, description = "Customer found", body = CustomerResponse),
        (status = 404, description = "Customer not found"),
    ),
    tag = "customers"
)]
pub async fn get_customer(
    catalog: Catalog,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    match web::block(move || catalog.get_customer(id)).await?? {
        Some(customer) => Ok(HttpResponse::Ok().json(CustomerResponse::from(&customer))),
        None => Err(AppError::NotFound(format!("customer {} not found", id))),
    }
}

/// GET /customers
#[utoipa::path(
    get,
    path = "/customers",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of customers", body = ListResponse<CustomerResponse>),
        (status = 400, description = "Malformed filter or order_by"),
    ),
    tag = "customers"
)]
pub async fn list_customers(
    catalog: Catalog,
    query: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let query = query.to_query()?;
    let page = web::block(move || catalog.list_customers(&query)).await??;
    Ok(HttpResponse::Ok().json(ListResponse::from_page(page, |c| CustomerResponse::from(c))))
}

/// PATCH /customers/{id}
#[utoipa::path(
    patch,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer UUID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 404, description = "Customer not found"),
    ),
    tag = "customers"
)]
pub async fn update_customer(
    catalog: Catalog,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let patch = ContactPatch::from(body.into_inner());
    let customer = web::block(move || catalog.update_customer(id, patch)).await??;
    Ok(HttpResponse::Ok().json(CustomerResponse::from(&customer)))
}

/// DELETE /customers/{id}
///
/// Sales orders keep their embedded customer snapshot.
#[utoipa::path(
    delete,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer UUID")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Customer not found"),
    ),
    tag = "customers"
)]
pub async fn delete_customer(
    catalog: Catalog,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    web::block(move || catalog.delete_customer(id)).await??;
    Ok(HttpResponse::NoContent().finish())
}
