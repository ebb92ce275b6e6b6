use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::product_service::ProductService;
use crate::domain::ports::Storage;
use crate::domain::product::{NewProduct, Product};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub picture: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub stock: i32,
    #[serde(default)]
    pub description: String,
    pub expiration_time: DateTime<Utc>,
    #[serde(default)]
    pub is_sold_out: bool,
    pub sold_out_at: Option<DateTime<Utc>>,
}

impl TryFrom<CreateProductRequest> for NewProduct {
    type Error = AppError;

    fn try_from(body: CreateProductRequest) -> Result<Self, Self::Error> {
        let price = BigDecimal::from_str(&body.price).map_err(|e| {
            AppError::BadRequest(format!("Invalid price '{}': {}", body.price, e))
        })?;
        Ok(NewProduct {
            name: body.name,
            description: body.description,
            picture: body.picture,
            price,
            stock: body.stock,
            expiration_time: body.expiration_time,
            is_sold_out: body.is_sold_out,
            sold_out_at: body.sold_out_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub picture: String,
    pub price: String,
    pub stock: i32,
    pub expiration_time: String,
    pub is_sold_out: bool,
    pub sold_out_at: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            picture: p.picture,
            price: p.price.to_string(),
            stock: p.stock,
            expiration_time: p.expiration_time.to_rfc3339(),
            is_sold_out: p.is_sold_out,
            sold_out_at: p.sold_out_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product payload"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn create_product<S: Storage>(
    service: web::Data<ProductService<S>>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product = NewProduct::try_from(body.into_inner())?;

    let created = web::block(move || service.create_product(product))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product<S: Storage>(
    service: web::Data<ProductService<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let product = web::block(move || service.get_product(product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "Products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products<S: Storage>(
    service: web::Data<ProductService<S>>,
) -> Result<HttpResponse, AppError> {
    let products = web::block(move || service.list_products())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}
