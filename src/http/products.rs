//! Product endpoints. Reads are public, writes go through [`RequireAdmin`].

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{auth::RequireAdmin, AppState};
use crate::domain::aggregates::{Product, ProductFields};
use crate::domain::value_objects::ProductId;
use crate::images::ImageUpload;
use crate::CatalogError;

type ApiResult<T> = Result<T, CatalogError>;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub product: Product,
}

pub async fn list(State(s): State<AppState>, Query(p): Query<ListParams>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(s.catalog.list(p.category.as_deref()).await?))
}

pub async fn get(State(s): State<AppState>, Path(id): Path<ProductId>) -> ApiResult<Json<Product>> {
    Ok(Json(s.catalog.get(id).await?))
}

pub async fn categories(State(s): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(s.catalog.categories().await?))
}

pub async fn create(State(s): State<AppState>, _admin: RequireAdmin, form: Multipart) -> ApiResult<(StatusCode, Json<Product>)> {
    let (fields, image) = read_product_form(form).await?;
    Ok((StatusCode::CREATED, Json(s.catalog.create(fields, image).await?)))
}

pub async fn update(State(s): State<AppState>, _admin: RequireAdmin, Path(id): Path<ProductId>, form: Multipart) -> ApiResult<Json<Product>> {
    let (fields, image) = read_product_form(form).await?;
    Ok(Json(s.catalog.update(id, fields, image).await?))
}

pub async fn delete(State(s): State<AppState>, _admin: RequireAdmin, Path(id): Path<ProductId>) -> ApiResult<Json<DeleteResponse>> {
    let product = s.catalog.delete(id).await?;
    Ok(Json(DeleteResponse { message: "Product deleted", product }))
}

/// Reads `name`, `description`, `price`, `category` and an optional `image` file.
/// An empty file part (no file chosen in the form) counts as no image.
async fn read_product_form(mut form: Multipart) -> ApiResult<(ProductFields, Option<ImageUpload>)> {
    let bad = |e: axum::extract::multipart::MultipartError| CatalogError::Validation(e.to_string());
    let mut fields = ProductFields::default();
    let mut image = None;
    while let Some(field) = form.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                let file_name = field.file_name().map(str::to_string).filter(|f| !f.is_empty());
                let bytes = field.bytes().await.map_err(bad)?;
                if !bytes.is_empty() {
                    image = Some(ImageUpload { bytes: bytes.to_vec(), content_type, file_name });
                }
            }
            "name" => fields.name = field.text().await.map_err(bad)?,
            "description" => fields.description = Some(field.text().await.map_err(bad)?),
            "price" => fields.price = field.text().await.map_err(bad)?,
            "category" => fields.category = Some(field.text().await.map_err(bad)?),
            _ => {}
        }
    }
    Ok((fields, image))
}
