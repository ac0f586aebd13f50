/// Generic resource routes
///
/// Thin HTTP glue: each handler parses the request, delegates to the
/// generic store operations for the given `ResourceSpec`, and maps the
/// outcome to a response. The same five handlers serve users, posts and
/// comments.
use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, ValidationError};
use crate::store::resource::{self, ResourceSpec};

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidId.into())
}

pub async fn list_documents(
    spec: &'static ResourceSpec,
    pool: web::Data<PgPool>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let documents = resource::find(pool.get_ref(), spec, &query).await?;
    let body: Vec<Value> = documents.iter().map(|d| d.to_response(spec)).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub async fn create_document(
    spec: &'static ResourceSpec,
    pool: web::Data<PgPool>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let document = resource::create(pool.get_ref(), spec, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(document.to_response(spec)))
}

pub async fn get_document(
    spec: &'static ResourceSpec,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    match resource::find_by_id(pool.get_ref(), spec, id).await? {
        Some(document) => Ok(HttpResponse::Ok().json(document.to_response(spec))),
        None => Ok(HttpResponse::NotFound().body("not found")),
    }
}

pub async fn update_document(
    spec: &'static ResourceSpec,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    match resource::update_by_id(pool.get_ref(), spec, id, &body).await? {
        // Updates answer 201, same as create
        Some(document) => Ok(HttpResponse::Created().json(document.to_response(spec))),
        None => Ok(HttpResponse::NotFound().body("not found")),
    }
}

pub async fn delete_document(
    spec: &'static ResourceSpec,
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    match resource::delete_by_id(pool.get_ref(), spec, id).await? {
        Some(document) => Ok(HttpResponse::Ok().json(document.to_response(spec))),
        None => Ok(HttpResponse::NotFound().body("not found")),
    }
}

/// Register the five CRUD routes for one collection inside a scope.
pub fn resource_routes(spec: &'static ResourceSpec) -> impl Fn(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.route(
            "",
            web::get().to(
                move |pool: web::Data<PgPool>, query: web::Query<HashMap<String, String>>| {
                    list_documents(spec, pool, query)
                },
            ),
        )
        .route(
            "",
            web::post().to(
                move |pool: web::Data<PgPool>, body: web::Json<Map<String, Value>>| {
                    create_document(spec, pool, body)
                },
            ),
        )
        .route(
            "/{id}",
            web::get().to(move |pool: web::Data<PgPool>, path: web::Path<String>| {
                get_document(spec, pool, path)
            }),
        )
        .route(
            "/{id}",
            web::put().to(
                move |pool: web::Data<PgPool>,
                      path: web::Path<String>,
                      body: web::Json<Map<String, Value>>| {
                    update_document(spec, pool, path, body)
                },
            ),
        )
        .route(
            "/{id}",
            web::delete().to(move |pool: web::Data<PgPool>, path: web::Path<String>| {
                delete_document(spec, pool, path)
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_a_client_error() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
