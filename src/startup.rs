use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::JwtSettings;
use crate::middleware::{RequestLogger, RequireAuth};
use crate::routes::{health_check, login, logout, refresh, register, resource_routes};
use crate::store::collections::{COMMENTS, POSTS, USERS};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let jwt_config_data = web::Data::new(jwt_config.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared state
            .app_data(connection.clone())
            .app_data(jwt_config_data.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))
            .route("/auth/logout", web::post().to(logout))
            // Resource routes, all behind the access-token gate
            .service(
                web::scope("/users")
                    .wrap(RequireAuth::new(jwt_config.clone()))
                    .configure(resource_routes(&USERS)),
            )
            .service(
                web::scope("/posts")
                    .wrap(RequireAuth::new(jwt_config.clone()))
                    .configure(resource_routes(&POSTS)),
            )
            .service(
                web::scope("/comments")
                    .wrap(RequireAuth::new(jwt_config.clone()))
                    .configure(resource_routes(&COMMENTS)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
