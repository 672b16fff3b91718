// src/api/mod.rs
pub mod health;
pub mod shared;
pub mod thumbnails;
mod upload;
pub mod videos;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(videos::configure)
            .configure(thumbnails::configure)
            .configure(health::configure),
    );
}
