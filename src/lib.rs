pub mod app;
pub mod config;
pub mod error;
pub mod demo_seeder;
pub mod db {
    pub mod category_repository;
    pub mod models;
    pub mod repository;
    pub mod schema;
}
pub mod articles {
    pub mod mapper;
    pub mod pagination;
    pub mod service;
    pub mod text;
    pub mod types;
}
pub mod auth {
    pub mod admin;
    pub mod demo_auth;
    pub mod identity;
    pub mod models;
}
pub mod rendering {
    pub mod markdown;
}
pub mod api {
    pub mod admin_articles;
    pub mod articles;
    pub mod categories;
    pub mod errors;
}
