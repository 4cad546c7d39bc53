//! `SeaORM` persistence for posts.

pub mod entity;
pub mod mapper;
pub mod migrations;
mod sea_orm_repo;

pub use sea_orm_repo::SeaOrmPostsRepository;
