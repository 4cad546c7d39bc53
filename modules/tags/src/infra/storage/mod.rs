//! `SeaORM` persistence for tags and post/tag associations.

pub mod entity;
pub mod mapper;
pub mod migrations;
mod sea_orm_repo;

pub use sea_orm_repo::SeaOrmTagsRepository;
