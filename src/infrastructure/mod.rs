pub mod memory;
pub mod models;
pub mod order_repo;
pub mod product_repo;
pub mod storage;
pub mod user_repo;
