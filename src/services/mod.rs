pub mod auth_service;
pub mod category_service;
pub mod order_service;
pub mod payment;
pub mod product_service;
