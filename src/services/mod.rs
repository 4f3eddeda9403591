pub mod auth_service;
pub mod directory_service;
pub mod notification_service;
pub mod rate_limit_service;
pub mod rating_service;
pub mod registration_service;
pub mod user_service;
pub mod watermark_service;
