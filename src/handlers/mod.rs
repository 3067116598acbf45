pub mod admin;
pub mod campaign;
pub mod donation;

pub use admin::admin_config;
pub use campaign::campaign_config;
pub use donation::donation_config;

use crate::error::AppError;
use actix_web::web;

/// 请求体 / 查询参数 / 路径参数解析失败统一返回 400 信封
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(64 * 1024)
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    );
}
