//! 分页相关的数据结构

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationParams {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self { page, limit }
    }

    pub fn get_page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// 每页数量，限制在 `[1, max]`
    pub fn get_limit(&self, default: u64, max: u64) -> u64 {
        self.limit.unwrap_or(default).clamp(1, max.max(1))
    }

    /// 偏移量；超出 Postgres BIGINT 范围时返回 `None`
    pub fn get_offset(&self, default: u64, max: u64) -> Option<u64> {
        (self.get_page() - 1)
            .checked_mul(self.get_limit(default, max))
            .filter(|offset| *offset <= i64::MAX as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let pages = if total == 0 {
            1
        } else {
            total.div_ceil(limit.max(1))
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// 服务层分页结果
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }
}
