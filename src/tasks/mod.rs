//! 后台定时任务
//!
//! 启动时调用一次 `spawn_all`。

use actix_web::web;

use crate::services::CampaignService;

/// 启动全部后台任务（通过 `tokio::spawn` 分离执行，不阻塞）
///
/// 结束过期项目是幂等操作，漏跑或重复执行都不会产生副作用。
pub fn spawn_all(campaign_service: web::Data<CampaignService>, close_expired_interval_secs: u64) {
    // 到期项目自动结束
    {
        let svc = campaign_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.close_expired(chrono::Utc::now()).await {
                    Ok(n) if n > 0 => log::info!("Expired campaigns closed: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to close expired campaigns: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(close_expired_interval_secs))
                    .await;
            }
        });
    }
}
