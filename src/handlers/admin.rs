use crate::models::*;
use crate::services::{CampaignService, DonationService, StatsService};
use actix_web::{HttpResponse, ResponseError, Result, web};

// -----------------------------
// 项目管理
// -----------------------------

#[utoipa::path(
    get,
    path = "/admin/campaigns",
    tag = "admin",
    operation_id = "admin_list_campaigns",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量"),
        ("search" = Option<String>, Query, description = "按标题/描述搜索"),
        ("status" = Option<String>, Query, description = "状态: draft/active/completed/cancelled"),
        ("category" = Option<String>, Query, description = "分类"),
        ("featured" = Option<bool>, Query, description = "只看精选项目")
    ),
    responses(
        (status = 200, description = "获取项目列表成功", body = [CampaignResponse])
    )
)]
pub async fn list_campaigns(
    campaign_service: web::Data<CampaignService>,
    query: web::Query<CampaignQuery>,
) -> Result<HttpResponse> {
    match campaign_service.list_admin(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::paginated(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/campaigns",
    tag = "admin",
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "创建项目成功", body = CampaignResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_campaign(
    campaign_service: web::Data<CampaignService>,
    request: web::Json<CreateCampaignRequest>,
) -> Result<HttpResponse> {
    match campaign_service.create(request.into_inner()).await {
        Ok(campaign) => Ok(HttpResponse::Created().json(ApiResponse::success(campaign))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/campaigns/{id}",
    tag = "admin",
    operation_id = "admin_get_campaign",
    params(
        ("id" = i64, Path, description = "项目 ID")
    ),
    responses(
        (status = 200, description = "获取项目详情成功", body = CampaignResponse),
        (status = 404, description = "项目不存在")
    )
)]
pub async fn get_campaign(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match campaign_service.get_admin(path.into_inner()).await {
        Ok(campaign) => Ok(HttpResponse::Ok().json(ApiResponse::success(campaign))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/campaigns/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "项目 ID")
    ),
    request_body = UpdateCampaignRequest,
    responses(
        (status = 200, description = "更新项目成功", body = CampaignResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "项目不存在"),
        (status = 409, description = "已有捐款，不能修改币种")
    )
)]
pub async fn update_campaign(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<i64>,
    request: web::Json<UpdateCampaignRequest>,
) -> Result<HttpResponse> {
    match campaign_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(campaign) => Ok(HttpResponse::Ok().json(ApiResponse::success(campaign))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/campaigns/{id}/status",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "项目 ID")
    ),
    request_body = CampaignStatusRequest,
    responses(
        (status = 200, description = "状态切换成功", body = CampaignResponse),
        (status = 404, description = "项目不存在"),
        (status = 409, description = "不允许的状态切换")
    )
)]
pub async fn change_campaign_status(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<i64>,
    request: web::Json<CampaignStatusRequest>,
) -> Result<HttpResponse> {
    match campaign_service
        .change_status(path.into_inner(), request.status)
        .await
    {
        Ok(campaign) => Ok(HttpResponse::Ok().json(ApiResponse::success(campaign))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/campaigns/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "项目 ID")
    ),
    responses(
        (status = 200, description = "删除项目成功（捐款记录保留）"),
        (status = 404, description = "项目不存在")
    )
)]
pub async fn delete_campaign(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match campaign_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            (),
            "Campaign deleted".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

// -----------------------------
// 捐款管理
// -----------------------------

#[utoipa::path(
    get,
    path = "/admin/donations",
    tag = "admin",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量"),
        ("search" = Option<String>, Query, description = "捐款人姓名/邮箱/收据号"),
        ("status" = Option<String>, Query, description = "状态: pending/completed/failed/refunded"),
        ("campaign" = Option<String>, Query, description = "项目 slug")
    ),
    responses(
        (status = 200, description = "获取捐款列表成功", body = [DonationResponse])
    )
)]
pub async fn list_donations(
    donation_service: web::Data<DonationService>,
    query: web::Query<DonationQuery>,
) -> Result<HttpResponse> {
    match donation_service.list_admin(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::paginated(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/donations/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "捐款 ID")
    ),
    responses(
        (status = 200, description = "获取捐款详情成功", body = DonationResponse),
        (status = 404, description = "捐款不存在")
    )
)]
pub async fn get_donation(
    donation_service: web::Data<DonationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match donation_service.get(path.into_inner()).await {
        Ok(donation) => Ok(HttpResponse::Ok().json(ApiResponse::success(donation))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/donations/{id}/complete",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "捐款 ID")
    ),
    responses(
        (status = 200, description = "确认到账成功", body = DonationResponse),
        (status = 404, description = "捐款不存在"),
        (status = 409, description = "当前状态不能确认")
    )
)]
pub async fn complete_donation(
    donation_service: web::Data<DonationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match donation_service.complete(path.into_inner()).await {
        Ok(donation) => Ok(HttpResponse::Ok().json(ApiResponse::success(donation))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/donations/{id}/fail",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "捐款 ID")
    ),
    responses(
        (status = 200, description = "标记失败成功", body = DonationResponse),
        (status = 404, description = "捐款不存在"),
        (status = 409, description = "当前状态不能标记失败")
    )
)]
pub async fn fail_donation(
    donation_service: web::Data<DonationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match donation_service.fail(path.into_inner()).await {
        Ok(donation) => Ok(HttpResponse::Ok().json(ApiResponse::success(donation))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/donations/{id}/refund",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "捐款 ID")
    ),
    responses(
        (status = 200, description = "退款成功", body = DonationResponse),
        (status = 404, description = "捐款不存在"),
        (status = 409, description = "只有已完成的捐款可以退款")
    )
)]
pub async fn refund_donation(
    donation_service: web::Data<DonationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match donation_service.refund(path.into_inner()).await {
        Ok(donation) => Ok(HttpResponse::Ok().json(ApiResponse::success(donation))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/donations/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "捐款 ID")
    ),
    responses(
        (status = 200, description = "删除捐款成功"),
        (status = 404, description = "捐款不存在")
    )
)]
pub async fn delete_donation(
    donation_service: web::Data<DonationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match donation_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            (),
            "Donation deleted".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "获取统计数据成功", body = DashboardStats)
    )
)]
pub async fn get_stats(stats_service: web::Data<StatsService>) -> Result<HttpResponse> {
    match stats_service.dashboard().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/campaigns", web::get().to(list_campaigns))
            .route("/campaigns", web::post().to(create_campaign))
            .route("/campaigns/{id}", web::get().to(get_campaign))
            .route("/campaigns/{id}", web::put().to(update_campaign))
            .route("/campaigns/{id}", web::delete().to(delete_campaign))
            .route("/campaigns/{id}/status", web::post().to(change_campaign_status))
            .route("/donations", web::get().to(list_donations))
            .route("/donations/{id}", web::get().to(get_donation))
            .route("/donations/{id}", web::delete().to(delete_donation))
            .route("/donations/{id}/complete", web::post().to(complete_donation))
            .route("/donations/{id}/fail", web::post().to(fail_donation))
            .route("/donations/{id}/refund", web::post().to(refund_donation))
            .route("/stats", web::get().to(get_stats)),
    );
}
