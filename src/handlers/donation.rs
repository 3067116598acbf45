use crate::models::*;
use crate::services::DonationService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/donations",
    tag = "donation",
    request_body = CreateDonationRequest,
    responses(
        (status = 201, description = "捐款已提交，等待确认", body = DonationReceiptResponse),
        (status = 400, description = "请求参数错误 / 金额或币种无效"),
        (status = 404, description = "项目不存在"),
        (status = 409, description = "项目当前不接受捐款")
    )
)]
pub async fn submit_donation(
    donation_service: web::Data<DonationService>,
    request: web::Json<CreateDonationRequest>,
) -> Result<HttpResponse> {
    match donation_service.submit(request.into_inner()).await {
        Ok(receipt) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            receipt,
            "Donation received and awaiting confirmation".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/donations/receipt/{receipt_number}",
    tag = "donation",
    params(
        ("receipt_number" = String, Path, description = "收据号，如 PSN-20250901-ABCDEF")
    ),
    responses(
        (status = 200, description = "查询收据成功", body = DonationReceiptResponse),
        (status = 404, description = "收据不存在")
    )
)]
pub async fn get_receipt(
    donation_service: web::Data<DonationService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match donation_service.find_by_receipt(&path).await {
        Ok(receipt) => Ok(HttpResponse::Ok().json(ApiResponse::success(receipt))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn donation_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/donations")
            .route("", web::post().to(submit_donation))
            .route("/receipt/{receipt_number}", web::get().to(get_receipt)),
    );
}
