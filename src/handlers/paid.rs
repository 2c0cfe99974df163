use crate::models::{PaidResponse, Verdict};
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

/// Paid endpoint: echoes the payment that unlocked it.
pub async fn paid_receipt(
    Extension(verdict): Extension<Verdict>,
) -> Json<PaidResponse<Verdict>> {
    Json(PaidResponse {
        success: true,
        data: verdict,
        timestamp: Utc::now(),
        request_id: Uuid::new_v4().to_string(),
    })
}
