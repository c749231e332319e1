//! Taxpayer lookup endpoint

use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::taxinfo::{cuit::CuitNumber, TaxInfo};

/// Look up taxpayer registration data by CUIT
pub async fn tax_info_by_cuit(
    State(state): State<AppState>,
    Path(cuit): Path<String>,
) -> ApiResult<Json<TaxInfo>> {
    let cuit = CuitNumber::parse(&cuit)?;
    let info = state.tax_info.tax_info_by_cuit(&cuit).await?;
    Ok(Json(info))
}
