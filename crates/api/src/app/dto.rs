use serde::Deserialize;

// -------------------------
// Request DTOs
// -------------------------
//
// Fields are optional so that missing values surface as per-field
// validation messages instead of a deserialization failure.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub vehicle_id: Option<String>,
    pub cpf_buyer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhookRequest {
    pub payment_code: Option<String>,
    pub status: Option<String>,
}
