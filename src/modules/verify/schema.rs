use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct GetCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct GetCodeResponse {
    pub message: &'static str,
    pub generated: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
}
