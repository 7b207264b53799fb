use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Request DTO for a manual hand-off
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignOperatorDto {
    #[validate(range(min = 1))]
    pub operator_id: i64,
}
