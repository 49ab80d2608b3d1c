use crate::errors::AppError;
use crate::models::user::{PlanTier, User};

/// Rejects the call unless `user` is on `required` or a higher tier.
/// Callers must check this before any write so a rejection has no side effects.
pub fn require_plan(user: &User, required: PlanTier, feature: &'static str) -> Result<(), AppError> {
    if user.plan >= required {
        Ok(())
    } else {
        tracing::info!(
            user_id = %user.id,
            plan = %user.plan,
            %required,
            feature,
            "Plan gate rejected request"
        );
        Err(AppError::PlanRequired { feature, required })
    }
}
