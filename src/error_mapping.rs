//! Maps crate-local errors onto `sched2cal_core::AppError` so the binary has
//! a single error type with user-facing messages.

use sched2cal_calendar::CalendarError;
use sched2cal_core::{AppError, AuthError, PortalError, ReqwestErrorExt};

use crate::planner::PlanError;

pub fn calendar(e: CalendarError) -> AppError {
    match e {
        CalendarError::TokenExpired => AppError::Auth(AuthError::TokenExpired),
        CalendarError::AuthRequired => {
            AppError::Auth(AuthError::OAuthFailed("calendar access denied".into()))
        }
        CalendarError::NetworkError(e) => AppError::Network(e.into_network_error()),
        other => AppError::Calendar(other.user_message()),
    }
}

pub fn plan(e: PlanError) -> AppError {
    AppError::Portal(PortalError::MalformedRow(e.to_string()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]
    use super::*;

    #[test]
    fn test_calendar_not_found_keeps_name() {
        match calendar(CalendarError::CalendarNotFound("HK1".into())) {
            AppError::Calendar(msg) => assert!(msg.contains("HK1")),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn test_expired_token_is_auth_error() {
        assert!(matches!(
            calendar(CalendarError::TokenExpired),
            AppError::Auth(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_plan_error_is_portal_error() {
        let e = PlanError::MissingField { index: 2, field: "room" };
        assert!(matches!(
            plan(e),
            AppError::Portal(PortalError::MalformedRow(msg)) if msg.contains("room")
        ));
    }
}
