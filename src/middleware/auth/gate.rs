//! Authorization gate: AuthCtx × route requirement → proceed / 401 / 403
//!
//! filter (access) が AuthCtx を入れた後に、route 単位で 1 回だけ評価する。
//! 判定そのものは `decide` (純粋関数) に閉じ込め、middleware はその結果を AppError に写すだけ。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use tracing::debug;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{Capability, Identity};
use crate::state::AppState;

/// Route-level requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    User,
    Admin,
}

impl Requirement {
    fn capability(&self) -> Option<Capability> {
        match self {
            Self::Public => None,
            Self::User => Some(Capability::User),
            Self::Admin => Some(Capability::Admin),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    /// 401
    Unauthenticated,
    /// 403
    Forbidden,
}

pub fn decide(identity: Option<&Identity>, requirement: Requirement) -> Decision {
    let Some(capability) = requirement.capability() else {
        return Decision::Proceed;
    };

    match identity {
        None => Decision::Unauthenticated,
        Some(identity) if identity.has(capability) => Decision::Proceed,
        Some(_) => Decision::Forbidden,
    }
}

/// Router 内の全 route に requirement を宣言する。
///
/// `route_layer` なので、マッチしなかったリクエスト (404/405) には掛からない。
pub fn require(router: Router<AppState>, requirement: Requirement) -> Router<AppState> {
    if requirement == Requirement::Public {
        return router;
    }
    router.route_layer(middleware::from_fn_with_state(requirement, gate_middleware))
}

async fn gate_middleware(
    State(requirement): State<Requirement>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req.extensions().get::<AuthCtx>().and_then(AuthCtx::identity);

    match decide(identity, requirement) {
        Decision::Proceed => Ok(next.run(req).await),
        Decision::Unauthenticated => {
            debug!(?requirement, path = %req.uri().path(), "no identity for protected route");
            Err(AppError::Unauthorized)
        }
        Decision::Forbidden => {
            debug!(
                ?requirement,
                path = %req.uri().path(),
                subject = identity.map(Identity::id),
                "identity lacks required capability"
            );
            Err(AppError::Forbidden)
        }
    }
}
