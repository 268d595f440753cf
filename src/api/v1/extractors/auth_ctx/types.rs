/*
 * Responsibility
 * - リクエスト単位の「認証コンテキスト」の型
 * - middleware (access) が 1 リクエストにつき 1 つだけ request extensions に格納する
 * - gate / handler はこの型だけを見る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 * - Identity が無い (= 匿名) ことも正常な状態として表現する
 */
use crate::services::auth::Identity;

/// 認証済みなら Identity を持ち、匿名なら None
#[derive(Debug, Clone, Default)]
pub struct AuthCtx {
    identity: Option<Identity>,
}

impl AuthCtx {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}
