//! ContentId 生成 Outbound ポート
//!
//! ContentManager は IdGenerator を注入され、テストでは固定 ID を返す実装を渡せる。

use crate::domain::ContentId;

/// ContentId を生成する抽象（Outbound ポート）
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> ContentId;
}
