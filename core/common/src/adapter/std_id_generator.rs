//! ContentId を生成する IdGenerator の標準実装（Clock + グローバルシーケンス）
//!
//! 形式: base62(0-9,A-Z,a-z) 10文字。値 = (ms since 2020-01-01)<<8 | seq(0..255)。
//! 辞書順＝生成順。プロセス内では同一 ms でも重複しない。

use crate::domain::ContentId;
use crate::ports::outbound::{Clock, IdGenerator};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static LAST_ID: AtomicU64 = AtomicU64::new(0);

const EPOCH_MS: u64 = 1577836800000; // 2020-01-01 00:00:00 UTC
const SEQ_BITS: u64 = 8;
const BASE: u64 = 62;
const WIDTH: usize = 10;

/// 0-9, A-Z, a-z の順で辞書順＝数値順になるbase62
const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Clock + グローバルシーケンスで ContentId を生成する標準実装
pub struct StdIdGenerator {
    clock: Arc<dyn Clock>,
}

impl StdIdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl IdGenerator for StdIdGenerator {
    fn next_id(&self) -> ContentId {
        let ms = self.clock.now_ms();
        let ms_rel = ms.saturating_sub(EPOCH_MS);
        let base = ms_rel << SEQ_BITS;

        loop {
            let prev = LAST_ID.load(Ordering::SeqCst);
            let next = if (prev >> SEQ_BITS) < ms_rel {
                base
            } else {
                // 同一 ms 内（または時計の巻き戻り）: 直前の値から単調増加させる
                prev + 1
            };
            if LAST_ID
                .compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return ContentId::new(to_base62(next));
            }
        }
    }
}

fn to_base62(mut n: u64) -> String {
    let mut buf = [0u8; WIDTH];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(n % BASE) as usize];
        n /= BASE;
    }
    buf.iter().map(|&b| b as char).collect()
}
