//! Webhook 签名校验（HMAC-SHA256）
//!
//! Plane 使用共享密钥对原始 body 计算 HMAC-SHA256，十六进制编码后放在
//! `X-Plane-Signature` 头中。密钥为空时跳过校验。

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 携带签名的请求头
pub const SIGNATURE_HEADER: &str = "x-plane-signature";

/// 计算 body 的十六进制签名
pub fn sign(body: &[u8], secret: &str) -> String {
    // HMAC 接受任意长度的 key，new_from_slice 不会失败
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::new(),
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// 校验签名
///
/// `secret` 为空时总是返回 `true`（安全校验关闭，部署时需注意）。
pub fn verify(body: &[u8], signature: &str, secret: &str) -> bool {
    if secret.is_empty() {
        return true;
    }

    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    // verify_slice 为常量时间比较
    mac.verify_slice(&expected).is_ok()
}
