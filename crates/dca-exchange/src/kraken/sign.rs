//! Kraken 비공개 API 요청 서명.
//!
//! `API-Sign = base64(HMAC-SHA512(secret, path ++ SHA256(nonce ++ postdata)))`

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use std::collections::BTreeMap;

use crate::error::ExchangeError;

type HmacSha512 = Hmac<Sha512>;

/// 키 순으로 정렬된 폼 파라미터.
pub type FormParams = BTreeMap<&'static str, String>;

/// 폼 파라미터를 `application/x-www-form-urlencoded`로 인코딩합니다 (키 순).
pub fn encode_form(params: &FormParams) -> Result<String, ExchangeError> {
    serde_urlencoded::to_string(params)
        .map_err(|e| ExchangeError::ParseError(format!("폼 인코딩 실패: {}", e)))
}

/// 비공개 요청의 서명을 계산합니다.
///
/// 부수효과가 없는 순수 함수입니다.
pub fn sign(path: &str, encoded_form: &str, nonce: u64, secret_key: &[u8]) -> String {
    let mut sha = Sha256::new();
    sha.update(nonce.to_string().as_bytes());
    sha.update(encoded_form.as_bytes());
    let digest = sha.finalize();

    let mut mac =
        HmacSha512::new_from_slice(secret_key).expect("HMAC accepts keys of any length");
    mac.update(path.as_bytes());
    mac.update(&digest);

    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// 서명이 끝난 비공개 요청.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// API 경로 (예: "/0/private/AddOrder")
    pub path: &'static str,
    /// 인코딩된 폼 본문 (nonce 포함)
    pub body: String,
    /// 사용한 nonce
    pub nonce: u64,
    /// `API-Sign` 헤더 값
    pub signature: String,
}

impl SignedRequest {
    /// `nonce`를 폼에 넣고 인코딩한 뒤 서명합니다.
    pub fn new(
        path: &'static str,
        mut params: FormParams,
        nonce: u64,
        secret_key: &[u8],
    ) -> Result<Self, ExchangeError> {
        params.insert("nonce", nonce.to_string());
        let body = encode_form(&params)?;
        let signature = sign(path, &body, nonce, secret_key);

        Ok(Self {
            path,
            body,
            nonce,
            signature,
        })
    }
}
