//! Kraken 클라이언트 설정.

use std::time::Duration;

use dca_core::KrakenSettings;

/// Kraken 클라이언트 설정.
///
/// 자격증명은 `KrakenClient`가 별도로 소유합니다.
#[derive(Debug, Clone)]
pub struct KrakenConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 연결 타임아웃 (DNS, TCP, TLS 핸드셰이크)
    pub connect_timeout: Duration,
    /// 요청 전체 타임아웃
    pub request_timeout: Duration,
}

impl Default for KrakenConfig {
    fn default() -> Self {
        Self::from_settings(&KrakenSettings::default())
    }
}

impl KrakenConfig {
    /// 설정 파일의 `kraken` 섹션에서 생성합니다.
    pub fn from_settings(settings: &KrakenSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }

    /// 기본 URL을 변경합니다 (테스트 서버 등).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// API 경로의 전체 URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KrakenConfig::default();
        assert_eq!(config.base_url, "https://api.kraken.com");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_url_join() {
        let config = KrakenConfig::default().with_base_url("http://127.0.0.1:1234/");
        assert_eq!(
            config.url("/0/public/Ticker"),
            "http://127.0.0.1:1234/0/public/Ticker"
        );
    }
}
