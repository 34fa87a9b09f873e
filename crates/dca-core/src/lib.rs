//! # DCA Core
//!
//! 정액 분할 매수 봇의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 매수 요청 및 주문 결과 타입
//! - 설정 관리
//! - 로깅 인프라
//! - 자격증명 및 원격 시크릿 참조
//! - 빌드 메타데이터

pub mod build_info;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod logging;

pub use build_info::BuildInfo;
pub use config::*;
pub use credentials::{
    decode_secret_best_effort, Credentials, NoSecretStore, SecretReference, SecretResolver,
};
pub use domain::*;
pub use error::*;
pub use logging::*;
