//! DCA 봇 CLI.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 정액 매수 실행 및 결과 보고
//! - 수량 미리보기 (드라이런)
//! - 종료 시그널 처리
//! - AWS Parameter Store 시크릿 조회

pub mod commands;
pub mod secrets;

pub use commands::*;
pub use secrets::ParameterStore;
