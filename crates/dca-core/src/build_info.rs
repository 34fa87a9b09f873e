//! 빌드 메타데이터.
//!
//! 바이너리에서 한 번 생성한 뒤 로깅/리포트에 명시적으로 전달합니다.
//! 전역 가변 상태로 노출하지 않습니다.

use serde::Serialize;

/// 값이 주입되지 않았을 때 사용하는 기본값.
pub const UNKNOWN: &str = "dev";

/// 빌드 정보 (버전, 커밋, 빌드 날짜).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub date: String,
}

impl BuildInfo {
    /// 새 빌드 정보를 생성합니다. 빈 값은 `"dev"`로 대체됩니다.
    pub fn new(
        version: impl Into<String>,
        commit: Option<&str>,
        date: Option<&str>,
    ) -> Self {
        let or_unknown = |v: Option<&str>| {
            v.filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string()
        };

        Self {
            version: version.into(),
            commit: or_unknown(commit),
            date: or_unknown(date),
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::new(UNKNOWN, None, None)
    }
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.version, self.commit, self.date)
    }
}

/// 빌드 시점 정보를 담은 `BuildInfo`를 생성하는 매크로.
///
/// 호출한 크레이트의 `CARGO_PKG_VERSION`과 빌드 환경 변수
/// `DCA_GIT_COMMIT`, `DCA_BUILD_DATE`를 사용합니다.
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::build_info::BuildInfo::new(
            env!("CARGO_PKG_VERSION"),
            option_env!("DCA_GIT_COMMIT"),
            option_env!("DCA_BUILD_DATE"),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_defaults() {
        let info = BuildInfo::new("0.1.0", None, Some(""));
        assert_eq!(info.version, "0.1.0");
        assert_eq!(info.commit, "dev");
        assert_eq!(info.date, "dev");
        assert_eq!(info.to_string(), "0.1.0 (dev, dev)");
    }

    #[test]
    fn test_build_info_macro() {
        let info = build_info!();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }
}
