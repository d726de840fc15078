//! 사이트 특성 및 도메인 상수들
//!
//! AWS Service Authorization Reference 사이트의 고유한 특성들을 정의합니다.

/// Service Authorization Reference 사이트 특성 상수들
pub mod site {
    /// 상세 페이지들이 위치한 기본 URL (끝의 `/` 포함)
    pub const BASE_URL: &str = "https://docs.aws.amazon.com/service-authorization/latest/reference/";

    /// 서비스 목록(인덱스) 페이지
    pub const ENTRY_URL: &str = "https://docs.aws.amazon.com/service-authorization/latest/reference/reference_policies_actions-resources-contextkeys.html";

    /// 상세 페이지 href 패턴 (`list_<service>.html`, 선택적 `./` 접두어)
    pub const DETAIL_HREF_PATTERN: &str = r"^(\./)?list_.*\.html$";

    /// 문서 링크로 신뢰하는 도메인 접두어
    pub const TRUSTED_DOC_PREFIX: &str = "https://docs.aws.amazon.com/";

    /// 상세 페이지 본문에서 서비스 접두어를 찾는 패턴
    pub const SERVICE_PREFIX_PATTERN: &str = r"(?i)service prefix:\s*([A-Za-z0-9_-]+)";
}

/// 액션 테이블의 논리적 컬럼 위치
pub mod columns {
    pub const IDENTIFIER: usize = 0;
    pub const DESCRIPTION: usize = 1;
    pub const ACCESS_LEVEL: usize = 2;
    pub const RESOURCE_TYPES: usize = 3;
    pub const CONTEXT_KEYS: usize = 4;

    /// Number of logical columns the grid parser tracks
    pub const TRACKED: usize = 5;
}

/// 파일 출력 관련 상수들
pub mod output {
    /// 기본 출력 디렉토리
    pub const DEFAULT_DIR: &str = "aws_service_actions";

    /// 출력 파일 확장자
    pub const FILE_EXTENSION: &str = "json";

    /// 파일명에서 `_`로 치환되는 문자들
    pub const ILLEGAL_FILENAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|', ' '];
}
