use axum::http::HeaderMap;

pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// 요청 단위 Trace ID (request extensions에 저장)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trace ID 생성 및 전파를 담당
pub struct TraceContext;

impl TraceContext {
    /// 새 Trace ID 생성 (UUID v4)
    pub fn new_trace_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// HTTP 헤더에서 Trace ID 추출 (없으면 생성)
    ///
    /// x-trace-id 헤더를 찾고, 비어 있거나 없으면 새로 생성
    pub fn extract_or_generate(headers: &HeaderMap) -> String {
        headers
            .get(TRACE_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(Self::new_trace_id)
    }

    /// Trace ID를 HTTP 헤더에 추가
    pub fn add_to_headers(headers: &mut HeaderMap, trace_id: &str) {
        if let Ok(value) = trace_id.parse() {
            headers.insert(TRACE_ID_HEADER, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trace_id() {
        let id1 = TraceContext::new_trace_id();
        let id2 = TraceContext::new_trace_id();

        assert_ne!(id1, id2);
        assert!(uuid::Uuid::parse_str(&id1).is_ok());
    }

    #[test]
    fn test_extract_or_generate_with_existing() {
        let mut headers = HeaderMap::new();
        headers.insert(TRACE_ID_HEADER, "test-trace-id".parse().unwrap());

        let trace_id = TraceContext::extract_or_generate(&headers);
        assert_eq!(trace_id, "test-trace-id");
    }

    #[test]
    fn test_extract_or_generate_ignores_empty_header() {
        let mut headers = HeaderMap::new();
        headers.insert(TRACE_ID_HEADER, "".parse().unwrap());

        let trace_id = TraceContext::extract_or_generate(&headers);
        assert!(uuid::Uuid::parse_str(&trace_id).is_ok());
    }

    #[test]
    fn test_add_to_headers() {
        let mut headers = HeaderMap::new();
        TraceContext::add_to_headers(&mut headers, "abc-123");
        assert_eq!(headers.get(TRACE_ID_HEADER).unwrap(), "abc-123");
    }
}
