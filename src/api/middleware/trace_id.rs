use axum::{extract::Request, response::Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::infrastructure::logging::{TraceContext, TraceId};

/// TraceIdLayer - Trace ID를 HTTP 요청에 추가하는 미들웨어
///
/// - x-trace-id 헤더가 있으면 사용
/// - 없으면 새로 생성
/// - 핸들러용 `TraceId` request extension으로 저장
/// - 응답 헤더에도 trace_id 추가
#[derive(Clone)]
pub struct TraceIdLayer;

impl<S> Layer<S> for TraceIdLayer {
    type Service = TraceIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceIdService { inner }
    }
}

#[derive(Clone)]
pub struct TraceIdService<S> {
    inner: S,
}

impl<S> Service<Request> for TraceIdService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // Take the service that was driven to readiness, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            // Extract or generate trace ID
            let trace_id = TraceContext::extract_or_generate(req.headers());

            // Add to request extensions
            req.extensions_mut().insert(TraceId(trace_id.clone()));

            // Call inner service
            let mut response = inner.call(req).await?;

            // Add to response headers
            TraceContext::add_to_headers(response.headers_mut(), &trace_id);

            Ok(response)
        })
    }
}
