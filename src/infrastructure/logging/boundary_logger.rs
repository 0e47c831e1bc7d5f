use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::events::Event;

/// BoundaryLogger - 모든 모듈 경계에서 로깅을 담당
///
/// 로깅 포맷: [trace_id] [호출자→피호출자] [작업] [상태] [duration]
#[derive(Clone)]
pub struct BoundaryLogger;

impl BoundaryLogger {
    pub fn new() -> Self {
        Self
    }

    /// API 엔드포인트 호출 시작
    /// 예: [API→Handler] GET /api/v1/boards/b1/events [ENTRY] b1
    pub fn api_entry(&self, trace_id: &str, method: &str, path: &str, params: &str) {
        info!(
            trace_id = %trace_id,
            method = %method,
            path = %path,
            flow = "API→Handler",
            stage = "ENTRY",
            "[{}] [API→Handler] {} {} [ENTRY] {}",
            trace_id, method, path, params
        );
    }

    /// API 엔드포인트 완료
    /// 예: [API→Handler] GET /api/v1/events/stats [←DONE] 0.12ms status=200
    pub fn api_exit(&self, trace_id: &str, method: &str, path: &str, duration_ms: f64, status: u16) {
        info!(
            trace_id = %trace_id,
            method = %method,
            path = %path,
            flow = "API→Handler",
            stage = "←DONE",
            duration_ms = %duration_ms,
            status = %status,
            "[{}] [API→Handler] {} {} [←DONE] {:.2}ms status={}",
            trace_id, method, path, duration_ms, status
        );
    }

    /// 서비스 레이어 호출 시작
    /// 예: [API→BoardNotifier] commit [ENTRY] params="card.created"
    pub fn service_entry<T: std::fmt::Debug>(&self, trace_id: &str, from: &str, service: &str, method: &str, params: &T) {
        info!(
            trace_id = %trace_id,
            from = %from,
            service = %service,
            method = %method,
            flow = format!("{}→{}", from, service),
            stage = "ENTRY",
            params = ?params,
            "[{}] [{}→{}] {} [ENTRY] params={:?}",
            trace_id, from, service, method, params
        );
    }

    /// 서비스 레이어 완료
    pub fn service_exit(&self, trace_id: &str, from: &str, service: &str, method: &str, duration_ms: f64) {
        info!(
            trace_id = %trace_id,
            from = %from,
            service = %service,
            method = %method,
            flow = format!("{}→{}", from, service),
            stage = "←DONE",
            duration_ms = %duration_ms,
            "[{}] [{}→{}] {} [←DONE] {:.2}ms",
            trace_id, from, service, method, duration_ms
        );
    }

    /// 서비스 레이어 에러
    pub fn service_error<E: std::fmt::Display>(&self, trace_id: &str, from: &str, service: &str, method: &str, error: &E) {
        error!(
            trace_id = %trace_id,
            from = %from,
            service = %service,
            method = %method,
            flow = format!("{}→{}", from, service),
            stage = "←FAIL",
            error = %error,
            "[{}] [{}→{}] {} [←FAIL] error={}",
            trace_id, from, service, method, error
        );
    }

    /// 레포지토리 호출 시작
    /// 예: [BoardNotifier→ActivityRepo] append [CALL]
    pub fn repo_call(&self, trace_id: &str, from: &str, repo: &str, method: &str) {
        info!(
            trace_id = %trace_id,
            from = %from,
            repo = %repo,
            method = %method,
            flow = format!("{}→{}", from, repo),
            stage = "CALL",
            "[{}] [{}→{}] {} [CALL]",
            trace_id, from, repo, method
        );
    }

    /// 레포지토리 완료
    pub fn repo_done(&self, trace_id: &str, from: &str, repo: &str, method: &str, duration_ms: f64) {
        info!(
            trace_id = %trace_id,
            from = %from,
            repo = %repo,
            method = %method,
            flow = format!("{}→{}", from, repo),
            stage = "←DONE",
            duration_ms = %duration_ms,
            "[{}] [{}→{}] {} [←DONE] {:.2}ms",
            trace_id, from, repo, method, duration_ms
        );
    }

    /// 레포지토리 에러 (호출자는 계속 진행하므로 warn 레벨)
    pub fn repo_error<E: std::fmt::Display>(&self, trace_id: &str, from: &str, repo: &str, method: &str, error: &E) {
        warn!(
            trace_id = %trace_id,
            from = %from,
            repo = %repo,
            method = %method,
            flow = format!("{}→{}", from, repo),
            stage = "←FAIL",
            error = %error,
            "[{}] [{}→{}] {} [←FAIL] error={}",
            trace_id, from, repo, method, error
        );
    }

    /// 이벤트 발행
    /// 예: [EventBus] publish [EVT↗] #42 card.moved board=b1 delivered=3 dropped=0
    pub fn event_publish(&self, event: &Event, delivered: usize, dropped: usize) {
        debug!(
            sequence = event.sequence,
            topic = %event.topic,
            event_type = %event.event_type,
            delivered = delivered,
            dropped = dropped,
            stage = "EVT↗",
            "[EventBus] publish [EVT↗] #{} {} board={} delivered={} dropped={}",
            event.sequence, event.event_type, event.topic, delivered, dropped
        );
    }

    /// 스트림 구독 시작
    /// 예: [Stream→EventBus] sub-7 board=b1 [OPEN]
    pub fn stream_opened(&self, trace_id: &str, topic: &str, subscription: &str) {
        info!(
            trace_id = %trace_id,
            topic = %topic,
            subscription = %subscription,
            flow = "Stream→EventBus",
            stage = "OPEN",
            "[{}] [Stream→EventBus] {} board={} [OPEN]",
            trace_id, subscription, topic
        );
    }

    /// 스트림 종료 (연결 끊김은 정상 종료로 취급, error 레벨 사용 안 함)
    /// 예: [Stream→EventBus] sub-7 board=b1 [CLOSE] reason=disconnected frames=12 dropped=0
    pub fn stream_closed(&self, trace_id: &str, summary: &StreamSummary<'_>) {
        info!(
            trace_id = %trace_id,
            topic = %summary.topic,
            subscription = %summary.subscription,
            flow = "Stream→EventBus",
            stage = "CLOSE",
            reason = %summary.reason,
            frames_sent = summary.frames_sent,
            dropped = summary.dropped,
            duration_ms = %summary.duration_ms,
            "[{}] [Stream→EventBus] {} board={} [CLOSE] reason={} frames={} dropped={} {:.2}ms",
            trace_id,
            summary.subscription,
            summary.topic,
            summary.reason,
            summary.frames_sent,
            summary.dropped,
            summary.duration_ms
        );
    }
}

impl Default for BoundaryLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// 스트림 종료 시 남기는 요약
#[derive(Debug, Clone, Copy)]
pub struct StreamSummary<'a> {
    pub topic: &'a str,
    pub subscription: &'a str,
    pub reason: &'a str,
    pub frames_sent: u64,
    pub dropped: u64,
    pub duration_ms: f64,
}

/// 성능 측정용 타이머
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// 타이머 시작
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// 경과 시간 (밀리초)
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}
