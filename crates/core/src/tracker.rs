//! 리소스 추적 -- 실행 중 생성한 리소스를 기록하고 끝에 삭제
//!
//! 시나리오가 성공했든 실패했든 추적된 모든 리소스는 정리 단계에서
//! 한 번씩 삭제 시도를 받습니다. 삭제 실패는 로그로만 남고 실행 결과에
//! 영향을 주지 않습니다.
//!
//! # 정리 규칙
//! - 생성 역순으로 삭제 (초대장 → 프로필)
//! - 200/204 → 삭제됨, 404 → 이미 없음, 그 외 → 실패 (다음 정리에서 재시도)
//! - 이미 삭제한 리소스는 다시 요청하지 않고 "이미 없음"으로 보고

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::AuthenticatedClient;
use crate::error::CleanupError;
use crate::metrics as m;

/// 추적 대상 리소스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// 일반 프로필
    Profile,
    /// 이벤트 초대장
    Invitation,
    /// 템플릿으로 전환된 프로필
    Template,
}

impl ResourceKind {
    /// 삭제 엔드포인트 경로
    ///
    /// 템플릿은 플래그가 붙은 프로필이므로 프로필 경로로 삭제합니다.
    pub fn delete_path(self, id: &str) -> String {
        match self {
            Self::Profile | Self::Template => format!("/admin/profiles/{id}"),
            Self::Invitation => format!("/admin/event-invitations/{id}"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Invitation => "invitation",
            Self::Template => "template",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 추적 중인 리소스
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedResource {
    pub kind: ResourceKind,
    pub id: String,
}

impl fmt::Display for TrackedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// 삭제 실패 기록
#[derive(Debug, Clone, Serialize)]
pub struct FailedCleanup {
    pub resource: TrackedResource,
    pub reason: String,
}

/// 정리 결과
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    /// 이번 정리에서 삭제된 리소스
    pub deleted: Vec<TrackedResource>,
    /// 이미 없던 리소스 (404 또는 이전 정리에서 삭제됨)
    pub already_gone: Vec<TrackedResource>,
    /// 삭제 실패
    pub failed: Vec<FailedCleanup>,
}

impl CleanupReport {
    /// 삭제 시도 대상 수
    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.already_gone.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 생성 리소스 추적기
///
/// 실행 컨텍스트가 단독으로 소유하므로 잠금이 없습니다.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    pending: Vec<TrackedResource>,
    released: Vec<TrackedResource>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 정리 대상으로 기록합니다. 같은 리소스를 두 번 기록하지 않습니다.
    pub fn track(&mut self, kind: ResourceKind, id: impl Into<String>) {
        let resource = TrackedResource {
            kind,
            id: id.into(),
        };
        if self.pending.contains(&resource) {
            return;
        }
        debug!(kind = %resource.kind, id = %resource.id, "tracking resource");
        self.pending.push(resource);
    }

    /// 시나리오가 직접 삭제한 리소스를 추적에서 제외합니다.
    ///
    /// 제외된 리소스는 "이미 삭제됨"으로 간주됩니다.
    pub fn untrack(&mut self, kind: ResourceKind, id: &str) -> bool {
        match self
            .pending
            .iter()
            .position(|r| r.kind == kind && r.id == id)
        {
            Some(index) => {
                let resource = self.pending.remove(index);
                self.released.push(resource);
                true
            }
            None => false,
        }
    }

    /// 리소스 종류를 바꿉니다 (프로필 → 템플릿).
    pub fn retag(&mut self, id: &str, kind: ResourceKind) -> bool {
        match self.pending.iter_mut().find(|r| r.id == id) {
            Some(resource) => {
                resource.kind = kind;
                true
            }
            None => false,
        }
    }

    /// 정리 대기 중인 리소스 (생성 순)
    pub fn pending(&self) -> &[TrackedResource] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 추적된 리소스를 역순으로 삭제합니다. 에러를 반환하지 않습니다.
    pub async fn cleanup(&mut self, client: &AuthenticatedClient) -> CleanupReport {
        let mut report = CleanupReport {
            already_gone: self.released.clone(),
            ..CleanupReport::default()
        };
        let mut retry = Vec::new();

        while let Some(resource) = self.pending.pop() {
            match delete_one(client, &resource).await {
                Ok(true) => {
                    debug!(kind = %resource.kind, id = %resource.id, "resource deleted");
                    self.released.push(resource.clone());
                    report.deleted.push(resource);
                }
                Ok(false) => {
                    debug!(kind = %resource.kind, id = %resource.id, "resource already gone");
                    self.released.push(resource.clone());
                    report.already_gone.push(resource);
                }
                Err(e) => {
                    warn!(kind = %resource.kind, id = %resource.id, error = %e, "cleanup failed");
                    metrics::counter!(
                        m::CLEANUP_FAILURES_TOTAL,
                        m::LABEL_KIND => resource.kind.as_str()
                    )
                    .increment(1);
                    report.failed.push(FailedCleanup {
                        resource: resource.clone(),
                        reason: e.to_string(),
                    });
                    retry.push(resource);
                }
            }
        }

        // 실패한 리소스는 생성 순서를 유지한 채 다시 대기열로
        retry.reverse();
        self.pending = retry;

        info!(
            deleted = report.deleted.len(),
            already_gone = report.already_gone.len(),
            failed = report.failed.len(),
            "cleanup finished"
        );
        report
    }
}

/// 삭제되었으면 `Ok(true)`, 이미 없으면 `Ok(false)`
async fn delete_one(
    client: &AuthenticatedClient,
    resource: &TrackedResource,
) -> Result<bool, CleanupError> {
    let response = client
        .delete(&resource.kind.delete_path(&resource.id))
        .await
        .map_err(|source| CleanupError::Transport {
            kind: resource.kind.to_string(),
            id: resource.id.clone(),
            source,
        })?;
    match response.status {
        200 | 204 => Ok(true),
        404 => Ok(false),
        status => Err(CleanupError::Status {
            kind: resource.kind.to_string(),
            id: resource.id.clone(),
            status,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_paths_by_kind() {
        assert_eq!(ResourceKind::Profile.delete_path("p1"), "/admin/profiles/p1");
        assert_eq!(ResourceKind::Template.delete_path("t1"), "/admin/profiles/t1");
        assert_eq!(
            ResourceKind::Invitation.delete_path("i1"),
            "/admin/event-invitations/i1"
        );
    }

    #[test]
    fn track_ignores_duplicates() {
        let mut tracker = ResourceTracker::new();
        tracker.track(ResourceKind::Profile, "p1");
        tracker.track(ResourceKind::Profile, "p1");
        tracker.track(ResourceKind::Invitation, "i1");
        assert_eq!(tracker.pending().len(), 2);
    }

    #[test]
    fn untrack_removes_pending_entry() {
        let mut tracker = ResourceTracker::new();
        tracker.track(ResourceKind::Profile, "p1");
        assert!(tracker.untrack(ResourceKind::Profile, "p1"));
        assert!(!tracker.untrack(ResourceKind::Profile, "p1"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn retag_changes_kind() {
        let mut tracker = ResourceTracker::new();
        tracker.track(ResourceKind::Profile, "p1");
        assert!(tracker.retag("p1", ResourceKind::Template));
        assert_eq!(tracker.pending()[0].kind, ResourceKind::Template);
        assert!(!tracker.retag("nope", ResourceKind::Template));
    }

    #[test]
    fn report_counts() {
        let resource = TrackedResource {
            kind: ResourceKind::Profile,
            id: "p1".to_owned(),
        };
        let report = CleanupReport {
            deleted: vec![resource.clone()],
            already_gone: vec![resource.clone()],
            failed: vec![FailedCleanup {
                resource,
                reason: "500".to_owned(),
            }],
        };
        assert_eq!(report.attempted(), 3);
        assert!(!report.is_clean());
    }
}
