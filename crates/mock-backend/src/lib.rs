//! 테스트용 인메모리 청첩장 백엔드
//!
//! invitecheck의 통합 테스트가 실제 서버 없이 HTTP 계약을 검증할 수 있도록
//! `127.0.0.1:0`에 axum 서버를 띄웁니다. 실제 백엔드의 설계가 아니라
//! 하네스가 기대하는 응답을 돌려주는 테스트 더블입니다.
//!
//! ```ignore
//! let backend = MockBackend::spawn().await?;
//! let mut config = HarnessConfig::default();
//! config.target.base_url = backend.base_url();
//! ```

pub mod error;
pub mod routes;
pub mod store;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use crate::routes::{AdminAccount, AppState, Knobs};
use crate::store::Store;

/// 기본 관리자 이메일
pub const ADMIN_EMAIL: &str = "admin@wedding.com";
/// 기본 관리자 비밀번호
pub const ADMIN_PASSWORD: &str = "admin123";

/// 서버 생성 옵션
#[derive(Debug, Clone)]
pub struct MockOptions {
    pub email: String,
    pub password: String,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            email: ADMIN_EMAIL.to_owned(),
            password: ADMIN_PASSWORD.to_owned(),
        }
    }
}

/// 실행 중인 목 백엔드. drop 시 서버 태스크를 중단합니다.
pub struct MockBackend {
    addr: SocketAddr,
    state: AppState,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// 기본 관리자 계정으로 서버를 띄웁니다.
    pub async fn spawn() -> std::io::Result<Self> {
        Self::spawn_with(MockOptions::default()).await
    }

    pub async fn spawn_with(options: MockOptions) -> std::io::Result<Self> {
        let state = AppState {
            store: Arc::new(Mutex::new(Store::default())),
            admin: Arc::new(AdminAccount {
                id: Uuid::new_v4().to_string(),
                email: options.email,
                password: options.password,
                token: Uuid::new_v4().simple().to_string(),
            }),
            knobs: Arc::new(Knobs::default()),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = routes::router(state.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!(error = %e, "mock backend stopped");
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// `/api` 접두어를 포함한 기본 URL
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// 모든 응답을 지정 시간만큼 지연시킵니다.
    pub fn set_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.state.knobs.delay_ms.store(millis, Ordering::SeqCst);
    }

    /// DELETE 요청에 500을 반환하게 합니다.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.state.knobs.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// 받은 요청 수
    pub fn request_count(&self) -> usize {
        self.state.knobs.requests.load(Ordering::SeqCst)
    }

    /// 받은 DELETE 요청 수
    pub fn delete_count(&self) -> usize {
        self.state.knobs.deletes.load(Ordering::SeqCst)
    }

    /// 저장된 프로필 수 (템플릿 포함)
    pub fn profile_count(&self) -> usize {
        self.state.store().profile_count()
    }

    pub fn invitation_count(&self) -> usize {
        self.state.store().invitation_count()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
