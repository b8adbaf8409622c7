//! invitecheck 시나리오 카탈로그
//!
//! 스위트마다 필요한 리소스를 직접 만들고, 만든 리소스는 모두 추적기에
//! 기록합니다. 스위트 사이에는 공유 상태가 없으므로 어떤 조합으로든
//! 실행할 수 있습니다.
//!
//! | 스위트 | 대상 |
//! |--------|------|
//! | `profile-save` | 프로필 생성 검증, 언어 규칙, 조회/수정/삭제 |
//! | `design-system` | 디자인 기본값과 8종 디자인 |
//! | `templates` | 템플릿 저장, 목록, 템플릿에서 생성, 복제 |
//! | `event-invitations` | 이벤트 초대장 CRUD, 신(deity) 규칙, 공개 뷰 |
//! | `audit-logs` | 관리 작업 감사 기록 |

pub mod catalog;
pub mod fixtures;
pub mod steps;
pub mod suites;

pub use catalog::{ALL, SUITES, build, suite};
