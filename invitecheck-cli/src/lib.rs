//! invitecheck CLI 라이브러리
//!
//! 바이너리(`invitecheck`)와 통합 테스트가 같은 명령 처리기를 씁니다.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
