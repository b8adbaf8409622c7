//! 스위트별 시나리오 정의
//!
//! 각 모듈은 스위트 이름 `NAME`과 실행 순서대로 정렬된 `scenarios()`를
//! 제공합니다. 변수 키는 스위트 이름을 접두어로 씁니다.

pub mod audit;
pub mod design;
pub mod invitation;
pub mod profile;
pub mod template;

use invitecheck_core::scenario::DynScenario;

/// 스위트 구성 요소
pub type ScenarioList = Vec<Box<dyn DynScenario>>;

/// 스위트 이름을 붙인 시나리오 이름
fn titled(suite: &str, name: &str) -> String {
    format!("{suite}: {name}")
}
