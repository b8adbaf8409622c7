//! 스위트 카탈로그 -- 이름으로 시나리오 레지스트리를 구성

use invitecheck_core::error::RegistryError;
use invitecheck_core::scenario::ScenarioRegistry;
use tracing::debug;

use crate::suites::{self, ScenarioList};

/// 모든 스위트를 뜻하는 이름
pub const ALL: &str = "all";

/// 스위트 이름 (기본 실행 순서)
pub const SUITES: [&str; 5] = [
    suites::profile::NAME,
    suites::design::NAME,
    suites::template::NAME,
    suites::invitation::NAME,
    suites::audit::NAME,
];

/// 스위트 하나의 시나리오
pub fn suite(name: &str) -> Result<ScenarioList, RegistryError> {
    let list = match name {
        suites::profile::NAME => suites::profile::scenarios(),
        suites::design::NAME => suites::design::scenarios(),
        suites::template::NAME => suites::template::scenarios(),
        suites::invitation::NAME => suites::invitation::scenarios(),
        suites::audit::NAME => suites::audit::scenarios(),
        other => {
            return Err(RegistryError::UnknownSuite {
                name: other.to_owned(),
            });
        }
    };
    Ok(list)
}

/// 요청된 이름을 실행할 스위트 목록으로 펼칩니다.
///
/// `all`은 모든 스위트가 되고, 중복은 처음 나온 위치만 남깁니다.
pub fn expand<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static str>, RegistryError> {
    let mut selected: Vec<&'static str> = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        let matched: Vec<&'static str> = if name == ALL {
            SUITES.to_vec()
        } else {
            let known = SUITES
                .iter()
                .find(|s| **s == name)
                .ok_or_else(|| RegistryError::UnknownSuite {
                    name: name.to_owned(),
                })?;
            vec![*known]
        };
        for suite in matched {
            if !selected.contains(&suite) {
                selected.push(suite);
            }
        }
    }
    Ok(selected)
}

/// 스위트 이름들로 레지스트리를 만듭니다.
pub fn build<S: AsRef<str>>(names: &[S]) -> Result<ScenarioRegistry, RegistryError> {
    let mut registry = ScenarioRegistry::new();
    for name in expand(names)? {
        let list = suite(name)?;
        debug!(suite = name, scenarios = list.len(), "suite registered");
        registry.extend(list)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_expands_to_every_suite_in_order() {
        assert_eq!(expand(&["all"]).unwrap(), SUITES.to_vec());
    }

    #[test]
    fn duplicates_are_dropped() {
        let selected = expand(&["templates", "all", "templates"]).unwrap();
        assert_eq!(selected.len(), SUITES.len());
        assert_eq!(selected[0], "templates");
    }

    #[test]
    fn unknown_suite_is_rejected() {
        let err = expand(&["profile-save", "payments"]).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSuite { name } if name == "payments"));
        assert!(suite("payments").is_err());
    }

    #[test]
    fn full_catalogue_has_unique_names() {
        let registry = build(&[ALL]).unwrap();
        let expected: usize = SUITES.iter().map(|s| suite(s).unwrap().len()).sum();
        assert_eq!(registry.len(), expected);
    }

    #[test]
    fn every_suite_is_non_empty() {
        for name in SUITES {
            assert!(!suite(name).unwrap().is_empty(), "{name}");
        }
    }
}
