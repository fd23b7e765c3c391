//! The university list: the batch driver's input.

use std::path::Path;

use serde::{Deserialize, Serialize};

use bulletin_types::ConfigError;

/// One crawl target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
    pub name: String,
    pub url: String,
}

/// The list file is either a bare array or wrapped in a `universities` key,
/// matching both generations of the config format.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UniversityFile {
    Bare(Vec<University>),
    Wrapped { universities: Vec<University> },
}

/// Load the crawl targets. An unreadable or malformed list is a startup
/// failure.
pub fn load_universities(path: &Path) -> Result<Vec<University>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let parsed: UniversityFile =
        serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid {
            reason: format!("{}: {e}", path.display()),
        })?;
    let universities = match parsed {
        UniversityFile::Bare(list) => list,
        UniversityFile::Wrapped { universities } => universities,
    };
    Ok(universities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_bare_arrays_and_wrapped_lists() {
        let mut bare = tempfile::NamedTempFile::new().unwrap();
        write!(
            bare,
            r#"[{{"name": "서울대학교", "url": "https://snu.ac.kr/notice"}}]"#
        )
        .unwrap();
        let list = load_universities(bare.path()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "서울대학교");

        let mut wrapped = tempfile::NamedTempFile::new().unwrap();
        write!(
            wrapped,
            r#"{{"universities": [{{"name": "연세대학교", "url": "https://yonsei.ac.kr/notice"}}]}}"#
        )
        .unwrap();
        let list = load_universities(wrapped.path()).unwrap();
        assert_eq!(list[0].url, "https://yonsei.ac.kr/notice");
    }

    #[test]
    fn missing_list_is_a_startup_failure() {
        let err = load_universities(Path::new("/nonexistent/universities.json"));
        assert!(matches!(err, Err(ConfigError::Unreadable { .. })));
    }
}
