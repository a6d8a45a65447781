//! Output locations for per-company artifacts.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static RESERVED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("valid filename regex"));

/// Replace characters that are not allowed in file names with `_`.
pub fn sanitize_filename(name: &str) -> String {
    RESERVED.replace_all(name.trim(), "_").into_owned()
}

/// Directory holding every artifact for `company` under `root`.
pub fn company_dir(root: &Path, company: &str) -> PathBuf {
    root.join(sanitize_filename(company))
}

/// First path that does not exist yet: `path`, then `stem_2.ext`,
/// `stem_3.ext`, and so on.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()));
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    (2..)
        .map(|n| parent.join(format!("{stem}_{n}{}", extension.as_deref().unwrap_or(""))))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;

    #[rstest]
    #[case("삼성전자", "삼성전자")]
    #[case("A/B:C", "A_B_C")]
    #[case(" 회사*?\"<>| ", "회사______")]
    #[case(r"a\b", "a_b")]
    fn test_sanitize_filename(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(input), expected);
    }

    #[test]
    fn test_company_dir() {
        let dir = company_dir(Path::new("out"), "LG/화학");
        assert_eq!(dir, Path::new("out").join("LG_화학"));
    }

    #[test]
    fn test_unique_path_numbers_collisions() {
        let dir = std::env::temp_dir().join("dartlens_unique_path_test");
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(&dir).unwrap();

        let base = dir.join("report.txt");
        assert_eq!(unique_path(&base), base);

        fs::write(&base, "a").unwrap();
        assert_eq!(unique_path(&base), dir.join("report_2.txt"));

        fs::write(dir.join("report_2.txt"), "b").unwrap();
        assert_eq!(unique_path(&base), dir.join("report_3.txt"));

        fs::remove_dir_all(&dir).ok();
    }
}
