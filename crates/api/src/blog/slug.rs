use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// Turn a title into a URL slug.
///
/// Non-ASCII characters are dropped, as is anything that is not a word
/// character, whitespace or hyphen. Runs of whitespace and hyphens collapse to
/// a single hyphen; leading and trailing hyphens and underscores are trimmed.
///
/// ```
/// use microapi_api::blog::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// ```
pub fn slugify(value: &str) -> String {
    let ascii: String = value.chars().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let cleaned = DISALLOWED_RE.replace_all(&lowered, "");
    let joined = SEPARATOR_RE.replace_all(&cleaned, "-");
    joined.trim_matches(|c: char| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_is_dropped() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("Life Update"), "life-update");
    }

    #[test]
    fn separators_collapse() {
        assert_eq!(slugify("  Cat -- Pictures\t2 "), "cat-pictures-2");
    }

    #[test]
    fn edges_are_trimmed() {
        assert_eq!(slugify("_-draft-_"), "draft");
    }

    #[test]
    fn non_ascii_is_removed() {
        assert_eq!(slugify("Crème brûlée"), "crme-brle");
    }

    #[test]
    fn empty_title_gives_empty_slug() {
        assert_eq!(slugify("!!!"), "");
    }
}
