//! Class-name conventions of the cascading filesystem.
//!
//! Underscores in a class name map to directory separators:
//! `Model_Blog_Post` lives at `Model/Blog/Post.php`.

use std::path::PathBuf;

/// Extension of generated source files.
pub const EXT: &str = "php";

/// Relative file path for a class name.
///
/// ## Examples
///
/// | Input | Output |
/// |-------|--------|
/// | `Foo` | `Foo.php` |
/// | `Model_Blog_Post` | `Model/Blog/Post.php` |
pub fn class_to_path(name: &str) -> PathBuf {
    let mut path: PathBuf = name.split('_').filter(|s| !s.is_empty()).collect();
    path.set_extension(EXT);
    path
}

/// Capitalize each underscore-separated segment.
///
/// Separators other than `_` (`-`, whitespace) are normalized to `_`, so
/// `blog post` and `blog-post` both become `Blog_Post`. Letters after the
/// first of a segment keep their case (`HTTPClient` stays as written).
pub fn to_class_name(input: &str) -> String {
    input
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::new();
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                    out
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Prefix a class name with `prefix_` unless it already carries it.
pub fn with_prefix(prefix: &str, name: &str) -> String {
    let marker = format!("{prefix}_");
    let prefixed = name
        .get(..marker.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(&marker));
    if prefixed && name.len() > marker.len() {
        name.to_string()
    } else {
        format!("{marker}{name}")
    }
}

/// Drop a `prefix_` from a class name when present.
pub fn without_prefix<'a>(prefix: &str, name: &'a str) -> &'a str {
    let marker_len = prefix.len() + 1;
    let prefixed = name
        .get(..marker_len)
        .is_some_and(|head| head.eq_ignore_ascii_case(&format!("{prefix}_")));
    match name.get(marker_len..) {
        Some(rest) if prefixed && !rest.is_empty() => rest,
        _ => name,
    }
}

/// Split a comma-separated option value, trimming entries and dropping
/// empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn class_names_map_to_paths() {
        assert_eq!(class_to_path("Foo"), Path::new("Foo.php"));
        assert_eq!(
            class_to_path("Model_Blog_Post"),
            Path::new("Model/Blog/Post.php")
        );
    }

    #[test]
    fn class_name_casing() {
        assert_eq!(to_class_name("blog post"), "Blog_Post");
        assert_eq!(to_class_name("model_user"), "Model_User");
        assert_eq!(to_class_name("HTTPClient"), "HTTPClient");
        assert_eq!(to_class_name("--"), "");
    }

    #[test]
    fn prefixes() {
        assert_eq!(with_prefix("Controller", "Welcome"), "Controller_Welcome");
        assert_eq!(
            with_prefix("Controller", "controller_Welcome"),
            "controller_Welcome"
        );
        assert_eq!(without_prefix("Controller", "Controller_Welcome"), "Welcome");
        assert_eq!(without_prefix("Controller", "Welcome"), "Welcome");
    }

    #[test]
    fn lists_are_trimmed() {
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
