/// Derive a URL slug from a title or category name.
///
/// Lowercases ASCII, keeps alphanumerics, and collapses every other run of
/// characters into a single hyphen. Matches the slugs stored alongside
/// articles and categories (unique-indexed at the storage layer).
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_hyphen = true;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Healthy Eating 101"), "healthy-eating-101");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("Sleep, Stress & You!"), "sleep-stress-you");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  Mental Health  "), "mental-health");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn drops_non_ascii() {
        assert_eq!(slugify("Café guide"), "caf-guide");
    }
}
