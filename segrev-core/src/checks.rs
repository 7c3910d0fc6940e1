//! Engine-side integrity checks: inline tags and leading/trailing whitespace.
//!
//! Both checks compare source against target and skip segments with an empty target.

/// Inline markup tokens in order of appearance: `<...>` elements and `{n}` placeholders.
fn extract_tags(text: &str) -> Vec<&str> {
    let mut tags = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => match text[i..].find('>') {
                Some(len) => {
                    tags.push(&text[i..=i + len]);
                    i += len + 1;
                    continue;
                }
                None => break,
            },
            b'{' => {
                let start = i + 1;
                let mut j = start;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                if j > start && j < bytes.len() && bytes[j] == b'}' {
                    tags.push(&text[i..=j]);
                    i = j + 1;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    tags
}

/// Classifies a tag defect, or `None` when source and target carry the same tags in the
/// same order.
pub fn tag_error(source: &str, target: &str) -> Option<&'static str> {
    if target.is_empty() {
        return None;
    }
    let source_tags = extract_tags(source);
    let target_tags = extract_tags(target);
    if source_tags == target_tags {
        return None;
    }
    let mut s = source_tags.clone();
    let mut t = target_tags.clone();
    s.sort_unstable();
    t.sort_unstable();
    if s == t {
        return Some("Tags out of order");
    }
    Some(match target_tags.len().cmp(&source_tags.len()) {
        std::cmp::Ordering::Less => "Missing tags",
        std::cmp::Ordering::Greater => "Extra tags",
        std::cmp::Ordering::Equal => "Tag mismatch",
    })
}

fn leading_ws(text: &str) -> &str {
    &text[..text.len() - text.trim_start().len()]
}

fn trailing_ws(text: &str) -> &str {
    &text[text.trim_end().len()..]
}

/// Classifies a whitespace defect, or `None` when the leading and trailing whitespace runs
/// of the target equal those of the source. A target with no text at all has nothing to
/// re-wrap and is not reported.
pub fn space_error(source: &str, target: &str) -> Option<&'static str> {
    if target.trim().is_empty() {
        return None;
    }
    let initial = leading_ws(source) != leading_ws(target);
    let trailing = trailing_ws(source) != trailing_ws(target);
    match (initial, trailing) {
        (false, false) => None,
        (true, false) => Some("Initial space"),
        (false, true) => Some("Trailing space"),
        (true, true) => Some("Initial and trailing space"),
    }
}

/// Rewrites `target` so its leading and trailing whitespace match `source`.
///
/// A target that is all whitespace is left alone; there is no body to re-wrap.
pub fn fix_spaces(source: &str, target: &str) -> String {
    let body = target.trim();
    if body.is_empty() {
        return target.to_owned();
    }
    format!("{}{}{}", leading_ws(source), body, trailing_ws(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_tags_pass() {
        assert_eq!(tag_error("<b>Hello</b> {0}", "<b>Hola</b> {0}"), None);
        assert_eq!(tag_error("No tags", "Sin etiquetas"), None);
    }

    #[test]
    fn missing_extra_and_mismatched_tags() {
        assert_eq!(tag_error("<b>Hello</b>", "Hola</b>"), Some("Missing tags"));
        assert_eq!(tag_error("Hello", "<i>Hola</i>"), Some("Extra tags"));
        assert_eq!(tag_error("<b>Hello</b>", "<i>Hola</i>"), Some("Tag mismatch"));
        assert_eq!(tag_error("{0} of {1}", "{1} de {0}"), Some("Tags out of order"));
    }

    #[test]
    fn untranslated_segments_are_skipped() {
        assert_eq!(tag_error("<b>Hello</b>", ""), None);
        assert_eq!(space_error(" Hello", ""), None);
        assert_eq!(space_error("Hello", "   "), None);
    }

    #[test]
    fn braces_without_digits_are_text() {
        assert_eq!(tag_error("{name}", "{nombre}"), None);
    }

    #[test]
    fn whitespace_defects_are_classified() {
        assert_eq!(space_error("Hello ", "Hola "), None);
        assert_eq!(space_error(" Hello", "Hola"), Some("Initial space"));
        assert_eq!(space_error("Hello", "Hola  "), Some("Trailing space"));
        assert_eq!(space_error(" Hello ", "Hola"), Some("Initial and trailing space"));
    }

    #[test]
    fn fix_copies_source_whitespace() {
        assert_eq!(fix_spaces(" Hello\t", "Hola  "), " Hola\t");
        assert_eq!(fix_spaces("Hello", "  Hola"), "Hola");
        assert_eq!(space_error(" Hello\t", &fix_spaces(" Hello\t", "Hola  ")), None);
        assert_eq!(fix_spaces("Hello", "   "), "   ");
    }
}
