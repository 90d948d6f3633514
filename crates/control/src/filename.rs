use regex::Regex;
use std::sync::LazyLock;

static FORBIDDEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[<>:"/\\|?*]"#).expect("static pattern")
});

const MAX_LEN: usize = 100;
const STEM_LEN: usize = 90;

/// Makes a title safe to offer as a download filename.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned = FORBIDDEN.replace_all(filename, "").into_owned();
    if cleaned.chars().count() <= MAX_LEN {
        return cleaned;
    }

    match cleaned.rsplit_once('.') {
        Some((stem, ext)) => {
            let stem: String = stem.chars().take(STEM_LEN).collect();
            if ext.is_empty() {
                stem
            } else {
                format!("{stem}.{ext}")
            }
        }
        None => cleaned.chars().take(STEM_LEN).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_forbidden_characters() {
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j.mp4"#), "abcdefghij.mp4");
    }

    #[test]
    fn keeps_short_names() {
        assert_eq!(sanitize_filename("Concierto en vivo.webm"), "Concierto en vivo.webm");
    }

    #[test]
    fn shortens_long_names_keeping_extension() {
        let long = format!("{}.mp4", "x".repeat(150));
        let out = sanitize_filename(&long);
        assert_eq!(out, format!("{}.mp4", "x".repeat(90)));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let name = format!("{}.m4a", "ñ".repeat(95));
        assert_eq!(sanitize_filename(&name), name);
    }
}
