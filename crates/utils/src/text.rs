use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// Turns a title into a URL slug: lowercase ASCII words joined by `-`.
///
/// Common Latin accents are folded first so "Implantología" becomes
/// "implantologia" rather than losing the letter.
pub fn slugify(input: &str) -> String {
    let folded: String = input
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .collect();
    NON_SLUG_CHARS
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// Keeps the extension of an uploaded file name but makes the stem safe for
/// use inside an object key.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };
    let stem = match slugify(stem) {
        s if s.is_empty() => "file".to_string(),
        s => s,
    };
    match ext.map(slugify).filter(|e| !e.is_empty()) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Teeth Whitening"), "teeth-whitening");
        assert_eq!(slugify("  Root canal -- (Endodontics)! "), "root-canal-endodontics");
        assert_eq!(slugify("Implantología"), "implantologia");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Dr. Smith Portrait.JPG"), "dr-smith-portrait.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name(".env"), "env");
        assert_eq!(sanitize_file_name("???.png"), "file.png");
    }
}
