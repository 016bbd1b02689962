//! Regular English noun inflection for association names

const SIBILANT_SUFFIXES: [&str; 4] = ["s", "x", "ch", "sh"];

/// `document` -> `documents`, `policy` -> `policies`, `box` -> `boxes`
pub fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y')
        && !stem.is_empty()
        && !stem.ends_with(is_vowel)
    {
        return format!("{stem}ies");
    }

    if SIBILANT_SUFFIXES.iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{word}es");
    }

    format!("{word}s")
}

/// `memberships` -> `membership`, `policies` -> `policy`, `boxes` -> `box`,
/// `statuses` -> `status`
///
/// Regular nouns only. A consonant before `-uses` is read as an `-us`
/// singular (`buses`, `campuses`), so words like `abuses` come out wrong.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies")
        && !stem.is_empty()
    {
        return format!("{stem}y");
    }

    if let Some(stem) = word.strip_suffix("es")
        && (stem.ends_with("ss")
            || SIBILANT_SUFFIXES
                .iter()
                .any(|suffix| *suffix != "s" && stem.ends_with(suffix)))
    {
        return stem.to_string();
    }

    if let Some(stem) = word.strip_suffix("es")
        && let Some(head) = stem.strip_suffix("us")
        && head.ends_with(|c: char| c.is_alphabetic() && !is_vowel(c))
    {
        return stem.to_string();
    }

    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_string(),
        _ => word.to_string(),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
