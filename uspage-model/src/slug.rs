//! Slug derivation.
//!
//! Slugs are the URL-safe identifiers of public landing and invitation
//! pages. They are scoped per owning user, so uniqueness is enforced over
//! `(user_id, slug)` rather than globally.

/// Maximum slug length accepted on input and produced by derivation.
pub const MAX_SLUG_LEN: usize = 50;

/// Derive a slug from a human-readable title or name.
///
/// Lowercases, transliterates common accented Latin characters to ASCII,
/// and collapses every other run of non-alphanumerics into a single
/// hyphen. Characters with no ASCII equivalent (¿, ¡, emoji, ...) are
/// dropped.
///
/// `slugify("¿Quieres ser mi San Valentín?")` yields
/// `"quieres-ser-mi-san-valentin"`.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        let mapped = transliterate(c);
        match mapped {
            Some(c) if c.is_ascii_alphanumeric() => {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c.to_ascii_lowercase());
            }
            Some(_) => pending_hyphen = true,
            // No ASCII equivalent: drop without forcing a separator.
            None => {}
        }
        if out.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    out.truncate(MAX_SLUG_LEN);
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Whether `slug` is acceptable as a user-supplied slug.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn transliterate(c: char) -> Option<char> {
    if c.is_ascii() {
        return Some(c);
    }
    let mapped = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ñ' | 'Ñ' => 'n',
        'ç' | 'Ç' => 'c',
        _ => return None,
    };
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugifies_default_invitation_title() {
        assert_eq!(
            slugify("¿Quieres ser mi San Valentín?"),
            "quieres-ser-mi-san-valentin"
        );
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(slugify("Ana  &  Luis"), "ana-luis");
        assert_eq!(slugify("--hello--world--"), "hello-world");
    }

    #[test]
    fn drops_characters_without_ascii_equivalent() {
        assert_eq!(slugify("¡Sorpresa!"), "sorpresa");
        assert_eq!(slugify("corazón ❤"), "corazon");
    }

    #[test]
    fn truncates_to_max_len() {
        let long = "a".repeat(80);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn validates_user_supplied_slugs() {
        assert!(is_valid_slug("ana-y-luis-2024"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Ana-Y-Luis"));
        assert!(!is_valid_slug("con espacios"));
        assert!(!is_valid_slug(&"x".repeat(51)));
    }
}
