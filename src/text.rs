use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {

    /// Romanian diacritics and the plain letters they are replaced with.
    ///
    /// Both the comma-below (`ș`, `ț`) and the legacy cedilla (`ş`, `ţ`) forms
    /// are covered, since pages mix them freely.
    pub static ref DIACRITICS_RULES: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"[\x{0219}\x{015F}]").unwrap(), "s"),
        (Regex::new(r"[\x{0218}\x{015E}]").unwrap(), "S"),
        (Regex::new(r"[\x{021B}\x{0163}]").unwrap(), "t"),
        (Regex::new(r"[\x{021A}\x{0162}]").unwrap(), "T"),
        (Regex::new(r"[\x{0103}\x{00E2}]").unwrap(), "a"),
        (Regex::new(r"[\x{0102}\x{00C2}]").unwrap(), "A"),
        (Regex::new(r"[\x{00EE}]").unwrap(), "i"),
        (Regex::new(r"[\x{00CE}]").unwrap(), "I"),
    ];
}

/// Replace all diacritics in `text` with their plain counterparts.
///
/// The rules in [`DIACRITICS_RULES`] are applied in order, each over the
/// output of the previous one. Case and whitespace are left untouched.
///
/// # Example
///
/// ```rust
///  use avizier::text::strip_diacritics;
///  assert_eq!(strip_diacritics("Hotărâre a Guvernului"), "Hotarare a Guvernului");
/// ```
pub fn strip_diacritics(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in DIACRITICS_RULES.iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comma_and_cedilla_forms() {
        assert_eq!(strip_diacritics("ș ş Ș Ş ț ţ Ț Ţ"), "s s S S t t T T");
        assert_eq!(strip_diacritics("ă â Ă Â î Î"), "a a A A i I");
    }

    #[test]
    fn keeps_case_and_whitespace() {
        assert_eq!(
            strip_diacritics("  Ordonanță de URGENȚĂ\n"),
            "  Ordonanta de URGENTA\n"
        );
    }

    #[test]
    fn empty_and_plain_text() {
        assert_eq!(strip_diacritics(""), "");
        assert_eq!(strip_diacritics("ordinul nr. 12"), "ordinul nr. 12");
    }

    #[test]
    fn idempotent() {
        for s in &[
            "Proiect de hotărâre a Guvernului",
            "ÎNȘTIINȚARE",
            "Comunicat de presă",
            "",
            "ﬁ ß é ü",
        ] {
            let once = strip_diacritics(s);
            assert_eq!(strip_diacritics(&once), once);
        }
    }

    #[test]
    fn other_accents_untouched() {
        assert_eq!(strip_diacritics("é ü ö"), "é ü ö");
    }
}
