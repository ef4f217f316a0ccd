//! Filename sanitization.
//!
//! Turns an arbitrary client-supplied filename into a storage-safe,
//! URL-safe, unique key:
//!
//! 1. percent-decode once (`+` is a space)
//! 2. collapse runs of `+ / % # ?` into `_`
//! 3. transliterate to lowercase ASCII
//! 4. collapse whitespace runs into `-`
//! 5. drop anything outside `[a-z0-9._-]`
//! 6. prefix with a unique token: `{token}-{name}`

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use uuid::Uuid;

use super::error::UploadError;

/// Characters collapsed into a single underscore.
const RESERVED: &[char] = &['+', '/', '%', '#', '?'];

/// Russian alphabet, upper and lower case.
const CYRILLIC: [(char, &str); 66] = [
    ('А', "A"), ('Б', "B"), ('В', "V"), ('Г', "G"), ('Д', "D"), ('Е', "E"),
    ('Ё', "E"), ('Ж', "Zh"), ('З', "Z"), ('И', "I"), ('Й', "Y"), ('К', "K"),
    ('Л', "L"), ('М', "M"), ('Н', "N"), ('О', "O"), ('П', "P"), ('Р', "R"),
    ('С', "S"), ('Т', "T"), ('У', "U"), ('Ф', "F"), ('Х', "H"), ('Ц', "Ts"),
    ('Ч', "Ch"), ('Ш', "Sh"), ('Щ', "Sch"), ('Ъ', ""), ('Ы', "Y"), ('Ь', ""),
    ('Э', "E"), ('Ю', "Yu"), ('Я', "Ya"),
    ('а', "a"), ('б', "b"), ('в', "v"), ('г', "g"), ('д', "d"), ('е', "e"),
    ('ё', "e"), ('ж', "zh"), ('з', "z"), ('и', "i"), ('й', "y"), ('к', "k"),
    ('л', "l"), ('м', "m"), ('н', "n"), ('о', "o"), ('п', "p"), ('р', "r"),
    ('с', "s"), ('т', "t"), ('у', "u"), ('ф', "f"), ('х', "h"), ('ц', "ts"),
    ('ч', "ch"), ('ш', "sh"), ('щ', "sch"), ('ъ', ""), ('ы', "y"), ('ь', ""),
    ('э', "e"), ('ю', "yu"), ('я', "ya"),
];

/// Transliteration ruleset applied to filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransliterationRules {
    /// Any script to Latin, then to ASCII.
    #[default]
    Unicode,
    /// Russian alphabet table only; other non-ASCII characters are removed.
    Cyrillic,
}

impl TransliterationRules {
    /// Ruleset name as written in configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unicode => "unicode",
            Self::Cyrillic => "cyrillic",
        }
    }

    /// Transliterate `input` to lowercase ASCII.
    #[must_use]
    pub fn transliterate(&self, input: &str) -> String {
        let latin = match self {
            Self::Unicode => deunicode::deunicode_with_tofu(input, ""),
            Self::Cyrillic => input.chars().fold(String::new(), |mut out, c| {
                match CYRILLIC.iter().find(|(cyr, _)| *cyr == c) {
                    Some((_, latin)) => out.push_str(latin),
                    None => out.push(c),
                }
                out
            }),
        };
        latin
            .chars()
            .filter(char::is_ascii)
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }
}

impl FromStr for TransliterationRules {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unicode" | "any-latin" => Ok(Self::Unicode),
            "cyrillic" => Ok(Self::Cyrillic),
            _ => Err(UploadError::transliteration_unavailable(s)),
        }
    }
}

impl fmt::Display for TransliterationRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates unique, sanitized storage names from original filenames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameSanitizer {
    rules: TransliterationRules,
}

impl FilenameSanitizer {
    /// Sanitizer using the named ruleset.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::TransliterationUnavailable`] for an unknown ruleset.
    pub fn new(rules: &str) -> Result<Self, UploadError> {
        Ok(Self::with_rules(rules.parse()?))
    }

    /// Sanitizer using an already-resolved ruleset.
    #[must_use]
    pub fn with_rules(rules: TransliterationRules) -> Self {
        Self { rules }
    }

    /// Active ruleset.
    #[must_use]
    pub fn rules(&self) -> TransliterationRules {
        self.rules
    }

    /// `{unique_token}-{sanitized_name}`.
    #[must_use]
    pub fn generate_name(&self, original_name: &str) -> String {
        format!("{}-{}", unique_token(), self.clear_name(original_name))
    }

    /// Sanitize `original_name` without the unique prefix.
    #[must_use]
    pub fn clear_name(&self, original_name: &str) -> String {
        let decoded = url_decode(original_name);
        let reserved_replaced = collapse_runs(&decoded, |c| RESERVED.contains(&c), '_');
        let ascii = self.rules.transliterate(&reserved_replaced);
        let hyphenated = collapse_runs(&ascii, char::is_whitespace, '-');

        hyphenated
            .chars()
            .filter(|&c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
            .collect()
    }
}

/// Time-ordered token, monotonic within the process.
fn unique_token() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Single decoding pass; invalid escapes stay as they are.
fn url_decode(input: &str) -> Cow<'_, str> {
    if !input.contains(['%', '+']) {
        return Cow::Borrowed(input);
    }
    let spaced = input.replace('+', " ");
    Cow::Owned(percent_decode_str(&spaced).decode_utf8_lossy().into_owned())
}

/// Replace every maximal run of characters matching `pred` with `replacement`.
fn collapse_runs(input: &str, pred: impl Fn(char) -> bool, replacement: char) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;
    for c in input.chars() {
        if pred(c) {
            if !in_run {
                out.push(replacement);
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}
