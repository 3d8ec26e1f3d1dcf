use deunicode::deunicode;
use std::fmt::Display;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical comparison key for a modality or contract value.
///
/// Takes the string form of `value`, strips diacritics (NFKD plus removal of
/// combining marks), transliterates what is left to ASCII and uppercases the
/// result. Both the workbook side and the contract side go through this
/// function so that `"Électrique"`, `"electrique"` and `"ELECTRIQUE"` all land
/// on the same key. Non-Latin scripts are romanized (`"Москва"` becomes
/// `"MOSKVA"`), so the output is always ASCII.
pub fn normalize_key<T: Display + ?Sized>(value: &T) -> String {
    let stripped: String = value
        .to_string()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    deunicode(&stripped).to_uppercase()
}
