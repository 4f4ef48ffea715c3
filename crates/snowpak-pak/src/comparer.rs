//! Archive member ordering.

use std::cmp::Ordering;

/// Name of the load list inside a pak; it must be the first member.
pub const LOAD_LIST_NAME: &str = "pak.load_list";

/// Orders relative names for packing: the list file first, then all other
/// names with [`compare_ignore_case`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PakableNameComparer<'a> {
    list_file_name: &'a str,
}

impl Default for PakableNameComparer<'static> {
    fn default() -> Self {
        Self::new(LOAD_LIST_NAME)
    }
}

impl<'a> PakableNameComparer<'a> {
    /// Comparer that puts `list_file_name` first.
    pub fn new(list_file_name: &'a str) -> Self {
        Self { list_file_name }
    }

    /// Whether `name` is the list file.
    pub fn is_list_file(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(self.list_file_name)
    }

    /// Compare two relative names.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.is_list_file(a), self.is_list_file(b)) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => compare_ignore_case(a, b),
        }
    }
}

/// Ordinal comparison of upper-cased UTF-16 code units, the order the
/// game's own tools sort member names in.
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    let a = a.encode_utf16().map(upper_unit);
    let b = b.encode_utf16().map(upper_unit);
    a.cmp(b)
}

/// Simple upper-case mapping of one code unit. Surrogates and characters
/// without a single BMP upper-case form are kept as they are.
fn upper_unit(unit: u16) -> u16 {
    if unit < 0x80 {
        return (unit as u8).to_ascii_uppercase() as u16;
    }
    let Some(c) = char::from_u32(unit as u32) else {
        return unit;
    };
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u16::try_from(u as u32).unwrap_or(unit),
        _ => unit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_file_sorts_first() {
        let comparer = PakableNameComparer::default();
        let mut names = vec!["[a]\\x", "PAK.LOAD_LIST", "a.txt"];
        names.sort_by(|a, b| comparer.compare(a, b));
        assert_eq!(names, vec!["PAK.LOAD_LIST", "a.txt", "[a]\\x"]);
        assert_eq!(
            comparer.compare("pak.load_list", "Pak.Load_List"),
            Ordering::Equal
        );
    }

    #[test]
    fn test_case_folds_to_upper() {
        // '_' (0x5F) sits between upper and lower case letters.
        assert_eq!(compare_ignore_case("a_b", "aab"), Ordering::Greater);
        assert_eq!(compare_ignore_case("ABC", "abc"), Ordering::Equal);
        assert_eq!(compare_ignore_case("ab", "abc"), Ordering::Less);
    }

    #[test]
    fn test_non_ascii_names() {
        assert_eq!(compare_ignore_case("é.txt", "É.TXT"), Ordering::Equal);
        assert_eq!(compare_ignore_case("ÿ", "Ÿ"), Ordering::Equal);
        // No single-character upper case; kept as is.
        assert_eq!(compare_ignore_case("ß", "SS"), Ordering::Greater);
        // Surrogate pairs sort by code unit, below the rest of the BMP top.
        assert_eq!(compare_ignore_case("𝄞", "Ａ"), Ordering::Less);
    }
}
