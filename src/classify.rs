//! Character classes used by the grammar.
//!
//! ASCII membership is answered from tables built at compile time; letters are
//! whatever `char::is_alphabetic` accepts.

const WHITESPACE: &[u8] = b" \r\t\n,";
const SEPARATORS: &[u8] = b"()[]{} \r\t\n\\;'@^~`,\"%";
const SYMBOL_PUNCTUATION: &[u8] = b".*!?$%&=+_-";
const INNER_EXTRA: &[u8] = b"0123456789#:";

const fn table(members: &[&[u8]]) -> [bool; 128] {
    let mut table = [false; 128];
    let mut i = 0;
    while i < members.len() {
        let mut j = 0;
        while j < members[i].len() {
            table[members[i][j] as usize] = true;
            j += 1;
        }
        i += 1;
    }
    table
}

static WHITESPACE_TABLE: [bool; 128] = table(&[WHITESPACE]);
static SEPARATOR_TABLE: [bool; 128] = table(&[SEPARATORS]);
static FIRST_TABLE: [bool; 128] = table(&[SYMBOL_PUNCTUATION]);
static INNER_TABLE: [bool; 128] = table(&[SYMBOL_PUNCTUATION, INNER_EXTRA]);

fn lookup(table: &[bool; 128], c: char) -> bool {
    c.is_ascii() && table[c as usize]
}

pub fn is_whitespace(c: char) -> bool {
    lookup(&WHITESPACE_TABLE, c)
}

/// Characters that end a `nil`, boolean or character literal. Only ever peeked at.
pub fn is_separator(c: char) -> bool {
    lookup(&SEPARATOR_TABLE, c)
}

pub fn is_first_symbol_char(c: char) -> bool {
    c.is_alphabetic() || lookup(&FIRST_TABLE, c)
}

/// The alphabet allowed right after a leading `+`, `-` or `.`, so that a symbol never
/// starts like a number.
pub fn is_non_numeric_symbol_char(c: char) -> bool {
    is_first_symbol_char(c)
}

pub fn is_inner_symbol_char(c: char) -> bool {
    c.is_alphabetic() || lookup(&INNER_TABLE, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_whitespace() {
        for c in [' ', '\r', '\t', '\n', ','].iter() {
            assert!(is_whitespace(*c), "{:?}", c);
        }
        assert!(!is_whitespace('a'));
        assert!(!is_whitespace('\u{a0}'));
    }

    #[test]
    fn test_separators() {
        for c in "()[]{} \r\t\n\\;'@^~`,\"%".chars() {
            assert!(is_separator(c), "{:?}", c);
        }
        assert!(!is_separator('a'));
        assert!(!is_separator('#'));
        assert!(!is_separator(':'));
    }

    #[test]
    fn test_symbol_alphabets() {
        assert!(is_first_symbol_char('a'));
        assert!(is_first_symbol_char('λ'));
        assert!(is_first_symbol_char('-'));
        assert!(!is_first_symbol_char('1'));
        assert!(!is_first_symbol_char('#'));
        assert!(!is_first_symbol_char(':'));
        assert!(!is_first_symbol_char('/'));

        assert!(!is_non_numeric_symbol_char('7'));
        assert!(is_non_numeric_symbol_char('x'));

        assert!(is_inner_symbol_char('7'));
        assert!(is_inner_symbol_char('#'));
        assert!(is_inner_symbol_char(':'));
        assert!(!is_inner_symbol_char('/'));
        assert!(!is_inner_symbol_char(' '));
    }

    proptest! {
        #[test]
        fn test_first_is_subset_of_inner(c in any::<char>()) {
            if is_first_symbol_char(c) {
                prop_assert!(is_inner_symbol_char(c));
            }
        }

        #[test]
        fn test_whitespace_is_separator(c in any::<char>()) {
            if is_whitespace(c) {
                prop_assert!(is_separator(c));
            }
        }
    }
}
