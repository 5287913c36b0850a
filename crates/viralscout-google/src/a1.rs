//! A1 notation helpers.

/// Column letters for a 0-based column index: `0 → A`, `25 → Z`, `26 → AA`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        // rem < 26
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Quote a worksheet title for use in a range. Embedded single quotes are
/// doubled.
#[must_use]
pub fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// `'Title'!A1`-style range.
#[must_use]
pub fn range(title: &str, a1: &str) -> String {
    format!("{}!{a1}", quote_sheet(title))
}

/// Single-cell range for a 1-based row and a 0-based column.
#[must_use]
pub fn cell(title: &str, row: usize, col: usize) -> String {
    range(title, &format!("{}{row}", column_letter(col)))
}
