//! Page splitting for text extracted by PDF tools.
//!
//! `pdftotext` ends every page with a form feed, so a trailing empty
//! segment is not a page.

pub const PAGE_BREAK: char = '\x0c';

pub fn split_pages(text: &str) -> Vec<&str> {
    let mut pages: Vec<&str> = text.split(PAGE_BREAK).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages() {
        assert_eq!(split_pages("a\x0cb\x0c"), vec!["a", "b"]);
        assert_eq!(split_pages("a\x0c\x0cc"), vec!["a", "", "c"]);
        assert_eq!(split_pages("only"), vec!["only"]);
        assert_eq!(split_pages(""), vec![""]);
    }
}
