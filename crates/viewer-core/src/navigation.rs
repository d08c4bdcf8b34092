use crate::error::SessionError;

/// Current page of a loaded document.
///
/// The index is 0-based and stays inside `[0, page_count - 1]`; with zero
/// pages every move is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigator {
    current: u32,
    page_count: u32,
}

impl Navigator {
    pub fn new(page_count: u32) -> Self {
        Self { current: 0, page_count }
    }

    pub fn current_index(&self) -> u32 {
        self.current
    }

    /// 1-based number of the current page.
    pub fn current_page_number(&self) -> u32 {
        self.current + 1
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.page_count
    }

    /// Returns whether the page changed.
    pub fn prev(&mut self) -> bool {
        if self.page_count == 0 || self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        if self.page_count == 0 || self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Jumps to a 1-based page number.
    pub fn go_to(&mut self, page_number: i64) -> Result<(), SessionError> {
        if page_number < 1 || page_number > i64::from(self.page_count) {
            return Err(SessionError::PageOutOfRange {
                requested: page_number,
                page_count: self.page_count,
            });
        }
        self.current = (page_number - 1) as u32;
        Ok(())
    }

    /// Jumps to the page typed into the go-to entry.
    pub fn go_to_entry(&mut self, entry: &str) -> Result<(), SessionError> {
        let page_number = parse_page_entry(entry)?;
        self.go_to(page_number)
    }
}

pub fn parse_page_entry(entry: &str) -> Result<i64, SessionError> {
    let trimmed = entry.trim();
    trimmed.parse::<i64>().map_err(|_| SessionError::InvalidPageEntry(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_and_prev_visit_every_page_once() {
        let mut nav = Navigator::new(4);
        let mut visited = vec![nav.current_index()];
        while nav.next() {
            visited.push(nav.current_index());
        }
        assert_eq!(visited, vec![0, 1, 2, 3]);
        assert!(!nav.next());
        assert_eq!(nav.current_index(), 3);

        let mut back = 0;
        while nav.prev() {
            back += 1;
        }
        assert_eq!(back, 3);
        assert_eq!(nav.current_index(), 0);
        assert!(!nav.prev());
    }

    #[test]
    fn empty_navigator_never_moves() {
        let mut nav = Navigator::default();
        assert!(!nav.next());
        assert!(!nav.prev());
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn go_to_accepts_inclusive_bounds() {
        let mut nav = Navigator::new(10);
        nav.go_to(10).expect("last page is valid");
        assert_eq!(nav.current_index(), 9);
        nav.go_to(1).expect("first page is valid");
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn go_to_out_of_range_keeps_page() {
        let mut nav = Navigator::new(10);
        nav.go_to(4).expect("page 4 is valid");

        for bad in [0, -3, 11, 500] {
            let err = nav.go_to(bad).expect_err("out of range");
            assert!(matches!(
                err,
                SessionError::PageOutOfRange { requested, page_count: 10 } if requested == bad
            ));
            assert!(err.to_string().contains("between 1 and 10"));
            assert_eq!(nav.current_index(), 3);
        }
    }

    #[test]
    fn go_to_entry_rejects_non_numbers() {
        let mut nav = Navigator::new(5);
        nav.go_to(2).expect("page 2 is valid");

        let err = nav.go_to_entry("three").expect_err("not a number");
        assert!(matches!(err, SessionError::InvalidPageEntry(ref entry) if entry == "three"));
        assert_eq!(nav.current_index(), 1);

        nav.go_to_entry("  5 ").expect("whitespace is trimmed");
        assert_eq!(nav.current_page_number(), 5);
    }
}
