/// Page navigation state for a listing with a known number of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControl {
    current: u32,
    total_pages: u32,
}

impl PageControl {
    /// Build from the raw `page` navigation value.
    ///
    /// A missing or non-numeric page is treated as page 1. The value is not
    /// clamped to `total_pages`; navigation is what enforces the range.
    #[must_use]
    pub fn from_param(raw_page: Option<&str>, total_pages: u32) -> Self {
        let current = raw_page
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(1);
        Self {
            current,
            total_pages,
        }
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.previous().is_some()
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next().is_some()
    }

    /// Target page for a navigation request, or `None` when it falls
    /// outside `1..=total_pages`.
    #[must_use]
    pub fn go_to(&self, page: u32) -> Option<u32> {
        (1..=self.total_pages).contains(&page).then_some(page)
    }

    #[must_use]
    pub fn previous(&self) -> Option<u32> {
        self.current.checked_sub(1).and_then(|page| self.go_to(page))
    }

    #[must_use]
    pub fn next(&self) -> Option<u32> {
        self.current.checked_add(1).and_then(|page| self.go_to(page))
    }

    /// Every selectable page number.
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        1..=self.total_pages
    }
}
