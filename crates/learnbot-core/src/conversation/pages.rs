//! Paging of the delete list.

/// Triggers shown per page.
pub const PAGE_SIZE: usize = 7;

/// Characters of trigger text shown on a button.
pub const LABEL_CHARS: usize = 25;

/// One page of trigger texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    /// Zero-based page actually shown.
    pub page: usize,
    pub total_pages: usize,
    pub items: Vec<String>,
}

impl PageView {
    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }
}

/// Cuts `page` out of `texts`. A page past the end shows page 0; an empty
/// list has no pages.
pub fn paginate(texts: &[String], page: usize) -> Option<PageView> {
    if texts.is_empty() {
        return None;
    }

    let total_pages = texts.len().div_ceil(PAGE_SIZE);
    let page = if page < total_pages { page } else { 0 };
    let items = texts
        .iter()
        .skip(page * PAGE_SIZE)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    Some(PageView {
        page,
        total_pages,
        items,
    })
}

/// Button label for a trigger.
pub fn item_label(text: &str) -> String {
    let short: String = text.chars().take(LABEL_CHARS).collect();
    format!("❌ {}", short)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("t{}", i)).collect()
    }

    #[test]
    fn test_fifteen_items() {
        let all = texts(15);

        let p0 = paginate(&all, 0).unwrap();
        assert_eq!(p0.items, texts(7));
        assert!(!p0.has_prev());
        assert!(p0.has_next());
        assert_eq!(p0.total_pages, 3);

        let p1 = paginate(&all, 1).unwrap();
        assert_eq!(p1.items.first().map(String::as_str), Some("t8"));
        assert_eq!(p1.items.last().map(String::as_str), Some("t14"));
        assert!(p1.has_prev() && p1.has_next());

        let p2 = paginate(&all, 2).unwrap();
        assert_eq!(p2.items, vec!["t15".to_string()]);
        assert!(p2.has_prev());
        assert!(!p2.has_next());
    }

    #[test]
    fn test_out_of_range_resets() {
        let view = paginate(&texts(3), 9).unwrap();
        assert_eq!(view.page, 0);
        assert_eq!(view.items.len(), 3);
        assert!(!view.has_next());
    }

    #[test]
    fn test_empty_has_no_pages() {
        assert!(paginate(&[], 0).is_none());
    }

    #[test]
    fn test_exact_page_boundary() {
        let view = paginate(&texts(14), 1).unwrap();
        assert_eq!(view.total_pages, 2);
        assert!(!view.has_next());
    }

    #[test]
    fn test_item_label_truncates_chars() {
        assert_eq!(item_label("hi"), "❌ hi");
        let long = "é".repeat(40);
        assert_eq!(item_label(&long).chars().count(), 2 + LABEL_CHARS);
    }
}
