pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: u32,
    page_count: u32,
}

impl<'a, T> Paginator<'a, T> {
    pub fn from(items: &'a [T], page_size: u32) -> Self {
        let page_size = page_size.max(1);
        if items.is_empty() {
            return Paginator {
                items,
                page_size,
                page_count: 0,
            };
        }
        let item_count = items.len() as u32;
        let upper_bound = item_count - 1;
        let page_count = (upper_bound / page_size) + 1;

        Paginator {
            items,
            page_size,
            page_count,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn get_page(&self, page: u32) -> Result<&'a [T], String> {
        match page {
            0 => return Err("Page has to be greater than 0".to_string()),
            x if x > self.page_count => return Err(format!("Page has to be less than page_count ({})", self.page_count)),
            _ => {}
        };

        let start = ((page - 1) * self.page_size) as usize;
        let end = (start + self.page_size as usize).min(self.items.len());
        Ok(&self.items[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_case() {
        let items = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];
        let paginator = Paginator::from(&items, 3);
        assert_eq!(paginator.page_count(), 5);
        assert_eq!(paginator.get_page(1), Ok([1, 2, 3].as_slice()));
        assert_eq!(paginator.get_page(2), Ok([4, 5, 6].as_slice()));
        assert_eq!(paginator.get_page(5), Ok([13].as_slice()));

        assert_eq!(paginator.get_page(0), Err("Page has to be greater than 0".to_string()));
        assert_eq!(paginator.get_page(6), Err("Page has to be less than page_count (5)".to_string()));
    }

    #[test]
    fn test_empty() {
        let items: Vec<u32> = vec![];
        let paginator = Paginator::from(&items, 3);
        assert_eq!(paginator.page_count(), 0);
        assert_eq!(paginator.get_page(1), Err("Page has to be less than page_count (0)".to_string()));
    }

    #[test]
    fn test_zero_page_size() {
        let items = vec![1, 2];
        let paginator = Paginator::from(&items, 0);
        assert_eq!(paginator.page_count(), 2);
        assert_eq!(paginator.get_page(2), Ok([2].as_slice()));
    }
}
