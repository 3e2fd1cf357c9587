//! Paginator view-model over server-generated page links

use hybridly_tables_types::{PaginatedRecords, PaginatorLink};

/// Label the server uses for elided page ranges
pub const SEPARATOR: &str = "...";

/// One entry of the link list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatorItem {
	pub url: Option<String>,
	pub label: String,
	/// Label is a page number
	pub is_page: bool,
	/// Link to the first page (second entry)
	pub is_first: bool,
	/// "Previous" link (first entry)
	pub is_previous: bool,
	/// "Next" link (last entry)
	pub is_next: bool,
	/// Link to the last page (second to last entry)
	pub is_last: bool,
	/// Page currently displayed
	pub is_current: bool,
	/// Elided range
	pub is_separator: bool,
	/// Has a URL and is not the current page
	pub is_active: bool,
}

/// Navigation state derived from a page of records
///
/// ```
/// use hybridly_tables_client::Paginator;
/// use hybridly_tables_types::{PaginatedRecords, PaginatorLink};
///
/// let link = |label: &str, url: Option<&str>, active: bool| PaginatorLink {
///     url: url.map(str::to_string),
///     label: label.to_string(),
///     active,
/// };
/// let records: PaginatedRecords<u32> = PaginatedRecords {
///     data: vec![1, 2],
///     current_page: 1,
///     last_page: 2,
///     per_page: 2,
///     total: 3,
///     from: Some(1),
///     to: Some(2),
///     path: "/users".into(),
///     first_page_url: "/users?page=1".into(),
///     last_page_url: "/users?page=2".into(),
///     next_page_url: Some("/users?page=2".into()),
///     prev_page_url: None,
///     links: vec![
///         link("« Previous", None, false),
///         link("1", Some("/users?page=1"), true),
///         link("2", Some("/users?page=2"), false),
///         link("Next »", Some("/users?page=2"), false),
///     ],
/// };
///
/// let paginator = Paginator::new(&records);
/// assert_eq!(paginator.pages.len(), 2);
/// assert_eq!(paginator.current.unwrap().label, "1");
/// assert!(!paginator.previous.unwrap().is_active);
/// assert!(paginator.next.unwrap().is_active);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
	/// Every link, in order
	pub items: Vec<PaginatorItem>,
	/// Page numbers and separators
	pub pages: Vec<PaginatorItem>,
	pub current: Option<PaginatorItem>,
	pub previous: Option<PaginatorItem>,
	pub next: Option<PaginatorItem>,
	pub from: Option<usize>,
	pub to: Option<usize>,
	pub total: usize,
}

impl Paginator {
	pub fn new<R>(records: &PaginatedRecords<R>) -> Self {
		let count = records.links.len();
		let items: Vec<PaginatorItem> = records
			.links
			.iter()
			.enumerate()
			.map(|(index, link)| item(index, count, link))
			.collect();

		let pages = items
			.iter()
			.filter(|item| item.is_page || item.is_separator)
			.cloned()
			.collect();
		let current = items.iter().find(|item| item.is_current).cloned();
		let previous = items.iter().find(|item| item.is_previous).cloned();
		let next = items.iter().find(|item| item.is_next).cloned();

		Self {
			items,
			pages,
			current,
			previous,
			next,
			from: records.from,
			to: records.to,
			total: records.total,
		}
	}
}

fn item(index: usize, count: usize, link: &PaginatorLink) -> PaginatorItem {
	PaginatorItem {
		url: link.url.clone(),
		label: link.label.clone(),
		is_page: link.label.parse::<usize>().is_ok(),
		is_first: index == 1,
		is_previous: index == 0,
		is_next: index + 1 == count,
		is_last: index + 2 == count,
		is_current: link.active,
		is_separator: link.label == SEPARATOR,
		is_active: link.url.is_some() && !link.active,
	}
}
