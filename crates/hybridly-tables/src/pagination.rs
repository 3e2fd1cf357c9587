//! Page-number pagination for table records
//!
//! Page links keep every other query parameter of the current request, so
//! moving between pages preserves the active sorts and filters.

use crate::request::TableRequest;
use hybridly_tables_types::{PaginatedRecords, PaginatorLink};
use url::Url;

/// Label of the link to the previous page
pub const PREVIOUS_LABEL: &str = "« Previous";
/// Label of the link to the next page
pub const NEXT_LABEL: &str = "Next »";
/// Label of elided page ranges
pub const ELLIPSIS: &str = "...";

/// Page-number pagination settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNumberPagination {
	/// Records per page
	pub page_size: usize,
	/// Name of the page query parameter
	pub page_query_param: String,
	/// Page links shown on each side of the current page
	pub on_each_side: usize,
	/// Page links always shown at both ends
	pub on_ends: usize,
}

impl Default for PageNumberPagination {
	fn default() -> Self {
		Self {
			page_size: crate::config::DEFAULT_RECORDS_PER_PAGE,
			page_query_param: hybridly_tables_types::scope::PAGE.to_string(),
			on_each_side: 3,
			on_ends: 2,
		}
	}
}

impl PageNumberPagination {
	/// Creates a paginator with default settings
	///
	/// # Examples
	///
	/// ```
	/// use hybridly_tables::pagination::PageNumberPagination;
	///
	/// let paginator = PageNumberPagination::new();
	/// assert_eq!(paginator.page_size, 15);
	/// assert_eq!(paginator.page_query_param, "page");
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the page size
	pub fn page_size(mut self, size: usize) -> Self {
		self.page_size = size.max(1);
		self
	}

	/// Sets the page parameter name
	pub fn page_query_param(mut self, param: impl Into<String>) -> Self {
		self.page_query_param = param.into();
		self
	}

	/// Page requested by `request`
	///
	/// Absent, zero and unparseable values select the first page.
	pub fn current_page(&self, request: &TableRequest) -> usize {
		request
			.param_str(&self.page_query_param)
			.and_then(|page| page.trim().parse::<usize>().ok())
			.filter(|page| *page > 0)
			.unwrap_or(1)
	}

	/// Number of records skipped before `page`
	pub fn offset(&self, page: usize) -> usize {
		page.saturating_sub(1).saturating_mul(self.page_size)
	}

	/// Number of pages needed for `total` records; at least one
	pub fn last_page(&self, total: usize) -> usize {
		total.div_ceil(self.page_size).max(1)
	}

	/// URL of `page`, preserving the other query parameters of `url`
	pub fn build_url(&self, url: &Url, page: usize) -> String {
		let mut page_url = url.clone();
		page_url.set_fragment(None);

		let others: Vec<(String, String)> = url
			.query_pairs()
			.filter(|(key, _)| key != &self.page_query_param)
			.map(|(key, value)| (key.into_owned(), value.into_owned()))
			.collect();

		page_url
			.query_pairs_mut()
			.clear()
			.extend_pairs(others)
			.append_pair(&self.page_query_param, &page.to_string());

		page_url.to_string()
	}

	/// Assembles one page of records
	///
	/// `data` must already be the slice of records for `page`. Pages past the
	/// end are reported as requested, with no data.
	pub fn paginate<R>(
		&self,
		data: Vec<R>,
		total: usize,
		page: usize,
		url: &Url,
	) -> PaginatedRecords<R> {
		let page = page.max(1);
		let last_page = self.last_page(total);
		let (from, to) = if data.is_empty() {
			(None, None)
		} else {
			let from = self.offset(page) + 1;
			(Some(from), Some(from + data.len() - 1))
		};

		let mut path = url.clone();
		path.set_query(None);
		path.set_fragment(None);

		let prev_page_url = (page > 1).then(|| self.build_url(url, page - 1));
		let next_page_url = (page < last_page).then(|| self.build_url(url, page + 1));

		let mut links = Vec::new();
		links.push(PaginatorLink {
			url: prev_page_url.clone(),
			label: PREVIOUS_LABEL.to_string(),
			active: false,
		});
		for element in elided_page_range(page, last_page, self.on_each_side, self.on_ends) {
			links.push(match element {
				Some(number) => PaginatorLink {
					url: Some(self.build_url(url, number)),
					label: number.to_string(),
					active: number == page,
				},
				None => PaginatorLink {
					url: None,
					label: ELLIPSIS.to_string(),
					active: false,
				},
			});
		}
		links.push(PaginatorLink {
			url: next_page_url.clone(),
			label: NEXT_LABEL.to_string(),
			active: false,
		});

		PaginatedRecords {
			data,
			current_page: page,
			last_page,
			per_page: self.page_size,
			total,
			from,
			to,
			path: path.to_string(),
			first_page_url: self.build_url(url, 1),
			last_page_url: self.build_url(url, last_page),
			next_page_url,
			prev_page_url,
			links,
		}
	}
}

/// Page numbers to display, `None` standing for an elided range
///
/// ```
/// use hybridly_tables::pagination::elided_page_range;
///
/// assert_eq!(elided_page_range(1, 3, 3, 2), vec![Some(1), Some(2), Some(3)]);
///
/// let elided = elided_page_range(10, 20, 2, 2);
/// assert_eq!(&elided[..3], &[Some(1), Some(2), None]);
/// assert!(elided.contains(&Some(10)));
/// ```
pub fn elided_page_range(
	current: usize,
	num_pages: usize,
	on_each_side: usize,
	on_ends: usize,
) -> Vec<Option<usize>> {
	let needed_pages = on_each_side
		.saturating_mul(2)
		.saturating_add(on_ends.saturating_mul(2))
		.saturating_add(1);
	if num_pages <= needed_pages {
		return (1..=num_pages).map(Some).collect();
	}

	// pages past the end are windowed around the last page
	let current = current.clamp(1, num_pages);
	let mut result: Vec<Option<usize>> = (1..=on_ends).map(Some).collect();

	let left_start = current.saturating_sub(on_each_side);
	if left_start > on_ends + 1 {
		result.push(None);
	}

	let middle_start = (on_ends + 1).max(left_start);
	let middle_end = (num_pages - on_ends).min(current.saturating_add(on_each_side));
	result.extend((middle_start..=middle_end).map(Some));

	if middle_end < num_pages - on_ends {
		result.push(None);
	}

	result.extend(((num_pages - on_ends + 1).max(middle_end + 1)..=num_pages).map(Some));

	result
}
