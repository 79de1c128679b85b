use crate::store::Record;

/// Rows returned by a fetch, grouped per request in launch order.
///
/// Groups are concatenated as-is: a row matched by two requests appears in
/// both groups and twice in [`FetchResult::into_rows`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    groups: Vec<Vec<Record>>,
}

impl FetchResult {
    pub(crate) fn from_groups(groups: Vec<Vec<Record>>) -> Self {
        FetchResult { groups }
    }

    /// Rows per request, in launch order.
    pub fn groups(&self) -> &[Vec<Record>] {
        &self.groups
    }

    /// Rows produced by the request at `index`.
    pub fn group(&self, index: usize) -> Option<&[Record]> {
        self.groups.get(index).map(Vec::as_slice)
    }

    /// Total row count across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = &Record> {
        self.groups.iter().flatten()
    }

    /// All rows concatenated in launch order, duplicates kept.
    pub fn into_rows(self) -> Vec<Record> {
        self.groups.into_iter().flatten().collect()
    }

    pub fn into_groups(self) -> Vec<Vec<Record>> {
        self.groups
    }
}
