use std::fmt::Debug;

/// A row that can be shown in a feed.
///
/// Two rows are the same logical item when their ids are equal; the content
/// of the row plays no part in deduplication.
pub trait Model: Clone + Send + Sync + 'static {
    type Id: PartialEq + Clone + Debug + Send + Sync;

    fn id(&self) -> &Self::Id;

    /// Whether `other` is the same logical item as `self`.
    fn same_item(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
