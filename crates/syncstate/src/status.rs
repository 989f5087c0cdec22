// ── In-flight operation tracking ──
//
// An ordered list of operation tags per collection, with a reserved
// sentinel meaning "the whole collection". Start actions append, terminal
// actions remove. Removal of specific ids also retires the sentinel, so a
// per-id success clears a stale collection-wide marker.

/// One in-flight operation tag: a specific resource id, or the whole
/// collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusId {
    /// Sentinel covering the entire collection.
    All,
    Id(String),
}

/// Ordered list of in-flight operation tags.
///
/// Append-only on start actions; duplicates across repeated starts are
/// tolerated because consumers test membership, not uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusIds(Vec<StatusId>);

impl StatusIds {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append the incoming ids, or the sentinel when none are given.
    pub fn apply(&mut self, incoming: Option<&[String]>) {
        match incoming {
            None => self.0.push(StatusId::All),
            Some(ids) => self
                .0
                .extend(ids.iter().map(|id| StatusId::Id(id.clone()))),
        }
    }

    /// Remove every occurrence of the incoming ids *and* the sentinel.
    /// With no ids, only the sentinel is removed.
    pub fn remove(&mut self, incoming: Option<&[String]>) {
        let targets = incoming.unwrap_or_default();
        self.0.retain(|tag| match tag {
            StatusId::All => false,
            StatusId::Id(id) => !targets.iter().any(|t| t == id),
        });
    }

    /// Drop every tag, id and sentinel alike.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.0
            .iter()
            .any(|tag| matches!(tag, StatusId::Id(i) if i == id))
    }

    /// Whether the whole-collection sentinel is present.
    pub fn contains_all(&self) -> bool {
        self.0.iter().any(|tag| matches!(tag, StatusId::All))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusId> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn apply_without_ids_marks_the_whole_collection() {
        let mut status = StatusIds::new();
        status.apply(None);
        assert!(status.contains_all());
        assert!(!status.is_empty());
    }

    #[test]
    fn apply_appends_ids_in_order() {
        let mut status = StatusIds::new();
        status.apply(Some(&ids(&["a", "b"])));
        status.apply(Some(&ids(&["c"])));
        let seen: Vec<_> = status.iter().cloned().collect();
        assert_eq!(
            seen,
            vec![
                StatusId::Id("a".into()),
                StatusId::Id("b".into()),
                StatusId::Id("c".into()),
            ]
        );
    }

    #[test]
    fn duplicate_ids_are_tolerated() {
        let mut status = StatusIds::new();
        status.apply(Some(&ids(&["a"])));
        status.apply(Some(&ids(&["a"])));
        assert_eq!(status.len(), 2);
        assert!(status.contains_id("a"));
    }

    #[test]
    fn remove_clears_ids_and_the_sentinel() {
        let mut status = StatusIds::new();
        status.apply(None);
        status.apply(Some(&ids(&["a", "b"])));

        status.remove(Some(&ids(&["a"])));

        assert!(!status.contains_all());
        assert!(!status.contains_id("a"));
        assert!(status.contains_id("b"));
    }

    #[test]
    fn remove_without_ids_only_clears_the_sentinel() {
        let mut status = StatusIds::new();
        status.apply(None);
        status.apply(Some(&ids(&["a"])));

        status.remove(None);

        assert!(!status.contains_all());
        assert!(status.contains_id("a"));
    }

    #[test]
    fn remove_clears_every_duplicate_occurrence() {
        let mut status = StatusIds::new();
        status.apply(Some(&ids(&["a"])));
        status.apply(Some(&ids(&["a", "b"])));

        status.remove(Some(&ids(&["a"])));

        assert_eq!(status.len(), 1);
        assert!(status.contains_id("b"));
    }

    #[test]
    fn apply_with_empty_slice_is_a_no_op() {
        let mut status = StatusIds::new();
        status.apply(Some(&[]));
        assert!(status.is_empty());
    }
}
