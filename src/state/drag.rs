//! Drag-and-drop reorder protocol for the favorites list.
//!
//! A drag gesture is a small explicit state machine rather than ad hoc
//! mutable flags, so reorder logic is testable without simulating pointer
//! events. The machine holds only the dragged item's identity; positions are
//! resolved against the current collection order at drop time, because the
//! list can change while a drag is in flight.
use super::favorites::FavoritesList;

/// Gesture state: either nothing is being dragged, or exactly one favorite
/// (tracked by identity) is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        identity: String,
    },
}

/// Outcome of dropping a dragged favorite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The dragged element moved from `from` to `to` (array-move).
    Moved { from: usize, to: usize },
    /// Nothing happened: dropped on itself, same position, or either identity
    /// was unresolvable (list changed mid-drag). Not an error.
    Cancelled,
}

impl DragState {
    /// Begin dragging the favorite with the given identity.
    ///
    /// Starting a new drag while one is active replaces it; the previous
    /// gesture is implicitly cancelled.
    pub fn begin(&mut self, identity: impl Into<String>) {
        *self = DragState::Dragging {
            identity: identity.into(),
        };
    }

    /// Abort the gesture without touching the collection.
    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Identity currently being dragged, if any.
    pub fn dragged(&self) -> Option<&str> {
        match self {
            DragState::Dragging { identity } => Some(identity),
            DragState::Idle => None,
        }
    }

    /// Drop the dragged favorite onto the element with `target` identity.
    ///
    /// Always transitions back to `Idle`. If the drag resolves to a real
    /// reorder, applies array-move on `favorites` and reports the indices;
    /// every degenerate case (no active drag, self-drop, unresolvable
    /// identities, equal positions) is [`DropOutcome::Cancelled`].
    pub fn drop_on(&mut self, favorites: &mut FavoritesList, target: &str) -> DropOutcome {
        let dragged = match std::mem::take(self) {
            DragState::Dragging { identity } => identity,
            DragState::Idle => return DropOutcome::Cancelled,
        };

        if dragged == target {
            return DropOutcome::Cancelled;
        }

        // Positions computed against the current order; either side may have
        // disappeared since the drag began.
        let (from, to) = match (favorites.position_of(&dragged), favorites.position_of(target)) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                tracing::debug!(
                    dragged = %dragged,
                    target = %target,
                    "Drop target unresolvable, treating as drag cancelled"
                );
                return DropOutcome::Cancelled;
            }
        };

        if favorites.move_item(from, to) {
            DropOutcome::Moved { from, to }
        } else {
            DropOutcome::Cancelled
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::favorites::FavoriteItem;

    fn movie(id: u64) -> FavoriteItem {
        FavoriteItem::Movie {
            id,
            title: format!("Movie {}", id),
            description: String::new(),
            url: format!("https://www.themoviedb.org/movie/{}", id),
        }
    }

    fn three_favorites() -> FavoritesList {
        let mut list = FavoritesList::new();
        list.add(movie(1));
        list.add(movie(2));
        list.add(movie(3));
        list
    }

    fn order(list: &FavoritesList) -> Vec<String> {
        list.iter().map(|i| i.identity()).collect()
    }

    #[test]
    fn test_begin_and_cancel() {
        let mut drag = DragState::default();
        assert!(!drag.is_dragging());

        drag.begin("movie-1");
        assert!(drag.is_dragging());
        assert_eq!(drag.dragged(), Some("movie-1"));

        drag.cancel();
        assert_eq!(drag, DragState::Idle);
    }

    #[test]
    fn test_drop_moves_and_returns_to_idle() {
        let mut list = three_favorites();
        let mut drag = DragState::default();

        drag.begin("movie-3");
        let outcome = drag.drop_on(&mut list, "movie-1");

        assert_eq!(outcome, DropOutcome::Moved { from: 2, to: 0 });
        assert_eq!(order(&list), vec!["movie-3", "movie-1", "movie-2"]);
        assert_eq!(drag, DragState::Idle);
    }

    #[test]
    fn test_drop_on_self_is_cancelled() {
        let mut list = three_favorites();
        let before = list.clone();
        let mut drag = DragState::default();

        drag.begin("movie-2");
        assert_eq!(drag.drop_on(&mut list, "movie-2"), DropOutcome::Cancelled);
        assert_eq!(list, before);
        assert_eq!(drag, DragState::Idle);
    }

    #[test]
    fn test_drop_with_unresolvable_target_is_cancelled() {
        let mut list = three_favorites();
        let before = list.clone();
        let mut drag = DragState::default();

        drag.begin("movie-1");
        assert_eq!(
            drag.drop_on(&mut list, "news-https://gone.example"),
            DropOutcome::Cancelled
        );
        assert_eq!(list, before);
    }

    #[test]
    fn test_drop_after_dragged_item_removed_mid_drag() {
        let mut list = three_favorites();
        let mut drag = DragState::default();

        drag.begin("movie-1");
        list.remove("movie-1"); // list changed mid-drag

        let before = list.clone();
        assert_eq!(drag.drop_on(&mut list, "movie-3"), DropOutcome::Cancelled);
        assert_eq!(list, before);
        assert_eq!(drag, DragState::Idle);
    }

    #[test]
    fn test_drop_without_active_drag_is_cancelled() {
        let mut list = three_favorites();
        let before = list.clone();
        let mut drag = DragState::default();

        assert_eq!(drag.drop_on(&mut list, "movie-1"), DropOutcome::Cancelled);
        assert_eq!(list, before);
    }

    #[test]
    fn test_new_drag_replaces_previous() {
        let mut drag = DragState::default();
        drag.begin("movie-1");
        drag.begin("movie-2");
        assert_eq!(drag.dragged(), Some("movie-2"));
    }
}
