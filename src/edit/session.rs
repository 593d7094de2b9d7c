//! The edit session: the one object currently being created or edited.
//!
//! A checked-out object lives only in the session (its store slot is
//! freed) until it is committed back, which allocates a fresh slot. Opening
//! a new object or selecting another one always commits the open session
//! first, so edits are never dropped by re-selection.

use glam::{Mat4, Vec3};

use crate::error::MboxError;
use crate::picking::PickTarget;
use crate::scene::{ObjectCreateInfo, ObjectStore};
use crate::transform::{decompose, translate, DecomposedTransform};

/// Lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No object is open.
    #[default]
    Empty,
    /// A brand-new object that has never been stored.
    New,
    /// An existing object checked out of the store.
    Editing,
    /// Deleted this frame; dropped at the next frame boundary.
    Discarded,
}

/// What a pick did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// Nothing changed.
    Unchanged,
    /// The open session was committed to the given slot.
    Committed(usize),
    /// A stored object was checked out.
    Selected {
        /// Slot the object was checked out of (now free).
        slot: usize,
        /// Slot the previously open session was committed to, if any.
        committed: Option<usize>,
    },
}

/// Single-object edit session.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    state: SessionState,
    transform: DecomposedTransform,
    deleted: bool,
}

impl EditSession {
    /// Empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether an object is open for editing.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::New | SessionState::Editing)
    }

    /// Whether a delete is pending suppression of the next commit.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Editable fields of the open object.
    #[must_use]
    pub fn transform(&self) -> Option<&DecomposedTransform> {
        self.is_open().then_some(&self.transform)
    }

    /// Mutable fields of the open object, for the parameter panel.
    pub fn transform_mut(&mut self) -> Option<&mut DecomposedTransform> {
        if self.is_open() {
            Some(&mut self.transform)
        } else {
            None
        }
    }

    /// Composed model matrix of the open object.
    #[must_use]
    pub fn model(&self) -> Option<Mat4> {
        self.transform().map(DecomposedTransform::to_model)
    }

    /// Open a new object `distance` units in front of the camera described
    /// by `view`, committing any open session first.
    ///
    /// Returns the slot the previous session was committed to.
    ///
    /// # Errors
    ///
    /// Propagates [`MboxError::CapacityExceeded`] from the commit (the
    /// previous session stays open) and [`MboxError::SingularTransform`]
    /// for a degenerate view matrix.
    pub fn open_new(
        &mut self,
        store: &mut ObjectStore,
        view: &Mat4,
        distance: f32,
        color: Vec3,
    ) -> Result<Option<usize>, MboxError> {
        let mut placed = *view;
        translate(&mut placed, Vec3::new(0.0, 0.0, distance));
        let transform = decompose(&placed.inverse(), color)?;

        let committed = self.commit(store)?;
        self.transform = transform;
        self.state = SessionState::New;
        log::debug!("new object opened at {}", transform.position);
        Ok(committed)
    }

    /// Check out the stored object in `slot`, committing the open session
    /// first.
    ///
    /// The object is decomposed before anything is committed, so a
    /// rejected selection leaves both store and session untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::SingularTransform`] if the stored matrix cannot
    /// be decomposed, or [`MboxError::CapacityExceeded`] if the open session
    /// cannot be committed.
    pub fn select(
        &mut self,
        store: &mut ObjectStore,
        slot: usize,
    ) -> Result<PickOutcome, MboxError> {
        let Some(info) = store.get(slot) else {
            return Ok(PickOutcome::Unchanged);
        };
        let transform = decompose(&info.model, info.color)?;

        let committed = self.commit(store)?;
        store.free(slot);
        self.transform = transform;
        self.state = SessionState::Editing;
        log::debug!("checked out slot {slot}");
        Ok(PickOutcome::Selected { slot, committed })
    }

    /// Write the open object back into the store and close the session.
    ///
    /// Returns the new slot, or `None` if nothing was open.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::CapacityExceeded`] if the store is full; the
    /// session stays open so the commit can be retried.
    pub fn commit(
        &mut self,
        store: &mut ObjectStore,
    ) -> Result<Option<usize>, MboxError> {
        if !self.is_open() {
            return Ok(None);
        }
        let slot = store.alloc(ObjectCreateInfo {
            model: self.transform.to_model(),
            color: self.transform.color,
        })?;
        self.state = SessionState::Empty;
        self.transform = DecomposedTransform::default();
        log::debug!("committed session to slot {slot}");
        Ok(Some(slot))
    }

    /// Drop the open object without storing it.
    pub fn delete(&mut self) {
        if self.is_open() {
            self.state = SessionState::Discarded;
            self.deleted = true;
            log::debug!("session discarded");
        }
    }

    /// Frame boundary: a discarded session becomes empty.
    pub fn end_frame(&mut self) {
        if self.state == SessionState::Discarded {
            self.state = SessionState::Empty;
            self.transform = DecomposedTransform::default();
        }
    }

    /// Apply a click-release on `target`.
    ///
    /// Background commits the open session unless a delete is pending,
    /// the active object leaves everything as is, and a stored object is
    /// selected. The pending-delete flag is consumed by every call.
    ///
    /// # Errors
    ///
    /// See [`Self::select`] and [`Self::commit`].
    pub fn on_pick(
        &mut self,
        store: &mut ObjectStore,
        target: PickTarget,
    ) -> Result<PickOutcome, MboxError> {
        let suppressed = std::mem::take(&mut self.deleted);
        match target {
            PickTarget::Active => Ok(PickOutcome::Unchanged),
            PickTarget::Background if suppressed => Ok(PickOutcome::Unchanged),
            PickTarget::Background => Ok(self
                .commit(store)?
                .map_or(PickOutcome::Unchanged, PickOutcome::Committed)),
            PickTarget::Object(slot) => self.select(store, slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::compose;

    const COLOR: Vec3 = Vec3::new(1.0, 0.5, 0.31);

    fn store_with(transforms: &[DecomposedTransform]) -> ObjectStore {
        let mut store = ObjectStore::new();
        for t in transforms {
            let _ = store
                .alloc(ObjectCreateInfo {
                    model: compose(t),
                    color: t.color,
                })
                .unwrap();
        }
        store
    }

    fn at(position: Vec3) -> DecomposedTransform {
        DecomposedTransform {
            position,
            color: COLOR,
            ..DecomposedTransform::default()
        }
    }

    #[test]
    fn test_new_object_in_front_of_camera() {
        let mut store = ObjectStore::new();
        let mut session = EditSession::new();
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let committed = session.open_new(&mut store, &view, 4.5, COLOR).unwrap();
        assert_eq!(committed, None);
        assert_eq!(session.state(), SessionState::New);
        let t = session.transform().unwrap();
        assert!(t.position.abs_diff_eq(Vec3::new(0.0, 0.0, -1.5), 1e-4));
        assert!((t.scale - 1.0).abs() < 1e-4);
        assert!(t.rotation_angle.abs() < 1e-3);
        assert_eq!(t.color, COLOR);
    }

    #[test]
    fn test_commit_on_reselect() {
        let mut store = store_with(&[at(Vec3::X * 3.0)]);
        let mut session = EditSession::new();
        let _ = session
            .open_new(&mut store, &Mat4::IDENTITY, 4.5, COLOR)
            .unwrap();
        {
            let t = session.transform_mut().unwrap();
            t.scale = 2.0;
            t.position = Vec3::new(1.0, 2.0, 3.0);
        }
        let expected = session.model().unwrap();

        let outcome = session.on_pick(&mut store, PickTarget::Object(0)).unwrap();
        assert_eq!(
            outcome,
            PickOutcome::Selected {
                slot: 0,
                committed: Some(1)
            }
        );
        // exactly one stored object: the committed edit
        let stored: Vec<_> = store.iter().collect();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].model.abs_diff_eq(expected, 1e-5));
        // session now holds the picked object
        assert_eq!(session.state(), SessionState::Editing);
        let t = session.transform().unwrap();
        assert!(t.position.abs_diff_eq(Vec3::X * 3.0, 1e-4));
    }

    #[test]
    fn test_background_click_commits() {
        let mut store = ObjectStore::new();
        let mut session = EditSession::new();
        let _ = session
            .open_new(&mut store, &Mat4::IDENTITY, 4.5, COLOR)
            .unwrap();
        let outcome = session.on_pick(&mut store, PickTarget::Background).unwrap();
        assert_eq!(outcome, PickOutcome::Committed(0));
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(store.len(), 1);
        // nothing open: a second click changes nothing
        let outcome = session.on_pick(&mut store, PickTarget::Background).unwrap();
        assert_eq!(outcome, PickOutcome::Unchanged);
    }

    #[test]
    fn test_active_click_keeps_session() {
        let mut store = ObjectStore::new();
        let mut session = EditSession::new();
        let _ = session
            .open_new(&mut store, &Mat4::IDENTITY, 4.5, COLOR)
            .unwrap();
        let outcome = session.on_pick(&mut store, PickTarget::Active).unwrap();
        assert_eq!(outcome, PickOutcome::Unchanged);
        assert_eq!(session.state(), SessionState::New);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_drops_without_store_write() {
        let mut store = store_with(&[at(Vec3::ZERO)]);
        let mut session = EditSession::new();
        let _ = session.select(&mut store, 0).unwrap();
        assert!(store.is_empty());

        session.delete();
        assert_eq!(session.state(), SessionState::Discarded);
        assert!(session.transform().is_none());
        session.end_frame();
        assert_eq!(session.state(), SessionState::Empty);

        // the pending delete suppresses the release's commit
        let outcome = session.on_pick(&mut store, PickTarget::Background).unwrap();
        assert_eq!(outcome, PickOutcome::Unchanged);
        assert!(!session.is_deleted());
        assert!(store.is_empty());
    }

    #[test]
    fn test_new_while_editing_commits_first() {
        let mut store = store_with(&[at(Vec3::Y)]);
        let mut session = EditSession::new();
        let _ = session.select(&mut store, 0).unwrap();
        let committed = session
            .open_new(&mut store, &Mat4::IDENTITY, 4.5, COLOR)
            .unwrap();
        assert_eq!(committed, Some(0));
        assert_eq!(session.state(), SessionState::New);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_capacity_keeps_session_open() {
        let mut store = ObjectStore::with_capacity(Some(1));
        let _ = store
            .alloc(ObjectCreateInfo {
                model: Mat4::IDENTITY,
                color: COLOR,
            })
            .unwrap();
        let mut session = EditSession::new();
        let _ = session
            .open_new(&mut store, &Mat4::IDENTITY, 4.5, COLOR)
            .unwrap();
        assert!(matches!(
            session.commit(&mut store),
            Err(MboxError::CapacityExceeded { capacity: 1 })
        ));
        assert_eq!(session.state(), SessionState::New);
    }

    #[test]
    fn test_singular_object_is_not_selected() {
        let mut store = ObjectStore::new();
        let _ = store
            .alloc(ObjectCreateInfo {
                model: Mat4::ZERO,
                color: COLOR,
            })
            .unwrap();
        let mut session = EditSession::new();
        assert!(matches!(
            session.on_pick(&mut store, PickTarget::Object(0)),
            Err(MboxError::SingularTransform { .. })
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_freed_slot_pick_is_ignored() {
        let mut store = store_with(&[at(Vec3::ZERO)]);
        store.free(0);
        let mut session = EditSession::new();
        let outcome = session.on_pick(&mut store, PickTarget::Object(0)).unwrap();
        assert_eq!(outcome, PickOutcome::Unchanged);
    }
}
