//! Field-level diff engine.
//!
//! Bit `i` of [`Diff::changed_mask`] is tied to field `i` in declaration order
//! (see [`field`]). The mapping is a compile-time contract with host shells;
//! appending a field is compatible, reordering is not.

use crate::types::{AppState, Model, UiState};

/// Identifier of a diffable field (its bit position in the changed mask).
pub type FieldId = u16;

/// Stable field identifiers.
pub mod field {
    use super::FieldId;

    pub const COUNTER: FieldId = 0;
    pub const INPUT: FieldId = 1;
    pub const SELECTION: FieldId = 2;
    pub const LAST_BUTTON: FieldId = 3;
    pub const SCREEN: FieldId = 4;
    pub const PREVIOUS_SCREEN: FieldId = 5;
    pub const TAB: FieldId = 6;
    pub const SCROLL_OFFSET: FieldId = 7;
    pub const LOADING: FieldId = 8;
    pub const FOREGROUND: FieldId = 9;
}

/// Number of fields covered by the diff engine.
pub const FIELD_COUNT: usize = 10;

const _: () = assert!(FIELD_COUNT <= 64);

/// Compact change descriptor produced by a commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Diff {
    /// Bit `i` set when field `i` differed.
    pub changed_mask: u64,
    /// Number of changed fields (summed across merged diffs).
    pub change_count: u32,
    /// State version this diff belongs to.
    pub version: u64,
}

impl Diff {
    /// A diff reporting no changes against `version`.
    pub fn empty(version: u64) -> Self {
        Self {
            changed_mask: 0,
            change_count: 0,
            version,
        }
    }

    /// Returns `true` when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.change_count == 0
    }

    /// Returns whether `id` is marked as changed. Ids beyond the mask width are never set.
    pub fn field_changed(&self, id: FieldId) -> bool {
        id < 64 && self.changed_mask & (1u64 << id) != 0
    }

    /// Folds `other` into this diff: masks are OR'd, counts summed, and the
    /// version advances to `other.version`.
    pub fn merge(&mut self, other: &Diff) {
        self.changed_mask |= other.changed_mask;
        self.change_count = self.change_count.saturating_add(other.change_count);
        self.version = self.version.max(other.version);
    }
}

/// Accumulates per-field comparisons into a [`Diff`].
#[derive(Debug, Default)]
pub struct DiffBuilder {
    mask: u64,
    count: u32,
}

impl DiffBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares one field and records `id` when the values differ.
    pub fn field<T: PartialEq + ?Sized>(&mut self, id: FieldId, before: &T, after: &T) {
        debug_assert!((id as usize) < FIELD_COUNT, "field id {id} out of range");
        if before != after {
            self.mask |= 1u64 << id;
            self.count += 1;
        }
    }

    /// Finishes the comparison, stamping the result with `version`.
    pub fn finish(self, version: u64) -> Diff {
        Diff {
            changed_mask: self.mask,
            change_count: self.count,
            version,
        }
    }
}

/// Trait for values the diff engine can compare field by field.
pub trait Diffable {
    /// Records every differing field between `self` (before) and `after`.
    fn diff_fields(&self, after: &Self, out: &mut DiffBuilder);
}

impl Diffable for AppState {
    fn diff_fields(&self, after: &Self, out: &mut DiffBuilder) {
        out.field(field::COUNTER, &self.counter, &after.counter);
        // Bounded buffers compare by (length, content).
        out.field(
            field::INPUT,
            &(self.input.len(), self.input.as_bytes()),
            &(after.input.len(), after.input.as_bytes()),
        );
        out.field(field::SELECTION, &self.selection, &after.selection);
        out.field(field::LAST_BUTTON, &self.last_button, &after.last_button);
    }
}

impl Diffable for UiState {
    fn diff_fields(&self, after: &Self, out: &mut DiffBuilder) {
        out.field(field::SCREEN, &self.screen, &after.screen);
        out.field(
            field::PREVIOUS_SCREEN,
            &self.previous_screen,
            &after.previous_screen,
        );
        out.field(field::TAB, &self.tab, &after.tab);
        out.field(field::SCROLL_OFFSET, &self.scroll_offset, &after.scroll_offset);
        out.field(field::LOADING, &self.loading, &after.loading);
        out.field(field::FOREGROUND, &self.foreground, &after.foreground);
    }
}

impl Diffable for Model {
    fn diff_fields(&self, after: &Self, out: &mut DiffBuilder) {
        self.app.diff_fields(&after.app, out);
        self.ui.diff_fields(&after.ui, out);
    }
}

/// Compares two models and returns the resulting diff stamped with `version`.
pub fn diff_models(before: &Model, after: &Model, version: u64) -> Diff {
    let mut builder = DiffBuilder::new();
    before.diff_fields(after, &mut builder);
    builder.finish(version)
}
