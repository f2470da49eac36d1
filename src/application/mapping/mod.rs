//! Entity ⇄ DTO mapping
//!
//! One pure function per entity/DTO pair:
//!
//! - `*_to_dto`: entity (plus any related records) → response DTO. Related
//!   records are passed as `Option<&T>`; a missing one yields `""` for the
//!   derived name, never an error.
//! - `*_from_create`: create request → new entity. The caller supplies the ID
//!   and the `now` instant; `created_at` and `updated_at` are both set to it and
//!   default status / `is_active` values are fixed here.
//! - `apply_*_update`: update request → in-place patch. `Some` overwrites,
//!   `None` keeps the stored value, `updated_at` is always re-stamped.
//!
//! Mapping never validates; request DTOs are validated when they are bound.

pub mod classes;
pub mod enrollments;
pub mod packages;
pub mod users;

pub use classes::*;
pub use enrollments::*;
pub use packages::*;
pub use users::*;

/// Derive a display name from an optional related record.
pub(crate) fn name_of<T>(related: Option<&T>, name: impl FnOnce(&T) -> String) -> String {
    related.map(name).unwrap_or_default()
}

/// Overwrite `target` only when the update supplies a value.
pub(crate) fn patch<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Same as [`patch`] for nullable columns: a supplied value is stored as `Some`.
pub(crate) fn patch_opt<T>(target: &mut Option<T>, value: Option<T>) {
    if let Some(value) = value {
        *target = Some(value);
    }
}
