/// Three-state partial update for optional fields.
///
/// A plain `Option<T>` cannot distinguish "leave this field alone" from
/// "clear it"; this can.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Keep the existing value.
    NoChange,
    /// Replace the value.
    Set(T),
    /// Reset the field to `None`.
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::NoChange
    }
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }
}
