//! Composition of optional query filters.

use sea_orm::Condition;
use sea_orm::sea_query::SimpleExpr;

/// ANDs together every filter whose input is present.
///
/// ```ignore
/// let cond = FilterBuilder::new()
///     .with(query.user_id, |id| post::Column::UserId.eq(id))
///     .with(query.ids, |ids| post::Column::Id.is_in(ids))
///     .build();
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct FilterBuilder {
    cond: Condition,
    applied: usize,
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self {
            cond: Condition::all(),
            applied: 0,
        }
    }

    /// Add `to_expr(value)` when `value` is `Some`; `None` adds nothing.
    pub fn with<T, F>(mut self, value: Option<T>, to_expr: F) -> Self
    where
        F: FnOnce(T) -> SimpleExpr,
    {
        if let Some(value) = value {
            self.cond = self.cond.add(to_expr(value));
            self.applied += 1;
        }
        self
    }

    /// Number of filters that were actually present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.applied
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied == 0
    }

    #[must_use]
    pub fn build(self) -> Condition {
        self.cond
    }
}
