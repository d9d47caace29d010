//! # Queries
//!
//! A [`Query`] is the `find(filter, order, limit)` half of the store API: a conjunction of
//! predicates, an optional comparator and an optional row limit, evaluated inside the actor
//! against a consistent snapshot of the table.

use std::cmp::Ordering;
use std::fmt;

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Filter, order and limit applied by [`ResourceClient::find`](crate::ResourceClient::find).
///
/// Rows without an explicit order come back in insertion order.
///
/// ```rust
/// use resource_actor::Query;
///
/// let query = Query::<u32>::new()
///     .filter(|n| n % 2 == 0)
///     .order_by(|a, b| b.cmp(a))
///     .limit(2);
/// assert_eq!(query.apply([1, 2, 3, 4, 6].iter()), vec![6, 4]);
/// ```
pub struct Query<T> {
    filters: Vec<Predicate<T>>,
    order: Option<Comparator<T>>,
    limit: Option<usize>,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }
}

impl<T> Query<T> {
    /// A query matching every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate. All predicates must hold for a row to match.
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filters.push(Box::new(predicate));
        self
    }

    pub fn order_by(mut self, cmp: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.order = Some(Box::new(cmp));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, item: &T) -> bool {
        self.filters.iter().all(|f| f(item))
    }

    /// Evaluates the query over `items`, cloning the matching rows.
    pub fn apply<'a>(&self, items: impl Iterator<Item = &'a T>) -> Vec<T>
    where
        T: Clone + 'a,
    {
        let mut rows: Vec<T> = items.filter(|item| self.matches(item)).cloned().collect();
        if let Some(cmp) = &self.order {
            // stable, so ties keep insertion order
            rows.sort_by(|a, b| cmp(a, b));
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filters", &self.filters.len())
            .field("ordered", &self.order.is_some())
            .field("limit", &self.limit)
            .finish()
    }
}
