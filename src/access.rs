//! Department and warehouse visibility for the current user.

use std::collections::{HashMap, HashSet};

/// What a user is allowed to see.
///
/// A department grant covers every warehouse of that department; a
/// warehouse grant covers only that warehouse. Anything not covered is
/// silently dropped from result sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// Admin role, no filtering.
    Unrestricted,
    Restricted {
        departments: HashSet<i32>,
        /// Granted warehouse ID -> its department ID.
        warehouses: HashMap<i32, i32>,
    },
}

impl AccessScope {
    /// Scope that sees nothing (unknown or inactive user).
    pub fn none() -> Self {
        Self::Restricted {
            departments: HashSet::new(),
            warehouses: HashMap::new(),
        }
    }

    /// Build a restricted scope from department grants and
    /// `(warehouse_id, department_id)` warehouse grants.
    pub fn restricted(
        departments: impl IntoIterator<Item = i32>,
        warehouses: impl IntoIterator<Item = (i32, i32)>,
    ) -> Self {
        Self::Restricted {
            departments: departments.into_iter().collect(),
            warehouses: warehouses.into_iter().collect(),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Whether a record at `warehouse_id` of `department_id` is visible.
    pub fn allows_warehouse(&self, department_id: i32, warehouse_id: i32) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted {
                departments,
                warehouses,
            } => departments.contains(&department_id) || warehouses.get(&warehouse_id) == Some(&department_id),
        }
    }

    /// Whether any part of the department is visible. Used for records
    /// that belong to a department as a whole (transport programs).
    pub fn allows_department(&self, department_id: i32) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted {
                departments,
                warehouses,
            } => departments.contains(&department_id) || warehouses.values().any(|d| *d == department_id),
        }
    }

    /// Drop items whose `(department_id, warehouse_id)` is not visible.
    /// A `None` warehouse is checked at department level.
    pub fn retain<T>(&self, items: &mut Vec<T>, key: impl Fn(&T) -> (i32, Option<i32>)) {
        if self.is_unrestricted() {
            return;
        }
        items.retain(|item| match key(item) {
            (department_id, Some(warehouse_id)) => self.allows_warehouse(department_id, warehouse_id),
            (department_id, None) => self.allows_department(department_id),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // (department, warehouse)
    fn records() -> Vec<(i32, Option<i32>)> {
        vec![
            (1, Some(10)),
            (1, Some(11)),
            (2, Some(20)),
            (2, None),
            (3, Some(30)),
            (3, None),
        ]
    }

    #[test]
    fn test_unrestricted_sees_everything() {
        let mut items = records();
        AccessScope::Unrestricted.retain(&mut items, |r| *r);
        assert_eq!(items, records());
    }

    #[test]
    fn test_department_grant_covers_its_warehouses() {
        let scope = AccessScope::restricted([1], []);
        assert!(scope.allows_warehouse(1, 10));
        assert!(scope.allows_warehouse(1, 11));
        assert!(!scope.allows_warehouse(2, 20));
    }

    #[test]
    fn test_warehouse_grant_is_narrow() {
        let scope = AccessScope::restricted([], [(20, 2)]);
        assert!(scope.allows_warehouse(2, 20));
        assert!(!scope.allows_warehouse(2, 21));
        // Department-level rows of that department stay visible.
        assert!(scope.allows_department(2));
        assert!(!scope.allows_department(1));
    }

    #[test]
    fn test_warehouse_grant_requires_matching_department() {
        let scope = AccessScope::restricted([], [(20, 2)]);
        assert!(!scope.allows_warehouse(3, 20));
    }

    #[test]
    fn test_none_sees_nothing() {
        let mut items = records();
        AccessScope::none().retain(&mut items, |r| *r);
        assert!(items.is_empty());
    }

    #[test]
    fn test_restricted_is_subset_and_idempotent() {
        let scopes = [
            AccessScope::restricted([1], []),
            AccessScope::restricted([], [(20, 2), (30, 3)]),
            AccessScope::restricted([3], [(11, 1)]),
            AccessScope::none(),
        ];

        let mut everything = records();
        AccessScope::Unrestricted.retain(&mut everything, |r| *r);

        for scope in &scopes {
            let mut once = records();
            scope.retain(&mut once, |r| *r);
            assert!(once.iter().all(|r| everything.contains(r)), "{scope:?} widened the set");

            let mut twice = once.clone();
            scope.retain(&mut twice, |r| *r);
            assert_eq!(once, twice, "{scope:?} is not idempotent");
        }
    }
}
