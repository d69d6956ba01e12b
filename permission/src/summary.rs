use std::fmt;

use crate::{Category, Permission, PermissionSystem, category_of};

/// Granted count for one category of the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRow {
    /// The category.
    pub category: Category,
    /// Members of the category that are granted.
    pub granted: usize,
    /// Members of the category in the working set.
    pub total: usize,
}

/// Grant state of a working set, grouped by category.
///
/// Built from scratch every time; it never tracks changes on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Granted permissions in the working set.
    pub granted: usize,
    /// Permissions in the working set that are not granted.
    pub denied: usize,
    /// One row per category with at least one member, in category order.
    pub rows: Vec<CategoryRow>,
}

impl Summary {
    /// Query `system` for every permission of `working_set`.
    pub fn collect<S: PermissionSystem>(working_set: &[Permission], system: &S) -> Self {
        let states: Vec<(Option<Category>, bool)> = working_set
            .iter()
            .map(|p| (category_of(p), system.is_granted(p)))
            .collect();

        let granted = states.iter().filter(|(_, g)| *g).count();
        let rows = Category::ALL
            .iter()
            .filter_map(|&category| {
                let members = states.iter().filter(|(c, _)| *c == Some(category));
                let (total, granted) =
                    members.fold((0, 0), |(t, g), (_, ok)| (t + 1, g + usize::from(*ok)));
                (total > 0).then_some(CategoryRow {
                    category,
                    granted,
                    total,
                })
            })
            .collect();

        Self {
            granted,
            denied: states.len() - granted,
            rows,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Permissions: ✓ {} | ✗ {}", self.granted, self.denied)?;
        writeln!(f, "{}", "─".repeat(30))?;
        writeln!(f)?;
        for row in &self.rows {
            writeln!(f, "{}: {}/{}", row.category, row.granted, row.total)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::future::Future;

    use super::*;
    use crate::manifest::{CAMERA, READ_CALENDAR, READ_SMS, WRITE_CALENDAR};
    use crate::{Outcome, PermissionError};

    struct Granted(HashSet<Permission>);

    impl PermissionSystem for Granted {
        fn is_granted(&self, permission: &Permission) -> bool {
            self.0.contains(permission)
        }

        fn request(
            &self,
            batch: &[Permission],
        ) -> impl Future<Output = Result<Outcome, PermissionError>> {
            std::future::ready(Ok(Outcome::denied(batch)))
        }
    }

    #[test]
    fn counts_by_category() {
        let set = [READ_CALENDAR, WRITE_CALENDAR, CAMERA, READ_SMS];
        let system = Granted([READ_CALENDAR, CAMERA].into_iter().collect());

        let summary = Summary::collect(&set, &system);
        assert_eq!(summary.granted, 2);
        assert_eq!(summary.denied, 2);
        assert_eq!(
            summary.rows,
            vec![
                CategoryRow {
                    category: Category::Calendar,
                    granted: 1,
                    total: 2
                },
                CategoryRow {
                    category: Category::Camera,
                    granted: 1,
                    total: 1
                },
                CategoryRow {
                    category: Category::Sms,
                    granted: 0,
                    total: 1
                },
            ]
        );
    }

    #[test]
    fn unknown_permissions_count_but_have_no_row() {
        let set = [Permission::new("com.example.CUSTOM")];
        let summary = Summary::collect(&set, &Granted(HashSet::new()));
        assert_eq!(summary.denied, 1);
        assert!(summary.rows.is_empty());
    }

    #[test]
    fn renders_header_and_rows() {
        let set = [CAMERA];
        let system = Granted([CAMERA].into_iter().collect());
        let text = Summary::collect(&set, &system).to_string();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Permissions: ✓ 1 | ✗ 0"));
        assert_eq!(lines.next().map(|l| l.chars().count()), Some(30));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), Some("Camera: 1/1"));
    }

    #[test]
    fn rows_count_every_member_of_a_category() {
        let set = crate::working_set(crate::ApiLevel::TIRAMISU);
        let summary = Summary::collect(&set, &Granted(HashSet::new()));
        let total = |category| {
            summary
                .rows
                .iter()
                .find(|row| row.category == category)
                .map(|row| row.total)
        };

        assert_eq!(summary.rows.len(), Category::ALL.len());
        assert_eq!(total(Category::Phone), Some(5));
        assert_eq!(total(Category::Location), Some(3));
        assert!(summary.to_string().contains("Phone: 0/5"));
    }
}
