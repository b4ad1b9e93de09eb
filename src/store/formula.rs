use chrono::NaiveDate;

use crate::core::view::ListFilter;

/// `filterByFormula` expression for a list, or `None` to list everything.
pub fn filter_formula(filter: ListFilter, today: NaiveDate) -> Option<String> {
    let today = today.format("%Y-%m-%d");
    match filter {
        ListFilter::All => None,
        ListFilter::Inbox => Some("{Completed} = FALSE()".to_string()),
        ListFilter::Today => Some(format!(
            "AND({{Completed}} = FALSE(), {{DueDate}} = '{}')",
            today
        )),
        ListFilter::Upcoming => Some(format!(
            "AND({{Completed}} = FALSE(), {{DueDate}} > '{}')",
            today
        )),
        ListFilter::Completed => Some("{Completed} = TRUE()".to_string()),
    }
}

/// Equality predicate on an arbitrary text column, quotes escaped.
pub fn field_equals(field: &str, value: &str) -> String {
    format!("{{{}}} = '{}'", field, value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Conjunction of several predicates.
pub fn all_of(parts: &[String]) -> Option<String> {
    match parts {
        [] => None,
        [single] => Some(single.clone()),
        many => Some(format!("AND({})", many.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_formulas() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        assert_eq!(filter_formula(ListFilter::All, today), None);
        assert_eq!(
            filter_formula(ListFilter::Inbox, today).as_deref(),
            Some("{Completed} = FALSE()")
        );
        assert_eq!(
            filter_formula(ListFilter::Today, today).as_deref(),
            Some("AND({Completed} = FALSE(), {DueDate} = '2026-03-04')")
        );
        assert_eq!(
            filter_formula(ListFilter::Upcoming, today).as_deref(),
            Some("AND({Completed} = FALSE(), {DueDate} > '2026-03-04')")
        );
        assert_eq!(
            filter_formula(ListFilter::Completed, today).as_deref(),
            Some("{Completed} = TRUE()")
        );
    }

    #[test]
    fn equality_escapes_quotes() {
        assert_eq!(field_equals("Area", "Dev"), "{Area} = 'Dev'");
        assert_eq!(field_equals("Name", "Bob's"), r"{Name} = 'Bob\'s'");
    }

    #[test]
    fn conjunction() {
        assert_eq!(all_of(&[]), None);
        assert_eq!(all_of(&["{A} = 1".into()]).as_deref(), Some("{A} = 1"));
        assert_eq!(
            all_of(&["{A} = 1".into(), "{B} = 2".into()]).as_deref(),
            Some("AND({A} = 1, {B} = 2)")
        );
    }
}
