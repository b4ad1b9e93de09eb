use regex::Regex;
use std::sync::LazyLock;

use super::date::DateResolver;
use crate::core::draft::TaskDraft;

pub const LABEL_MARKER: char = '@';
pub const DATE_MARKER: char = '#';

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*@(?P<label>\w+)").unwrap());

/// `#` plus everything up to the next marker or the end of the text, so
/// `17:30`, `2026-12-25` and `3/15` stay in one phrase.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*#(?P<phrase>[^@#]*)").unwrap());

pub struct InputParser;

impl InputParser {
    /// Parse one line of quick-entry text.
    ///
    /// `Buy milk @home #tomorrow at 5pm` becomes the title `Buy milk`, the
    /// label `home` and whatever `resolver` makes of `tomorrow at 5pm`.
    /// Never fails: missing markers or an unresolvable date simply leave
    /// the corresponding fields empty.
    pub fn parse(input: &str, resolver: &impl DateResolver) -> TaskDraft {
        let (labels, rest) = Self::extract_labels(input);
        let (phrase, rest) = Self::extract_date_phrase(&rest);

        let due = phrase.and_then(|p| {
            let resolved = resolver.resolve(&p);
            if resolved.is_none() {
                log::debug!("No date found in phrase {:?}", p);
            }
            resolved
        });

        TaskDraft {
            title: rest.trim().to_string(),
            labels,
            due,
        }
    }

    /// Labels in first-seen order without duplicates, plus the text with
    /// every label token removed.
    pub fn extract_labels(input: &str) -> (Vec<String>, String) {
        let mut labels: Vec<String> = Vec::new();
        for caps in LABEL_RE.captures_iter(input) {
            let label = &caps["label"];
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
        let rest = LABEL_RE.replace_all(input, "").into_owned();
        (labels, rest)
    }

    /// The first date phrase (marker stripped, trimmed, `None` if blank),
    /// plus the text with every date span removed.
    pub fn extract_date_phrase(input: &str) -> (Option<String>, String) {
        let phrase = DATE_RE
            .captures(input)
            .map(|caps| caps["phrase"].trim().to_string())
            .filter(|p| !p.is_empty());
        let rest = DATE_RE.replace_all(input, "").into_owned();
        (phrase, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::date::NaturalDateResolver;
    use chrono::{NaiveDate, NaiveDateTime};

    fn resolver() -> NaturalDateResolver {
        NaturalDateResolver::new(
            NaiveDate::from_ymd_opt(2026, 3, 4)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    fn never(_: &str) -> Option<NaiveDateTime> {
        None
    }

    #[test]
    fn plain_text_is_title() {
        let draft = InputParser::parse("  Water the  plants ", &resolver());
        assert_eq!(draft.title, "Water the  plants");
        assert!(draft.labels.is_empty());
        assert!(draft.due.is_none());
    }

    #[test]
    fn labels_are_extracted_in_order() {
        let draft = InputParser::parse("Buy milk @home @errand", &resolver());
        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.labels, vec!["home", "errand"]);
        assert!(draft.due.is_none());
    }

    #[test]
    fn labels_are_unique_and_unmarked() {
        let draft = InputParser::parse("@work Review @pr the @work change", &resolver());
        assert_eq!(draft.labels, vec!["work", "pr"]);
        assert_eq!(draft.title, "Review the change");
        assert!(draft.labels.iter().all(|l| !l.contains(LABEL_MARKER)));
    }

    #[test]
    fn date_and_label() {
        let r = resolver();
        let draft = InputParser::parse("Call client #tomorrow @urgent", &r);
        assert_eq!(draft.title, "Call client");
        assert_eq!(draft.labels, vec!["urgent"]);
        assert_eq!(draft.due, r.resolve("tomorrow"));
        assert!(draft.due.is_some());
    }

    #[test]
    fn date_phrase_runs_to_end() {
        let r = resolver();
        let draft = InputParser::parse("Dentist #friday at 3pm", &r);
        assert_eq!(draft.title, "Dentist");
        assert_eq!(
            draft.due,
            NaiveDate::from_ymd_opt(2026, 3, 6).and_then(|d| d.and_hms_opt(15, 0, 0))
        );
    }

    #[test]
    fn phrase_passed_without_marker() {
        let seen = std::cell::RefCell::new(Vec::new());
        let recording = |p: &str| -> Option<NaiveDateTime> {
            seen.borrow_mut().push(p.to_string());
            None
        };
        let draft = InputParser::parse("Ship it #next week @release", &recording);
        assert_eq!(*seen.borrow(), vec!["next week".to_string()]);
        assert_eq!(draft.title, "Ship it");
        assert!(draft.due.is_none());
    }

    #[test]
    fn unresolvable_date_is_absent_but_stripped() {
        let draft = InputParser::parse("Plan trip #someday", &never);
        assert_eq!(draft.title, "Plan trip");
        assert!(draft.due.is_none());
    }

    #[test]
    fn empty_date_phrase() {
        let seen = std::cell::Cell::new(false);
        let recording = |_: &str| -> Option<NaiveDateTime> {
            seen.set(true);
            None
        };
        let draft = InputParser::parse("Fix bug # @dev", &recording);
        assert!(!seen.get());
        assert!(draft.due.is_none());
        assert_eq!(draft.labels, vec!["dev"]);
        assert_eq!(draft.title, "Fix bug");
    }

    #[test]
    fn only_markers_gives_empty_title() {
        let draft = InputParser::parse("@home #today", &resolver());
        assert_eq!(draft.title, "");
        assert!(!draft.has_title());
        assert_eq!(draft.labels, vec!["home"]);
        assert!(draft.due.is_some());
    }

    #[test]
    fn first_date_phrase_wins() {
        let seen = std::cell::RefCell::new(Vec::new());
        let recording = |p: &str| -> Option<NaiveDateTime> {
            seen.borrow_mut().push(p.to_string());
            None
        };
        let draft = InputParser::parse("Report #monday, review #friday", &recording);
        assert_eq!(*seen.borrow(), vec!["monday, review".to_string()]);
        assert_eq!(draft.title, "Report");
    }

    #[test]
    fn punctuated_dates_stay_in_the_phrase() {
        let r = resolver();
        let at = |y: i32, m: u32, d: u32, h: u32, min: u32| NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(h, min, 0));

        let draft = InputParser::parse("Call #tomorrow at 17:30", &r);
        assert_eq!(draft.title, "Call");
        assert_eq!(draft.due, at(2026, 3, 5, 17, 30));

        let draft = InputParser::parse("Ship #2026-12-25 @rel", &r);
        assert_eq!(draft.title, "Ship");
        assert_eq!(draft.labels, vec!["rel"]);
        assert_eq!(draft.due, at(2026, 12, 25, 12, 0));

        let draft = InputParser::parse("Pay rent #3/15", &r);
        assert_eq!(draft.title, "Pay rent");
        assert_eq!(draft.due, at(2026, 3, 15, 12, 0));
    }

    #[test]
    fn out_of_range_offset_is_no_date() {
        let r = resolver();
        for text in ["Renew #in 99999999 days", "Renew #in 4294967295 months", "Renew #in 4000000 months"] {
            let draft = InputParser::parse(text, &r);
            assert_eq!(draft.title, "Renew");
            assert!(draft.due.is_none(), "{}", text);
        }
    }

    #[test]
    fn bare_at_sign_is_kept() {
        let draft = InputParser::parse("Lunch @ noon", &never);
        assert_eq!(draft.title, "Lunch @ noon");
        assert!(draft.labels.is_empty());
    }
}
