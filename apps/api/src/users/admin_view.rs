//! The admin dashboard's derived view: filter → stable sort → export.
//!
//! Pure functions over listing summaries. The store is consulted once for
//! the full list; everything after that is view state.

use serde::Deserialize;

use crate::models::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    AtsScore,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Case-insensitive substring filter over "first last email jobRole",
/// optionally narrowed to one status ("all" disables the narrowing).
pub fn filter_users(
    users: Vec<UserSummary>,
    search: &str,
    status: Option<&str>,
) -> Vec<UserSummary> {
    let needle = search.to_lowercase();
    users
        .into_iter()
        .filter(|user| {
            let haystack = format!(
                "{} {} {} {}",
                user.first_name, user.last_name, user.email, user.job_role
            )
            .to_lowercase();
            let matches_search = needle.is_empty() || haystack.contains(&needle);
            let matches_status = status.map_or(true, |s| s == "all" || user.status == s);
            matches_search && matches_status
        })
        .collect()
}

/// Stable sort: entries with equal keys keep their listing order.
pub fn sort_users(users: &mut [UserSummary], key: SortKey, order: SortOrder) {
    users.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => {
                let a_name = format!("{} {}", a.first_name, a.last_name).to_lowercase();
                let b_name = format!("{} {}", b.first_name, b.last_name).to_lowercase();
                a_name.cmp(&b_name)
            }
            SortKey::AtsScore => a.ats_score.cmp(&b.ats_score),
            SortKey::Date => a.timestamp.cmp(&b.timestamp),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

const CSV_HEADERS: &[&str] = &[
    "ID",
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Job Role",
    "ATS Score",
    "Status",
    "Registration Date",
];

/// Fields containing a comma, quote, or newline are wrapped and inner
/// quotes doubled.
fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders the (already filtered/sorted) view as CSV.
pub fn to_csv(users: &[UserSummary]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADERS.join(","));
    out.push('\n');

    for user in users {
        let row = [
            user.id.to_string(),
            user.first_name.clone(),
            user.last_name.clone(),
            user.email.clone(),
            user.contact.clone(),
            user.job_role.clone(),
            user.ats_score.to_string(),
            user.status.clone(),
            user.timestamp.to_rfc3339(),
        ];
        let line: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn make_summary(
        first: &str,
        last: &str,
        email: &str,
        job_role: &str,
        ats_score: i32,
        status: &str,
        day: u32,
    ) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap(),
            role: "student".to_string(),
            contact: "555-0100".to_string(),
            address: String::new(),
            job_role: job_role.to_string(),
            status: status.to_string(),
            ats_score,
        }
    }

    fn fixture() -> Vec<UserSummary> {
        vec![
            make_summary("Ada", "Lovelace", "ada@example.com", "Backend Developer", 80, "active", 1),
            make_summary("Grace", "Hopper", "grace@example.com", "Compiler Engineer", 95, "active", 2),
            make_summary("Linus", "Torvalds", "linus@example.com", "Kernel Hacker", 80, "inactive", 3),
        ]
    }

    #[test]
    fn test_filter_is_case_insensitive_over_name_email_and_role() {
        let by_name = filter_users(fixture(), "ADA", None);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].first_name, "Ada");

        let by_email = filter_users(fixture(), "grace@", None);
        assert_eq!(by_email.len(), 1);

        let by_role = filter_users(fixture(), "kernel", None);
        assert_eq!(by_role.len(), 1);
        assert_eq!(by_role[0].first_name, "Linus");
    }

    #[test]
    fn test_empty_search_keeps_everyone() {
        assert_eq!(filter_users(fixture(), "", None).len(), 3);
    }

    #[test]
    fn test_status_filter_narrows_and_all_disables() {
        assert_eq!(filter_users(fixture(), "", Some("inactive")).len(), 1);
        assert_eq!(filter_users(fixture(), "", Some("all")).len(), 3);
    }

    #[test]
    fn test_sort_by_score_desc() {
        let mut users = fixture();
        sort_users(&mut users, SortKey::AtsScore, SortOrder::Desc);
        assert_eq!(users[0].first_name, "Grace");
    }

    #[test]
    fn test_equal_keys_keep_listing_order() {
        // Ada and Linus share a score; Ada was listed first.
        let mut users = fixture();
        sort_users(&mut users, SortKey::AtsScore, SortOrder::Asc);
        assert_eq!(users[0].first_name, "Ada");
        assert_eq!(users[1].first_name, "Linus");
        assert_eq!(users[2].first_name, "Grace");
    }

    #[test]
    fn test_sort_by_date() {
        let mut users = fixture();
        sort_users(&mut users, SortKey::Date, SortOrder::Desc);
        assert_eq!(users[0].first_name, "Linus");
    }

    #[test]
    fn test_csv_has_header_and_one_line_per_user() {
        let csv = to_csv(&fixture());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID,First Name,Last Name"));
    }

    #[test]
    fn test_csv_quotes_fields_with_commas_and_quotes() {
        let mut user = make_summary("Ada", "Lovelace", "ada@example.com", "", 80, "active", 1);
        user.job_role = "Backend, \"Platform\"".to_string();
        let csv = to_csv(&[user]);
        assert!(csv.contains("\"Backend, \"\"Platform\"\"\""));
    }
}
