//! Mapping loosely typed HQ records into the fixed internal shapes
//!
//! The upstream emits PascalCase or camelCase depending on build and
//! endpoint, so every logical field is resolved through an ordered list of
//! candidate keys and the first present, non-null value wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::models::{Assignment, Interview, Role, User, Workspace, WorkspaceStatus};

/// Look up the first present, non-null value among the candidate keys.
/// Keys containing `.` traverse nested objects (`responsible.name`).
pub fn first_present<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        let mut current = record;
        let mut found = true;
        for part in key.split('.') {
            match current.get(part) {
                Some(next) => current = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found && !current.is_null() {
            return Some(current);
        }
    }
    None
}

/// Like [`first_present`] but only accepts non-empty trimmed strings.
pub fn first_nonempty_string(record: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(Value::String(s)) = first_present(record, &[key]) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Resolve the login name across the spellings different HQ builds use.
pub fn pick_login_name(record: &Value) -> Option<String> {
    first_nonempty_string(
        record,
        &[
            "UserName", "userName", "username", "LoginName", "loginName", "login_name", "Login",
            "login",
        ],
    )
}

/// Coerce an id value: non-empty string, or a bare number rendered as one.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_field(record: &Value, keys: &[&str]) -> Option<String> {
    first_present(record, keys).and_then(id_string)
}

/// Loose truthiness across the representations HQ uses for flags.
fn loose_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

fn bool_field(record: &Value, keys: &[&str]) -> bool {
    first_present(record, keys).map(loose_bool).unwrap_or(false)
}

/// Non-negative integer, tolerating numeric strings. Defaults to 0.
fn count_field(record: &Value, keys: &[&str]) -> i64 {
    let value = match first_present(record, keys) {
        Some(v) => v,
        None => return 0,
    };
    let n = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    n.unwrap_or(0).max(0)
}

/// The user id across its known spellings, coerced to a string.
pub fn user_id(raw: &Value) -> Option<String> {
    id_field(raw, &["UserId", "userId", "Id", "id"])
}

/// Normalize a raw user record from any of the role-scoped listings.
///
/// `fallback_role` is the role implied by the endpoint the record came from
/// (e.g. Supervisor for the supervisors listing); it applies only when the
/// record itself carries no usable role field.
pub fn normalize_user(raw: &Value, fallback_role: Role) -> User {
    let username = pick_login_name(raw);
    let role = first_present(raw, &["Role", "role", "UserRole", "userRole"])
        .and_then(|v| v.as_str())
        .and_then(Role::normalize)
        .unwrap_or(fallback_role);

    User {
        id: user_id(raw),
        name: first_nonempty_string(raw, &["FullName", "fullName", "name"]).or_else(|| username.clone()),
        role: Some(role),
        email: first_nonempty_string(raw, &["Email", "email"]),
        phone: first_nonempty_string(raw, &["PhoneNumber", "phoneNumber", "phone"]),
        workspace: first_nonempty_string(
            raw,
            &["Workspace", "workspace", "WorkspaceName", "workspaceName"],
        ),
        supervisor: None,
        is_archived: bool_field(raw, &["IsArchived", "isArchived"]),
        is_locked: bool_field(raw, &["IsLocked", "isLocked"]),
        creation_date: first_nonempty_string(raw, &["CreationDate", "creationDate"]),
        username,
    }
}

/// Normalize a workspace record. Records without a usable name are dropped
/// since the name is the scoping key for every other call.
pub fn normalize_workspace(raw: &Value) -> Option<Workspace> {
    let name = first_nonempty_string(raw, &["name", "Name"])?;
    // Some responses provide DisabledAtUtc instead of a boolean.
    let disabled = match first_present(raw, &["disabled", "isDisabled"]) {
        Some(value) => loose_bool(value),
        None => first_present(raw, &["DisabledAtUtc"]).is_some(),
    };

    Some(Workspace {
        name,
        display_name: first_nonempty_string(raw, &["display_name", "displayName", "DisplayName"]),
        disabled,
        description: first_nonempty_string(raw, &["description", "Description"]),
    })
}

pub fn normalize_assignment(raw: &Value) -> Assignment {
    Assignment {
        id: id_field(raw, &["id"]),
        questionnaire_title: first_nonempty_string(
            raw,
            &["questionnaireTitle", "questionnaire.title", "questionnaireId"],
        ),
        workspace: first_nonempty_string(
            raw,
            &["workspace", "workspaceName", "workspace.display_name"],
        ),
        responsible: first_nonempty_string(raw, &["responsible", "responsibleName", "responsible.name"]),
        status: first_nonempty_string(raw, &["status", "Status"]),
        quantity: count_field(raw, &["quantity", "size"]),
        interviews_count: count_field(raw, &["interviewsCount", "interviews_count"]),
    }
}

pub fn normalize_interview(raw: &Value) -> Interview {
    let created_at = first_nonempty_string(raw, &["createdAt", "created_at", "created"])
        .map(|s| canonicalize_timestamp(&s));

    Interview {
        interview_id: id_field(raw, &["id", "interview_id"]),
        assignment_id: id_field(raw, &["assignmentId", "assignment_id"]),
        interviewer: first_nonempty_string(raw, &["interviewer", "interviewerName", "interviewer.name"]),
        status: first_nonempty_string(raw, &["status", "Status"]),
        created_at,
    }
}

/// Parse the fallback counters from the workspace status endpoint.
pub fn normalize_workspace_status(raw: &Value) -> WorkspaceStatus {
    let count = |keys: &[&str]| {
        first_present(raw, keys).and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    };

    WorkspaceStatus {
        supervisors_count: count(&["SupervisorsCount", "supervisorsCount", "supervisors_count"]),
        interviewers_count: count(&["InterviewersCount", "interviewersCount", "interviewers_count"]),
    }
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS`, keeping the raw string
/// when it matches none of the formats HQ is known to emit.
fn canonicalize_timestamp(raw: &str) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format(FORMAT).to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return dt.format(FORMAT).to_string();
        }
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_present_respects_candidate_order() {
        let record = json!({"Id": "pascal", "id": "lower"});
        let value = first_present(&record, &["UserId", "userId", "Id", "id"]).unwrap();
        assert_eq!(value, "pascal");
    }

    #[test]
    fn first_present_skips_nulls() {
        let record = json!({"UserId": null, "id": "5"});
        let value = first_present(&record, &["UserId", "userId", "Id", "id"]).unwrap();
        assert_eq!(value, "5");
    }

    #[test]
    fn first_present_traverses_dotted_paths() {
        let record = json!({"responsible": {"name": "ana"}});
        let value = first_present(&record, &["responsibleName", "responsible.name"]).unwrap();
        assert_eq!(value, "ana");
    }

    #[test]
    fn pick_login_name_order_and_trimming() {
        let record = json!({"login": "last", "userName": "  mid  ", "UserName": "first"});
        assert_eq!(pick_login_name(&record), Some("first".to_string()));

        let record = json!({"UserName": "   ", "loginName": "fallback"});
        assert_eq!(pick_login_name(&record), Some("fallback".to_string()));

        assert_eq!(pick_login_name(&json!({"FullName": "no login"})), None);
    }

    #[test]
    fn normalize_user_maps_pascal_case_record() {
        let raw = json!({"UserId": "5", "UserName": "bob", "Role": "SUPERVISOR"});
        let user = normalize_user(&raw, Role::Interviewer);
        assert_eq!(user.id.as_deref(), Some("5"));
        assert_eq!(user.username.as_deref(), Some("bob"));
        assert_eq!(user.role, Some(Role::Supervisor));
    }

    #[test]
    fn normalize_user_applies_fallback_role() {
        let raw = json!({"UserId": "7", "UserName": "ivy"});
        let user = normalize_user(&raw, Role::Interviewer);
        assert_eq!(user.role, Some(Role::Interviewer));
    }

    #[test]
    fn normalize_user_defaults_flags_to_false() {
        let raw = json!({"UserName": "x"});
        let user = normalize_user(&raw, Role::Supervisor);
        assert!(!user.is_archived);
        assert!(!user.is_locked);
    }

    #[test]
    fn normalize_user_coerces_loose_booleans() {
        let raw = json!({"UserName": "x", "IsLocked": "true", "isArchived": 1});
        let user = normalize_user(&raw, Role::Supervisor);
        assert!(user.is_locked);
        assert!(user.is_archived);
    }

    #[test]
    fn normalize_user_numeric_id() {
        let raw = json!({"id": 42});
        let user = normalize_user(&raw, Role::Interviewer);
        assert_eq!(user.id.as_deref(), Some("42"));
    }

    #[test]
    fn normalize_user_name_falls_back_to_username() {
        let raw = json!({"UserName": "sup1"});
        let user = normalize_user(&raw, Role::Supervisor);
        assert_eq!(user.name.as_deref(), Some("sup1"));
    }

    #[test]
    fn workspace_disabled_from_explicit_flag() {
        let raw = json!({"name": "main", "disabled": true});
        assert!(normalize_workspace(&raw).unwrap().disabled);
    }

    #[test]
    fn workspace_disabled_inferred_from_timestamp() {
        let raw = json!({"Name": "main", "DisabledAtUtc": "2024-01-01T00:00:00Z"});
        assert!(normalize_workspace(&raw).unwrap().disabled);

        let raw = json!({"Name": "main", "DisabledAtUtc": null});
        assert!(!normalize_workspace(&raw).unwrap().disabled);
    }

    #[test]
    fn workspace_without_name_is_dropped() {
        assert!(normalize_workspace(&json!({"displayName": "x"})).is_none());
        assert!(normalize_workspace(&json!({"name": "  "})).is_none());
    }

    #[test]
    fn assignment_nested_and_flat_fields() {
        let raw = json!({
            "id": 12,
            "questionnaire": {"title": "Census"},
            "responsible": {"name": "ana"},
            "quantity": "30",
            "interviewsCount": 4
        });
        let a = normalize_assignment(&raw);
        assert_eq!(a.id.as_deref(), Some("12"));
        assert_eq!(a.questionnaire_title.as_deref(), Some("Census"));
        assert_eq!(a.responsible.as_deref(), Some("ana"));
        assert_eq!(a.quantity, 30);
        assert_eq!(a.interviews_count, 4);
    }

    #[test]
    fn assignment_counts_never_negative() {
        let a = normalize_assignment(&json!({"quantity": -5}));
        assert_eq!(a.quantity, 0);
        assert_eq!(a.interviews_count, 0);
    }

    #[test]
    fn interview_timestamp_canonicalized() {
        let raw = json!({"id": "i1", "createdAt": "2024-03-01T10:15:30Z"});
        let i = normalize_interview(&raw);
        assert_eq!(i.created_at.as_deref(), Some("2024-03-01 10:15:30"));
    }

    #[test]
    fn interview_unparsable_timestamp_kept_raw() {
        let raw = json!({"id": "i1", "created": "sometime last week"});
        let i = normalize_interview(&raw);
        assert_eq!(i.created_at.as_deref(), Some("sometime last week"));
    }

    #[test]
    fn interview_nested_interviewer_name() {
        let raw = json!({"id": "i1", "interviewer": {"name": "ana"}});
        let i = normalize_interview(&raw);
        assert_eq!(i.interviewer.as_deref(), Some("ana"));
    }

    #[test]
    fn workspace_status_counters() {
        let raw = json!({"SupervisorsCount": 3, "InterviewersCount": "11"});
        let status = normalize_workspace_status(&raw);
        assert_eq!(status.supervisors_count, Some(3));
        assert_eq!(status.interviewers_count, Some(11));

        let empty = normalize_workspace_status(&json!({}));
        assert_eq!(empty.supervisors_count, None);
    }
}
