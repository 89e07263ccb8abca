use crate::ipc::error::{err, ok, roster_err};
use crate::ipc::types::{AppState, Request};
use crate::record::StudentView;
use crate::roster::{Roster, StudentDraft};
use serde_json::json;

/// Text of a form field. Numbers are accepted as their decimal text so
/// they go through the same integer parsing as typed input.
fn field_text(req: &Request, key: &str) -> String {
    match req.params.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn parse_draft(req: &Request) -> Result<StudentDraft, serde_json::Value> {
    let cw1 = field_text(req, "cw1");
    let cw2 = field_text(req, "cw2");
    let cw3 = field_text(req, "cw3");
    StudentDraft::parse(
        &field_text(req, "code"),
        &field_text(req, "name"),
        [cw1.as_str(), cw2.as_str(), cw3.as_str()],
        &field_text(req, "exam"),
    )
    .map_err(|e| {
        err(
            &req.id,
            "validation_failed",
            e.to_string(),
            Some(json!({ "reason": e.reason() })),
        )
    })
}

fn require_key(req: &Request) -> Result<String, serde_json::Value> {
    match req.params.get("key").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(err(&req.id, "bad_params", "key must not be empty", None)),
        None => Err(err(&req.id, "bad_params", "missing key", None)),
    }
}

fn views(roster: &Roster) -> Vec<StudentView> {
    roster.students().iter().map(StudentView::from).collect()
}

fn handle_students_refresh(roster: &mut Roster, req: &Request) -> serde_json::Value {
    match roster.refresh() {
        Ok(report) => ok(
            &req.id,
            json!({
                "studentCount": report.student_count,
                "codesRepaired": report.codes_repaired,
            }),
        ),
        Err(e) => roster_err(&req.id, &e),
    }
}

fn handle_students_list(roster: &mut Roster, req: &Request) -> serde_json::Value {
    let summary = roster.class_summary();
    ok(
        &req.id,
        json!({
            "students": views(roster),
            "classSize": summary.class_size,
            "classAverage": summary.class_average,
        }),
    )
}

fn handle_students_find(roster: &mut Roster, req: &Request) -> serde_json::Value {
    let key = match require_key(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    match roster.find_by_key(&key) {
        Some(s) => ok(&req.id, json!({ "student": StudentView::from(s) })),
        None => err(
            &req.id,
            "not_found",
            format!("no student found for '{key}'"),
            Some(json!({ "key": key })),
        ),
    }
}

fn handle_students_highest(roster: &mut Roster, req: &Request) -> serde_json::Value {
    match roster.highest() {
        Ok(s) => ok(&req.id, json!({ "student": StudentView::from(s) })),
        Err(e) => roster_err(&req.id, &e),
    }
}

fn handle_students_lowest(roster: &mut Roster, req: &Request) -> serde_json::Value {
    match roster.lowest() {
        Ok(s) => ok(&req.id, json!({ "student": StudentView::from(s) })),
        Err(e) => roster_err(&req.id, &e),
    }
}

fn handle_students_sort(roster: &mut Roster, req: &Request) -> serde_json::Value {
    let ascending = req
        .params
        .get("ascending")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    match roster.sort(ascending) {
        Ok(()) => ok(&req.id, json!({ "students": views(roster) })),
        Err(e) => roster_err(&req.id, &e),
    }
}

fn handle_students_create(roster: &mut Roster, req: &Request) -> serde_json::Value {
    let draft = match parse_draft(req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match roster.add(draft) {
        Ok(s) => ok(&req.id, json!({ "student": StudentView::from(s) })),
        Err(e) => roster_err(&req.id, &e),
    }
}

fn handle_students_update(roster: &mut Roster, req: &Request) -> serde_json::Value {
    let key = match require_key(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let draft = match parse_draft(req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match roster.update_by_key(&key, draft) {
        Ok(s) => ok(&req.id, json!({ "student": StudentView::from(s) })),
        Err(e) => roster_err(&req.id, &e),
    }
}

fn handle_students_delete(roster: &mut Roster, req: &Request) -> serde_json::Value {
    let key = match require_key(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    match roster.delete_by_key(&key) {
        Ok(removed) => ok(&req.id, json!({ "deleted": StudentView::from(&removed) })),
        Err(e) => roster_err(&req.id, &e),
    }
}

fn handle_students_summary(roster: &mut Roster, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(roster.class_summary()))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let handler: fn(&mut Roster, &Request) -> serde_json::Value = match req.method.as_str() {
        "students.refresh" => handle_students_refresh,
        "students.list" => handle_students_list,
        "students.find" => handle_students_find,
        "students.highest" => handle_students_highest,
        "students.lowest" => handle_students_lowest,
        "students.sort" => handle_students_sort,
        "students.create" => handle_students_create,
        "students.update" => handle_students_update,
        "students.delete" => handle_students_delete,
        "students.summary" => handle_students_summary,
        _ => return None,
    };
    let Some(roster) = state.roster.as_mut() else {
        return Some(err(
            &req.id,
            "no_workspace",
            "select a workspace first",
            None,
        ));
    };
    Some(handler(roster, req))
}
