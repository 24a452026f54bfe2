use crate::auth::{Actor, Role};
use crate::db::status_updates::list_updates;
use crate::errors::ServerError;
use crate::router::respond;
use crate::service::update_status;
use crate::tests::utils::{add_staff, body_json, get, init_test_app, post_form, submit};
use std::collections::HashMap;

#[test]
fn assigned_technician_updates_and_sees_history() {
    let (app, outbox) = init_test_app();
    let (_, manager) = add_staff(&app, "alice", Role::Manager);
    let (bob, tech) = add_staff(&app, "bob", Role::Technician);
    let id = submit(&app, "email=amina%40example.org&location=Main+St&description=Leak");

    respond(
        post_form("/admin/assign", &format!("complaint={id}&technician={}", bob.id), Some(&manager)),
        &app,
    );

    let resp = respond(
        post_form(
            &format!("/complaints/{id}/status"),
            "status=Fixed&comment=Replaced+valve",
            Some(&tech),
        ),
        &app,
    );
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp)["complaint"]["status"], "FIX");

    let detail = body_json(respond(get(&format!("/complaints/{id}"), Some(&tech)), &app));
    assert_eq!(detail["status_label"], "Fixed");
    assert_eq!(detail["assignee"]["username"], "bob");
    let history = detail["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["status"], "INP");
    assert_eq!(history[1]["status"], "FIX");
    assert_eq!(history[1]["comment"], "Replaced valve");

    let mails = outbox.with_subject("Complaint Status Update");
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].body, format!("Your complaint #{id} status is now Fixed."));
}

#[test]
fn technician_cannot_touch_someone_elses_complaint() {
    let (app, _) = init_test_app();
    let (_, tech) = add_staff(&app, "bob", Role::Technician);
    let id = submit(&app, "location=Main+St&description=Leak");

    let update = respond(
        post_form(&format!("/complaints/{id}/status"), "status=FIX", Some(&tech)),
        &app,
    );
    assert_eq!(update.status(), 403);

    let detail = respond(get(&format!("/complaints/{id}"), Some(&tech)), &app);
    assert_eq!(detail.status(), 403);

    let history = app.db.with_conn(|conn| list_updates(conn, id)).unwrap();
    assert!(history.is_empty());
}

#[test]
fn unknown_status_is_a_validation_error() {
    let (app, _) = init_test_app();
    let (_, manager) = add_staff(&app, "alice", Role::Manager);
    let id = submit(&app, "location=Main+St&description=Leak");

    let resp = respond(
        post_form(&format!("/complaints/{id}/status"), "status=DONE", Some(&manager)),
        &app,
    );
    assert_eq!(resp.status(), 400);
    assert_eq!(
        body_json(resp)["fields"]["status"],
        "Select a valid choice. DONE is not one of the available choices."
    );
}

#[test]
fn missing_complaint_is_404() {
    let (app, _) = init_test_app();
    let (_, manager) = add_staff(&app, "alice", Role::Manager);

    assert_eq!(respond(get("/complaints/999", Some(&manager)), &app).status(), 404);
    assert_eq!(respond(get("/complaints/abc", Some(&manager)), &app).status(), 404);
    assert_eq!(
        respond(post_form("/complaints/999/status", "status=FIX", Some(&manager)), &app).status(),
        404
    );
}

#[test]
fn citizens_cannot_read_details() {
    let (app, _) = init_test_app();
    let id = submit(&app, "location=Main+St&description=Leak");
    assert_eq!(respond(get(&format!("/complaints/{id}"), None), &app).status(), 401);
}

#[test]
fn concurrent_closes_let_exactly_one_win() {
    let (app, _) = init_test_app();
    let (alice, _) = add_staff(&app, "alice", Role::Manager);
    let id = submit(&app, "location=Main+St&description=Leak");
    let actor = Actor::Staff(alice);

    let results: Vec<Result<_, ServerError>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let app = &app;
                let actor = &actor;
                s.spawn(move || {
                    let form = HashMap::from([
                        ("status".to_string(), "CLO".to_string()),
                        ("comment".to_string(), format!("closed by worker {i}")),
                    ]);
                    update_status(app, actor, id, &form)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, ServerError::TerminalState { id: got, .. } if *got == id)));

    let history = app.db.with_conn(|conn| list_updates(conn, id)).unwrap();
    assert_eq!(history.len(), 1);
}
