use crate::auth::Role;
use crate::db::status_updates::list_updates;
use crate::router::respond;
use crate::tests::utils::{add_staff, body_json, get, init_test_app, post_form, submit};

fn seed_complaints(app: &crate::app::App, n: usize) {
    for i in 1..=n {
        submit(
            app,
            &format!("email=c{i}%40example.org&location=Ward+{i}&description=Leak+{i}"),
        );
    }
}

#[test]
fn manager_assigns_complaint_five_to_bob() {
    let (app, outbox) = init_test_app();
    let (_, manager) = add_staff(&app, "alice", Role::Manager);
    let (bob, _) = add_staff(&app, "bob", Role::Technician);
    seed_complaints(&app, 5);

    let resp = respond(
        post_form("/admin/assign", &format!("complaint=5&technician={}", bob.id), Some(&manager)),
        &app,
    );
    assert_eq!(resp.status(), 200);
    let body = body_json(resp);
    assert_eq!(body["complaint"]["status"], "INP");
    assert_eq!(body["complaint"]["assigned_to"], bob.id);
    assert_eq!(body["update"]["comment"], "Assigned to bob");
    assert_eq!(body["message"], "Complaint #5 assigned to bob.");

    let history = app.db.with_conn(|conn| list_updates(conn, 5)).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].comment, "Assigned to bob");

    let mails = outbox.with_subject("Complaint Assignment");
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].recipient, "c5@example.org");
    assert_eq!(mails[0].body, "Your complaint #5 has been assigned to bob.");
}

#[test]
fn closed_complaint_seven_cannot_be_reassigned_or_updated() {
    let (app, _) = init_test_app();
    let (_, manager) = add_staff(&app, "alice", Role::Manager);
    let (bob, _) = add_staff(&app, "bob", Role::Technician);
    seed_complaints(&app, 7);

    let closed = respond(
        post_form("/complaints/7/status", "status=CLOSED&comment=Done", Some(&manager)),
        &app,
    );
    assert_eq!(closed.status(), 200);
    let before = app.db.with_conn(|conn| list_updates(conn, 7)).unwrap();

    let reassign = respond(
        post_form("/admin/assign", &format!("complaint=7&technician={}", bob.id), Some(&manager)),
        &app,
    );
    assert_eq!(reassign.status(), 409);
    assert_eq!(
        body_json(reassign)["message"],
        "Complaint #7 is already Closed and cannot reassign."
    );

    let update = respond(
        post_form("/complaints/7/status", "status=NEW", Some(&manager)),
        &app,
    );
    assert_eq!(update.status(), 409);
    assert_eq!(
        body_json(update)["message"],
        "Complaint #7 is already Closed and cannot be updated."
    );

    let after = app.db.with_conn(|conn| list_updates(conn, 7)).unwrap();
    assert_eq!(before, after);

    let detail = body_json(respond(get("/complaints/7", Some(&manager)), &app));
    assert_eq!(detail["complaint"]["status"], "CLO");
    assert!(detail["complaint"]["assigned_to"].is_null());
}

#[test]
fn assignment_requires_both_fields() {
    let (app, _) = init_test_app();
    let (_, manager) = add_staff(&app, "alice", Role::Manager);

    let resp = respond(post_form("/admin/assign", "", Some(&manager)), &app);
    assert_eq!(resp.status(), 400);
    let body = body_json(resp);
    assert_eq!(body["fields"]["complaint"], "This field is required.");
    assert_eq!(body["fields"]["technician"], "This field is required.");
}

#[test]
fn assignment_to_a_non_technician_is_not_found() {
    let (app, _) = init_test_app();
    let (alice, manager) = add_staff(&app, "alice", Role::Manager);
    seed_complaints(&app, 1);

    let resp = respond(
        post_form("/admin/assign", &format!("complaint=1&technician={}", alice.id), Some(&manager)),
        &app,
    );
    assert_eq!(resp.status(), 404);
    assert_eq!(body_json(resp)["message"], "Technician not found.");
}

#[test]
fn only_managers_assign() {
    let (app, _) = init_test_app();
    let (bob, tech) = add_staff(&app, "bob", Role::Technician);
    seed_complaints(&app, 1);
    let form = format!("complaint=1&technician={}", bob.id);

    let anon = respond(post_form("/admin/assign", &form, None), &app);
    assert_eq!(anon.status(), 401);

    let as_tech = respond(post_form("/admin/assign", &form, Some(&tech)), &app);
    assert_eq!(as_tech.status(), 403);
}
