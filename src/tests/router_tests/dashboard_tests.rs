use crate::auth::Role;
use crate::router::respond;
use crate::tests::utils::{add_staff, body_json, get, init_test_app, post_form, submit};

fn assign(app: &crate::app::App, manager: &str, complaint: i64, technician: i64) {
    let resp = respond(
        post_form(
            "/admin/assign",
            &format!("complaint={complaint}&technician={technician}"),
            Some(manager),
        ),
        app,
    );
    assert_eq!(resp.status(), 200);
}

fn set_status(app: &crate::app::App, token: &str, complaint: i64, status: &str) {
    let resp = respond(
        post_form(&format!("/complaints/{complaint}/status"), &format!("status={status}"), Some(token)),
        app,
    );
    assert_eq!(resp.status(), 200);
}

#[test]
fn technician_dashboard_is_scoped_to_their_complaints() {
    let (app, _) = init_test_app();
    let (_, manager) = add_staff(&app, "alice", Role::Manager);
    let (bob, bob_token) = add_staff(&app, "bob", Role::Technician);
    let (carol, _) = add_staff(&app, "carol", Role::Technician);

    let a = submit(&app, "location=Main+St&description=Leak");
    let b = submit(&app, "location=Main+St&description=Dry+tap");
    let c = submit(&app, "location=Kabale&description=Burst");
    assign(&app, &manager, a, bob.id);
    assign(&app, &manager, b, bob.id);
    assign(&app, &manager, c, carol.id);
    set_status(&app, &bob_token, a, "CLO");

    let body = body_json(respond(get("/technician", Some(&bob_token)), &app));
    assert_eq!(body["technician"], "bob");
    assert_eq!(body["metrics"]["total"], 2);
    assert_eq!(body["metrics"]["status_counts"]["closed"], 1);
    assert_eq!(body["metrics"]["status_counts"]["in_progress"], 1);
    assert_eq!(body["metrics"]["resolution"]["sample_size"], 1);
    let ids: Vec<i64> = body["complaints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![b, a]);

    let as_manager = respond(get("/technician", Some(&manager)), &app);
    assert_eq!(as_manager.status(), 403);
}

#[test]
fn global_metrics_for_managers_only() {
    let (app, _) = init_test_app();
    let (_, manager) = add_staff(&app, "alice", Role::Manager);
    let (bob, tech) = add_staff(&app, "bob", Role::Technician);

    let a = submit(&app, "location=Main+St&description=Leak");
    let b = submit(&app, "location=Main+St&description=Dry+tap");
    submit(&app, "location=Kabale&description=Burst");
    assign(&app, &manager, a, bob.id);
    set_status(&app, &tech, a, "FIX");
    // Fixed without ever being assigned.
    set_status(&app, &manager, b, "FIX");

    let body = body_json(respond(get("/metrics", Some(&manager)), &app));
    assert_eq!(body["total"], 3);
    assert_eq!(body["breakdown"]["new"], 1);
    assert_eq!(body["breakdown"]["fixed"], 2);
    assert_eq!(body["breakdown"]["closed"], 1);
    assert_eq!(body["resolution"]["sample_size"], 2);
    assert_eq!(body["top_locations"][0]["location"], "Main St");
    assert_eq!(body["top_locations"][0]["count"], 2);
    let monthly = body["monthly"].as_array().unwrap();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0]["count"], 3);

    assert_eq!(respond(get("/metrics", Some(&tech)), &app).status(), 403);
    assert_eq!(respond(get("/metrics", None), &app).status(), 401);
}

#[test]
fn admin_triage_filters_and_searches() {
    let (app, _) = init_test_app();
    let (_, manager) = add_staff(&app, "alice", Role::Manager);
    let (bob, tech) = add_staff(&app, "bob", Role::Technician);

    let a = submit(&app, "location=Main+St&description=Leak");
    let b = submit(&app, "location=Kabale&description=Burst+pipe");
    assign(&app, &manager, a, bob.id);
    set_status(&app, &tech, a, "CLO");

    let all = body_json(respond(get("/admin", Some(&manager)), &app));
    assert_eq!(all["complaints"].as_array().unwrap().len(), 2);
    assert_eq!(all["technicians"][0]["username"], "bob");

    let closed = body_json(respond(get("/admin?filter=closed_by_tech", Some(&manager)), &app));
    let closed = closed["complaints"].as_array().unwrap();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0]["id"], a);

    let searched = body_json(respond(get("/admin?q=pipe", Some(&manager)), &app));
    let searched = searched["complaints"].as_array().unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0]["id"], b);

    assert_eq!(respond(get("/admin", Some(&tech)), &app).status(), 403);
}
