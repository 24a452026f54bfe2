use crate::router::respond;
use crate::tests::utils::{body_json, get, init_test_app, init_test_app_with_failing_mail, post_form, submit};

#[test]
fn submission_returns_id_and_notifies_citizen() {
    let (app, outbox) = init_test_app();

    let resp = respond(
        post_form(
            "/complaints",
            "name=Amina&contact=0772123456&email=amina%40example.org&location=Main+St&description=No+water+since+Monday",
            None,
        ),
        &app,
    );
    assert_eq!(resp.status(), 201);
    let body = body_json(resp);
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["status"], "New");

    let emails = outbox.with_subject("Complaint Received");
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].recipient, "amina@example.org");
    assert_eq!(
        emails[0].body,
        format!("Your complaint has been received.\n\nComplaint ID: {id}\nCheck status: http://water.test/lookup")
    );

    let sms: Vec<_> = outbox.sent().into_iter().filter(|s| s.channel == "sms").collect();
    assert_eq!(sms.len(), 1);
    assert_eq!(sms[0].recipient, "0772123456");
    assert_eq!(
        sms[0].body,
        format!("Complaint #{id} received. Use your ID to check status online.")
    );
}

#[test]
fn submission_without_email_sends_no_email() {
    let (app, outbox) = init_test_app();
    submit(&app, "location=Main+St&description=Leak");
    assert!(outbox.with_subject("Complaint Received").is_empty());
}

#[test]
fn submission_reports_every_invalid_field() {
    let (app, outbox) = init_test_app();

    let resp = respond(post_form("/complaints", "email=not-an-email", None), &app);
    assert_eq!(resp.status(), 400);
    let body = body_json(resp);
    assert_eq!(body["error"], "validation");
    assert_eq!(body["fields"]["location"], "This field is required.");
    assert_eq!(body["fields"]["description"], "This field is required.");
    assert_eq!(body["fields"]["email"], "Enter a valid email address.");

    assert!(outbox.sent().is_empty());
}

#[test]
fn submission_survives_mail_outage() {
    let app = init_test_app_with_failing_mail();
    let resp = respond(
        post_form(
            "/complaints",
            "email=amina%40example.org&location=Main+St&description=Dry+taps",
            None,
        ),
        &app,
    );
    assert_eq!(resp.status(), 201);
}

#[test]
fn lookup_needs_matching_id_and_contact() {
    let (app, _) = init_test_app();
    let id = submit(&app, "contact=0772123456&location=Main+St&description=Low+pressure");

    let ok = respond(
        get(&format!("/lookup?complaint_id={id}&contact=0772123456"), None),
        &app,
    );
    assert_eq!(ok.status(), 200);
    let body = body_json(ok);
    assert_eq!(body["id"], id);
    assert_eq!(body["status"], "New");

    let wrong = respond(
        post_form("/lookup", &format!("complaint_id={id}&contact=0700000000"), None),
        &app,
    );
    assert_eq!(wrong.status(), 404);
    assert_eq!(body_json(wrong)["message"], "No matching complaint found.");
}

#[test]
fn lookup_with_blank_contact_is_rejected() {
    let (app, _) = init_test_app();
    submit(&app, "location=Main+St&description=Low+pressure");

    let resp = respond(post_form("/lookup", "complaint_id=1&contact=+", None), &app);
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(resp)["fields"]["contact"], "This field is required.");
}

#[test]
fn unknown_routes_are_404() {
    let (app, _) = init_test_app();
    let resp = respond(get("/nowhere", None), &app);
    assert_eq!(resp.status(), 404);
}

#[test]
fn bad_token_is_401_even_on_public_routes() {
    let (app, _) = init_test_app();
    let resp = respond(get("/lookup?complaint_id=1&contact=1", Some("bogus")), &app);
    assert_eq!(resp.status(), 401);
}
