use crate::app::App;
use crate::auth::{register_staff, Role};
use crate::config::Config;
use crate::db::connection::init_db;
use crate::router::respond;
use astra::Server;
use log::{error, info};
use std::net::SocketAddr;

mod app;
mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod forms;
mod notify;
mod reports;
mod responses;
mod router;
mod service;

#[cfg(test)]
mod tests;

const USAGE: &str = "usage: water_complaints [serve] | add-staff <username> <technician|manager> [email]";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let app = App::new(config);

    if let Err(e) = init_db(&app.db) {
        error!("database initialization failed: {e}");
        std::process::exit(1);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("serve") => serve(app),
        Some("add-staff") => add_staff(&app, &args[1..]),
        Some(other) => {
            eprintln!("unknown command {other:?}\n{USAGE}");
            std::process::exit(2);
        }
    }
}

fn add_staff(app: &App, args: &[String]) {
    let (username, role) = match (args.first(), args.get(1).and_then(|r| Role::parse_staff(r))) {
        (Some(u), Some(r)) => (u, r),
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };
    let email = args.get(2).map(String::as_str);

    match register_staff(&app.db, username, role, email, service::now_unix()) {
        Ok((member, token)) => {
            println!("Created {} {} (id {})", member.role.as_str(), member.username, member.id);
            println!("Bearer token (shown once): {token}");
        }
        Err(e) => {
            error!("could not create staff member: {e}");
            std::process::exit(1);
        }
    }
}

fn serve(app: App) {
    let addr: SocketAddr = match app.config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("invalid BIND_ADDR {:?}: {e}", app.config.bind_addr);
            std::process::exit(1);
        }
    };
    info!("starting server at http://{addr}");

    let server = Server::bind(&addr).max_workers(app.config.max_workers);

    let result = server.serve(move |req, _info| respond(req, &app));

    if let Err(e) = result {
        error!("server ended with error: {e}");
    }

    info!("server shut down");
}
