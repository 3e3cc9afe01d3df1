use crate::config::Config;
use crate::db::{init_db, Database, SCHEMA_SQL};
use crate::router::{respond, AppState};
use astra::Server;
use tracing::{error, info};

mod config;
mod db;
mod domain;
mod errors;
mod responses;
mod router;
mod telemetry;

#[cfg(test)]
mod tests;

fn main() {
    telemetry::init();

    // 1️⃣ Load configuration (file, then environment)
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {e}");
            std::process::exit(1);
        }
    };

    // 2️⃣ Open the connection pool, and the schema if asked to
    let db = match Database::open(&config.database) {
        Ok(db) => db,
        Err(e) => {
            error!(path = %config.database.path.display(), "❌ Database open failed: {e}");
            std::process::exit(1);
        }
    };
    if config.database.init_schema {
        if let Err(e) = init_db(&db, SCHEMA_SQL) {
            error!("❌ Database initialization failed: {e}");
            std::process::exit(1);
        }
    }

    // 3️⃣ Start the server
    let addr = match config.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("❌ {e}");
            std::process::exit(1);
        }
    };
    info!(
        environment = ?config.environment,
        pool_size = config.database.pool_size,
        "Starting server at http://{addr}"
    );

    let state = AppState {
        db,
        env: config.environment,
    };
    let server = Server::bind(&addr).max_workers(config.server.max_workers);

    // 4️⃣ Serve requests, passing the state into the closure
    let result = server.serve(move |req, _info| respond(req, &state));

    if let Err(e) = result {
        error!("Server ended with error: {e}");
    }

    info!("Server shut down cleanly.");
}
