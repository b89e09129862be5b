use std::error::Error;
use std::sync::Arc;

use warp::Filter;

use audiofile::config::get_variable;
use audiofile::db::PgDb;
use audiofile::environment::Environment;
use audiofile::routes;
use audiofile::urls::Urls;
use futures::future::FutureExt;
use log::{info, initialize_logger};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let main_port: u16 = get_variable("AUDIOFILE_PORT")
        .parse()
        .expect("parse AUDIOFILE_PORT as u16");
    let admin_port: u16 = get_variable("AUDIOFILE_ADMIN_PORT")
        .parse()
        .expect("parse AUDIOFILE_ADMIN_PORT as u16");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool...");
    let connection_string = get_variable("AUDIOFILE_DB_CONNECTION_STRING");
    let pool = sqlx::Pool::connect(&connection_string)
        .await
        .expect("create database pool from AUDIOFILE_DB_CONNECTION_STRING");
    let db = Arc::new(PgDb::new(pool));

    let urls = Arc::new(Urls::new(
        get_variable("AUDIOFILE_BASE_URL"),
        get_variable("AUDIOFILE_RECORDS_PATH"),
    ));

    let environment = Environment::new(logger.clone(), db, urls);

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate =
        Arc::new(move || {
            let termination_sender = termination_sender.clone();

            async move {
            let termination_sender = termination_sender.clone();
                termination_sender.send(()).await.unwrap();
            }
            .boxed()
        });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            let terminate = terminate.clone();

            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let logger2 = logger.clone();

        let create_route = routes::make_create_route(environment.clone());
        let count_route = routes::make_count_route(environment.clone());
        let retrieve_route = routes::make_retrieve_route(environment.clone());
        let replace_route = routes::make_replace_route(environment.clone());
        let amend_route = routes::make_amend_route(environment.clone());
        let delete_route = routes::make_delete_route(environment.clone());
        let list_route = routes::make_list_route(environment.clone());

        let routes = create_route
            .or(count_route)
            .or(retrieve_route)
            .or(replace_route)
            .or(amend_route)
            .or(delete_route)
            .or(list_route)
            .recover(move |r| routes::format_rejection(logger2.clone(), r));

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let routes = routes::admin::make_healthz_route(environment.clone()).or(
            routes::admin::make_termination_route(environment.clone(), terminate),
        );

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
