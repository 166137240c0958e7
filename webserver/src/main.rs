use std::path::PathBuf;
use actix_web::{App, HttpServer, middleware, web};
use clap::Parser;
use log::info;
use confstore::config;
use confstore::configrefs::ENV_PREFIX;

mod api;
mod configrefs;
mod server;

/// Serve the configuration and log store over HTTP.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// YAML configuration file.  Environment variables prefixed with
    /// CONFSTORE_ override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<(), String> {
    env_logger::init();
    let args = Args::parse();

    let cfg = config::load(args.config.as_ref(), ENV_PREFIX)?;
    let state = web::Data::new(server::State::new(cfg.as_ref())?);
    let root_path = server::root_path(cfg.as_ref())?;
    let api_path = config::get_ref(cfg.as_ref(), &configrefs::SERVER_API_PATH)?;
    let addr = server::addr(cfg.as_ref())?;

    info!("listening on {}:{}, operations at {root_path}{api_path}",
          addr.0, addr.1);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(api::cors())
            .wrap(middleware::Logger::default())
            .service(web::scope(&root_path)
                .service(api::service(&api_path)))
            .default_service(web::to(api::operation))
    })
        .bind_auto_h2c(addr)
        .map_err(|e| format!("error binding port: {e}"))?
        .run()
        .await
        .map_err(|e| format!("error initialising or interrupted: {e}"))
}
