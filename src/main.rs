//! Special Equipment - desktop reporting on equipment requests and the transport program.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use special_equipment as app;

use app::access::AccessScope;
use app::config::{AppConfig, ConfigLoadResult, DatabaseBackend};
use app::credentials::CredentialStore;
use app::db;
use app::ui::App;

/// Reports on special equipment requests and transport program execution.
#[derive(Parser)]
#[command(name = "special-equipment", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Path to the config file
    #[arg(long, value_name = "PATH", conflicts_with = "dev")]
    config: Option<PathBuf>,

    /// Encrypt a connection string into the credential store and exit
    #[arg(long, value_name = "URL")]
    store_connection: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    let _log_guard = app::logging::init(&app::logging::default_log_dir());

    tracing::info!("Special Equipment {} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        tracing::error!("Fatal: {:#}", e);
        MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title("Спецтехника")
            .set_description(format!("{e:#}"))
            .set_buttons(MessageButtons::Ok)
            .show();
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(url) = cli.store_connection {
        let store = CredentialStore::open_default();
        store.save(&url).context("Failed to store connection string")?;
        tracing::info!("Connection string stored in {:?}", store.path());
        println!("Connection string stored in {}", store.path().display());
        return Ok(());
    }

    let config_path = if cli.dev {
        tracing::info!("Dev mode: loading config from current directory");
        PathBuf::from("config.toml")
    } else {
        cli.config.unwrap_or_else(AppConfig::default_path)
    };
    tracing::info!("Config path: {:?}", config_path);

    let config = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => {
            tracing::info!("Config loaded successfully");
            config
        }
        ConfigLoadResult::Missing => {
            tracing::info!("Config missing, writing defaults");
            AppConfig::default()
                .save(&config_path)
                .with_context(|| format!("Failed to create {}", config_path.display()))?;
            MessageDialog::new()
                .set_level(MessageLevel::Info)
                .set_title("Спецтехника")
                .set_description(format!(
                    "Создан файл настроек {}.\nУкажите параметры подключения и перезапустите программу.",
                    config_path.display()
                ))
                .set_buttons(MessageButtons::Ok)
                .show();
            return Ok(());
        }
        ConfigLoadResult::Invalid(e) => {
            return Err(anyhow::Error::new(e).context(format!("Invalid config {}", config_path.display())));
        }
    };

    run_main_app(config)
}

/// Connect, resolve the session user and run the window.
fn run_main_app(config: AppConfig) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    let url = config
        .database
        .resolve_connection_string(&CredentialStore::open_default())?;

    let (pool, user, scope) = rt.block_on(async {
        let conn = db::connect(&url).await.context("Failed to connect to database")?;

        if config.database.backend == DatabaseBackend::Sqlite {
            db::schema::create_all(&conn).await.context("Failed to create schema")?;
            if let Some(admin) = db::user::bootstrap_admin(&conn, &config.session.login).await? {
                tracing::info!("Created admin user '{}' on empty database", admin.login);
            }
        }

        if let Ok(version) = db::get_version(&conn).await {
            tracing::info!("Database: {}", version);
        }
        if let Ok(counts) = db::get_table_counts(&conn).await {
            tracing::info!(
                "Tables: {} departments, {} warehouses, {} equipment, {} shift requests ({} worked), {} plans",
                counts.departments,
                counts.warehouses,
                counts.equipment,
                counts.shift_requests,
                counts.worked_shifts,
                counts.transport_programs
            );
        }

        let user = db::user::get_by_login(&conn, &config.session.login).await?;
        let scope = match &user {
            Some(user) => db::user::load_scope(&conn, user.id).await?,
            None => {
                tracing::warn!("User '{}' not found, no data will be visible", config.session.login);
                AccessScope::none()
            }
        };

        anyhow::Ok((conn, user, scope))
    })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Спецтехника")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Спецтехника",
        options,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(App::new(pool, config, rt, user, scope)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {e}"))
}
