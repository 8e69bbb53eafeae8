use pathstack::config::load_options_file;
use pathstack::Context;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct AppConfig {
    app: AppSection,
    database: DatabaseSection,
}

#[derive(Debug, Deserialize)]
struct AppSection {
    name: String,
    debug: bool,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct DatabaseSection {
    host: String,
    port: u16,
}

fn main() -> Result<(), pathstack::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Optional: defaults apply when the file is absent
    let options = load_options_file("demos/pathstack.toml", false)?;
    let context = Context::builder().with_options(options).build()?;

    let defaults = context.include(&["defaults"])?;
    defaults.set("app.name", "demo")?;
    defaults.set("app.debug", false)?;
    defaults.set("database.host", "localhost")?;
    defaults.set("database.port", 5432)?;

    // Writes land in "local" only; "defaults" shows through underneath
    let local = defaults.include(&["local"])?;
    local.set("app.debug", true)?;

    let config: AppConfig = local.snapshot()?.deserialize()?;

    println!("App: {} (debug={})", config.app.name, config.app.debug);
    println!("Database: {:?}", config.database);

    Ok(())
}
