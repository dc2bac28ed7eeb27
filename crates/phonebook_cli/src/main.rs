//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `phonebook_core` linkage, configuration and schema bootstrap
//!   of the database at `PHONEBOOK_DB_PATH` from a binary.
//! - Keep output deterministic for quick local sanity checks.

use phonebook_core::db::migrations::{current_user_version, latest_version};
use phonebook_core::db::{open_db, DbResult};
use phonebook_core::{init_logging_from_config, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("phonebook_core ping={}", phonebook_core::ping());
    println!("phonebook_core version={}", phonebook_core::core_version());

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("phonebook_core config invalid: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!(
        "phonebook_core page_size default={} max={}",
        config.page_limits.default_page_size, config.page_limits.max_page_size
    );

    match init_logging_from_config(&config) {
        Ok(enabled) => println!("phonebook_core logging={enabled}"),
        Err(err) => eprintln!("phonebook_core logging disabled: {err}"),
    }

    match schema_version_at(&config) {
        Ok(version) => {
            println!(
                "phonebook_core db={} schema={version}/{}",
                config.db_path.display(),
                latest_version()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!(
                "phonebook_core schema bootstrap failed for `{}`: {err}",
                config.db_path.display()
            );
            ExitCode::FAILURE
        }
    }
}

/// Opens (and migrates) the configured database, returning its schema version.
fn schema_version_at(config: &CoreConfig) -> DbResult<u32> {
    let conn = open_db(&config.db_path)?;
    current_user_version(&conn)
}

#[cfg(test)]
mod tests {
    use super::schema_version_at;
    use phonebook_core::config::ENV_DB_PATH;
    use phonebook_core::db::migrations::latest_version;
    use phonebook_core::CoreConfig;

    #[test]
    fn bootstraps_the_configured_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cli.sqlite3");
        let config = CoreConfig::from_lookup(|key| {
            (key == ENV_DB_PATH).then(|| db_path.display().to_string())
        })
        .unwrap();

        assert_eq!(config.db_path, db_path);
        assert_eq!(schema_version_at(&config).unwrap(), latest_version());
        assert!(db_path.exists());
    }

    #[test]
    fn reports_unopenable_database_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig {
            db_path: dir.path().join("missing").join("cli.sqlite3"),
            ..CoreConfig::default()
        };

        assert!(schema_version_at(&config).is_err());
    }
}
