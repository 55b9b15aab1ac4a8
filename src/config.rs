// config.rs
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

/// Base directory holding one sub-folder per source system.
pub const DATA_DIR: &str = "datasets";

/// Source folder name -> target schema name, loaded in this order.
pub const SOURCE_MAP: &[(&str, &str)] = &[("source_crm", "raw_crm"), ("source_erp", "raw_erp")];

/// Connection descriptor. Missing variables are left empty and only fail
/// once the connection URL is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub dbname: String,
}

impl DbConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        DbConfig {
            user: get("DB_USER"),
            password: get("DB_PASSWORD"),
            host: get("DB_HOST"),
            port: get("DB_PORT"),
            dbname: get("DB_NAME"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapping {
    pub folder: String,
    pub schema: String,
}

pub struct Config {
    pub db: DbConfig,
    pub data_dir: PathBuf,
    pub sources: Vec<SourceMapping>,
}

pub fn default_sources() -> Vec<SourceMapping> {
    SOURCE_MAP
        .iter()
        .map(|(folder, schema)| SourceMapping {
            folder: folder.to_string(),
            schema: schema.to_string(),
        })
        .collect()
}

pub fn load_config() -> anyhow::Result<Config> {
    dotenv().ok();
    Ok(Config {
        db: DbConfig::from_lookup(|key| env::var(key).ok()),
        data_dir: PathBuf::from(DATA_DIR),
        sources: default_sources(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_all_five_variables() {
        let vars: HashMap<&str, &str> = [
            ("DB_USER", "etl"),
            ("DB_PASSWORD", "secret"),
            ("DB_HOST", "localhost"),
            ("DB_PORT", "5432"),
            ("DB_NAME", "warehouse"),
        ]
        .into_iter()
        .collect();

        let db = DbConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(
            db,
            DbConfig {
                user: "etl".into(),
                password: "secret".into(),
                host: "localhost".into(),
                port: "5432".into(),
                dbname: "warehouse".into(),
            }
        );
    }

    #[test]
    fn missing_variables_become_empty() {
        let db = DbConfig::from_lookup(|k| (k == "DB_HOST").then(|| "db".to_string()));
        assert_eq!(db.host, "db");
        assert!(db.user.is_empty());
        assert!(db.password.is_empty());
        assert!(db.port.is_empty());
        assert!(db.dbname.is_empty());
    }

    #[test]
    fn default_mapping_is_crm_then_erp() {
        let sources = default_sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].folder, "source_crm");
        assert_eq!(sources[0].schema, "raw_crm");
        assert_eq!(sources[1].folder, "source_erp");
        assert_eq!(sources[1].schema, "raw_erp");
    }
}
