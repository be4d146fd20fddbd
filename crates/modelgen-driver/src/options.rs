use crate::Error;
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Engine
///
/// Engines with a recognized option set. Anything else is treated as a
/// custom driver that validates its own configuration.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    Postgres,
    Mysql,
    Sqlite,
}

impl Engine {
    /// Match a driver name against the known engines; `None` means a custom
    /// driver whose options pass through unvalidated.
    #[must_use]
    pub fn known(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Option keys this engine understands beyond the typed connection
    /// parameters. Unrecognized keys for a known engine are a config error,
    /// not a silent passthrough.
    #[must_use]
    pub const fn recognized_keys(self) -> &'static [&'static str] {
        match self {
            Self::Postgres => &["schema", "sslcert", "sslkey", "sslrootcert"],
            Self::Mysql => &["schema", "protocol", "socket"],
            Self::Sqlite => &[],
        }
    }
}

///
/// ConnectionParams
///
/// Typed connection surface shared by every engine. Fields an engine does
/// not use stay `None` and are omitted on the wire.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ConnectionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sslmode: Option<String>,

    /// Filesystem path, for embedded engines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ConnectionParams {
    /// Fill engine defaults, then check required parameters. Runs before the
    /// driver subprocess is launched so a doomed run never spawns anything.
    pub fn prepare(
        &mut self,
        engine: Engine,
        options: &mut BTreeMap<String, serde_json::Value>,
    ) -> Result<(), Error> {
        for key in options.keys() {
            if !engine.recognized_keys().contains(&key.as_str()) {
                return Err(Error::config(
                    engine.to_string().to_lowercase(),
                    format!("unrecognized option '{key}'"),
                ));
            }
        }

        match engine {
            Engine::Postgres => {
                self.port.get_or_insert(5432);
                self.sslmode.get_or_insert_with(|| "require".to_string());
                options
                    .entry("schema".to_string())
                    .or_insert_with(|| "public".into());
                self.require(engine, &["user", "host", "dbname"])?;
            }
            Engine::Mysql => {
                self.port.get_or_insert(3306);
                self.sslmode.get_or_insert_with(|| "true".to_string());
                // mysql has no schema distinct from the database
                if let Some(dbname) = self.dbname.clone() {
                    options
                        .entry("schema".to_string())
                        .or_insert_with(|| dbname.into());
                }
                self.require(engine, &["user", "host", "dbname"])?;
            }
            Engine::Sqlite => {
                self.require(engine, &["path"])?;
            }
        }

        Ok(())
    }

    fn require(&self, engine: Engine, keys: &[&str]) -> Result<(), Error> {
        for key in keys {
            let present = match *key {
                "host" => self.host.is_some(),
                "user" => self.user.is_some(),
                "dbname" => self.dbname.is_some(),
                "path" => self.path.is_some(),
                _ => true,
            };

            if !present {
                return Err(Error::config(
                    engine.to_string().to_lowercase(),
                    format!("missing required parameter '{key}'"),
                ));
            }
        }

        Ok(())
    }
}
