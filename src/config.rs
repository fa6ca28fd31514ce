use crate::error::{GrowLogError, Result};
use crate::logic::{HarvestProjector, ProjectionPolicy, StageWeeks};
use config::{Environment, File, FileFormat};
use dialoguer::{Input, Select};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Expected stage lengths used to project harvest dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub seedling_weeks: u32,
    pub veg_weeks: u32,
    pub flower_weeks: u32,
    pub projection: ProjectionPolicy,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        let weeks = StageWeeks::default();
        Self {
            seedling_weeks: weeks.seedling_weeks,
            veg_weeks: weeks.veg_weeks,
            flower_weeks: weeks.flower_weeks,
            projection: ProjectionPolicy::default(),
        }
    }
}

/// Upper bound on any single stage length, in weeks.
pub const MAX_STAGE_WEEKS: u32 = 104;

impl HarvestConfig {
    fn check_weeks(&self) -> Result<()> {
        for (name, weeks) in [
            ("seedling_weeks", self.seedling_weeks),
            ("veg_weeks", self.veg_weeks),
            ("flower_weeks", self.flower_weeks),
        ] {
            if weeks > MAX_STAGE_WEEKS {
                return Err(GrowLogError::Config(format!(
                    "harvest.{} must be at most {} weeks, got {}",
                    name, MAX_STAGE_WEEKS, weeks
                )));
            }
        }
        Ok(())
    }

    pub fn stage_weeks(&self) -> StageWeeks {
        StageWeeks {
            seedling_weeks: self.seedling_weeks,
            veg_weeks: self.veg_weeks,
            flower_weeks: self.flower_weeks,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Layer built-in defaults, the YAML file and `GROWLOG__*` environment
    /// overrides. Without an explicit path a missing file means defaults.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) if !p.exists() => {
                return Err(GrowLogError::Config(format!(
                    "Config file not found at {:?}. Run `growlog init` to set up.",
                    p
                )));
            }
            Some(p) => Some(p),
            None => Self::find_config_path().ok().filter(|p| p.exists()),
        };

        let content = match &config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| GrowLogError::Config(format!("Failed to read config: {}", e)))?;
                // Substitute environment variables
                Some(Self::substitute_env_vars(&raw)?)
            }
            None => None,
        };

        let config = Self::build(content.as_deref())?;
        tracing::debug!(path = ?config_path, ?config, "Loaded configuration");
        Ok(config)
    }

    fn build(yaml: Option<&str>) -> Result<Self> {
        Self::build_with_env(yaml, None)
    }

    /// `env` replaces the process environment as the `GROWLOG__*` source.
    fn build_with_env(yaml: Option<&str>, env: Option<config::Map<String, String>>) -> Result<Self> {
        let defaults = HarvestConfig::default();
        let mut builder = config::Config::builder()
            .set_default("harvest.seedling_weeks", i64::from(defaults.seedling_weeks))?
            .set_default("harvest.veg_weeks", i64::from(defaults.veg_weeks))?
            .set_default("harvest.flower_weeks", i64::from(defaults.flower_weeks))?
            .set_default("harvest.projection", "lenient")?;

        if let Some(yaml) = yaml {
            builder = builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("GROWLOG")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.harvest.check_weeks()?;
        Ok(config)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        Self::default_config_path()
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/growlog/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GrowLogError::Config("Cannot determine config directory".into()))?
            .join("growlog");
        Ok(config_dir.join("config.yaml"))
    }

    pub fn projector(&self) -> HarvestProjector {
        HarvestProjector::new(self.harvest.stage_weeks()).with_policy(self.harvest.projection)
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the new Config and the path it was written to.
    pub fn setup_interactive(target: Option<PathBuf>) -> Result<(Self, PathBuf)> {
        let input_err = |e: dialoguer::Error| GrowLogError::Config(format!("Input error: {}", e));
        let defaults = HarvestConfig::default();

        println!();
        println!("Let's set up GrowLog!");
        println!();

        println!("Stage lengths (weeks)");
        let seedling_weeks: u32 = Input::new()
            .with_prompt("  Seedling")
            .default(defaults.seedling_weeks)
            .interact_text()
            .map_err(input_err)?;

        let veg_weeks: u32 = Input::new()
            .with_prompt("  Vegetative")
            .default(defaults.veg_weeks)
            .interact_text()
            .map_err(input_err)?;

        let flower_weeks: u32 = Input::new()
            .with_prompt("  Flowering")
            .default(defaults.flower_weeks)
            .interact_text()
            .map_err(input_err)?;

        let policies = ["lenient", "strict"];
        let policy = Select::new()
            .with_prompt("  Unknown stages when projecting")
            .items(&policies)
            .default(0)
            .interact()
            .map_err(input_err)?;

        println!();

        println!("Storage (leave blank for the default data directory)");
        let data_dir: String = Input::new()
            .with_prompt("  Data directory")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(input_err)?;

        println!();

        let config = Config {
            harvest: HarvestConfig {
                seedling_weeks,
                veg_weeks,
                flower_weeks,
                projection: if policy == 1 {
                    ProjectionPolicy::Strict
                } else {
                    ProjectionPolicy::Lenient
                },
            },
            storage: StorageConfig {
                data_dir: Some(data_dir.trim())
                    .filter(|d| !d.is_empty())
                    .map(PathBuf::from),
            },
        };

        config.harvest.check_weeks()?;

        let config_path = match target {
            Some(p) => p,
            None => Self::default_config_path()?,
        };
        config.save(&config_path)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| GrowLogError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# GrowLog Configuration\n# Generated by `growlog init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(path, content)?;
        Ok(())
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| GrowLogError::Config(format!("Invalid substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }

    /// Data directory: `--data-dir`, then `GROWLOG_DATA_DIR`, then the
    /// config file, then the XDG data directory.
    pub fn data_dir(&self, data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        let dir = match data_dir_override {
            Some(dir) => dir.clone(),
            None => match std::env::var("GROWLOG_DATA_DIR") {
                Ok(dir) => PathBuf::from(dir),
                Err(_) => match &self.storage.data_dir {
                    Some(dir) => dir.clone(),
                    None => dirs::data_dir()
                        .ok_or_else(|| {
                            GrowLogError::Config("Cannot determine data directory".into())
                        })?
                        .join("growlog"),
                },
            },
        };

        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn db_path(&self, data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(self.data_dir(data_dir_override)?.join("growlog.db"))
    }
}
