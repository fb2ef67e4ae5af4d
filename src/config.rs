use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

// Built-in plugin kinds: export names and the option names they finalize to
pub const ROOT_HOOKS_EXPORT: &str = "mochaHooks";
pub const ROOT_HOOKS_OPTION: &str = "rootHooks";
pub const GLOBAL_SETUP_EXPORT: &str = "mochaGlobalSetup";
pub const GLOBAL_SETUP_OPTION: &str = "globalSetup";
pub const GLOBAL_TEARDOWN_EXPORT: &str = "mochaGlobalTeardown";
pub const GLOBAL_TEARDOWN_OPTION: &str = "globalTeardown";

// Module resolution
pub const MODULE_EXTENSION: &str = "lua";
pub const DEFAULT_CONFIG_FILE: &str = ".pluginrc.toml";

// Lua state memory limit (10 MB)
pub const LUA_MEMORY_LIMIT: usize = 10_000_000;

#[derive(Parser, Debug)]
#[command(author, version, about = "Load test-runner plugins from Lua modules")]
pub struct Cli {
    /// Module to require (repeatable, loaded in order)
    #[arg(short, long = "require", value_name = "MODULE")]
    pub requires: Vec<PathBuf>,

    /// Plugin export name to ignore (repeatable)
    #[arg(long = "ignore", value_name = "EXPORT_NAME")]
    pub ignored: Vec<String>,

    /// Config file (default: .pluginrc.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the finalized settings as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Format log output for journald
    #[arg(long)]
    pub journald: bool,
}

/// Settings read from the config file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    #[serde(default)]
    pub require: Vec<PathBuf>,
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl FileConfig {
    /// Read a config file
    ///
    /// Relative module paths are resolved against the file's directory.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let mut config: FileConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;

        if let Some(base) = path.parent() {
            config.require = config
                .require
                .into_iter()
                .map(|module| if module.is_relative() { base.join(module) } else { module })
                .collect();
        }

        Ok(config)
    }
}

/// Modules and ignore list for one run, file values first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub requires: Vec<PathBuf>,
    pub ignored: Vec<String>,
}

impl RunConfig {
    /// Merge the config file (explicit or default) with command line values
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_path(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    FileConfig::from_path(default)?
                } else {
                    FileConfig::default()
                }
            }
        };

        let mut requires = file.require;
        requires.extend(cli.requires.iter().cloned());

        let mut ignored = file.ignore;
        for name in &cli.ignored {
            if !ignored.contains(name) {
                ignored.push(name.clone());
            }
        }

        Ok(Self { requires, ignored })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("plugins.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{content}").unwrap();
        path
    }

    #[test]
    fn test_file_config_resolves_relative_modules() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"require = ["hooks.lua", "/abs/setup.lua"]
ignore = ["mochaGlobalSetup"]"#,
        );

        let config = FileConfig::from_path(&path).unwrap();
        assert_eq!(config.require[0], temp_dir.path().join("hooks.lua"));
        assert_eq!(config.require[1], PathBuf::from("/abs/setup.lua"));
        assert_eq!(config.ignore, vec![GLOBAL_SETUP_EXPORT]);
    }

    #[test]
    fn test_file_config_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "require = [");
        assert!(FileConfig::from_path(&path).is_err());
    }

    #[test]
    fn test_cli_values_follow_file_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"require = ["a.lua"]
ignore = ["mochaGlobalSetup"]"#,
        );

        let cli = Cli::parse_from([
            "plugin-loader",
            "--config",
            path.to_str().unwrap(),
            "-r",
            "b.lua",
            "--ignore",
            "mochaGlobalSetup",
            "--ignore",
            "mochaGlobalTeardown",
        ]);
        let run = RunConfig::from_cli(&cli).unwrap();

        assert_eq!(run.requires, vec![temp_dir.path().join("a.lua"), PathBuf::from("b.lua")]);
        assert_eq!(run.ignored, vec![GLOBAL_SETUP_EXPORT, GLOBAL_TEARDOWN_EXPORT]);
    }
}
