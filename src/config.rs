use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MountsConfig {
    /// Mount table to read, normally `/proc/mounts`.
    pub mount_table: String,
    /// Kernel filesystem-type listing, normally `/proc/filesystems`.
    pub filesystems: String,
    pub label_dir: String,
    /// Upper bound for volume queries on network mounts.
    pub network_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mounts: MountsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

impl Default for MountsConfig {
    fn default() -> Self {
        // Mirror defaults from config/default.toml
        Self {
            mount_table: "/proc/mounts".to_string(),
            filesystems: "/proc/filesystems".to_string(),
            label_dir: "/dev/disk/by-label".to_string(),
            network_timeout_ms: 1000,
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: mountwald.toml (in CWD)
        .add_source(::config::File::with_name("mountwald").required(false));

    if let Ok(custom_path) = std::env::var("MOUNTWALD_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("MOUNTWALD").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    // Warn for privileged ports on Unix-like systems
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Mounts
    if cfg.mounts.mount_table.trim().is_empty() {
        return Err(anyhow::anyhow!("mounts.mount_table must not be empty"));
    }
    if cfg.mounts.filesystems.trim().is_empty() {
        return Err(anyhow::anyhow!("mounts.filesystems must not be empty"));
    }
    if !(100..=5000).contains(&cfg.mounts.network_timeout_ms) {
        return Err(anyhow::anyhow!("mounts.network_timeout_ms must be in 100..=5000"));
    }

    Ok(())
}
