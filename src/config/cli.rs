use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "user-search-widget")]
#[command(about = "Headless driver for the user search, create-user and location widgets")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Base URL used to resolve relative endpoints")]
    pub base_url: Option<String>,

    #[arg(long, help = "Anti-forgery token sent when creating users")]
    pub csrf_token: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 搜尋使用者並可選擇其中一位
    Search {
        #[arg(long)]
        query: Option<String>,

        #[arg(long, help = "Select the n-th result (0-based)")]
        select: Option<usize>,
    },
    /// 透過建立使用者表單新增使用者
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, help = "Defaults to nombre.apellido")]
        username: Option<String>,
        #[arg(long)]
        password: String,
        #[arg(long)]
        national_id: Option<String>,
        #[arg(long, help = "YYYY-MM-DD")]
        birth_date: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// 在位置選擇器中選取座標
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,
        #[arg(long, allow_hyphen_values = true)]
        lng: String,
        #[arg(long, help = "Simulate a page without the map library")]
        no_map: bool,
    },
}

impl CliConfig {
    /// 載入 TOML 設定 (若有) 並套用命令列覆寫
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.service.base_url = Some(base_url.clone());
        }
        if let Some(token) = &self.csrf_token {
            config.create_form.csrf_token = token.clone();
        }
        Ok(config)
    }
}
