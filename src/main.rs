use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use user_search_widget::config::cli::Command;
use user_search_widget::domain::ports::{GeolocationProvider, MapProvider};
use user_search_widget::utils::error::ErrorCategory;
use user_search_widget::utils::logger::{self, LogFormat};
use user_search_widget::utils::validation::Validate;
use user_search_widget::widgets::ListContent;
use user_search_widget::{
    CliConfig, CoordinatePicker, FormField, HeadlessMapProvider, PageHost, SearchSelect,
    TomlConfig, WidgetError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    let config = cli.resolve().context("loading configuration")?;

    // 初始化日誌
    let format = if cli.json_logs || config.json_logs() {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, cli.verbose || config.verbose());

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let page = PageHost::new();
    let result = match cli.command.clone() {
        Command::Search { query, select } => run_search(&config, page, query, select).await,
        Command::Create {
            first_name,
            last_name,
            email,
            username,
            password,
            national_id,
            birth_date,
            address,
            lat,
            lng,
        } => {
            let fields = [
                (FormField::FirstName, Some(first_name)),
                (FormField::LastName, Some(last_name)),
                (FormField::Email, Some(email)),
                (FormField::Username, username),
                (FormField::NationalId, national_id),
                (FormField::BirthDate, birth_date),
                (FormField::Address, address),
                (FormField::Password, Some(password)),
            ];
            let location = lat.zip(lng);
            run_create(&config, page, &fields, location).await
        }
        Command::Locate { lat, lng, no_map } => run_locate(&config, page, &lat, &lng, no_map).await,
    };

    if let Err(e) = result {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e);
        let exit_code = match e.category() {
            ErrorCategory::ValidationFailure | ErrorCategory::InputParseFailure => 2,
            ErrorCategory::TransportFailure => 3,
            _ => 1,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run_search(
    config: &TomlConfig,
    page: Arc<PageHost>,
    query: Option<String>,
    select: Option<usize>,
) -> Result<(), WidgetError> {
    let directory = Arc::new(config.directory()?);
    let widget = SearchSelect::initialize(directory, config.widgets(), page).await?;
    widget.on_focus();

    if let Some(query) = query {
        if query.trim().chars().count() >= config.search.min_chars {
            widget.search(&query).await;
        } else {
            widget.on_input_changed(&query);
        }
    }

    match widget.view().list {
        ListContent::Candidates(candidates) => {
            for (i, candidate) in candidates.iter().enumerate() {
                println!(
                    "[{}] {} <{}> (id {})",
                    i,
                    candidate.display_name(),
                    candidate.email,
                    candidate.id
                );
            }
        }
        ListContent::NoResults(text) | ListContent::Loading(text) => println!("{}", text),
        ListContent::Error(message) => {
            eprintln!("❌ {}", message);
            return Ok(());
        }
    }

    if let Some(index) = select {
        match widget.select_index(index) {
            Some(candidate) => println!(
                "✅ Selected {} (id {})",
                candidate.display_name(),
                candidate.id
            ),
            None => eprintln!("No result at index {}", index),
        }
    }
    Ok(())
}

async fn run_create(
    config: &TomlConfig,
    page: Arc<PageHost>,
    fields: &[(FormField, Option<String>)],
    location: Option<(f64, f64)>,
) -> Result<(), WidgetError> {
    user_search_widget::utils::validation::validate_non_empty_string(
        "create_form.csrf_token",
        &config.create_form.csrf_token,
    )?;

    let directory = Arc::new(config.directory()?);
    let map: Arc<dyn MapProvider> = Arc::new(HeadlessMapProvider::new());
    let widget = SearchSelect::initialize_with_map(
        directory,
        config.widgets(),
        Arc::clone(&page),
        Some(map),
        None,
    )
    .await?;

    let form = widget.open_create_flow().await;
    for (field, value) in fields {
        if let Some(value) = value {
            form.set_field(*field, value);
        }
    }
    tracing::debug!("Username: {}", form.field(FormField::Username));

    if let Some((lat, lng)) = location {
        let mut picker = form.open_location_picker();
        picker.show().await;
        picker.on_map_click(lat, lng);
        if let Some(coordinate) = picker.confirm() {
            form.apply_location(coordinate);
        }
        picker.destroy();
    }

    match widget.submit_create_flow(&form).await {
        Ok(candidate) => {
            for toast in page.active_toasts() {
                println!("✅ {}", toast.message);
            }
            println!(
                "Created {} <{}> (id {})",
                candidate.display_name(),
                candidate.email,
                candidate.id
            );
            form.destroy();
            Ok(())
        }
        Err(e) => {
            if let Some(text) = form.error() {
                eprintln!("{}", text);
            }
            form.destroy();
            Err(e)
        }
    }
}

async fn run_locate(
    config: &TomlConfig,
    page: Arc<PageHost>,
    lat: &str,
    lng: &str,
    no_map: bool,
) -> Result<(), WidgetError> {
    let map = HeadlessMapProvider::new();
    let provider: Option<Arc<dyn MapProvider>> = if no_map {
        None
    } else {
        Some(Arc::new(map.clone()))
    };
    let geolocation: Option<Arc<dyn GeolocationProvider>> = None;

    let mut picker = CoordinatePicker::new(config.picker.clone(), page, provider, geolocation);
    picker.show().await;

    if no_map {
        // 只有一個欄位時尚無有效座標
        let _ = picker.set_manual_latitude(lat);
        picker.set_manual_longitude(lng)?;
    } else {
        let lat = parse_cli_number("lat", lat)?;
        let lng = parse_cli_number("lng", lng)?;
        picker.on_map_click(lat, lng);
        tracing::debug!("Map markers: {:?}", map.snapshot().markers);
    }

    if let Some(readout) = picker.view().readout {
        println!("{}", readout);
    }
    match picker.confirm() {
        Some(coordinate) => {
            if !coordinate.is_in_range() {
                tracing::warn!("Coordinate {} is outside the valid range", coordinate);
            }
            println!("✅ Confirmed {}", coordinate);
        }
        None => eprintln!("No location selected"),
    }
    picker.destroy();
    Ok(())
}

fn parse_cli_number(field: &str, text: &str) -> Result<f64, WidgetError> {
    text.trim()
        .parse()
        .map_err(|_| WidgetError::InputParseError {
            field: field.to_string(),
            value: text.to_string(),
        })
}
