//! Tests for the repo-hooks-cli library module.

use super::*;
use std::io::Write as _;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOOK_URL: &str = "http://www.example.com/hook";
const HOOK_ID: &str = "d55ecc09f4cd1779d592b7c7f4bf3006fcb62a4c";

fn settings(server_url: &str, format: OutputFormat) -> Settings {
    Settings {
        server_url: server_url.to_string(),
        token: None,
        format,
    }
}

async fn run(command: Commands, settings: &Settings) -> Result<String, CliError> {
    let mut out = Vec::new();
    execute(command, settings, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_add_parsing_collects_repeated_events() {
    let cli = Cli::try_parse_from([
        "repo-hooks",
        "add",
        "debian",
        "--url",
        HOOK_URL,
        "--event",
        "new",
        "-e",
        "existing",
        "--namespace",
        "testing",
    ])
    .unwrap();

    assert_eq!(
        cli.command,
        Commands::Add {
            repo: "debian".to_string(),
            url: HOOK_URL.to_string(),
            events: vec!["new".to_string(), "existing".to_string()],
            namespace: Some("testing".to_string()),
        }
    );
}

#[test]
fn test_remove_parsing() {
    let cli = Cli::try_parse_from(["repo-hooks", "remove", "debian", HOOK_ID]).unwrap();

    assert_eq!(
        cli.command,
        Commands::Remove {
            repo: "debian".to_string(),
            id: HOOK_ID.to_string(),
            namespace: None,
        }
    );
}

#[test]
fn test_add_requires_url() {
    assert!(Cli::try_parse_from(["repo-hooks", "add", "debian"]).is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "repo-hooks",
        "list",
        "debian",
        "--format",
        "json",
        "--server-url",
        "http://hooks.internal:9000",
    ])
    .unwrap();

    assert_eq!(cli.format, Some(OutputFormat::Json));
    assert_eq!(cli.server_url.as_deref(), Some("http://hooks.internal:9000"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_load_without_path_gives_defaults() {
    assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
}

#[test]
fn test_load_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "server_url = \"https://hooks.example.com\"\ntoken = \"abc\"\noutput = \"json\""
    )
    .unwrap();

    let config = CliConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.server_url.as_deref(), Some("https://hooks.example.com"));
    assert_eq!(config.token.as_deref(), Some("abc"));
    assert_eq!(config.output, Some(OutputFormat::Json));
}

#[test]
fn test_load_missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        CliConfig::load(Some(&path)),
        Err(ConfigError::FileNotFound { .. })
    ));
}

#[test]
fn test_load_malformed_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "server_url = ").unwrap();

    assert!(matches!(
        CliConfig::load(Some(file.path())),
        Err(ConfigError::InvalidFormat(_))
    ));
}

#[test]
fn test_flags_override_config_file() {
    let cli = Cli::try_parse_from([
        "repo-hooks",
        "--server-url",
        "http://flag.example",
        "health",
    ])
    .unwrap();
    let config = CliConfig {
        server_url: Some("http://file.example".to_string()),
        token: Some("from-file".to_string()),
        output: Some(OutputFormat::Json),
    };

    let settings = Settings::resolve(&cli, config);

    assert_eq!(settings.server_url, "http://flag.example");
    assert_eq!(settings.token.as_deref(), Some("from-file"));
    assert_eq!(settings.format, OutputFormat::Json);
}

#[test]
fn test_defaults_apply_without_flags_or_file() {
    let cli = Cli::try_parse_from(["repo-hooks", "health"]).unwrap();

    let settings = Settings::resolve(&cli, CliConfig::default());

    // RH_SERVER_URL may be set in the environment running the tests
    if std::env::var("RH_SERVER_URL").is_err() {
        assert_eq!(settings.server_url, DEFAULT_SERVER_URL);
    }
    assert_eq!(settings.format, OutputFormat::Text);
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn test_id_command_works_offline() {
    let settings = settings("http://127.0.0.1:1", OutputFormat::Text);

    let output = run(
        Commands::Id {
            url: HOOK_URL.to_string(),
        },
        &settings,
    )
    .await
    .unwrap();

    assert_eq!(output, format!("{}\n", HOOK_ID));
}

#[tokio::test]
async fn test_list_command_renders_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/webhooks/debian"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "id": HOOK_ID,
            "url": HOOK_URL,
            "new": true,
            "existing": true,
            "active": true,
        }])))
        .mount(&server)
        .await;

    let output = run(
        Commands::List {
            repo: "debian".to_string(),
            namespace: None,
        },
        &settings(&server.uri(), OutputFormat::Text),
    )
    .await
    .unwrap();

    assert_eq!(output, format!("{}  {}  [new,existing]\n", HOOK_ID, HOOK_URL));
}

#[tokio::test]
async fn test_add_command_conflict_maps_to_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhooks/debian"))
        .respond_with(ResponseTemplate::new(409).set_body_string("other event is not supported"))
        .mount(&server)
        .await;

    let error = run(
        Commands::Add {
            repo: "debian".to_string(),
            url: HOOK_URL.to_string(),
            events: vec!["other".to_string()],
            namespace: None,
        },
        &settings(&server.uri(), OutputFormat::Text),
    )
    .await
    .unwrap_err();

    assert_eq!(error.to_string(), "other event is not supported");
    assert_eq!(error.exit_code(), 4);
}

#[test]
fn test_render_empty_list() {
    assert_eq!(
        render_list(&[], OutputFormat::Text).unwrap(),
        "no webhooks registered\n"
    );
    assert_eq!(render_list(&[], OutputFormat::Json).unwrap(), "[]\n");
}
