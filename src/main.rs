mod app;
mod ui;

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use humanity_status::config::{self, Config};
use humanity_status::core::{DeploymentBlocks, StatusChecker};
use humanity_status::infrastructure::abi::{ContractAddresses, ContractSet};
use humanity_status::infrastructure::{
    create_chain_client, AlloyChainClient, ProviderConfig, RuntimeBridge, RuntimeCommand,
    RuntimeEvent,
};
use humanity_status::logging::{init_tracing, LogTarget};
use humanity_status::modules::{export, render};

use crate::app::{App, InputMode, RpcEndpointOption, StatusLevel};

#[derive(Debug, Parser)]
#[command(
    name = "humanity-status",
    version,
    about = "Check the status of Humanity DAO governance proposals and applicants"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long)]
    ipc: Option<PathBuf>,

    /// HumanityGovernance contract address
    #[arg(long)]
    governance: Option<String>,

    /// TwitterHumanityApplicant contract address
    #[arg(long)]
    applicant: Option<String>,

    /// Truffle build directory with the contract artifacts
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Run a single search, print the result and exit
    #[arg(long, value_name = "QUERY")]
    once: Option<String>,

    /// With --once: print JSON instead of text
    #[arg(long, requires = "once")]
    json: bool,

    /// With --once: also write the JSON report and vote CSV into DIR
    #[arg(long, value_name = "DIR", requires = "once")]
    export: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let target = if args.once.is_some() {
        LogTarget::Stderr
    } else {
        match config::log_path() {
            Some(path) => LogTarget::File(path),
            None => LogTarget::Stderr,
        }
    };
    if let Err(err) = init_tracing(target, "info") {
        eprintln!("{err:#}");
    }

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "fatal");
            eprintln!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = config::load();
    let (endpoints, endpoint_options) = endpoints_from_args_and_config(&args, &config)?;
    let contracts = contracts_from_args_and_config(&args, &config)?;
    let blocks = config.deployment_blocks();

    if let Some(query) = args.once.as_deref() {
        return run_once(
            query,
            endpoints,
            contracts,
            blocks,
            &config.explorer_url(),
            args.json,
            args.export.as_deref(),
        );
    }

    run_tui(endpoints, endpoint_options, contracts, blocks, &config)?;
    Ok(ExitCode::SUCCESS)
}

/// One search on a current-thread runtime; failure exits non-zero
fn run_once(
    query: &str,
    endpoints: Vec<ProviderConfig>,
    contracts: ContractSet,
    blocks: DeploymentBlocks,
    explorer: &str,
    json: bool,
    export_dir: Option<&Path>,
) -> Result<ExitCode> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let client = connect_first(endpoints, &contracts).await?;

        let checker = StatusChecker::new(Arc::new(client), blocks);
        let report = match checker.search(query).await {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(error = ?err, "search failed");
                eprintln!("{}", err.notice());
                return Ok(ExitCode::FAILURE);
            }
        };

        if json {
            println!("{}", export::report_json(&report)?);
        } else {
            print!("{}", render::render_text(&report, explorer));
        }

        if let Some(dir) = export_dir {
            let summary = export::export_report(&report, Some(dir))?;
            for path in summary.json.iter().chain(summary.csv.iter()) {
                eprintln!("wrote {}", path.display());
            }
        }

        Ok(ExitCode::SUCCESS)
    })
}

/// Connect to the first endpoint that accepts a client
async fn connect_first(
    endpoints: Vec<ProviderConfig>,
    contracts: &ContractSet,
) -> Result<AlloyChainClient> {
    let mut last_err = None;
    for endpoint in endpoints {
        let endpoint_name = endpoint.display();
        match create_chain_client(endpoint, contracts.clone()).await {
            Ok(client) => return Ok(client),
            Err(err) => {
                tracing::warn!(endpoint = %endpoint_name, error = %err, "connection failed");
                last_err = Some(err);
            }
        }
    }
    match last_err {
        Some(err) => Err(err),
        None => anyhow::bail!("No endpoints configured"),
    }
}

fn run_tui(
    endpoints: Vec<ProviderConfig>,
    endpoint_options: Vec<RpcEndpointOption>,
    contracts: ContractSet,
    blocks: DeploymentBlocks,
    config: &Config,
) -> Result<()> {
    let initial_endpoint_display = endpoints
        .first()
        .map(|endpoint| endpoint.display())
        .unwrap_or_else(|| "localhost:8545".to_string());

    let runtime = RuntimeBridge::new(endpoints, contracts, blocks)?;

    let mut app = App::new(config.explorer_url());
    app.rpc_endpoint = initial_endpoint_display;
    app.rpc_endpoints = endpoint_options;
    app.rpc_endpoint_index = 0;
    app.set_status("Connecting…", StatusLevel::Info);

    let initial_query = config.initial_query();
    if !initial_query.trim().is_empty() {
        app.input = initial_query.clone();
        app.begin_search(initial_query);
    }

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::Connected {
                endpoint,
                head_block,
            } => app.apply_rpc_connected(endpoint, head_block),
            RuntimeEvent::SearchSettled { ticket, outcome } => {
                app.apply_search_settled(ticket, outcome)
            }
            RuntimeEvent::Error { message } => app.apply_rpc_error(message),
        }
    }

    if let Some(index) = app.take_endpoint_switch_request() {
        let _ = runtime.send(RuntimeCommand::SwitchEndpoint { index });
    }
    for (ticket, query) in app.take_search_requests() {
        if let Err(err) = runtime.send(RuntimeCommand::Search { ticket, query }) {
            app.set_status(format!("{err:#}"), StatusLevel::Error);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // A failed-search notice swallows the key that acknowledges it
    if app.input_mode == InputMode::Normal && app.dismiss_notice() {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }
        (KeyCode::Char('q'), _) => app.should_quit = true,
        (KeyCode::Char('?'), _) => app.help_open = true,
        (KeyCode::Char('/'), _) | (KeyCode::Char('i'), _) => app.enter_editing(),
        (KeyCode::Char('r'), _) => {
            let query = app.search.query().to_string();
            if query.is_empty() {
                app.set_status("Nothing to repeat", StatusLevel::Warn);
            } else {
                app.begin_search(query);
            }
        }
        (KeyCode::Tab, _) => app.cycle_focus(true),
        (KeyCode::BackTab, _) => app.cycle_focus(false),
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => app.move_selection_down(),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => app.move_selection_up(),
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => app.go_to_top(),
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => app.go_to_bottom(),
        (KeyCode::Enter, _) => {
            if app.focus == app::Focus::Applications {
                app.search_selected_application();
            }
        }
        (KeyCode::Char('y'), _) => handle_copy_to_clipboard(app),
        (KeyCode::Char('e'), _) => handle_export(app),
        (KeyCode::Char('['), _) => app.cycle_rpc_endpoint(false),
        (KeyCode::Char(']'), _) => app.cycle_rpc_endpoint(true),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_editing(),
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.input.push(ch);
        }
        _ => {}
    }
}

fn handle_copy_to_clipboard(app: &mut App) {
    use arboard::Clipboard;

    let Some(text) = app.selected_tx_hash() else {
        app.set_status("Nothing to copy", StatusLevel::Warn);
        return;
    };

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&text).is_ok() {
                app.set_status(
                    format!("Copied: {}...", &text[..text.len().min(20)]),
                    StatusLevel::Info,
                );
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status("Clipboard not available", StatusLevel::Error);
        }
    }
}

fn handle_export(app: &mut App) {
    let Some(report) = app.search.report() else {
        app.set_status("Nothing to export yet", StatusLevel::Warn);
        return;
    };

    match export::export_report(&report, None) {
        Ok(summary) => {
            let file = summary
                .csv
                .as_ref()
                .or(summary.json.as_ref())
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            app.set_status(
                format!("Exported {} vote rows ({})", summary.rows, file),
                StatusLevel::Info,
            );
        }
        Err(err) => app.set_status(format!("Export failed: {err:#}"), StatusLevel::Error),
    }
}

fn endpoints_from_args_and_config(
    args: &Args,
    config: &Config,
) -> Result<(Vec<ProviderConfig>, Vec<RpcEndpointOption>)> {
    fn push_endpoint(
        endpoints: &mut Vec<ProviderConfig>,
        options: &mut Vec<RpcEndpointOption>,
        seen: &mut BTreeSet<String>,
        endpoint: ProviderConfig,
        name: Option<String>,
    ) {
        let display = endpoint.display();
        let key = display.to_lowercase();
        if !seen.insert(key) {
            return;
        }
        let label = name
            .clone()
            .filter(|value| !value.trim().is_empty())
            .map(|name| format!("{name} ({display})"))
            .unwrap_or_else(|| display.clone());
        options.push(RpcEndpointOption { label, display });
        endpoints.push(endpoint);
    }

    let mut endpoints = Vec::new();
    let mut options = Vec::new();
    let mut seen = BTreeSet::<String>::new();

    // CLI arguments take precedence
    if let Some(ipc) = args.ipc.clone() {
        #[cfg(unix)]
        {
            push_endpoint(
                &mut endpoints,
                &mut options,
                &mut seen,
                ProviderConfig::Ipc(ipc),
                Some("cli".to_string()),
            );
        }
        #[cfg(not(unix))]
        {
            let _ = ipc;
            return Err(anyhow::anyhow!("IPC is not supported on this platform"));
        }
    } else if let Some(ws) = args.ws.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        push_endpoint(
            &mut endpoints,
            &mut options,
            &mut seen,
            ProviderConfig::WebSocket(ws.to_string()),
            Some("cli".to_string()),
        );
    } else if let Some(rpc) = args.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        push_endpoint(
            &mut endpoints,
            &mut options,
            &mut seen,
            ProviderConfig::Http(normalize_http_endpoint(rpc)),
            Some("cli".to_string()),
        );
    }

    // Config file endpoints
    for (idx, entry) in config.endpoints.iter().enumerate() {
        let name = entry.name.clone().filter(|value| !value.trim().is_empty());
        if let Some(rpc) = entry.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            push_endpoint(
                &mut endpoints,
                &mut options,
                &mut seen,
                ProviderConfig::Http(normalize_http_endpoint(rpc)),
                name,
            );
            continue;
        }
        if let Some(ws) = entry.ws.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            push_endpoint(
                &mut endpoints,
                &mut options,
                &mut seen,
                ProviderConfig::WebSocket(ws.to_string()),
                name,
            );
            continue;
        }
        if let Some(ipc) = entry.ipc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            #[cfg(unix)]
            {
                let Some(ipc_path) = expand_path(ipc) else {
                    continue;
                };
                push_endpoint(
                    &mut endpoints,
                    &mut options,
                    &mut seen,
                    ProviderConfig::Ipc(ipc_path),
                    name.or_else(|| Some(format!("ipc-{idx}"))),
                );
            }
            #[cfg(not(unix))]
            {
                let _ = (idx, ipc);
            }
        }
    }

    // Default fallback
    if endpoints.is_empty() {
        push_endpoint(
            &mut endpoints,
            &mut options,
            &mut seen,
            ProviderConfig::Http(normalize_http_endpoint("localhost:8545")),
            Some("local".to_string()),
        );
    }

    Ok((endpoints, options))
}

fn contracts_from_args_and_config(args: &Args, config: &Config) -> Result<ContractSet> {
    let governance = args
        .governance
        .as_deref()
        .or(config.contracts.governance.as_deref());
    let applicant = args
        .applicant
        .as_deref()
        .or(config.contracts.applicant.as_deref());
    let addresses = ContractAddresses {
        governance: parse_address_arg("governance", governance)?,
        applicant: parse_address_arg("applicant", applicant)?,
    };

    let artifacts_dir = args
        .artifacts
        .clone()
        .or_else(|| config.artifacts_dir.as_deref().and_then(expand_path));

    ContractSet::load(addresses, artifacts_dir.as_deref(), config.chain_id())
}

fn parse_address_arg(name: &str, raw: Option<&str>) -> Result<Option<Address>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Address>()
                .with_context(|| format!("Invalid {name} address '{s}'"))
        })
        .transpose()
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["humanity-status"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_normalize_http_endpoint() {
        assert_eq!(normalize_http_endpoint("localhost:8545"), "http://localhost:8545");
        assert_eq!(
            normalize_http_endpoint(" https://mainnet.example "),
            "https://mainnet.example"
        );
    }

    #[test]
    fn test_cli_endpoint_comes_first_and_dedups() {
        let config: Config = toml::from_str(
            r#"
            [[endpoints]]
            name = "dup"
            rpc = "localhost:8545"

            [[endpoints]]
            name = "remote"
            ws = "wss://node.example"
            "#,
        )
        .unwrap();
        let (endpoints, options) =
            endpoints_from_args_and_config(&args(&["--rpc", "localhost:8545"]), &config).unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(options[0].label, "cli (http://localhost:8545)");
        assert!(matches!(endpoints[1], ProviderConfig::WebSocket(_)));
    }

    #[test]
    fn test_default_endpoint() {
        let (endpoints, _) = endpoints_from_args_and_config(&args(&[]), &Config::default()).unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].display(), "http://localhost:8545");
    }

    #[test]
    fn test_cli_addresses_override_config() {
        let mut config = Config::default();
        config.contracts.governance = Some("0x1111111111111111111111111111111111111111".into());
        config.contracts.applicant = Some("0x2222222222222222222222222222222222222222".into());

        let set = contracts_from_args_and_config(
            &args(&["--governance", "0x3333333333333333333333333333333333333333"]),
            &config,
        )
        .unwrap();
        use humanity_status::domain::governance::ContractKind;
        assert_eq!(
            set.get(ContractKind::Governance).address,
            Address::repeat_byte(0x33)
        );
        assert_eq!(
            set.get(ContractKind::Applicant).address,
            Address::repeat_byte(0x22)
        );

        assert!(contracts_from_args_and_config(&args(&["--applicant", "nope"]), &config).is_err());
    }

    #[test]
    fn test_export_flag() {
        assert!(Args::try_parse_from(["humanity-status", "--export", "out"]).is_err());
        assert!(Args::try_parse_from(["humanity-status", "--once", "136", "--csv", "out"]).is_err());
        let parsed = args(&["--once", "136", "--export", "out"]);
        assert_eq!(parsed.export.as_deref(), Some(Path::new("out")));
    }

    fn builtin_contracts() -> ContractSet {
        ContractSet::builtin(Address::repeat_byte(0x11), Address::repeat_byte(0x22)).unwrap()
    }

    #[tokio::test]
    async fn test_connect_first_skips_bad_endpoints() {
        let endpoints = vec![
            ProviderConfig::Http("not a url".into()),
            ProviderConfig::Http("http://127.0.0.1:8545".into()),
        ];
        let client = connect_first(endpoints, &builtin_contracts()).await.unwrap();
        assert_eq!(client.endpoint_name(), "http://127.0.0.1:8545");
    }

    #[tokio::test]
    async fn test_connect_first_reports_last_error() {
        let err = connect_first(vec![ProviderConfig::Http("not a url".into())], &builtin_contracts())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid HTTP URL"));

        let err = connect_first(vec![], &builtin_contracts()).await.unwrap_err();
        assert_eq!(err.to_string(), "No endpoints configured");
    }

    #[test]
    fn test_keypress_acknowledges_notice() {
        let mut app = App::new("https://etherscan.io".into());
        app.set_notice("Wrong Proposal ID or Address.");

        let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        handle_key(&mut app, quit);
        assert!(!app.should_quit);
        assert!(app.status_text().is_none());

        handle_key(&mut app, quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_json_requires_once() {
        assert!(Args::try_parse_from(["humanity-status", "--json"]).is_err());
        let parsed = args(&["--once", "136", "--json"]);
        assert_eq!(parsed.once.as_deref(), Some("136"));
        assert!(parsed.json);
    }
}
