use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use hollywood_core::core_api::{Engine, Session, default_browse_dir, list_save_candidates};
use hollywood_core::fields::FieldId;
use hollywood_core::policy::ActivePolicy;
use hollywood_core::studio::Studio;
use hollywood_render::{
    FieldSelection, JsonStyle, render_json_full, render_json_selected, render_layout,
    render_save_report, render_selected_pairs, render_studio_sheet,
};
use serde_json::Value as JsonValue;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(value_name = "SAVE.json")]
    path: Option<PathBuf>,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    budget: bool,
    #[arg(long)]
    cash: bool,
    #[arg(long)]
    reputation: bool,
    #[arg(long)]
    influence: bool,
    #[arg(long = "tag-slot-max")]
    tag_slot_max: bool,
    #[arg(long = "contract-movies-max")]
    contract_movies_max: bool,
    #[arg(long = "contract-years-max")]
    contract_years_max: bool,
    #[arg(long = "all-cinemas")]
    all_cinemas: bool,
    #[arg(long = "owned-cinemas")]
    owned_cinemas: bool,
    #[arg(long = "independent-cinemas")]
    independent_cinemas: bool,
    #[arg(long)]
    policy: bool,
    #[arg(long)]
    versions: bool,
    #[arg(long = "set-budget", allow_hyphen_values = true)]
    set_budget: Option<String>,
    #[arg(long = "set-cash", allow_hyphen_values = true)]
    set_cash: Option<String>,
    #[arg(long = "set-reputation", allow_hyphen_values = true)]
    set_reputation: Option<String>,
    #[arg(long = "set-influence", allow_hyphen_values = true)]
    set_influence: Option<String>,
    #[arg(long = "set-tag-slot-max", allow_hyphen_values = true)]
    set_tag_slot_max: Option<String>,
    #[arg(long = "set-contract-movies-max", allow_hyphen_values = true)]
    set_contract_movies_max: Option<String>,
    #[arg(long = "set-contract-years-max", allow_hyphen_values = true)]
    set_contract_years_max: Option<String>,
    #[arg(long = "set-all-cinemas", allow_hyphen_values = true)]
    set_all_cinemas: Option<String>,
    #[arg(
        long = "set-owned",
        value_name = "STUDIO=COUNT",
        value_parser = parse_owned_edit,
        allow_hyphen_values = true
    )]
    set_owned: Vec<(Studio, String)>,
    #[arg(long = "set-policy", value_name = "POLICY_*", value_parser = parse_policy)]
    set_policy: Option<ActivePolicy>,
    /// Print the rewritten save instead of writing it.
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List candidate save files (defaults to the home directory).
    List {
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    Debug {
        #[command(subcommand)]
        command: DebugCommand,
    },
}

#[derive(Debug, Subcommand)]
enum DebugCommand {
    /// Show where each recognized value sits in the file.
    Layout {
        #[arg(value_name = "SAVE.json")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn field_selection(&self) -> FieldSelection {
        FieldSelection {
            budget: self.budget,
            cash: self.cash,
            reputation: self.reputation,
            influence: self.influence,
            tag_slot_max: self.tag_slot_max,
            contract_movies_max: self.contract_movies_max,
            contract_years_max: self.contract_years_max,
            all_cinemas: self.all_cinemas,
            owned_cinemas: self.owned_cinemas,
            independent_cinemas: self.independent_cinemas,
            policy: self.policy,
            versions: self.versions,
        }
    }

    fn scalar_edits(&self) -> Vec<(FieldId, &str)> {
        [
            (FieldId::Budget, &self.set_budget),
            (FieldId::Cash, &self.set_cash),
            (FieldId::Reputation, &self.set_reputation),
            (FieldId::Influence, &self.set_influence),
            (FieldId::TagSlotMax, &self.set_tag_slot_max),
            (FieldId::ContractMoviesMax, &self.set_contract_movies_max),
            (FieldId::ContractYearsMax, &self.set_contract_years_max),
            (FieldId::AllCinemas, &self.set_all_cinemas),
        ]
        .into_iter()
        .filter_map(|(id, value)| value.as_deref().map(|v| (id, v)))
        .collect()
    }

    fn has_edits(&self) -> bool {
        !self.scalar_edits().is_empty() || !self.set_owned.is_empty() || self.set_policy.is_some()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Command::List { dir }) => run_list(dir.clone()),
        Some(Command::Debug {
            command: DebugCommand::Layout { path, json },
        }) => run_debug_layout(path, *json),
        None => run_edit(&cli),
    }
}

fn run_list(dir: Option<PathBuf>) {
    let Some(dir) = dir.or_else(default_browse_dir) else {
        eprintln!("No directory given and no home directory available");
        process::exit(2);
    };

    let saves = list_save_candidates(&dir).unwrap_or_else(|e| {
        eprintln!("Error listing {}: {e}", dir.display());
        process::exit(1);
    });
    for path in saves {
        println!("{}", path.display());
    }
}

fn run_debug_layout(path: &Path, json: bool) {
    let session = open_or_exit(path);

    if json {
        let value = serde_json::to_value(session.layout()).unwrap_or(JsonValue::Null);
        print_json(&value);
        return;
    }
    print!("{}", render_layout(&session));
}

fn run_edit(cli: &Cli) {
    let Some(path) = cli.path.as_ref() else {
        eprintln!("missing <SAVE.json> path");
        process::exit(2);
    };
    let fields = cli.field_selection();
    let has_edits = cli.has_edits();

    if cli.dry_run && !has_edits {
        eprintln!("--dry-run requires at least one --set-* flag");
        process::exit(2);
    }

    let mut session = open_or_exit(path);

    for (id, value) in cli.scalar_edits() {
        session.set_field(id, value).unwrap_or_else(|e| {
            eprintln!("Error applying {} edit: {e}", id.key());
            process::exit(1);
        });
    }
    for (studio, value) in &cli.set_owned {
        session.set_owned_cinemas(*studio, value.clone());
    }
    if let Some(policy) = &cli.set_policy {
        session.set_active_policy(policy.clone());
    }

    if cli.dry_run {
        let text = session.render_text().unwrap_or_else(|e| {
            eprintln!("Error rewriting save: {e}");
            process::exit(1);
        });
        print!("{text}");
        return;
    }

    let report = if has_edits {
        Some(session.save().unwrap_or_else(|e| {
            eprintln!("Error saving {}: {e}", path.display());
            process::exit(1);
        }))
    } else {
        None
    };

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields, JsonStyle::CanonicalV1)
        } else {
            render_json_full(&session, JsonStyle::CanonicalV1)
        };
        print_json(&json);
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in render_selected_pairs(&session, &fields) {
            println!("{key}={value}");
        }
        return;
    }

    if let Some(report) = report {
        print!("{}", render_save_report(&report));
        return;
    }

    print!("{}", render_studio_sheet(&session));
}

fn open_or_exit(path: &Path) -> Session {
    Engine::new().open_path(path).unwrap_or_else(|e| {
        eprintln!("Error loading save file: {}", path.display());
        eprintln!("  {}", e);
        process::exit(1);
    })
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

// ---------------------------------------------------------------------------
// Argument parsers
// ---------------------------------------------------------------------------

fn parse_owned_edit(value: &str) -> Result<(Studio, String), String> {
    let Some((code, count)) = value.split_once('=') else {
        return Err(format!("expected STUDIO=COUNT, got '{value}'"));
    };
    let studio = Studio::from_code(code.trim()).ok_or_else(|| {
        let codes: Vec<&str> = Studio::ALL.iter().map(|s| s.code()).collect();
        format!(
            "unknown studio '{code}', expected one of: {}",
            codes.join(", ")
        )
    })?;
    Ok((studio, count.to_string()))
}

fn parse_policy(value: &str) -> Result<ActivePolicy, String> {
    let token = value.to_ascii_uppercase();
    let token = if token.starts_with("POLICY_") {
        token
    } else {
        format!("POLICY_{token}")
    };
    ActivePolicy::parse_known(&token).ok_or_else(|| {
        let tokens: Vec<String> = ActivePolicy::KNOWN
            .iter()
            .map(|p| p.token().to_string())
            .collect();
        format!(
            "invalid policy '{value}', expected one of: {}",
            tokens.join(", ")
        )
    })
}
