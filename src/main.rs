use std::path::Path;
use std::process::ExitCode;

use clap::{Args as ClapArgs, Parser, Subcommand};

use godspeed::config::Settings;
use godspeed::core::color::assign_color;
use godspeed::core::draft::{TaskPayload, TaskUpdate};
use godspeed::core::task::{Priority, Task, TaskType};
use godspeed::core::user::UserDirectory;
use godspeed::core::view::{self, ListFilter, TaskCounts, TypeFilter};
use godspeed::input::{self, NaturalDateResolver, parser::DATE_MARKER, parser::LABEL_MARKER};
use godspeed::predict::{self, Prediction};
use godspeed::store::{self, Connection, StoreError, formula, keyring, record::field};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Quick-entry tasks backed by Airtable.
#[derive(Parser, Debug)]
#[command(name = "godspeed", version)]
struct Cli {
    /// Log debug output to the journal
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show how quick-entry text is read (offline)
    Parse {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Create a task from quick-entry text
    Add(AddArgs),
    /// List tasks
    List(ListArgs),
    /// Task counters
    Stats,
    /// Mark a task completed
    Done { id: String },
    /// Mark a task not completed
    Reopen { id: String },
    Delete { id: String },
    /// Defaults the next task would get
    Predict,
    /// Suggested assignees and priority for a type and area
    Suggest {
        task_type: String,
        area: Option<String>,
    },
    /// Labels in use
    Labels,
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Store the API key in the keyring
    Login { api_key: String },
    /// Remove the API key from the keyring
    Logout,
}

#[derive(ClapArgs, Debug)]
struct AddArgs {
    /// Task text with optional @labels and one #date phrase
    #[arg(required = true)]
    text: Vec<String>,

    /// Tarea, Ticket, Bug or Feature
    #[arg(long = "type", value_parser = parse_task_type)]
    task_type: Option<TaskType>,

    #[arg(long)]
    area: Option<String>,

    /// low, medium or high (Baja, Media, Alta)
    #[arg(long, value_parser = parse_priority)]
    priority: Option<Priority>,

    /// User record id or name
    #[arg(long)]
    assign: Option<String>,

    #[arg(long)]
    notes: Option<String>,

    /// Do not fill unset fields from history
    #[arg(long)]
    no_predict: bool,
}

#[derive(ClapArgs, Debug)]
struct ListArgs {
    /// inbox, today, upcoming, completed or all
    #[arg(value_parser = parse_list, default_value = "inbox")]
    list: ListFilter,

    #[arg(long = "type", value_parser = parse_task_type, conflicts_with = "mine")]
    task_type: Option<TaskType>,

    #[arg(long)]
    area: Option<String>,

    /// Only tasks assigned to the current user
    #[arg(long)]
    mine: bool,
}

impl ListArgs {
    fn type_filter(&self) -> TypeFilter {
        match (self.task_type, self.mine) {
            (_, true) => TypeFilter::Mine,
            (Some(ty), false) => TypeFilter::Type(ty),
            (None, false) => TypeFilter::All,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the settings file (API key masked)
    Show,
    /// Change one setting; an empty value clears optional settings
    Set { key: String, value: String },
}

fn parse_task_type(s: &str) -> Result<TaskType, String> {
    TaskType::from_keyword(s).ok_or_else(|| format!("unknown type {:?}", s))
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::from_keyword(s).ok_or_else(|| format!("unknown priority {:?}", s))
}

fn parse_list(s: &str) -> Result<ListFilter, String> {
    ListFilter::from_name(s).ok_or_else(|| format!("unknown list {:?}", s))
}

fn init_logging() {
    // Journal logging (`journalctl --user -t godspeed -f`). Crate targets at
    // info/debug (per toggle), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("godspeed") {
                let max = if godspeed::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(j) => j.with_syslog_identifier("godspeed".to_string()),
        // No journal socket (containers, macOS): run without a logger.
        Err(_) => return,
    };

    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so crate debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

async fn resolve_api_key(settings: &Settings) -> Result<String, StoreError> {
    match keyring::load_api_key(&settings.base_id).await {
        Ok(Some(key)) => return Ok(key),
        Ok(None) => {}
        Err(e) => log::warn!("Keyring unavailable, falling back to settings: {}", e),
    }
    settings
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or(StoreError::NotConfigured("API key (run `godspeed login <key>`)"))
}

async fn open(settings: &Settings) -> Result<Connection, StoreError> {
    if !settings.has_base() {
        return Err(StoreError::NotConfigured(
            "base id (run `godspeed config set base_id <id>`)",
        ));
    }
    let api_key = resolve_api_key(settings).await?;
    store::connect(settings, &api_key).await
}

/// All tasks oldest-first, the order predictions expect.
async fn history(conn: &Connection) -> Result<Vec<Task>, StoreError> {
    let mut tasks = conn.client.list_tasks(ListFilter::All, &[], today()).await?;
    tasks.reverse();
    Ok(tasks)
}

fn print_task(task: &Task, users: &UserDirectory) {
    let mut line = format!("{}  [{}] {}", task.id, task.task_type, task.title);
    if task.completed {
        line.push_str("  (done)");
    }
    if let Some(due) = task.due {
        let marker = if view::is_overdue(task, today()) { "!" } else { "" };
        line.push_str(&format!("  {}{}{}", DATE_MARKER, view::format_due(due, today()), marker));
    }
    for label in &task.labels {
        line.push_str(&format!("  {}{}", LABEL_MARKER, label));
    }
    if !task.area.is_empty() {
        line.push_str(&format!("  area:{}", task.area));
    }
    if let Some(assignee) = task.assigned_to.as_deref() {
        let name = users.find_by_id(assignee).map_or(assignee, |u| u.name.as_str());
        line.push_str(&format!("  -> {}", name));
    }
    println!("{}", line);
}

fn print_prediction(p: &Prediction, users: &UserDirectory) {
    let assignee = p
        .assigned_to
        .as_deref()
        .map(|id| users.find_by_id(id).map_or(id.to_string(), |u| u.display_label()))
        .unwrap_or_else(|| "-".to_string());
    println!("type:        {}", p.task_type);
    println!("area:        {}", if p.area.is_empty() { "-" } else { p.area.as_str() });
    println!("assignee:    {}", assignee);
    println!("priority:    {}", p.priority);
    println!(
        "confidence:  {:.0}%{}",
        p.confidence * 100.0,
        if p.is_confident() { "" } else { " (not applied)" }
    );
}

fn cmd_parse(text: &[String]) -> CliResult {
    let draft = input::parse(&text.join(" "), &NaturalDateResolver::local());
    println!("title:  {}", if draft.has_title() { draft.title.as_str() } else { "(empty)" });
    println!("labels: {}", draft.labels.join(", "));
    match draft.due {
        Some(due) => println!("due:    {}", due.format("%Y-%m-%d %H:%M")),
        None => println!("due:    -"),
    }
    Ok(())
}

async fn cmd_add(args: AddArgs, settings: &Settings) -> CliResult {
    let draft = input::parse(&args.text.join(" "), &NaturalDateResolver::local());
    if !draft.has_title() {
        return Err("task title is empty".into());
    }

    let conn = open(settings).await?;
    let mut payload = TaskPayload::from_draft(draft);
    payload.task_type = args.task_type;
    payload.priority = args.priority;
    payload.area = args.area;
    payload.notes = args.notes;
    payload.requested_by = settings
        .current_user()
        .and_then(|id| conn.users.find_by_external_id(id))
        .map(|u| u.id.clone());

    if let Some(who) = args.assign {
        let user = conn
            .users
            .find_by_id(&who)
            .or_else(|| conn.users.users().iter().find(|u| u.name.eq_ignore_ascii_case(&who)))
            .ok_or_else(|| format!("unknown user {:?}", who))?;
        payload.assigned_to = Some(user.id.clone());
    }

    if !args.no_predict {
        let tasks = history(&conn).await?;
        let prediction = predict::predict(&tasks, settings.current_user(), &conn.users);
        if prediction.apply_to(&mut payload) {
            println!("Predictions applied ({:.0}% confidence)", prediction.confidence * 100.0);
        }
    }

    let task = conn.client.create_task(&payload).await?;
    print_task(&task, &conn.users);
    Ok(())
}

async fn cmd_list(args: ListArgs, settings: &Settings) -> CliResult {
    let type_filter = args.type_filter();
    let mut extra = Vec::new();
    if let Some(area) = args.area.as_deref() {
        extra.push(formula::field_equals(field::AREA, area));
    }

    let conn = open(settings).await?;
    let today = today();
    let tasks = conn.client.list_tasks(args.list, &extra, today).await?;

    let current_user = settings
        .current_user()
        .and_then(|id| conn.users.find_by_external_id(id));
    if type_filter == TypeFilter::Mine && current_user.is_none() {
        return Err("--mine needs current_user_external_id to match a user".into());
    }

    let shown = view::select_tasks(&tasks, args.list, &type_filter, current_user, today);
    if shown.is_empty() {
        println!("No tasks.");
    }
    for task in shown {
        print_task(task, &conn.users);
    }
    Ok(())
}

async fn cmd_stats(settings: &Settings) -> CliResult {
    let conn = open(settings).await?;
    let today = today();
    let tasks = conn.client.list_tasks(ListFilter::All, &[], today).await?;
    let current_user = settings
        .current_user()
        .and_then(|id| conn.users.find_by_external_id(id));

    for list in ListFilter::ALL {
        println!("{:<10} {}", format!("{}:", list.name()), view::filter_tasks(&tasks, list, today).len());
    }
    let counts = TaskCounts::build(&tasks, today, current_user);
    println!("active:    {}", counts.active);
    println!("tareas:    {}", counts.tasks);
    println!("tickets:   {}", counts.tickets);
    println!("mine:      {}", counts.mine);
    Ok(())
}

async fn cmd_update(id: &str, settings: &Settings, completed: bool) -> CliResult {
    let conn = open(settings).await?;
    let task = conn
        .client
        .update_task(id, &TaskUpdate::completion(completed), today())
        .await?;
    print_task(&task, &conn.users);
    Ok(())
}

async fn cmd_delete(id: &str, settings: &Settings) -> CliResult {
    let conn = open(settings).await?;
    conn.client.delete_task(id).await?;
    println!("Deleted {}", id);
    Ok(())
}

async fn cmd_predict(settings: &Settings) -> CliResult {
    let conn = open(settings).await?;
    let tasks = history(&conn).await?;
    let prediction = predict::predict(&tasks, settings.current_user(), &conn.users);
    print_prediction(&prediction, &conn.users);
    Ok(())
}

async fn cmd_suggest(task_type: &str, area: &str, settings: &Settings) -> CliResult {
    let conn = open(settings).await?;
    let set = predict::suggest(task_type, area, conn.users.users(), &settings.suggestion_tables());
    println!("priority: {}", set.priority);
    if set.assignees.is_empty() {
        println!("No suggested assignees.");
    }
    for user in &set.assignees {
        println!("  {}  {}", user.id, user.display_label());
    }
    Ok(())
}

async fn cmd_labels(settings: &Settings) -> CliResult {
    let conn = open(settings).await?;
    for label in conn.client.labels(today()).await? {
        println!("{}  {}", assign_color(&label), label);
    }
    Ok(())
}

fn cmd_config(action: Option<ConfigAction>, mut settings: Settings, path: &Path) -> CliResult {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let mut shown = settings.clone();
            if shown.api_key.is_some() {
                shown.api_key = Some("********".to_string());
            }
            println!("{}", path.display());
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        ConfigAction::Set { key, value } => {
            settings.set(&key, &value)?;
            settings.save_to(path)?;
            log::info!("Setting {} updated", key);
        }
    }
    Ok(())
}

async fn cmd_login(api_key: &str, settings: &Settings) -> CliResult {
    if !settings.has_base() {
        return Err("set base_id before storing a key".into());
    }
    keyring::store_api_key(&settings.base_id, api_key).await?;
    println!("API key stored in keyring");
    Ok(())
}

async fn cmd_logout(settings: &Settings) -> CliResult {
    keyring::delete_api_key(&settings.base_id).await?;
    println!("API key removed from keyring");
    Ok(())
}

async fn run(command: Command, settings: Settings, path: &Path) -> CliResult {
    match command {
        Command::Parse { text } => cmd_parse(&text),
        Command::Add(args) => cmd_add(args, &settings).await,
        Command::List(args) => cmd_list(args, &settings).await,
        Command::Stats => cmd_stats(&settings).await,
        Command::Done { id } => cmd_update(&id, &settings, true).await,
        Command::Reopen { id } => cmd_update(&id, &settings, false).await,
        Command::Delete { id } => cmd_delete(&id, &settings).await,
        Command::Predict => cmd_predict(&settings).await,
        Command::Suggest { task_type, area } => {
            cmd_suggest(&task_type, area.as_deref().unwrap_or(""), &settings).await
        }
        Command::Labels => cmd_labels(&settings).await,
        Command::Config { action } => cmd_config(action, settings, path),
        Command::Login { api_key } => cmd_login(&api_key, &settings).await,
        Command::Logout => cmd_logout(&settings).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let path = Settings::default_path();
    let settings = match Settings::load_from(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    godspeed::set_debug_logging(cli.debug || settings.debug_logging);
    init_logging();

    match run(cli.command, settings, &path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("godspeed").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_collects_text_and_options() {
        let cli = parse(&["add", "Call", "client", "#tomorrow", "--type", "bug", "--priority", "alta"]).unwrap();
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.text, vec!["Call", "client", "#tomorrow"]);
        assert_eq!(args.task_type, Some(TaskType::Bug));
        assert_eq!(args.priority, Some(Priority::High));
        assert!(!args.no_predict);
    }

    #[test]
    fn option_without_value_is_an_error() {
        assert!(parse(&["add", "Fix", "login", "--area"]).is_err());
        assert!(parse(&["add", "Fix", "--type", "chore"]).is_err());
        assert!(parse(&["add"]).is_err());
    }

    #[test]
    fn double_dash_keeps_option_names_in_title() {
        let cli = parse(&["add", "--area", "Dev", "--", "Document", "--area", "flag"]).unwrap();
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.area.as_deref(), Some("Dev"));
        assert_eq!(args.text, vec!["Document", "--area", "flag"]);
    }

    #[test]
    fn list_defaults_and_filters() {
        let cli = parse(&["list"]).unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.list, ListFilter::Inbox);
        assert_eq!(args.type_filter(), TypeFilter::All);

        let cli = parse(&["list", "completed", "--mine", "--debug"]).unwrap();
        assert!(cli.debug);
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.list, ListFilter::Completed);
        assert_eq!(args.type_filter(), TypeFilter::Mine);

        let cli = parse(&["list", "all", "--type", "ticket"]).unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.type_filter(), TypeFilter::Type(TaskType::Ticket));

        assert!(parse(&["list", "someday"]).is_err());
        assert!(parse(&["list", "--type", "bug", "--mine"]).is_err());
    }

    #[test]
    fn config_set_needs_key_and_value() {
        let cli = parse(&["config", "set", "base_id", "appXYZ"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config { action: Some(ConfigAction::Set { ref key, ref value }) }
                if key == "base_id" && value == "appXYZ"
        ));
        assert!(matches!(parse(&["config"]).unwrap().command, Command::Config { action: None }));
        assert!(parse(&["config", "set", "base_id"]).is_err());
    }

    #[test]
    fn id_commands_need_an_id() {
        assert!(matches!(parse(&["done", "rec1"]).unwrap().command, Command::Done { ref id } if id == "rec1"));
        assert!(parse(&["reopen"]).is_err());
        assert!(parse(&["delete"]).is_err());
    }
}
