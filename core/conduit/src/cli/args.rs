use crate::domain::{
    ConduitCommand, ConfigCommand, ConfluenceCommand, IssueKey, JiraCommand, PlatformName,
    DEFAULT_ISSUE_TYPE,
};
use clap::builder::ArgAction;
use clap::error::ErrorKind;
use clap::value_parser;
use clap_complete::Shell;
use common::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;

const BIN_NAME: &str = "conduit";

/// 一覧系コマンドの既定件数
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// CLI の解析結果（グローバルオプション + コマンド）
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub verbose: bool,
    /// `--site <alias>`。None なら設定の default_site_alias
    pub site: Option<String>,
    pub command: ConduitCommand,
}

/// 解析結果: 通常の Config、補完スクリプト生成、またはヘルプ等の表示のみ
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
    /// `--help` / `--version` / サブコマンド省略時（stdout に出して終了コード 0）
    Display(String),
}

fn global_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        clap::Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Mirror structured logs to stderr")
            .action(ArgAction::SetTrue)
            .global(true),
    )
    .arg(
        clap::Arg::new("site")
            .long("site")
            .value_name("alias")
            .help("Site alias from the configuration (default: default_site_alias)")
            .num_args(1)
            .global(true),
    )
    .arg(
        clap::Arg::new("generate")
            .long("generate")
            .value_name("shell")
            .help("Generate shell completion script")
            .value_parser(value_parser!(Shell))
            .num_args(1),
    )
}

fn positional(name: &'static str, help: &'static str) -> clap::Arg {
    clap::Arg::new(name).required(true).help(help)
}

fn content_file_arg(required: bool) -> clap::Arg {
    clap::Arg::new("content-file")
        .long("content-file")
        .value_name("path")
        .help("File containing the Markdown text (see get-content-path)")
        .value_parser(value_parser!(PathBuf))
        .required(required)
        .num_args(1)
}

fn build_config_subcommand() -> clap::Command {
    clap::Command::new("config")
        .about("Manage the configuration file")
        .subcommand_required(true)
        .subcommand(clap::Command::new("init").about("Write a template config.json (never overwrites)"))
        .subcommand(clap::Command::new("list").about("List configured sites with tokens masked"))
        .subcommand(clap::Command::new("path").about("Print the configuration file path"))
}

fn build_jira_subcommand() -> clap::Command {
    let issue = clap::Command::new("issue")
        .about("Jira issue operations")
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("get")
                .about("Get an issue as JSON")
                .arg(positional("key", "Issue key (e.g. PROJ-123)")),
        )
        .subcommand(
            clap::Command::new("search")
                .about("Search issues with JQL")
                .arg(positional("jql", "JQL query")),
        )
        .subcommand(
            clap::Command::new("create")
                .about("Create an issue; the description is read from --content-file")
                .arg(positional("project", "Project key"))
                .arg(
                    clap::Arg::new("summary")
                        .long("summary")
                        .value_name("text")
                        .required(true)
                        .num_args(1),
                )
                .arg(content_file_arg(true))
                .arg(
                    clap::Arg::new("type")
                        .long("type")
                        .value_name("issue type")
                        .default_value(DEFAULT_ISSUE_TYPE)
                        .num_args(1),
                ),
        )
        .subcommand(
            clap::Command::new("update")
                .about("Update summary and/or description")
                .arg(positional("key", "Issue key"))
                .arg(
                    clap::Arg::new("summary")
                        .long("summary")
                        .value_name("text")
                        .num_args(1),
                )
                .arg(content_file_arg(false)),
        )
        .subcommand(
            clap::Command::new("comment")
                .about("Add a comment read from --content-file")
                .arg(positional("key", "Issue key"))
                .arg(content_file_arg(true)),
        )
        .subcommand(
            clap::Command::new("status")
                .about("Transition an issue to a status")
                .arg(positional("key", "Issue key"))
                .arg(positional("status", "Target status or transition name")),
        )
        .subcommand(
            clap::Command::new("transitions")
                .about("List available transitions")
                .arg(positional("key", "Issue key")),
        )
        .subcommand(
            clap::Command::new("remote-links")
                .about("Get remote links of an issue")
                .arg(positional("key", "Issue key")),
        );
    clap::Command::new("jira")
        .about("Jira commands")
        .subcommand_required(true)
        .subcommand(issue)
}

fn limit_arg(name: &'static str) -> clap::Arg {
    clap::Arg::new(name)
        .long(name)
        .value_name("n")
        .value_parser(value_parser!(u32).range(1..))
        .default_value("100")
        .num_args(1)
}

fn build_confluence_subcommand() -> clap::Command {
    let pages = clap::Command::new("pages")
        .about("Confluence page operations")
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("list")
                .about("List pages in a space")
                .arg(positional("space", "Space key"))
                .arg(limit_arg("limit")),
        )
        .subcommand(
            clap::Command::new("list-all")
                .about("List every page in a space (paginated)")
                .arg(positional("space", "Space key"))
                .arg(limit_arg("batch-size")),
        )
        .subcommand(
            clap::Command::new("children")
                .about("List child pages")
                .arg(positional("parent_id", "Parent page ID")),
        )
        .subcommand(
            clap::Command::new("content")
                .about("Show a page rendered as Markdown")
                .arg(positional("space", "Space key"))
                .arg(positional("title", "Exact page title")),
        );
    clap::Command::new("confluence")
        .about("Confluence commands")
        .subcommand_required(true)
        .subcommand(pages)
}

pub(crate) fn build_clap_command() -> clap::Command {
    global_args(
        clap::Command::new(BIN_NAME)
            .about("Jira / Confluence from the command line, with content staging")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand(
                clap::Command::new("connect")
                    .about("Check the connection to a platform")
                    .arg(positional("platform", "jira or confluence")),
            )
            .subcommand(
                clap::Command::new("get-content-path")
                    .about("Print a fresh staging file path (the file is not created)"),
            )
            .subcommand(build_config_subcommand())
            .subcommand(build_jira_subcommand())
            .subcommand(build_confluence_subcommand())
            .subcommand(clap::Command::new("mcp").about("Run the MCP server on stdin/stdout")),
    )
}

fn required(m: &clap::ArgMatches, name: &str) -> Result<String, Error> {
    m.get_one::<String>(name)
        .cloned()
        .ok_or_else(|| Error::invalid_argument(format!("missing <{}>", name)))
}

fn issue_key(m: &clap::ArgMatches) -> Result<IssueKey, Error> {
    IssueKey::parse(&required(m, "key")?)
}

fn content_file(m: &clap::ArgMatches) -> Result<PathBuf, Error> {
    m.get_one::<PathBuf>("content-file")
        .cloned()
        .ok_or_else(|| Error::invalid_argument("missing --content-file"))
}

fn limit(m: &clap::ArgMatches, name: &str) -> u32 {
    m.get_one::<u32>(name).copied().unwrap_or(DEFAULT_PAGE_LIMIT)
}

fn jira_command(m: &clap::ArgMatches) -> Result<JiraCommand, Error> {
    let Some(("issue", issue_m)) = m.subcommand() else {
        return Err(Error::invalid_argument("jira requires a subcommand"));
    };
    match issue_m.subcommand() {
        Some(("get", m)) => Ok(JiraCommand::Get { key: issue_key(m)? }),
        Some(("search", m)) => Ok(JiraCommand::Search {
            jql: required(m, "jql")?,
        }),
        Some(("create", m)) => Ok(JiraCommand::Create {
            project: required(m, "project")?,
            summary: required(m, "summary")?,
            content_file: content_file(m)?,
            issue_type: m
                .get_one::<String>("type")
                .cloned()
                .unwrap_or_else(|| DEFAULT_ISSUE_TYPE.to_string()),
        }),
        Some(("update", m)) => Ok(JiraCommand::Update {
            key: issue_key(m)?,
            summary: m.get_one::<String>("summary").cloned(),
            content_file: m.get_one::<PathBuf>("content-file").cloned(),
        }),
        Some(("comment", m)) => Ok(JiraCommand::Comment {
            key: issue_key(m)?,
            content_file: content_file(m)?,
        }),
        Some(("status", m)) => Ok(JiraCommand::Status {
            key: issue_key(m)?,
            status: required(m, "status")?,
        }),
        Some(("transitions", m)) => Ok(JiraCommand::Transitions { key: issue_key(m)? }),
        Some(("remote-links", m)) => Ok(JiraCommand::RemoteLinks { key: issue_key(m)? }),
        _ => Err(Error::invalid_argument("jira issue requires a subcommand")),
    }
}

fn confluence_command(m: &clap::ArgMatches) -> Result<ConfluenceCommand, Error> {
    let Some(("pages", pages_m)) = m.subcommand() else {
        return Err(Error::invalid_argument("confluence requires a subcommand"));
    };
    match pages_m.subcommand() {
        Some(("list", m)) => Ok(ConfluenceCommand::List {
            space: required(m, "space")?,
            limit: limit(m, "limit"),
        }),
        Some(("list-all", m)) => Ok(ConfluenceCommand::ListAll {
            space: required(m, "space")?,
            batch_size: limit(m, "batch-size"),
        }),
        Some(("children", m)) => Ok(ConfluenceCommand::Children {
            parent_id: required(m, "parent_id")?,
        }),
        Some(("content", m)) => Ok(ConfluenceCommand::Content {
            space: required(m, "space")?,
            title: required(m, "title")?,
        }),
        _ => Err(Error::invalid_argument("confluence pages requires a subcommand")),
    }
}

fn matches_to_command(matches: &clap::ArgMatches) -> Result<Option<ConduitCommand>, Error> {
    let command = match matches.subcommand() {
        None => return Ok(None),
        Some(("connect", m)) => ConduitCommand::Connect {
            platform: required(m, "platform")?.parse::<PlatformName>()?,
        },
        Some(("get-content-path", _)) => ConduitCommand::GetContentPath,
        Some(("config", m)) => ConduitCommand::Config(match m.subcommand() {
            Some(("init", _)) => ConfigCommand::Init,
            Some(("list", _)) => ConfigCommand::List,
            Some(("path", _)) => ConfigCommand::Path,
            _ => return Err(Error::invalid_argument("config requires a subcommand")),
        }),
        Some(("jira", m)) => ConduitCommand::Jira(jira_command(m)?),
        Some(("confluence", m)) => ConduitCommand::Confluence(confluence_command(m)?),
        Some(("mcp", _)) => ConduitCommand::Mcp,
        Some((name, _)) => {
            return Err(Error::invalid_argument(format!(
                "Command '{}' is not implemented.",
                name
            )))
        }
    };
    Ok(Some(command))
}

/// 引数列を解析する（先頭はプログラム名）。テストからも使う。
pub fn parse_args_from<I, T>(args: I) -> Result<ParseOutcome, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut cmd = build_clap_command();
    let matches = match cmd.try_get_matches_from_mut(args) {
        Ok(m) => m,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(ParseOutcome::Display(e.to_string()));
        }
        Err(e) => return Err(Error::invalid_argument(e.to_string())),
    };

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }

    match matches_to_command(&matches)? {
        Some(command) => Ok(ParseOutcome::Config(Config {
            verbose: matches.get_flag("verbose"),
            site: matches.get_one::<String>("site").cloned(),
            command,
        })),
        None => Ok(ParseOutcome::Display(cmd.render_help().to_string())),
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    parse_args_from(std::env::args_os())
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut std::io::stdout());
}
