mod adapter;
mod cli;
mod domain;
mod ports;
#[cfg(test)]
mod tests;
mod usecase;
mod wiring;

use std::process;
use std::sync::Arc;

use cli::{parse_args, print_completion, Config, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};
use common::tool::ToolContext;
use domain::{ConduitCommand, ConfigCommand, ConfluenceCommand, JiraCommand};
use ports::inbound::UseCaseRunner;
use serde_json::Value;
use usecase::{CreateIssueInput, StagedFailure};
use wiring::{wire_conduit, App, Services};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl UseCaseRunner for Runner {
    fn run(&self, config: Config) -> Result<i32, Error> {
        let name = config.command.name();
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command started")
                .layer("cli")
                .kind("lifecycle")
                .field("command", name),
        );

        let result = self.dispatch(config);

        let record = match &result {
            Ok(code) => LogRecord::new(LogLevel::Info, "command finished")
                .kind("lifecycle")
                .field("exit_code", *code),
            Err(e) => LogRecord::new(LogLevel::Error, e.to_string())
                .kind("error")
                .field("exit_code", e.exit_code()),
        };
        let _ = self
            .app
            .logger
            .log(&record.layer("cli").field("command", name));
        result
    }
}

impl Runner {
    fn dispatch(&self, config: Config) -> Result<i32, Error> {
        match config.command {
            ConduitCommand::Config(ConfigCommand::Init) => {
                let path = self.app.config_use_case.init()?;
                println!("Created configuration file at {}", path.display());
                println!("Edit it to add your Jira and Confluence sites.");
                Ok(0)
            }
            ConduitCommand::Config(ConfigCommand::List) => {
                print_json(&self.app.config_use_case.list()?)?;
                Ok(0)
            }
            ConduitCommand::Config(ConfigCommand::Path) => {
                println!("{}", self.app.config_use_case.path().display());
                Ok(0)
            }
            command => {
                let services = self.app.load_services()?;
                run_service_command(&services, config.site.as_deref(), command)
            }
        }
    }
}

/// 設定が必要なコマンドを実行する（テストからはスタブ入りの Services で呼ぶ）
pub(crate) fn run_service_command(
    services: &Services,
    site: Option<&str>,
    command: ConduitCommand,
) -> Result<i32, Error> {
    match command {
        ConduitCommand::Connect { platform } => {
            services.connect.run(platform, site)?;
            println!("Successfully connected to {}", platform);
            Ok(0)
        }
        ConduitCommand::GetContentPath => {
            println!("{}", services.staging.content_path().display());
            Ok(0)
        }
        ConduitCommand::Jira(jira) => run_jira(services, site, jira),
        ConduitCommand::Confluence(confluence) => run_confluence(services, site, confluence),
        ConduitCommand::Mcp => run_mcp(services, site),
        ConduitCommand::Config(_) => Err(Error::system("config commands do not need services")),
    }
}

fn run_jira(services: &Services, site: Option<&str>, command: JiraCommand) -> Result<i32, Error> {
    let issues = &services.issues;
    match command {
        JiraCommand::Get { key } => print_json(&issues.get(site, &key)?)?,
        JiraCommand::Search { jql } => print_json(&Value::Array(issues.search(site, &jql)?))?,
        JiraCommand::Create {
            project,
            summary,
            content_file,
            issue_type,
        } => {
            let input = CreateIssueInput {
                project,
                summary,
                issue_type,
            };
            let created = report_staged(issues.create(site, input, &content_file))?;
            print_json(&created)?;
        }
        JiraCommand::Update {
            key,
            summary,
            content_file,
        } => {
            report_staged(issues.update(site, &key, summary, content_file.as_deref()))?;
            println!("Successfully updated issue {}", key);
        }
        JiraCommand::Comment { key, content_file } => {
            report_staged(issues.comment(site, &key, &content_file))?;
            println!("Successfully added comment to issue {}", key);
        }
        JiraCommand::Status { key, status } => {
            issues.transition(site, &key, &status)?;
            println!("Successfully transitioned issue {} to '{}'", key, status);
        }
        JiraCommand::Transitions { key } => {
            let transitions = issues.transitions(site, &key)?;
            if transitions.is_empty() {
                println!("No transitions available for issue {}", key);
            }
            for t in &transitions {
                println!("{}", adapter::jira_client::transition_label(t));
            }
        }
        JiraCommand::RemoteLinks { key } => {
            print_json(&Value::Array(issues.remote_links(site, &key)?))?
        }
    }
    Ok(0)
}

fn run_confluence(
    services: &Services,
    site: Option<&str>,
    command: ConfluenceCommand,
) -> Result<i32, Error> {
    let pages = &services.pages;
    match command {
        ConfluenceCommand::List { space, limit } => {
            let found = pages.list(site, &space, limit)?;
            print_page_list(&found, &format!("No pages found in space {}", space));
        }
        ConfluenceCommand::ListAll { space, batch_size } => {
            let found = pages.list_all(site, &space, batch_size)?;
            print_page_list(&found, &format!("No pages found in space {}", space));
            if !found.is_empty() {
                println!("Total: {} page(s)", found.len());
            }
        }
        ConfluenceCommand::Children { parent_id } => {
            let found = pages.children(site, &parent_id)?;
            print_page_list(&found, &format!("No child pages found for parent {}", parent_id));
        }
        ConfluenceCommand::Content { space, title } => {
            println!("{}", pages.content(site, &space, &title)?);
        }
    }
    Ok(0)
}

fn run_mcp(services: &Services, site: Option<&str>) -> Result<i32, Error> {
    let registry = adapter::mcp::build_registry(
        services.config.masked(),
        Arc::clone(&services.issues),
        Arc::clone(&services.pages),
    );
    let server = adapter::mcp::McpServer::new(
        registry,
        ToolContext::new(site.map(str::to_string)),
        Arc::clone(&services.pages),
        Arc::clone(&services.logger),
    );
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    server
        .serve(stdin.lock(), stdout.lock())
        .map_err(|e| Error::system(format!("MCP server stopped: {:#}", e)))?;
    Ok(0)
}

/// ステージング付き処理の失敗時、退避先などの補足を stderr に出して元のエラーを返す
fn report_staged<T>(result: Result<T, StagedFailure>) -> Result<T, Error> {
    result.map_err(|failure| {
        for notice in failure.notices() {
            eprintln!("{}", notice);
        }
        failure.error
    })
}

fn print_json(value: &Value) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_page_list(pages: &[Value], empty_message: &str) {
    if pages.is_empty() {
        println!("{}", empty_message);
        return;
    }
    for page in pages {
        println!("{}", adapter::confluence_markup::page_list_line(page));
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("conduit: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

fn print_usage() {
    eprintln!("Usage: conduit [-v] [--site <alias>] <command> [args...]  (see conduit --help)");
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
        ParseOutcome::Display(text) => {
            print!("{}", text);
            return Ok(0);
        }
    };
    let app = wire_conduit(config.verbose)?;
    let runner = Runner { app };
    runner.run(config)
}
