use super::stubs::{failed_files, services_in, staged_files, StubFactory, StubTracker};
use crate::adapter::mcp::{build_registry, McpServer};
use crate::wiring::Services;
use common::adapter::NoopLog;
use common::tool::ToolContext;
use serde_json::{json, Value};
use std::sync::Arc;

fn server(services: &Services, default_site: Option<&str>) -> McpServer {
    McpServer::new(
        build_registry(
            services.config.masked(),
            Arc::clone(&services.issues),
            Arc::clone(&services.pages),
        ),
        ToolContext::new(default_site.map(str::to_string)),
        Arc::clone(&services.pages),
        Arc::new(NoopLog),
    )
}

fn request(server: &McpServer, id: i64, method: &str, params: Value) -> Value {
    let line = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }).to_string();
    let response = server.handle_line(&line).expect("requests get a response");
    serde_json::to_value(response).unwrap()
}

fn call_tool(server: &McpServer, name: &str, arguments: Value) -> Value {
    request(server, 1, "tools/call", json!({ "name": name, "arguments": arguments }))["result"].clone()
}

#[test]
fn test_initialize_and_tools_list() {
    let tmp = tempfile::tempdir().unwrap();
    let services = services_in(tmp.path(), Arc::new(StubFactory::new(StubTracker::default())));
    let server = server(&services, None);

    let init = request(&server, 1, "initialize", json!({}));
    assert_eq!(init["id"], 1);
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(init["result"]["serverInfo"]["name"], "conduit");

    let list = request(&server, 2, "tools/list", json!({}));
    let names: Vec<&str> = list["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "add_jira_comment",
            "create_jira_issue",
            "get_confluence_page",
            "get_jira_issue",
            "list_config",
            "list_confluence_pages",
            "search_jira_issues",
        ]
    );
}

#[test]
fn test_notifications_get_no_response() {
    let tmp = tempfile::tempdir().unwrap();
    let services = services_in(tmp.path(), Arc::new(StubFactory::new(StubTracker::default())));
    let server = server(&services, None);

    assert!(server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .is_none());
    assert!(server
        .handle_line(r#"{"jsonrpc":"2.0","method":"unknown/thing"}"#)
        .is_none());
}

#[test]
fn test_protocol_errors() {
    let tmp = tempfile::tempdir().unwrap();
    let services = services_in(tmp.path(), Arc::new(StubFactory::new(StubTracker::default())));
    let server = server(&services, None);

    let unknown = request(&server, 3, "does/not/exist", json!({}));
    assert_eq!(unknown["error"]["code"], -32601);

    let malformed = serde_json::to_value(server.handle_line("{not json").unwrap()).unwrap();
    assert_eq!(malformed["error"]["code"], -32700);
    assert_eq!(malformed["id"], Value::Null);
}

#[test]
fn test_list_config_masks_tokens() {
    let tmp = tempfile::tempdir().unwrap();
    let services = services_in(tmp.path(), Arc::new(StubFactory::new(StubTracker::default())));
    let server = server(&services, None);

    let result = call_tool(&server, "list_config", json!({}));
    assert_eq!(result["isError"], false);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("****"));
    assert!(!text.contains("your-api-token"));
}

#[test]
fn test_create_issue_tool_stages_and_cleans_up() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::default()));
    let services = services_in(tmp.path(), Arc::clone(&factory));
    let server = server(&services, Some("work"));

    let result = call_tool(
        &server,
        "create_jira_issue",
        json!({ "project": "ABC", "summary": "From agent", "description": "**bold** text" }),
    );
    assert_eq!(result["isError"], false);
    assert!(result["content"][0]["text"].as_str().unwrap().contains("ABC-1"));

    let created = factory.tracker.created.lock().unwrap();
    assert_eq!(created[0].description, "**bold** text");
    assert_eq!(created[0].issue_type, "Task");
    assert_eq!(staged_files(tmp.path()), 0);
    assert_eq!(
        factory.sites.lock().unwrap().last().cloned().flatten().as_deref(),
        Some("work")
    );
}

#[test]
fn test_failed_comment_tool_reports_preserved_path() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::failing()));
    let services = services_in(tmp.path(), Arc::clone(&factory));
    let server = server(&services, None);

    let result = call_tool(
        &server,
        "add_jira_comment",
        json!({ "key": "ABC-9", "comment": "retry me" }),
    );
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("HTTP 400: summary: required"));
    assert!(text.contains("Content preserved at "));

    let failed = failed_files(tmp.path());
    assert_eq!(failed.len(), 1);
    assert_eq!(std::fs::read_to_string(&failed[0]).unwrap(), "retry me");
}

#[test]
fn test_tool_argument_errors_are_tool_results() {
    let tmp = tempfile::tempdir().unwrap();
    let services = services_in(tmp.path(), Arc::new(StubFactory::new(StubTracker::default())));
    let server = server(&services, None);

    let result = call_tool(&server, "get_jira_issue", json!({ "key": "not a key" }));
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Invalid issue key"));

    let missing = call_tool(&server, "search_jira_issues", json!({}));
    assert_eq!(missing["isError"], true);
}

#[test]
fn test_unknown_tool_is_invalid_params() {
    let tmp = tempfile::tempdir().unwrap();
    let services = services_in(tmp.path(), Arc::new(StubFactory::new(StubTracker::default())));
    let server = server(&services, None);

    let response = request(&server, 5, "tools/call", json!({ "name": "delete_everything" }));
    assert_eq!(response["error"]["code"], -32602);
}

#[test]
fn test_resources_read_confluence_page() {
    let tmp = tempfile::tempdir().unwrap();
    let services = services_in(tmp.path(), Arc::new(StubFactory::new(StubTracker::default())));
    let server = server(&services, None);

    let response = request(
        &server,
        6,
        "resources/read",
        json!({ "uri": "confluence://DOC/Release%20Notes?site=work" }),
    );
    let contents = &response["result"]["contents"][0];
    assert_eq!(contents["mimeType"], "text/markdown");
    assert!(contents["text"].as_str().unwrap().starts_with("# Release Notes\n"));

    let bad = request(&server, 7, "resources/read", json!({ "uri": "jira://ABC-1" }));
    assert_eq!(bad["error"]["code"], -32602);
}

#[test]
fn test_serve_reads_lines_until_eof() {
    let tmp = tempfile::tempdir().unwrap();
    let services = services_in(tmp.path(), Arc::new(StubFactory::new(StubTracker::default())));
    let server = server(&services, None);

    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
        "\n\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#,
        "\n"
    );
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[0]["result"], json!({}));
    assert_eq!(lines[1]["result"]["resources"], json!([]));
}
