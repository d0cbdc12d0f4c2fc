//! Assistant tool server.
//!
//! Serves the ledger's calculators and queries as schema-described tools
//! over JSON-RPC 2.0 on stdio: initialize, tools/list, tools/call.

use std::io::{BufRead, Write};

use anyhow::Result;
use rusqlite::Connection;
use serde_json::Value;

use family_ledger::tools::protocol::*;
use family_ledger::tools::{get_tools, ToolHandlers};
use family_ledger::setup_database;

struct AssistantServer {
    handlers: ToolHandlers,
}

impl AssistantServer {
    fn new(conn: Connection) -> Self {
        Self {
            handlers: ToolHandlers::new(conn),
        }
    }

    /// Read newline-delimited JSON-RPC from stdin, answer on stdout.
    fn run(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        eprintln!("[assistant] Server started, waiting for messages...");

        for line in stdin.lock().lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            eprintln!("[assistant] <- {}", preview(&line));

            let response = self.handle(&line);
            let out = serde_json::to_string(&response)?;

            eprintln!("[assistant] -> {}", preview(&out));

            writeln!(stdout, "{}", out)?;
            stdout.flush()?;
        }

        Ok(())
    }

    fn handle(&self, msg: &str) -> JsonRpcResponse {
        let req: JsonRpcRequest = match serde_json::from_str(msg) {
            Ok(req) => req,
            Err(e) => return JsonRpcResponse::error(None, PARSE_ERROR, e.to_string()),
        };

        match req.method.as_str() {
            "initialize" => {
                let result = InitializeResult {
                    protocol_version: "2024-11-05".into(),
                    capabilities: ServerCapabilities {
                        tools: ToolsCapability {
                            list_changed: false,
                        },
                    },
                    server_info: ServerInfo {
                        name: "family-ledger".into(),
                        version: family_ledger::VERSION.into(),
                    },
                };
                respond(req.id, &result)
            }
            "tools/list" => {
                let result = ToolsListResult { tools: get_tools() };
                respond(req.id, &result)
            }
            "tools/call" => {
                let params: ToolCallParams = match serde_json::from_value(req.params) {
                    Ok(params) => params,
                    Err(e) => return JsonRpcResponse::error(req.id, INVALID_PARAMS, e.to_string()),
                };
                let result = self.handlers.call(&params.name, &params.arguments);
                respond(req.id, &result)
            }
            "notifications/initialized" => JsonRpcResponse::success(req.id, Value::Null),
            other => {
                JsonRpcResponse::error(req.id, METHOD_NOT_FOUND, format!("Unknown method: {}", other))
            }
        }
    }
}

fn respond<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INVALID_REQUEST, e.to_string()),
    }
}

fn preview(s: &str) -> String {
    if s.len() > 100 {
        format!("{}...", &s[..100])
    } else {
        s.to_string()
    }
}

fn main() -> Result<()> {
    let db_path = std::env::var("FAMILY_LEDGER_DB")
        .unwrap_or_else(|_| "family-ledger.db".to_string());

    let conn = Connection::open(&db_path)?;
    setup_database(&conn)?;
    eprintln!("[assistant] Ledger opened: {}", db_path);

    AssistantServer::new(conn).run()
}
