//! Interactive console.
//!
//! Reads calls such as `personal.unlockAccount("0x..", "secret", 300)` line by
//! line, executes them against an in-process handler and prints the result.

use crate::{error::Result, helpers, rpc, Error};
use std::io::{self, BufRead, Write};

const PROMPT: &str = "> ";

/// A single line of console input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A method call, `method` in `namespace_name` form.
    Call {
        /// JSON-RPC method name
        method: String,
        /// Positional parameters
        params: Vec<rpc::Value>,
    },
    /// Nothing to do.
    Empty,
    /// Leave the console.
    Exit,
}

impl Command {
    /// Parse `namespace.method(args...)`; the parentheses may be left out for
    /// calls without arguments.
    pub fn parse(line: &str) -> Result<Command> {
        let line = line.trim();
        match line {
            "" => return Ok(Command::Empty),
            "exit" | "quit" => return Ok(Command::Exit),
            _ => {}
        }

        let (name, args) = match line.find('(') {
            Some(open) => {
                let args = line[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| Error::Input("missing closing parenthesis".into()))?;
                (line[..open].trim_end(), args)
            }
            None => (line, ""),
        };

        let mut parts = name.splitn(2, '.');
        let (namespace, method) = match (parts.next(), parts.next()) {
            (Some(namespace), Some(method)) if is_identifier(namespace) && is_identifier(method) => {
                (namespace, method)
            }
            _ => return Err(Error::Input(format!("expected namespace.method, got {:?}", name))),
        };

        let params = serde_json::from_str(&format!("[{}]", args))
            .map_err(|e| Error::Input(format!("invalid arguments: {}", e)))?;

        Ok(Command::Call {
            method: format!("{}_{}", namespace, method),
            params,
        })
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Console driving a JSON-RPC handler with synchronous calls.
pub struct Console {
    handler: rpc::IoHandler,
    next_id: usize,
}

impl Console {
    /// Create a console over `handler`.
    pub fn new(handler: rpc::IoHandler) -> Self {
        Console { handler, next_id: 1 }
    }

    /// Execute `method` with `params`.
    pub fn call(&mut self, method: &str, params: Vec<rpc::Value>) -> Result<rpc::Value> {
        let id = self.next_id;
        self.next_id += 1;

        let request = helpers::build_request(id, method, params);
        let request = serde_json::to_string(&request).map_err(|e| Error::Encoding(format!("{}", e)))?;
        log::trace!("[{}] Calling: {}", id, method);

        let response = self
            .handler
            .handle_request_sync(&request)
            .ok_or_else(|| Error::Encoding("no response".into()))?;
        match helpers::to_response_from_str(&response)? {
            rpc::Response::Single(output) => helpers::to_result_from_output(output),
            rpc::Response::Batch(_) => Err(Error::Encoding("unexpected batch response".into())),
        }
    }

    /// Read commands from `input` until EOF or `exit`, writing results to `output`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        for line in input.lines() {
            match Command::parse(&line?) {
                Ok(Command::Exit) => return Ok(()),
                Ok(Command::Empty) => {}
                Ok(Command::Call { method, params }) => match self.call(&method, params) {
                    Ok(value) => writeln!(output, "{}", pretty(&value))?,
                    Err(err) => writeln!(output, "Error: {}", err)?,
                },
                Err(err) => writeln!(output, "Error: {}", err)?,
            }
            write!(output, "{}", PROMPT)?;
            output.flush()?;
        }
        writeln!(output)
    }
}

fn pretty(value: &rpc::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
