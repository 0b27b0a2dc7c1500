//! Command dispatcher: maps command names, optionally grouped in namespaces,
//! to wrappers and calls them with positional text arguments.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use callkit_core::config::CliConfig;
use callkit_core::errors::DispatchError;
use callkit_core::tracing::fields;
use callkit_core::{Context, Value};
use callkit_engine::Wrapper;

use crate::message::user_message;

/// Whitespace, shell metacharacters and control characters.
static FORBIDDEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s|&;()<>\p{Cc}]").expect("static regex"));

/// Check that `name` can be typed as a single shell word.
pub fn validate_command_name(name: &str) -> Result<(), DispatchError> {
    let invalid = |reason: &str| DispatchError::InvalidCommandName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if let Some(found) = FORBIDDEN.find(name) {
        let c = found.as_str();
        return Err(if c.chars().all(char::is_whitespace) {
            invalid("contains whitespace")
        } else if c.chars().all(char::is_control) {
            invalid("contains a control character")
        } else {
            invalid(&format!("contains {c:?}"))
        });
    }
    if !name.chars().any(|c| !c.is_whitespace() && !c.is_control()) {
        return Err(invalid("has no printable character"));
    }
    Ok(())
}

type Commands = BTreeMap<String, Arc<dyn Wrapper>>;

fn insert(commands: &mut Commands, name: &str, wrapper: Arc<dyn Wrapper>) -> Result<(), DispatchError> {
    validate_command_name(name)?;
    if commands.contains_key(name) {
        return Err(DispatchError::DuplicateRegistration {
            name: name.to_string(),
        });
    }
    commands.insert(name.to_string(), wrapper);
    Ok(())
}

/// Registered commands and namespaces.
///
/// A command line is `[namespace] command args...`. A top-level command
/// shadows a namespace of the same name.
pub struct Dispatcher {
    program_name: String,
    json_output: bool,
    commands: Commands,
    namespaces: BTreeMap<String, Commands>,
}

impl Dispatcher {
    pub fn new(program_name: impl Into<String>) -> Self {
        Self {
            program_name: program_name.into(),
            json_output: false,
            commands: BTreeMap::new(),
            namespaces: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &CliConfig) -> Self {
        Self::new(config.effective_program_name()).with_json_output(config.effective_json_output())
    }

    /// Print results as JSON instead of canonical text.
    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }

    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    pub fn register(&mut self, name: &str, wrapper: Arc<dyn Wrapper>) -> Result<(), DispatchError> {
        insert(&mut self.commands, name, wrapper)
    }

    /// Register `name` inside `namespace`, creating the namespace on first use.
    pub fn register_in(
        &mut self,
        namespace: &str,
        name: &str,
        wrapper: Arc<dyn Wrapper>,
    ) -> Result<(), DispatchError> {
        validate_command_name(namespace)?;
        insert(self.namespaces.entry(namespace.to_string()).or_default(), name, wrapper)
    }

    pub fn command_names(&self) -> Vec<String> {
        let top = self.commands.keys().cloned();
        let nested = self
            .namespaces
            .iter()
            .flat_map(|(ns, commands)| commands.keys().map(move |name| format!("{ns} {name}")));
        top.chain(nested).collect()
    }

    /// Resolve a command line to a wrapper and its remaining arguments.
    pub fn resolve<'a, 'b>(
        &'a self,
        args: &'b [&'b str],
    ) -> Result<(&'a Arc<dyn Wrapper>, &'b [&'b str]), DispatchError> {
        let Some((first, rest)) = args.split_first() else {
            return Err(DispatchError::CommandNotFound {
                name: String::new(),
            });
        };
        if let Some(wrapper) = self.commands.get(*first) {
            return Ok((wrapper, rest));
        }
        if self.namespaces.contains_key(*first) {
            let Some((command, rest)) = rest.split_first() else {
                return Err(DispatchError::CommandNotFound {
                    name: format!("{first} "),
                });
            };
            return self
                .resolve_in(first, command)
                .map(|wrapper| (wrapper, rest));
        }
        Err(DispatchError::CommandNotFound {
            name: (*first).to_string(),
        })
    }

    /// Look up `command` in `namespace`.
    pub fn resolve_in(&self, namespace: &str, command: &str) -> Result<&Arc<dyn Wrapper>, DispatchError> {
        let commands = self
            .namespaces
            .get(namespace)
            .ok_or_else(|| DispatchError::NamespaceNotFound {
                name: namespace.to_string(),
            })?;
        commands
            .get(command)
            .ok_or_else(|| DispatchError::CommandNotFound {
                name: format!("{namespace} {command}"),
            })
    }

    /// Resolve and call a command line.
    pub fn dispatch(&self, ctx: &Context, args: &[&str]) -> Result<Vec<Value>, DispatchError> {
        let (wrapper, rest) = self.resolve(args)?;
        debug!({ fields::COMMAND } = wrapper.name(), args = rest.len(), "dispatching");
        Ok(wrapper.call_with_strings(ctx, rest)?)
    }

    /// Call `command` in `namespace` with positional arguments.
    pub fn dispatch_in(
        &self,
        ctx: &Context,
        namespace: &str,
        command: &str,
        args: &[&str],
    ) -> Result<Vec<Value>, DispatchError> {
        let wrapper = self.resolve_in(namespace, command)?;
        debug!({ fields::COMMAND } = wrapper.name(), namespace, "dispatching");
        Ok(wrapper.call_with_strings(ctx, args)?)
    }

    /// Dispatch and print: results to `out` one per line, failures to `err`.
    /// Returns the process exit status.
    pub fn run(&self, ctx: &Context, args: &[&str], out: &mut impl Write, err: &mut impl Write) -> i32 {
        if matches!(args.first(), None | Some(&"help") | Some(&"--help") | Some(&"-h")) {
            let _ = write!(out, "{}", self.help());
            return 0;
        }
        match self.dispatch(ctx, args) {
            Ok(results) => {
                for value in &results {
                    let line = if self.json_output {
                        value.to_json().to_string()
                    } else {
                        value.to_text()
                    };
                    let _ = writeln!(out, "{line}");
                }
                0
            }
            Err(DispatchError::Call(call)) => {
                let _ = writeln!(err, "{}: {}", self.program_name, user_message(&call));
                1
            }
            Err(e) => {
                let _ = writeln!(err, "{}: {e}", self.program_name);
                let _ = write!(err, "{}", self.help());
                2
            }
        }
    }

    /// Usage text listing every command with its arguments.
    pub fn help(&self) -> String {
        let mut lines = vec![
            format!("Usage: {} [namespace] <command> [args...]", self.program_name),
            String::new(),
            "Commands:".to_string(),
        ];
        for (name, wrapper) in &self.commands {
            lines.push(command_line(name, wrapper.as_ref()));
        }
        for (namespace, commands) in &self.namespaces {
            for (name, wrapper) in commands {
                lines.push(command_line(&format!("{namespace} {name}"), wrapper.as_ref()));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }

    /// Argument list and descriptions for one command.
    pub fn help_for(&self, args: &[&str]) -> Result<String, DispatchError> {
        let (wrapper, _) = self.resolve(args)?;
        let description = wrapper.description();
        let mut lines = vec![command_line(description.name(), wrapper.as_ref())];
        for (_, arg) in description.bindable_args() {
            let mut line = format!("    {} <{}>", arg.name, arg.ty);
            if !arg.description.is_empty() {
                line.push_str("  ");
                line.push_str(&arg.description);
            }
            lines.push(line);
        }
        lines.push(String::new());
        Ok(lines.join("\n"))
    }
}

fn command_line(name: &str, wrapper: &dyn Wrapper) -> String {
    let args: Vec<String> = wrapper
        .description()
        .bindable_args()
        .map(|(_, arg)| format!("<{}>", arg.name))
        .collect();
    if args.is_empty() {
        format!("  {name}")
    } else {
        format!("  {name} {}", args.join(" "))
    }
}
