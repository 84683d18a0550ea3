//! Command implementations.
//!
//! Handler functions for each CLI command. Thin glue: argument plumbing,
//! resolver construction and rendering; all resolution semantics live in
//! [`crate::core::resolver`].

use std::path::PathBuf;

use clap::CommandFactory;

use crate::cli::{output, Cli, Command};
use crate::core::config::Config;
use crate::core::constants::DEFAULT_ENVIRONMENT;
use crate::core::convert::Cast;
use crate::core::parameter::ParameterKind;
use crate::core::resolver::Resolver;
use crate::core::scope::Scope;
use crate::core::store::FileStore;
use crate::error::{Error, Result};

/// Scope and store settings gathered from flags and env vars, completed
/// from `.backstop.toml` on demand.
struct Context {
    project: Option<String>,
    environment: Option<String>,
    store: Option<PathBuf>,
}

impl Context {
    /// Apply precedence: flags and env vars (already merged by clap) win
    /// over `.backstop.toml`, which wins over defaults.
    fn scope(&self) -> Result<Scope> {
        let config = Config::discover()?;

        let project = match &self.project {
            Some(project) => project.clone(),
            None => Config::require_project(config.as_ref())?,
        };
        let environment = self
            .environment
            .clone()
            .or_else(|| config.as_ref().and_then(|c| c.environment.clone()))
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        Ok(Scope::new(project, environment))
    }

    fn resolver(&self) -> Result<Resolver> {
        let scope = self.scope()?;
        let path = self
            .store
            .clone()
            .or_else(|| {
                Config::discover()
                    .ok()
                    .flatten()
                    .and_then(|config| config.store)
            })
            .ok_or_else(|| {
                Error::Config(
                    "no store configured: pass --store or set store in .backstop.toml".into(),
                )
            })?;
        let store = FileStore::open(path)?;
        Ok(Resolver::new(scope.project, scope.environment, Box::new(store)))
    }
}

/// Execute a parsed command.
pub fn execute(cli: Cli) -> Result<()> {
    let context = Context {
        project: cli.project,
        environment: cli.environment,
        store: cli.store,
    };

    match cli.command {
        Command::Show { keys, decrypt } => cmd_show(&mut context.resolver()?, &keys, decrypt),
        Command::Get {
            key,
            cast,
            no_decrypt,
            path,
            default,
        } => cmd_get(&mut context.resolver()?, &key, cast, !no_decrypt, path, default),
        Command::Set { kind, key, value } => cmd_set(&mut context.resolver()?, &key, &value, kind),
        Command::Delete { key } => cmd_delete(&mut context.resolver()?, &key),
        Command::Path { key } => {
            println!("{}", context.scope()?.full_path(&key));
            Ok(())
        }
        Command::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "backstop",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

/// List all or selected parameters as an aligned table.
fn cmd_show(resolver: &mut Resolver, keys: &[String], decrypt: bool) -> Result<()> {
    let rows: Vec<(String, String)> = if keys.is_empty() {
        resolver
            .get_all_parameters(decrypt, true)?
            .into_iter()
            .map(|entry| (entry.name, entry.value))
            .collect()
    } else {
        let mut rows = Vec::new();
        for key in keys {
            rows.push(resolver.get_entry(key, decrypt)?);
        }
        rows
    };

    if rows.is_empty() {
        output::dimmed("no parameters found");
        return Ok(());
    }

    let mut rendered = Vec::new();
    for (path, value) in rows {
        let value = if !decrypt && resolver.is_encrypted(&path)? {
            "<encrypted>".to_string()
        } else {
            value
        };
        rendered.push((path, value));
    }

    let width = rendered
        .iter()
        .map(|(path, _)| path.len())
        .max()
        .unwrap_or(0)
        .max("Path".len());
    output::header(&format!("{:width$}  Value", "Path"));
    output::rule();
    for (path, value) in rendered {
        println!("{:width$}  {}", path, value);
    }
    Ok(())
}

/// Resolve one parameter, convert and print it.
fn cmd_get(
    resolver: &mut Resolver,
    key: &str,
    cast: Cast,
    decrypt: bool,
    with_path: bool,
    default: Option<String>,
) -> Result<()> {
    match (resolver.get_entry(key, decrypt), default) {
        (Ok((fullpath, raw)), _) => {
            let value = cast.apply(&raw)?;
            if with_path {
                println!("{}\t{}", fullpath, value);
            } else {
                println!("{}", value);
            }
            Ok(())
        }
        (Err(Error::ParameterNotFound { .. }), Some(value)) => {
            println!("{}", value);
            Ok(())
        }
        (Err(e), _) => Err(e),
    }
}

fn cmd_set(resolver: &mut Resolver, key: &str, value: &str, kind: ParameterKind) -> Result<()> {
    resolver.set_parameter(key, value, kind)?;
    output::success(&format!("set {}", resolver.full_path(key)));
    Ok(())
}

fn cmd_delete(resolver: &mut Resolver, key: &str) -> Result<()> {
    match resolver.delete_parameter(key) {
        Ok(()) => {
            output::success(&format!("deleted {}", resolver.full_path(key)));
            Ok(())
        }
        Err(Error::NotFound(path)) => {
            output::warn(&format!("{} not found", path));
            Ok(())
        }
        Err(e) => Err(e),
    }
}
