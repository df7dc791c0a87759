//! Command-line interface for blogo.
//!
//! Every subcommand is an async handler registered by name in a
//! [`CommandRegistry`]. Handlers receive an explicit [`AppContext`] instead
//! of reaching for global state.

mod handlers;

pub use handlers::{register_all_commands, truncate};

use std::collections::HashMap;
use std::path::PathBuf;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

use crate::db::{User, UserRepository};
use crate::{BlogoError, Config, Database, Result};

/// State shared by all command handlers.
#[derive(Debug)]
pub struct AppContext {
    pub db: Database,
    pub config: Config,
    /// Where the session is saved when it changes.
    pub config_path: PathBuf,
}

impl AppContext {
    pub fn new(db: Database, config: Config, config_path: impl Into<PathBuf>) -> Self {
        Self {
            db,
            config,
            config_path: config_path.into(),
        }
    }

    /// Write the login session back to the config file.
    pub fn save_session(&self) -> Result<()> {
        self.config.save_session(&self.config_path)
    }
}

/// A parsed invocation: command name plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Build a command from command-line arguments (program name excluded).
    ///
    /// Returns `None` if there are no arguments.
    pub fn from_args<I>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let name = args.next()?;
        Some(Self::new(name, args.collect()))
    }

    /// Fail with a usage message unless exactly `count` arguments were given.
    pub fn require_args(&self, count: usize, usage: &str) -> Result<()> {
        if self.args.len() == count {
            Ok(())
        } else {
            Err(self.usage_error(usage))
        }
    }

    /// A validation error carrying the command's usage line.
    pub fn usage_error(&self, usage: &str) -> BlogoError {
        BlogoError::Validation(format!("{}: usage: {}", self.name, usage))
    }
}

/// A boxed async command handler.
pub type Handler = Box<
    dyn for<'a> Fn(&'a mut AppContext, &'a Command) -> BoxFuture<'a, Result<()>> + Send + Sync,
>;

/// A handler that needs the logged-in user.
pub type AuthedHandler =
    for<'a> fn(&'a mut AppContext, &'a Command, User) -> BoxFuture<'a, Result<()>>;

/// Box a handler function or closure.
pub fn handler<F>(f: F) -> Handler
where
    F: for<'a> Fn(&'a mut AppContext, &'a Command) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

/// Wrap a handler so it runs with the logged-in user.
///
/// With nobody logged in, a hint is printed and the command succeeds
/// without doing anything.
pub fn logged_in(inner: AuthedHandler) -> Handler {
    handler(move |ctx, cmd| {
        async move {
            let Some(name) = ctx.config.current_user().map(str::to_owned) else {
                println!(
                    "{}: you must log in first (try `login <name>`)",
                    cmd.name
                );
                return Ok(());
            };

            let user = UserRepository::new(ctx.db.pool())
                .get_by_name(&name)
                .await?
                .ok_or_else(|| {
                    BlogoError::Auth(format!("current user \"{name}\" is not registered"))
                })?;

            inner(ctx, cmd, user).await
        }
        .boxed()
    })
}

/// Maps command names to handlers.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Handler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, handler: Handler) {
        self.handlers.insert(name.into(), handler);
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the handler registered for `cmd`.
    pub async fn run(&self, ctx: &mut AppContext, cmd: &Command) -> Result<()> {
        let handler = self
            .handlers
            .get(&cmd.name)
            .ok_or_else(|| BlogoError::NotFound(format!("command \"{}\"", cmd.name)))?;

        debug!("Running command {} {:?}", cmd.name, cmd.args);
        handler(ctx, cmd).await
    }
}
