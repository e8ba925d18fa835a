//! Command routing and built-in commands.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::filter::CommandFilter;
use super::types::{CommandRecord, CommandResult, IncomingMessage};
use crate::account::{AccountProfile, AccountRegistry, PreferenceStore, PrefixSet};

/// Callback for a command registered at runtime.
pub type HandlerFn = Box<dyn Fn(&AccountProfile, &CommandRecord) -> CommandResult + Send + Sync>;

/// Commands every account gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinCommand {
    /// Liveness check.
    Ping,

    /// Show the account's prefixes.
    Prefix,

    /// Replace the account's prefixes.
    SetPrefix,

    /// List registered commands.
    Help,
}

impl BuiltinCommand {
    /// All built-in commands in registration order.
    pub const ALL: [Self; 4] = [Self::Ping, Self::Prefix, Self::SetPrefix, Self::Help];

    /// Returns the alias group the command is registered under.
    #[must_use]
    pub const fn aliases(self) -> &'static str {
        match self {
            Self::Ping => "ping|p",
            Self::Prefix => "prefix",
            Self::SetPrefix => "setprefix|setpref",
            Self::Help => "help|h",
        }
    }

    /// Returns the command description for help.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ping => "Check that the userbot is alive",
            Self::Prefix => "Show the current command prefixes",
            Self::SetPrefix => "Set command prefixes: setprefix <prefix> [prefix...]",
            Self::Help => "Show this help message",
        }
    }
}

enum Action {
    Builtin(BuiltinCommand),
    Custom(HandlerFn),
}

struct Registration {
    filter: CommandFilter,
    description: String,
    action: Action,
}

/// Routes messages to the first registration whose filter matches.
pub struct CommandRouter {
    /// Shared account state.
    registry: Arc<AccountRegistry>,

    /// Where prefix changes are persisted.
    store: Arc<dyn PreferenceStore>,

    /// Registrations in match order.
    registrations: Vec<Registration>,
}

impl CommandRouter {
    /// Creates a router with no commands.
    #[must_use]
    pub fn new(registry: Arc<AccountRegistry>, store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            registry,
            store,
            registrations: Vec::new(),
        }
    }

    /// Creates a router with the built-in commands registered.
    #[must_use]
    pub fn with_builtins(registry: Arc<AccountRegistry>, store: Arc<dyn PreferenceStore>) -> Self {
        let mut router = Self::new(registry, store);
        for command in BuiltinCommand::ALL {
            router.registrations.push(Registration {
                filter: CommandFilter::new(command.aliases()),
                description: command.description().to_owned(),
                action: Action::Builtin(command),
            });
        }
        router
    }

    /// Registers a handler for an alias group such as `"id|whois"`.
    pub fn register<F>(&mut self, aliases: &str, description: impl Into<String>, handler: F)
    where
        F: Fn(&AccountProfile, &CommandRecord) -> CommandResult + Send + Sync + 'static,
    {
        let filter = CommandFilter::new(aliases);
        debug!("Registering command {:?}", filter.aliases());
        self.registrations.push(Registration {
            filter,
            description: description.into(),
            action: Action::Custom(Box::new(handler)),
        });
    }

    /// Number of registered alias groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Runs the first matching handler for a message received by `account`.
    ///
    /// Returns `None` if the message is not a command.
    pub async fn dispatch(
        &self,
        account: &AccountProfile,
        message: &mut IncomingMessage,
    ) -> Option<CommandResult> {
        let prefixes = self.registry.prefixes(account.id).await;
        let username = account.username_or_empty();

        let registration = self
            .registrations
            .iter()
            .find(|r| r.filter.apply(message, username, &prefixes))?;

        let record = message.command.as_ref()?;
        debug!("Handling command for account {}: {}", account.id, record);

        let result = match &registration.action {
            Action::Builtin(command) => self.execute(*command, account, record, &prefixes).await,
            Action::Custom(handler) => handler(account, record),
        };

        info!(
            "Command {} for account {}: success={}",
            record.name(),
            account.id,
            result.success
        );

        Some(result)
    }

    async fn execute(
        &self,
        command: BuiltinCommand,
        account: &AccountProfile,
        record: &CommandRecord,
        prefixes: &PrefixSet,
    ) -> CommandResult {
        match command {
            BuiltinCommand::Ping => CommandResult::success("pong"),
            BuiltinCommand::Prefix => {
                CommandResult::success(format!("Current prefixes: {prefixes}"))
            }
            BuiltinCommand::SetPrefix => self.handle_set_prefix(account, record, prefixes).await,
            BuiltinCommand::Help => self.handle_help(prefixes),
        }
    }

    async fn handle_set_prefix(
        &self,
        account: &AccountProfile,
        record: &CommandRecord,
        current: &PrefixSet,
    ) -> CommandResult {
        if record.args().is_empty() {
            return CommandResult::error(format!(
                "Usage: {}{} <prefix> [prefix...]",
                current.primary(),
                record.name()
            ));
        }

        let prefixes = match PrefixSet::new(record.args().iter().cloned()) {
            Ok(p) => p,
            Err(e) => return CommandResult::error(format!("Invalid prefixes: {e}")),
        };

        if let Err(e) = self
            .registry
            .set_prefixes_persisted(account.id, prefixes.clone(), self.store.as_ref())
            .await
        {
            warn!("Failed to save prefixes for account {}: {}", account.id, e);
            return CommandResult::error(format!("Failed to save prefixes: {e}"));
        }

        CommandResult::success(format!("✓ Prefixes set to: {prefixes}"))
    }

    fn handle_help(&self, prefixes: &PrefixSet) -> CommandResult {
        let mut lines = vec![
            format!("Commands (prefixes: {prefixes})"),
            String::new(),
        ];

        for registration in &self.registrations {
            lines.push(format!(
                "  {}{} - {}",
                prefixes.primary(),
                registration.filter.aliases().join("|"),
                registration.description
            ));
        }

        CommandResult::success(lines.join("\n"))
    }
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("registrations", &self.registrations.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountId, MemoryPreferenceStore};

    type Fixture = (
        CommandRouter,
        Arc<AccountRegistry>,
        Arc<MemoryPreferenceStore>,
        AccountProfile,
    );

    async fn setup() -> Fixture {
        let registry = Arc::new(AccountRegistry::new());
        let store = Arc::new(MemoryPreferenceStore::new());
        let account = AccountProfile::new(AccountId(100), Some("himi".to_owned()), "Himi");
        registry.start_account(account.clone(), store.as_ref()).await.unwrap();

        let router = CommandRouter::with_builtins(Arc::clone(&registry), store.clone());
        (router, registry, store, account)
    }

    async fn send(
        router: &CommandRouter,
        account: &AccountProfile,
        text: &str,
    ) -> Option<CommandResult> {
        let mut message = IncomingMessage::new(text, account.id.0);
        router.dispatch(account, &mut message).await
    }

    #[tokio::test]
    async fn test_ping() {
        let (router, _, _, account) = setup().await;
        assert_eq!(send(&router, &account, ".ping").await, Some(CommandResult::success("pong")));
        assert_eq!(send(&router, &account, ".P@himi").await, Some(CommandResult::success("pong")));
    }

    #[tokio::test]
    async fn test_not_a_command() {
        let (router, _, _, account) = setup().await;
        assert_eq!(send(&router, &account, "hello").await, None);
        assert_eq!(send(&router, &account, ".unknown").await, None);
    }

    #[tokio::test]
    async fn test_setprefix_updates_and_persists() {
        let (router, registry, store, account) = setup().await;

        let result = send(&router, &account, ".setprefix ! \"hey \"").await.unwrap();
        assert!(result.success);

        let expected = PrefixSet::new(["!", "hey "]).unwrap();
        assert_eq!(registry.prefixes(account.id).await, expected);
        assert_eq!(
            store.get_prefixes(account.id).unwrap(),
            Some(vec!["!".to_owned(), "hey ".to_owned()])
        );

        assert_eq!(send(&router, &account, ".ping").await, None);
        assert!(send(&router, &account, "hey ping").await.is_some());
        assert!(send(&router, &account, "!ping").await.is_some());
    }

    #[tokio::test]
    async fn test_setprefix_requires_arguments() {
        let (router, registry, _, account) = setup().await;

        let result = send(&router, &account, ".setpref").await.unwrap();
        assert!(!result.success);
        assert!(result.message.contains("Usage: .setpref"));
        assert_eq!(registry.prefixes(account.id).await, PrefixSet::default());
    }

    #[tokio::test]
    async fn test_setprefix_rejects_empty_prefix() {
        let (router, registry, _, account) = setup().await;

        let result = send(&router, &account, ".setprefix \"\"").await.unwrap();
        assert!(!result.success);
        assert_eq!(registry.prefixes(account.id).await, PrefixSet::default());
    }

    #[tokio::test]
    async fn test_prefix_shows_current() {
        let (router, _, _, account) = setup().await;
        let result = send(&router, &account, ".prefix").await.unwrap();
        assert_eq!(result.message, "Current prefixes: .");
    }

    #[tokio::test]
    async fn test_help_lists_registrations() {
        let (mut router, _, _, account) = setup().await;
        router.register("id|whois", "Show account id", |account, _| {
            CommandResult::success(account.id.to_string())
        });

        let result = send(&router, &account, ".h").await.unwrap();
        assert!(result.message.contains(".ping|p - Check that the userbot is alive"));
        assert!(result.message.contains(".id|whois - Show account id"));
    }

    #[tokio::test]
    async fn test_custom_handler_receives_record() {
        let (mut router, _, _, account) = setup().await;
        router.register("echo", "Echo arguments", |_, record| {
            CommandResult::success(record.args().join("|"))
        });
        assert_eq!(router.len(), BuiltinCommand::ALL.len() + 1);

        let result = send(&router, &account, ".ECHO 'a b' c").await.unwrap();
        assert_eq!(result.message, "a b|c");
    }

    #[tokio::test]
    async fn test_first_registration_wins() {
        let registry = Arc::new(AccountRegistry::new());
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferenceStore::new());
        let account = AccountProfile::new(AccountId(1), None, "One");

        let mut router = CommandRouter::new(registry, store);
        assert!(router.is_empty());
        router.register("go", "first", |_, _| CommandResult::success("first"));
        router.register("go|g", "second", |_, _| CommandResult::success("second"));

        assert_eq!(send(&router, &account, ".go").await.unwrap().message, "first");
        assert_eq!(send(&router, &account, ".g").await.unwrap().message, "second");
    }
}
