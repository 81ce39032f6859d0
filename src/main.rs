use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
mod prompt;
use passguardian::backend::SecretRecord;
use passguardian::crypto::password::DEFAULT_LENGTH;
use passguardian::messages::{Lang, Msg};
use passguardian::{
    AuthService, Config, LocalBackend, NewSecret, PasswordOptions, SecretUpdate, Vault,
    clipboard, generate_password, generate_salt,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Debug, clap::Args)]
struct GeneratorArgs {
    /// Length of the generated password
    #[arg(long, short = 'l', default_value_t = DEFAULT_LENGTH)]
    length: usize,

    /// Leave out uppercase letters
    #[arg(long)]
    no_upper: bool,

    /// Leave out lowercase letters
    #[arg(long)]
    no_lower: bool,

    /// Leave out digits
    #[arg(long)]
    no_numbers: bool,

    /// Leave out symbols
    #[arg(long)]
    no_symbols: bool,
}

impl GeneratorArgs {
    fn options(&self) -> PasswordOptions {
        PasswordOptions {
            uppercase: !self.no_upper,
            lowercase: !self.no_lower,
            numbers: !self.no_numbers,
            symbols: !self.no_symbols,
        }
    }

    fn generate(&self) -> Result<Zeroizing<String>> {
        Ok(generate_password(self.length, &self.options())?)
    }
}

#[derive(Debug, Parser)]
#[command(name = "passguardian")]
#[command(
    version,
    about = "Password manager client with client-side AES-256-GCM encryption."
)]
struct Cli {
    /// Directory holding the local database and session
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    /// Output language (en, es)
    #[arg(long, global = true, value_name = "LANG")]
    lang: Option<Lang>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Creates an account with a fresh key derivation salt
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
    },

    /// Starts a session
    Signin {
        #[arg(long)]
        email: String,
    },

    /// Ends the current session
    Signout,

    /// Shows the signed-in account
    Whoami,

    /// Lists stored credentials, newest first
    List,

    /// Lists credentials whose service contains the query
    #[command(arg_required_else_help = true)]
    Search { query: String },

    /// Encrypts and stores a credential; generates the password if omitted
    #[command(arg_required_else_help = true)]
    Add {
        service: String,
        username: String,
        value: Option<String>,

        /// Marks the credential as private
        #[arg(long)]
        private: bool,

        #[arg(long, default_value = "")]
        notes: String,

        #[command(flatten)]
        generator: GeneratorArgs,
    },

    /// Decrypts and prints a credential's password
    #[command(arg_required_else_help = true)]
    Show { id: String },

    /// Decrypts a credential's password onto the clipboard
    #[command(arg_required_else_help = true)]
    Copy { id: String },

    /// Changes fields of a credential
    #[command(arg_required_else_help = true)]
    Update {
        id: String,
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// New password
        #[arg(long, conflicts_with = "generate")]
        value: Option<String>,
        /// Replace the password with a generated one
        #[arg(long)]
        generate: bool,
        #[arg(long)]
        private: Option<bool>,
        #[arg(long)]
        notes: Option<String>,

        #[command(flatten)]
        generator: GeneratorArgs,
    },

    /// Soft-deletes a credential
    #[command(arg_required_else_help = true)]
    Delete { id: String },

    /// Prints a random password
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,
    },

    /// Prints a random base64 salt
    Salt,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "passguardian=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(home) = args.home {
        config.data_dir = home;
    }
    if let Some(lang) = args.lang {
        config.lang = lang;
    }

    run(args.command, &config)
}

fn run(command: Commands, config: &Config) -> Result<()> {
    let lang = config.lang;
    let backend = config.backend();

    match command {
        Commands::Signup { email, username } => {
            let password = prompt::read_new_password_with_confirmation()?;
            let user = backend.sign_up(&email, &password, &username)?;
            println!("{}", Msg::AccountCreated.render(lang, &[("email", &user.email)]));
        }
        Commands::Signin { email } => {
            let password = prompt::read_password()?;
            let session = backend.sign_in(&email, &password)?;
            println!(
                "{}",
                Msg::SignedIn.render(lang, &[("username", &session.user.username)])
            );
        }
        Commands::Signout => {
            backend.sign_out()?;
            println!("{}", Msg::SignedOut.text(lang));
        }
        Commands::Whoami => match backend.get_session()? {
            Some(session) => println!(
                "{}",
                Msg::SessionInfo.render(
                    lang,
                    &[
                        ("username", &session.user.username),
                        ("email", &session.user.email),
                        ("since", &session.created_at.format("%Y-%m-%d %H:%M")),
                    ],
                )
            ),
            None => println!("{}", Msg::NotSignedIn.text(lang)),
        },
        Commands::List => {
            let vault = open_vault(backend, false, lang)?;
            print_records(&vault.fetch_secrets()?, lang);
        }
        Commands::Search { query } => {
            let vault = open_vault(backend, false, lang)?;
            print_records(&vault.search_secrets(&query)?, lang);
        }
        Commands::Add {
            service,
            username,
            value,
            private,
            notes,
            generator,
        } => {
            let vault = open_vault(backend, true, lang)?;
            let password = match value {
                Some(value) => Zeroizing::new(value),
                None => generator.generate()?,
            };
            let record = vault.create_secret(NewSecret {
                service,
                username,
                password,
                is_private: private,
                notes,
            })?;
            println!("{}", Msg::SecretAdded.render(lang, &[("id", &record.id)]));
        }
        Commands::Show { id } => {
            let vault = open_vault(backend, false, lang)?;
            let record = vault.get_secret(&id)?;
            let password = vault
                .reveal(&record)
                .map_err(|_| anyhow!(Msg::DecryptionFailed.text(lang)))?;
            println!("{}", password.as_str());
        }
        Commands::Copy { id } => {
            let vault = open_vault(backend, false, lang)?;
            let record = vault.get_secret(&id)?;
            let password = vault
                .reveal(&record)
                .map_err(|_| anyhow!(Msg::DecryptionFailed.text(lang)))?;

            let secs = config.clipboard_clear.as_secs();
            println!("{}", Msg::Copied.render(lang, &[("secs", &secs)]));
            if clipboard::copy_with_clear(&password, config.clipboard_clear)? {
                println!("{}", Msg::ClipboardCleared.text(lang));
            }
        }
        Commands::Update {
            id,
            service,
            username,
            value,
            generate,
            private,
            notes,
            generator,
        } => {
            let vault = open_vault(backend, true, lang)?;
            let password = match (value, generate) {
                (Some(value), _) => Some(Zeroizing::new(value)),
                (None, true) => Some(generator.generate()?),
                (None, false) => None,
            };
            let record = vault.update_secret(
                &id,
                SecretUpdate {
                    service,
                    username,
                    password,
                    is_private: private,
                    notes,
                },
            )?;
            println!("{}", Msg::SecretUpdated.render(lang, &[("id", &record.id)]));
        }
        Commands::Delete { id } => {
            let vault = open_vault(backend, false, lang)?;
            vault.delete_secret(&id)?;
            println!("{}", Msg::SecretDeleted.render(lang, &[("id", &id)]));
        }
        Commands::Generate { generator } => {
            println!("{}", generator.generate()?.as_str());
        }
        Commands::Salt => {
            println!("{}", generate_salt()?);
        }
    }

    Ok(())
}

/// Unlocks the session's vault with the master password.
///
/// Commands that encrypt check the password against the account first so a
/// typo never produces records nobody can open. Read-only commands leave the
/// rejection to the cipher.
fn open_vault(backend: LocalBackend, verify: bool, lang: Lang) -> Result<Vault<LocalBackend>> {
    let session = backend.require_session()?;
    let password = prompt::read_password()?;

    if verify {
        backend
            .verify_password(&session.user, &password)
            .map_err(|_| anyhow!(Msg::WrongMasterPassword.text(lang)))?;
    }

    Vault::open(backend, &session, password)
}

fn print_records(records: &[SecretRecord], lang: Lang) {
    if records.is_empty() {
        println!("{}", Msg::VaultEmpty.text(lang));
        return;
    }

    println!("{}", Msg::VaultCount.render(lang, &[("count", &records.len())]));

    let id_width = records.iter().map(|r| r.id.len()).max().unwrap_or(0).max("Id".len());
    let service_width = records
        .iter()
        .map(|r| r.service.chars().count())
        .chain(std::iter::once("Service".len()))
        .max()
        .unwrap_or(0);
    let user_width = records
        .iter()
        .map(|r| r.username.chars().count())
        .chain(std::iter::once("Username".len()))
        .max()
        .unwrap_or(0);

    println!(
        "{:<id_width$}  {:<service_width$}  {:<user_width$}  {:<7}  Created",
        "Id", "Service", "Username", "Private"
    );
    println!(
        "{:-<id_width$}  {:-<service_width$}  {:-<user_width$}  {:-<7}  {:-<16}",
        "", "", "", "", ""
    );
    for r in records {
        println!(
            "{:<id_width$}  {:<service_width$}  {:<user_width$}  {:<7}  {}",
            r.id,
            r.service,
            r.username,
            if r.is_private { "yes" } else { "no" },
            r.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}
