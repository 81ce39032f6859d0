//! User-facing strings, keyed by [`Msg`] and looked up per [`Lang`].

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Es,
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Lang::En),
            "es" => Ok(Lang::Es),
            other => Err(format!("unsupported language '{other}' (expected en or es)")),
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lang::En => "en",
            Lang::Es => "es",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    AccountCreated,
    SignedIn,
    SignedOut,
    NotSignedIn,
    SessionInfo,
    VaultCount,
    VaultEmpty,
    SecretAdded,
    SecretUpdated,
    SecretDeleted,
    Copied,
    ClipboardCleared,
    DecryptionFailed,
    WrongMasterPassword,
}

impl Msg {
    /// Raw template; placeholders look like `{name}`.
    pub fn text(self, lang: Lang) -> &'static str {
        use Lang::*;
        use Msg::*;

        match (self, lang) {
            (AccountCreated, En) => "account created for {email}",
            (AccountCreated, Es) => "identidad forjada para {email}",
            (SignedIn, En) => "signed in as {username}",
            (SignedIn, Es) => "acceso concedido: {username}",
            (SignedOut, En) => "signed out",
            (SignedOut, Es) => "bóveda sellada",
            (NotSignedIn, En) => "not signed in",
            (NotSignedIn, Es) => "sin sesión activa",
            (SessionInfo, En) => "{username} <{email}> since {since}",
            (SessionInfo, Es) => "{username} <{email}> desde {since}",
            (VaultCount, En) => "{count} credentials",
            (VaultCount, Es) => "{count} nodos de datos detectados",
            (VaultEmpty, En) => "no credentials yet",
            (VaultEmpty, Es) => "bóveda vacía",
            (SecretAdded, En) => "stored secret {id}",
            (SecretAdded, Es) => "registro sellado {id}",
            (SecretUpdated, En) => "secret {id} updated",
            (SecretUpdated, Es) => "registro {id} actualizado",
            (SecretDeleted, En) => "secret {id} deleted",
            (SecretDeleted, Es) => "registro {id} eliminado",
            (Copied, En) => "password copied to clipboard, clearing in {secs}s",
            (Copied, Es) => "dato capturado en el búfer temporal, se borra en {secs}s",
            (ClipboardCleared, En) => "clipboard cleared",
            (ClipboardCleared, Es) => "búfer temporal purgado",
            (DecryptionFailed, En) => {
                "decryption failed: wrong master password or corrupted record"
            }
            (DecryptionFailed, Es) => {
                "decryption failed: firma maestra incorrecta o registro corrupto"
            }
            (WrongMasterPassword, En) => "master password does not match this account",
            (WrongMasterPassword, Es) => "la firma no coincide con el registro",
        }
    }

    /// Template with every `{key}` replaced by its value.
    pub fn render(self, lang: Lang, args: &[(&str, &dyn fmt::Display)]) -> String {
        args.iter()
            .fold(self.text(lang).to_string(), |text, (key, value)| {
                text.replace(&format!("{{{key}}}"), &value.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_codes() {
        assert_eq!("ES".parse::<Lang>().unwrap(), Lang::Es);
        assert_eq!(" en ".parse::<Lang>().unwrap(), Lang::En);
        assert!("fr".parse::<Lang>().is_err());
    }

    #[test]
    fn renders_placeholders() {
        let text = Msg::VaultCount.render(Lang::Es, &[("count", &3)]);
        assert_eq!(text, "3 nodos de datos detectados");

        let text = Msg::SessionInfo.render(
            Lang::En,
            &[("username", &"ana"), ("email", &"ana@example.com"), ("since", &"today")],
        );
        assert_eq!(text, "ana <ana@example.com> since today");
    }

    #[test]
    fn decryption_failure_reads_the_same_for_every_cause() {
        for lang in [Lang::En, Lang::Es] {
            assert!(Msg::DecryptionFailed.text(lang).starts_with("decryption failed"));
        }
    }
}
