use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wallet_verifier_service::client::api::VerifierClient;
use wallet_verifier_service::client::history::MessageHistory;
use wallet_verifier_service::common::config::HolderConfig;
use wallet_verifier_service::common::signer::LocalWallet;
use wallet_verifier_service::common::types::{SignedMessage, VerificationResult};
use wallet_verifier_service::common::wallet::WalletProvider;

/// Signs messages with the local wallet and checks them against the verifier.
#[derive(Debug, Parser)]
#[command(name = "holder")]
#[command(about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Sign a message, record it and ask the verifier who signed it.
    Sign {
        /// Message words, joined with single spaces.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Ask the verifier to recover the signer of an existing signature.
    Verify {
        message: String,
        /// 0x-prefixed 65-byte hex signature.
        signature: String,
    },
    /// List recorded messages, oldest first.
    History,
    /// Remove every recorded message.
    Clear,
    /// Check that the verifier is up.
    Health,
}

fn print_result(result: &VerificationResult) {
    if result.is_valid {
        println!("valid signature from {}", result.signer);
    } else {
        println!("signature could not be recovered");
    }
    println!("message: {:?}", result.original_message);
}

async fn sign_and_verify(
    config: &HolderConfig,
    client: &VerifierClient,
    message: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wallet = LocalWallet::from_env()?;
    let address: Address = wallet.connect()?;
    println!("Signing as {}", address.to_checksum(None));

    let signature = wallet.sign_message(&message)?;
    println!("Generated signature: {}", signature);

    let mut history = MessageHistory::load(&config.history_file, config.history_limit)?;
    let entry = SignedMessage::new(message.clone(), signature.clone());
    let id = entry.id;
    history.append(entry)?;

    tracing::info!(url = %client.base_url(), "sending request to verifier service");
    let result = client.verify_signature(&message, &signature).await?;
    history.record_verification(id, &result)?;
    wallet.disconnect();

    print_result(&result);
    if let Some(entry) = history.get(id) {
        print_entry(entry);
    }
    Ok(())
}

fn print_history(history: &MessageHistory) {
    if history.is_empty() {
        println!("no signed messages");
        return;
    }
    for entry in history.entries() {
        print_entry(entry);
    }
}

fn print_entry(entry: &SignedMessage) {
    let time = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(entry.timestamp)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| entry.timestamp.to_string());
    let status = match entry.verified {
        Some(true) => format!("verified by {}", entry.signer.as_deref().unwrap_or("")),
        Some(false) => "invalid".to_string(),
        None => "unverified".to_string(),
    };
    println!("{} {} [{}] {:?}", entry.id, time, status, entry.message);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = HolderConfig::from_env()?;
    let client = VerifierClient::new(config.verifier_url.clone());

    match cli.command {
        Commands::Sign { message } => sign_and_verify(&config, &client, message.join(" ")).await?,
        Commands::Verify { message, signature } => {
            let result = client.verify_signature(&message, &signature).await?;
            print_result(&result);
        }
        Commands::History => {
            let history = MessageHistory::load(&config.history_file, config.history_limit)?;
            print_history(&history);
        }
        Commands::Clear => {
            let mut history = MessageHistory::load(&config.history_file, config.history_limit)?;
            history.clear()?;
            println!("history cleared");
        }
        Commands::Health => {
            let health = client.health().await?;
            println!("{}: {}", client.base_url(), health.status);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Commands, clap::Error> {
        Cli::try_parse_from(std::iter::once("holder").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn test_parse_sign_keeps_words() {
        assert_eq!(
            parse(&["sign", "Hello,", "World!"]).unwrap(),
            Commands::Sign {
                message: vec!["Hello,".to_string(), "World!".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_verify() {
        assert_eq!(
            parse(&["verify", "", "0xabc"]).unwrap(),
            Commands::Verify {
                message: String::new(),
                signature: "0xabc".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_commands_without_arguments() {
        assert_eq!(parse(&["history"]).unwrap(), Commands::History);
        assert_eq!(parse(&["clear"]).unwrap(), Commands::Clear);
        assert_eq!(parse(&["health"]).unwrap(), Commands::Health);
    }

    #[test]
    fn test_parse_rejects_unknown_or_incomplete() {
        assert_eq!(
            parse(&["sign"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["verify", "only"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["nope"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
        assert_eq!(
            parse(&["history", "extra"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert!(parse(&[]).is_err());
    }
}
