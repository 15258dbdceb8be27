//! macpair: generate and verify HMAC-SHA-256 tags from the command line
//!
//!   gen -k <secret> <message>        - print the tag of a message
//!   ver -k <secret> <message> <tag>  - check a received tag, exit 0 if VALID, 1 if INVALID
//!
//! The secret can also come from MACPAIR_SECRET. A message written as
//! `@file:<path>` is read from that file.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use macpair::{Encoding, MacEngine};

/// Prefix marking a message argument as a path to read.
const FILE_PREFIX: &str = "@file:";

#[derive(Parser, Debug)]
#[command(
    name = "macpair",
    version,
    about = "Authenticate short messages with a shared secret (HMAC-SHA-256)"
)]
struct Cli {
    /// Default log filter; RUST_LOG takes precedence
    #[arg(long, env = "MACPAIR_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the tag of a message
    Gen {
        /// Shared secret
        #[arg(long, short = 'k', env = "MACPAIR_SECRET", hide_env_values = true)]
        secret: String,
        /// Message text, or @file:<path>
        message: String,
        #[arg(long, short = 'f', value_enum, default_value_t = Format::Base64)]
        format: Format,
    },

    /// Check a received tag against a message
    Ver {
        /// Shared secret
        #[arg(long, short = 'k', env = "MACPAIR_SECRET", hide_env_values = true)]
        secret: String,
        /// Message text, or @file:<path>
        message: String,
        /// The tag that came with the message
        tag: String,
        #[arg(long, short = 'f', value_enum, default_value_t = TagFormat::Base64)]
        format: TagFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Base64,
    Hex,
    Both,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TagFormat {
    Base64,
    Hex,
}

impl From<TagFormat> for Encoding {
    fn from(format: TagFormat) -> Self {
        match format {
            TagFormat::Base64 => Encoding::Base64,
            TagFormat::Hex => Encoding::Hex,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Generated,
    Valid,
    Invalid,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = run(cli.command);
    if let Err(e) = &result {
        tracing::debug!("command failed: {e:?}");
        eprintln!("Error: {e:#}");
    }
    ExitCode::from(exit_code(&result))
}

/// 0 when the command did its job, 1 for a tag that does not verify, 2 when
/// verification could not even be attempted.
fn exit_code(result: &Result<Outcome>) -> u8 {
    match result {
        Ok(Outcome::Generated | Outcome::Valid) => 0,
        Ok(Outcome::Invalid) => 1,
        Err(_) => 2,
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Commands) -> Result<Outcome> {
    match command {
        Commands::Gen {
            secret,
            message,
            format,
        } => {
            for line in generate(&secret, &message, format)? {
                println!("{line}");
            }
            Ok(Outcome::Generated)
        }
        Commands::Ver {
            secret,
            message,
            tag,
            format,
        } => {
            let outcome = verify(&secret, &message, &tag, format)?;
            if outcome == Outcome::Valid {
                println!("VALID: message is authentic");
            } else {
                println!("INVALID: message was altered or wrong key used");
            }
            Ok(outcome)
        }
    }
}

fn generate(secret: &str, message_arg: &str, format: Format) -> Result<Vec<String>> {
    macpair::ensure_present("secret", secret)?;
    let message = read_message_arg(message_arg)?;
    macpair::ensure_present("message", &message)?;

    let engine = MacEngine::new(&macpair::derive_key(secret))?;
    let tag = engine.compute(&message);
    let lines = match format {
        Format::Base64 => vec![macpair::encode_base64(&tag)],
        Format::Hex => vec![macpair::encode_hex(&tag)],
        Format::Both => vec![
            format!("base64: {}", macpair::encode_base64(&tag)),
            format!("hex:    {}", macpair::encode_hex(&tag)),
        ],
    };
    Ok(lines)
}

fn verify(secret: &str, message_arg: &str, tag: &str, format: TagFormat) -> Result<Outcome> {
    macpair::ensure_present("secret", secret)?;
    let message = read_message_arg(message_arg)?;
    macpair::ensure_present("message", &message)?;
    let tag = tag.trim();
    macpair::ensure_present("tag", tag)?;

    let candidate = macpair::decode(tag, format.into())?;
    let key = macpair::derive_key(secret);
    if macpair::verify_tag(&key, &message, &candidate)? {
        Ok(Outcome::Valid)
    } else {
        Ok(Outcome::Invalid)
    }
}

/// The message bytes: the argument itself, or the raw contents of an
/// `@file:` path.
fn read_message_arg(arg: &str) -> Result<Vec<u8>> {
    match arg.strip_prefix(FILE_PREFIX) {
        Some(path) => {
            let path = Path::new(path);
            std::fs::read(path)
                .with_context(|| format!("reading message from {}", path.display()))
        }
        None => Ok(arg.as_bytes().to_vec()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::ffi::OsStr;
    use std::io::Write;

    const HELLO_B64: &str = "iKqz7ejTrflNJquQ07r9SiCDBww7zOnAFO4EpEOEfAs=";
    const HELLO_HEX: &str = "88aab3ede8d3adf94d26ab90d3bafd4a2083070c3bcce9c014ee04a443847c0b";

    fn exit_code_for(args: &[&str]) -> u8 {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        exit_code(&run(cli.command))
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_formats() {
        assert_eq!(
            generate("secret", "hello", Format::Base64).unwrap(),
            vec![HELLO_B64]
        );
        assert_eq!(
            generate("secret", "hello", Format::Hex).unwrap(),
            vec![HELLO_HEX]
        );
        let both = generate("secret", "hello", Format::Both).unwrap();
        assert_eq!(both.len(), 2);
        assert!(both[0].ends_with(HELLO_B64));
        assert!(both[1].ends_with(HELLO_HEX));
    }

    #[test]
    fn test_verify_outcomes() {
        let padded = format!("  {HELLO_HEX}\n");
        assert_eq!(
            verify("secret", "hello", HELLO_B64, TagFormat::Base64).unwrap(),
            Outcome::Valid
        );
        assert_eq!(
            verify("secret", "hello", &padded, TagFormat::Hex).unwrap(),
            Outcome::Valid
        );
        assert_eq!(
            verify("secret", "hellO", HELLO_B64, TagFormat::Base64).unwrap(),
            Outcome::Invalid
        );
        assert_eq!(
            verify("Secret", "hello", HELLO_B64, TagFormat::Base64).unwrap(),
            Outcome::Invalid
        );
    }

    #[test]
    fn test_verify_rejects_malformed_tag() {
        let err = verify("secret", "hello", "not-base64!", TagFormat::Base64).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<macpair::Error>(),
            Some(macpair::Error::MalformedEncoding { .. })
        ));
    }

    #[test]
    fn test_empty_inputs_are_refused() {
        for (secret, message, field) in [("", "hello", "secret"), ("secret", "", "message")] {
            let err = generate(secret, message, Format::Base64).unwrap_err();
            assert_eq!(
                err.downcast_ref::<macpair::Error>(),
                Some(&macpair::Error::EmptyInput { field })
            );
        }
        let err = verify("secret", "hello", "   ", TagFormat::Base64).unwrap_err();
        assert_eq!(
            err.downcast_ref::<macpair::Error>(),
            Some(&macpair::Error::EmptyInput { field: "tag" })
        );
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_code(&Ok(Outcome::Generated)), 0);
        assert_eq!(exit_code(&Ok(Outcome::Valid)), 0);
        assert_eq!(exit_code(&Ok(Outcome::Invalid)), 1);
        assert_eq!(exit_code(&Err(anyhow::anyhow!("unreadable"))), 2);
    }

    #[test]
    fn test_exit_codes_end_to_end() {
        let valid = ["macpair", "ver", "-k", "secret", "hello", HELLO_B64];
        assert_eq!(exit_code_for(&valid), 0);
        let valid_hex = [
            "macpair", "ver", "-k", "secret", "-f", "hex", "hello", HELLO_HEX,
        ];
        assert_eq!(exit_code_for(&valid_hex), 0);

        let tampered = ["macpair", "ver", "-k", "secret", "hellO", HELLO_B64];
        assert_eq!(exit_code_for(&tampered), 1);
        // Well-formed base64, but far too short to be a tag.
        let short = ["macpair", "ver", "-k", "secret", "hello", "iKqz"];
        assert_eq!(exit_code_for(&short), 1);

        let malformed = ["macpair", "ver", "-k", "secret", "hello", "not-base64!"];
        assert_eq!(exit_code_for(&malformed), 2);

        let generated = ["macpair", "gen", "-k", "secret", "hello"];
        assert_eq!(exit_code_for(&generated), 0);
        let empty_secret = ["macpair", "gen", "-k", "", "hello"];
        assert_eq!(exit_code_for(&empty_secret), 2);
    }

    #[test]
    fn test_parse_ver() {
        let cli = Cli::try_parse_from([
            "macpair", "ver", "-k", "secret", "hello", HELLO_HEX, "-f", "hex",
        ])
        .unwrap();
        match cli.command {
            Commands::Ver {
                secret,
                message,
                tag,
                format,
            } => {
                assert_eq!(secret, "secret");
                assert_eq!(message, "hello");
                assert_eq!(tag, HELLO_HEX);
                assert_eq!(format, TagFormat::Hex);
            }
            other => panic!("parsed as {other:?}"),
        }
    }

    #[test]
    fn test_secret_is_bound_to_environment() {
        use clap::CommandFactory;
        let command = Cli::command();
        for name in ["gen", "ver"] {
            let sub = command.find_subcommand(name).unwrap();
            let secret = sub
                .get_arguments()
                .find(|arg| arg.get_id() == "secret")
                .unwrap();
            assert_eq!(secret.get_env(), Some(OsStr::new("MACPAIR_SECRET")));
        }
    }

    #[test]
    fn test_gen_takes_secret_from_environment() {
        use clap::{CommandFactory, FromArgMatches};
        // Only this test reads the variable, so setting it races with nothing.
        const VAR: &str = "MACPAIR_SECRET_FOR_GEN_TEST";
        std::env::set_var(VAR, "secret");

        let command = Cli::command()
            .mut_subcommand("gen", |sub| sub.mut_arg("secret", |arg| arg.env(VAR)));
        let matches = command
            .try_get_matches_from(["macpair", "gen", "hello"])
            .unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        match cli.command {
            Commands::Gen {
                secret,
                message,
                format,
            } => {
                assert_eq!(secret, "secret");
                assert_eq!(generate(&secret, &message, format).unwrap(), vec![HELLO_B64]);
            }
            other => panic!("parsed as {other:?}"),
        }
    }

    #[test]
    fn test_message_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        let arg = format!("{FILE_PREFIX}{}", file.path().display());

        assert_eq!(read_message_arg(&arg).unwrap(), b"hello");
        assert_eq!(
            verify("secret", &arg, HELLO_B64, TagFormat::Base64).unwrap(),
            Outcome::Valid
        );
    }

    #[test]
    fn test_binary_message_file() {
        let bytes = [0xff, 0xfe, 0x00, 0x80];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        let arg = format!("{FILE_PREFIX}{}", file.path().display());

        let key = macpair::derive_key("secret");
        let tag = macpair::encode_hex(&macpair::compute_tag(&key, bytes).unwrap());
        assert_eq!(
            generate("secret", &arg, Format::Hex).unwrap(),
            vec![tag.clone()]
        );
        assert_eq!(
            verify("secret", &arg, &tag, TagFormat::Hex).unwrap(),
            Outcome::Valid
        );
    }

    #[test]
    fn test_missing_message_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.txt");
        let arg = format!("{FILE_PREFIX}{}", missing.display());
        let err = read_message_arg(&arg).unwrap_err();
        assert!(format!("{err:#}").contains("absent.txt"));
    }

    #[test]
    fn test_plain_message_is_passed_through() {
        assert_eq!(read_message_arg("@notafile").unwrap(), b"@notafile");
    }
}
