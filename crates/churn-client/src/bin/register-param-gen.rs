//! register-param-gen - fetch churn approval and print registration params
//!
//! ```bash
//! register-param-gen \
//!     --operator-address 0x00000000000000000000000000000000000000aa \
//!     --bls-key-path ./operator.key.json --bls-key-password secret \
//!     --churner-url churner:8090 --quorums 0,1
//! ```
//!
//! Every flag can also come from its `CHURN_*` environment variable.

use churn_client::output::render;
use churn_client::{AuthorityClient, AuthorizationVerifier, ChurnFlow, ClientConfig, Error, Result};
use churn_core::{Keystore, PublicKey};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "register-param-gen", version)]
#[command(about = "Request churn approval and print registerOperatorWithChurn parameters")]
struct Args {
    /// Operator address (0x-prefixed, 20 bytes).
    #[arg(long, env = "CHURN_OPERATOR_ADDRESS")]
    operator_address: String,

    /// Path to the encrypted operator key file.
    #[arg(long, env = "CHURN_BLS_KEY_PATH")]
    bls_key_path: PathBuf,

    /// Password for the operator key file.
    #[arg(long, env = "CHURN_BLS_KEY_PASSWORD", hide_env_values = true)]
    bls_key_password: String,

    /// Churn authority address. A bare `host:port` is reached over TLS;
    /// pass an explicit `http://` URL for a plaintext authority.
    #[arg(long, env = "CHURN_CHURNER_URL")]
    churner_url: String,

    /// Comma-separated quorum ids, e.g. `0,1`.
    #[arg(long, env = "CHURN_QUORUMS")]
    quorums: String,

    /// Authority public key (hex). Enables local signature verification.
    #[arg(long, env = "CHURN_AUTHORITY_PUBLIC_KEY")]
    authority_public_key: Option<String>,

    /// Authority call timeout in milliseconds.
    #[arg(
        long = "timeout-ms",
        env = "CHURN_TIMEOUT_MS",
        default_value = "5000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_ms: u64,

    /// Enable verbose logging.
    #[arg(short = 'v', long = "verbose")]
    is_verbose: bool,

    /// Suppress all logging output.
    #[arg(short = 'q', long = "quiet")]
    is_quiet: bool,
}

fn init_tracing(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(args: Args) -> Result<String> {
    let key_pair =
        Keystore::load(&args.bls_key_path, &args.bls_key_password).map_err(Error::Keystore)?;
    let authority_key = args
        .authority_public_key
        .as_deref()
        .map(PublicKey::from_hex)
        .transpose()
        .map_err(Error::Request)?;

    let config = ClientConfig::new(args.churner_url)
        .with_timeout(Duration::from_millis(args.timeout_ms));
    let flow = ChurnFlow::new(
        AuthorityClient::new(config)?,
        AuthorizationVerifier::new(authority_key),
    );

    let params = flow
        .register_params(&args.operator_address, &key_pair, &args.quorums)
        .await?;
    Ok(render(&params))
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.is_quiet, args.is_verbose);

    match run(args).await {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("Error ({} stage): {}", e.stage(), e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use churn_client::Stage;
    use churn_core::KeyPair;

    const REQUIRED: [&str; 11] = [
        "register-param-gen",
        "--operator-address",
        "0x00000000000000000000000000000000000000aa",
        "--bls-key-path",
        "/tmp/op.key.json",
        "--bls-key-password",
        "pw",
        "--churner-url",
        "localhost:8090",
        "--quorums",
        "0,1",
    ];

    fn args_for(key_path: &std::path::Path, password: &str, extra: &[&str]) -> Args {
        let mut argv: Vec<String> = REQUIRED.iter().map(|s| s.to_string()).collect();
        argv[4] = key_path.display().to_string();
        argv[6] = password.to_string();
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn parses_required_flags_with_defaults() {
        let args = Args::try_parse_from(REQUIRED).unwrap();
        assert_eq!(args.quorums, "0,1");
        assert_eq!(args.timeout_ms, 5000);
        assert!(args.authority_public_key.is_none());
        assert!(!args.is_verbose);
        assert!(!args.is_quiet);
    }

    #[test]
    fn parses_optional_flags() {
        let mut argv = REQUIRED.to_vec();
        argv.extend(["--timeout-ms", "250", "-v", "--authority-public-key", "ab"]);
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.timeout_ms, 250);
        assert!(args.is_verbose);
        assert_eq!(args.authority_public_key.as_deref(), Some("ab"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut argv = REQUIRED.to_vec();
        argv.extend(["--timeout-ms", "0"]);
        assert!(Args::try_parse_from(argv).is_err());

        let mut argv = REQUIRED.to_vec();
        argv.extend(["--timeout-ms", "1"]);
        assert_eq!(Args::try_parse_from(argv).unwrap().timeout_ms, 1);
    }

    #[tokio::test]
    async fn unsupported_churner_scheme_is_build_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("op.key.json");
        Keystore::encrypt(&KeyPair::generate(), "pw")
            .unwrap()
            .write(&path)
            .unwrap();
        let mut args = args_for(&path, "pw", &[]);
        args.churner_url = "grpc://churner:443".into();
        let err = run(args).await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
        assert_eq!(err.stage(), Stage::Build);
    }

    #[tokio::test]
    async fn missing_key_file_is_keystore_stage() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(&dir.path().join("absent.json"), "pw", &[]);
        assert_eq!(run(args).await.unwrap_err().stage(), Stage::Keystore);
    }

    #[tokio::test]
    async fn wrong_password_is_keystore_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("op.key.json");
        Keystore::encrypt(&KeyPair::generate(), "right")
            .unwrap()
            .write(&path)
            .unwrap();
        let args = args_for(&path, "wrong", &[]);
        assert_eq!(run(args).await.unwrap_err().stage(), Stage::Keystore);
    }

    #[tokio::test]
    async fn sentinel_quorum_fails_at_build_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("op.key.json");
        Keystore::encrypt(&KeyPair::generate(), "pw")
            .unwrap()
            .write(&path)
            .unwrap();
        let mut args = args_for(&path, "pw", &[]);
        args.quorums = "255".into();
        assert_eq!(run(args).await.unwrap_err().stage(), Stage::Build);
    }
}
