use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use saltkdf::{
    DerivedSalt, KdfError, KdfParams, KeyDeriver, SALT_KEY_ENV, SaltDeriver, SaltKey, generate_seed,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;
mod auth;

#[derive(Debug, clap::Args)]
struct Argon2Args {
    /// Argon2 time cost / passes (default: 2)
    #[arg(long = "time-cost", env = "SALTKDF_TIME_COST")]
    time_cost: Option<u32>,

    /// Argon2 memory cost in KiB (default: 102400)
    #[arg(long = "mem-cost", env = "SALTKDF_MEM_COST")]
    mem_cost_kib: Option<u32>,

    /// Argon2 parallelism (default: 8)
    #[arg(long = "parallelism", env = "SALTKDF_PARALLELISM")]
    parallelism: Option<u32>,

    /// Length of the derived key in bytes (default: 32)
    #[arg(long = "hash-len")]
    hash_len: Option<usize>,
}

impl Argon2Args {
    fn to_kdf_params(&self) -> Result<KdfParams, KdfError> {
        let default = KdfParams::default();

        KdfParams::new(
            self.time_cost.unwrap_or(default.time_cost()),
            self.mem_cost_kib.unwrap_or(default.mem_cost_kib()),
            self.parallelism.unwrap_or(default.parallelism()),
            self.hash_len.unwrap_or(default.hash_len()),
        )
    }
}

#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
struct SaltSource {
    /// Salt seed (user name, account ID), normalized through HMAC-SHA256
    #[arg(long)]
    seed: Option<String>,

    /// Raw salt in hex, used as-is (at least 8 bytes)
    #[arg(long = "salt-hex", value_name = "HEX")]
    salt_hex: Option<String>,

    /// Generate a random 16-byte seed and print it alongside the key
    #[arg(long = "random-seed")]
    random_seed: bool,
}

#[derive(Debug, Parser)]
#[command(name = "saltkdf")]
#[command(
    version,
    about = "Argon2id key derivation with HMAC-SHA256 salt normalization."
)]
struct Cli {
    /// Hex-encoded salt derivation key, at least 32 bytes.
    ///
    /// Arguments show up in the process list; prefer SALTKDF_SALT_KEY or a `.env` file.
    #[arg(long = "salt-key", global = true, value_name = "HEX")]
    salt_key: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Derives the 32-byte salt for a seed
    #[command(arg_required_else_help = true)]
    Salt { seed: String },

    /// Derives a key from a password read from SALTKDF_PASSWORD, stdin or a prompt
    Derive {
        #[command(flatten)]
        source: SaltSource,

        #[command(flatten)]
        argon2: Argon2Args,
    },

    /// Prints a random salt seed
    Seed,

    /// Shows default parameters and the recommended floor
    Params,
}

#[derive(Serialize)]
struct DeriveReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<String>,
    salt: String,
    key: &'a str,
    params: KdfParams,
}

#[derive(Serialize)]
struct ParamsReport {
    default: KdfParams,
    recommended_min_time_cost: u32,
    recommended_min_mem_cost_kib: u32,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "saltkdf=warn".into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let args = Cli::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit_code(&err)
        }
    }
}

/// 2 for invalid input or parameters, 3 for memory exhaustion.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<KdfError>() {
        Some(e) if e.is_validation() => ExitCode::from(2),
        Some(e) if e.is_resource_exhausted() => ExitCode::from(3),
        _ => ExitCode::FAILURE,
    }
}

fn run(args: Cli) -> Result<()> {
    match args.command {
        Commands::Salt { seed } => {
            let deriver = salt_deriver(args.salt_key.as_deref())?;
            let salt = deriver.derive(seed.as_bytes())?;
            if args.json {
                println!("{}", serde_json::json!({ "salt": salt.to_hex() }));
            } else {
                println!("{}", salt.to_hex());
            }
        }
        Commands::Derive { source, argon2 } => {
            let (seed, salt) = resolve_salt(args.salt_key.as_deref(), &source)?;

            let params = argon2.to_kdf_params()?;
            if !params.meets_recommended_floor() {
                tracing::warn!(
                    time_cost = params.time_cost(),
                    mem_cost_kib = params.mem_cost_kib(),
                    "argon2 parameters are below the recommended floor (time >= {}, memory >= {} KiB)",
                    KdfParams::RECOMMENDED_MIN_TIME_COST,
                    KdfParams::RECOMMENDED_MIN_MEM_COST_KIB,
                );
            }

            let password = auth::read_password()?;
            let key = KeyDeriver::new(params)
                .derive(password.as_bytes(), &salt)
                .context("unable to derive key")?;
            drop(password);

            let key_hex = key.to_hex();
            let salt_hex = hex::encode(&*salt);
            if args.json {
                let report = DeriveReport {
                    seed,
                    salt: salt_hex,
                    key: &key_hex,
                    params,
                };
                let out = Zeroizing::new(serde_json::to_string(&report)?);
                println!("{}", out.as_str());
            } else {
                println!("key:  {}", key_hex.as_str());
                println!("salt: {salt_hex}");
                if let Some(seed) = seed {
                    println!("seed: {seed}");
                }
            }
        }
        Commands::Seed => {
            let seed = hex::encode(generate_seed()?);
            if args.json {
                println!("{}", serde_json::json!({ "seed": seed }));
            } else {
                println!("{seed}");
            }
        }
        Commands::Params => {
            let report = ParamsReport {
                default: KdfParams::default(),
                recommended_min_time_cost: KdfParams::RECOMMENDED_MIN_TIME_COST,
                recommended_min_mem_cost_kib: KdfParams::RECOMMENDED_MIN_MEM_COST_KIB,
            };
            if args.json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                let d = report.default;
                println!("Defaults");
                println!("  time cost:    {}", d.time_cost());
                println!("  memory cost:  {} KiB", d.mem_cost_kib());
                println!("  parallelism:  {}", d.parallelism());
                println!("  hash length:  {} bytes", d.hash_len());
                println!("Recommended floor (not enforced)");
                println!("  time cost:    >= {}", report.recommended_min_time_cost);
                println!("  memory cost:  >= {} KiB", report.recommended_min_mem_cost_kib);
            }
        }
    }

    Ok(())
}

/// Uses `--salt-key`, then `SALTKDF_SALT_KEY`, then the embedded key.
fn salt_deriver(flag: Option<&str>) -> Result<SaltDeriver> {
    let key = match flag {
        Some(hex_key) => Some(SaltKey::from_hex(hex_key).context("invalid --salt-key")?),
        None => SaltKey::from_env(SALT_KEY_ENV)
            .with_context(|| format!("invalid {SALT_KEY_ENV}"))?,
    };

    match key {
        Some(key) => Ok(SaltDeriver::new(key)),
        None => {
            tracing::warn!("no salt key configured; using the embedded default key");
            Ok(SaltDeriver::default())
        }
    }
}

/// Returns the hex of a generated seed (if any) and the salt bytes to use.
/// A raw `--salt-hex` bypasses salt derivation entirely.
fn resolve_salt(
    salt_key: Option<&str>,
    source: &SaltSource,
) -> Result<(Option<String>, Zeroizing<Vec<u8>>)> {
    if let Some(salt_hex) = &source.salt_hex {
        let salt = hex::decode(salt_hex.trim())
            .map_err(|_| KdfError::InvalidInput("salt is not valid hex"))?;
        return Ok((None, Zeroizing::new(salt)));
    }

    let deriver = salt_deriver(salt_key)?;
    if let Some(seed) = &source.seed {
        let salt = deriver.derive(seed.as_bytes())?;
        return Ok((None, salt_bytes(&salt)));
    }

    debug_assert!(source.random_seed, "clap requires exactly one salt source");
    let seed = generate_seed()?;
    let salt = deriver.derive(&seed)?;
    Ok((Some(hex::encode(seed)), salt_bytes(&salt)))
}

fn salt_bytes(salt: &DerivedSalt) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(salt.as_bytes().to_vec())
}
