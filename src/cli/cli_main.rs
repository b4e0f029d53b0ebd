// Main CLI entrypoint
// (c) 2024 Ross Younger

use std::{path::Path, process::ExitCode};

use super::{
    args::CliArgs,
    styles::{DIGEST, LABEL},
};

use crate::{
    config::{Configuration, Manager},
    fingerprint::Fingerprint,
    identity,
    loader::load_certificate,
    util::setup_tracing,
};
use anstream::{print, println};
use anyhow::Context as _;
use clap::Parser;
use figment::providers::Serialized;
use tracing::{error_span, info};

/// Main CLI entrypoint
pub fn cli() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();
    if args.config_files {
        println!("{:?}", Manager::config_files());
        return Ok(ExitCode::SUCCESS);
    }

    let trace_level = if args.debug {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };
    setup_tracing(trace_level, args.log_file.as_deref()).inspect_err(|e| eprintln!("{e:?}"))?;

    let mut manager = Manager::new();
    if let Some(path) = &args.config {
        manager.merge_toml_file(path);
    }
    manager.merge_provider(Serialized::defaults(args.overrides.clone()));

    if args.show_config {
        println!("{}", manager.sources_table::<Configuration>(true));
        return Ok(ExitCode::SUCCESS);
    }

    let result = match &args.cert {
        Some(path) => describe_certificate(path),
        None => generate(&manager, &args),
    };
    result
        .inspect_err(|e| tracing::error!("{e:#}"))
        .or_else(|_| Ok(false))
        .map(|success| {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        })
}

fn print_fingerprint(fp: &Fingerprint) {
    println!("{LABEL}SHA-256{LABEL:#}: {DIGEST}{}{DIGEST:#}", fp.sha256);
    println!("{LABEL}SHA-1{LABEL:#}:   {DIGEST}{}{DIGEST:#}", fp.sha1);
}

/// Generates a fresh TLS identity and reports on it.
///
/// The keys go out of scope when we return; nothing is saved.
fn generate(manager: &Manager, args: &CliArgs) -> anyhow::Result<bool> {
    let _span = error_span!("setup").entered();
    let config = manager.configuration().context("invalid configuration")?;
    info!("{}", config.format_issuance_config());
    let tls = identity::setup(&config)
        .context("could not set up a TLS identity; refusing to serve TLS")?;

    print_fingerprint(&tls.fingerprint);
    if args.print_ca {
        println!();
        print!("{}", tls.authority_certificate_pem);
    }
    if args.print_cert {
        println!();
        print!("{}", tls.certificate_pem);
    }
    Ok(true)
}

fn describe_certificate(path: &Path) -> anyhow::Result<bool> {
    let cert = load_certificate(path)
        .with_context(|| format!("could not load user-supplied certificate {}", path.display()))?;
    println!("{LABEL}Subject{LABEL:#}:    {}", cert.subject);
    println!("{LABEL}Issuer{LABEL:#}:     {}", cert.issuer);
    println!("{LABEL}Serial{LABEL:#}:     {}", cert.serial);
    println!("{LABEL}Not before{LABEL:#}: {}", cert.not_before);
    println!("{LABEL}Not after{LABEL:#}:  {}", cert.not_after);
    print_fingerprint(&cert.fingerprint);
    Ok(true)
}
