// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! schoolmate-xss CLI
//!
//! Runs the fixture operations and stored XSS probes against the instance
//! named by `BASE_URL` (or the `SCHOOLMATE_CONFIG` file).

use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use schoolmate_xss::fixture::RestorePath;
use schoolmate_xss::{
    CleanupOutcome, EntityKind, Environment, Role, SchoolMate, StoredPayload, StoredXssScenario,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("schoolmate_xss=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "entities" => {
            list_entities();
            Ok(ExitCode::SUCCESS)
        }
        "session" => show_session(args.get(2).map(String::as_str)).await,
        "restore" => {
            if args.len() < 3 {
                eprintln!("Usage: schoolmate-xss restore <entity>");
                return ExitCode::from(1);
            }
            restore_entity(&args[2]).await
        }
        "edit" => {
            if args.len() < 4 {
                eprintln!("Usage: schoolmate-xss edit <entity> <value>...");
                return ExitCode::from(1);
            }
            edit_entity(&args[2], &args[3..]).await
        }
        "probe" => {
            if args.len() < 3 {
                eprintln!("Usage: schoolmate-xss probe <entity> [payload] [--field <name>]");
                return ExitCode::from(1);
            }
            probe_entity(&args[2], &args[3..]).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(ExitCode::SUCCESS)
        }
        "--version" | "-v" | "version" => {
            println!("schoolmate-xss {}", schoolmate_xss::VERSION);
            Ok(ExitCode::SUCCESS)
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Ok(ExitCode::from(1))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"schoolmate-xss - Stored XSS harness for SchoolMate

USAGE:
    schoolmate-xss <COMMAND> [OPTIONS]

COMMANDS:
    entities                          List fixture entities and their contracts
    session [role]                    Log in and show the session cookie (default: admin)
    restore <entity>                  Restore a fixture record to its seeded values
    edit <entity> <value>...          Overwrite a fixture record's editable fields
    probe <entity> [payload]          Store a payload, classify it, restore the record
          [--field <name>]            Field receiving the payload (default: first)
    help                              Show this help message
    version                           Show version information

ENVIRONMENT:
    BASE_URL                          Application base URL (default: http://localhost:8000/)
    ADMIN_USERNAME, ADMIN_PASSWORD    Admin credentials (also TEACHER_, STUDENT_, PARENT_)
    SCHOOLMATE_CONFIG                 Optional JSON config file
    RUST_LOG                          Log filter (default: schoolmate_xss=info)

EXIT CODES:
    0    success
    1    failure
    2    probe found an unescaped reflection

EXAMPLES:
    schoolmate-xss probe student "<script>alert(1)</script>"
    schoolmate-xss probe parent --field lname
    schoolmate-xss restore student
"#
    );
}

fn helper() -> anyhow::Result<SchoolMate> {
    let environment = Environment::load().context("loading configuration")?;
    tracing::debug!(base_url = %environment.base_url, "Using environment");
    Ok(SchoolMate::new(environment)?)
}

fn list_entities() {
    println!("{:<14} {:<14} {:<9} {:<30} seeded", "entity", "menu", "restore", "fields");
    for kind in EntityKind::ALL {
        let contract = kind.contract();
        let restore = match contract.restore {
            RestorePath::UiReplay => "replay",
            RestorePath::RawPost(_) => "post",
        };
        let seeded = contract
            .canonical
            .map(|values| values.join(", "))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<14} {:<14} {:<9} {:<30} {}",
            kind.as_str(),
            contract.navigation.menu_link(),
            restore,
            contract.fields.join(", "),
            seeded
        );
    }
}

async fn show_session(role: Option<&str>) -> anyhow::Result<ExitCode> {
    let role: Role = role.unwrap_or("admin").parse()?;
    let mut helper = helper()?;
    helper
        .login_as(role)
        .await
        .with_context(|| format!("logging in as {}", role))?;
    let credential = helper.session_cookie()?;
    println!("{} session: {}", role, credential.masked());
    Ok(ExitCode::SUCCESS)
}

async fn restore_entity(entity: &str) -> anyhow::Result<ExitCode> {
    let kind: EntityKind = entity.parse()?;
    let mut helper = helper()?;
    let _guard = schoolmate_xss::fixture::lock(kind).await;

    match helper
        .cleanup(kind)
        .await
        .with_context(|| format!("restoring {}", kind))?
    {
        CleanupOutcome::Replayed => println!("[OK] {} restored through the edit form", kind),
        CleanupOutcome::Posted(report) => println!(
            "[OK] {} restored out of band: {} {} ({}ms)",
            kind, report.status, report.url, report.elapsed_ms
        ),
    }
    Ok(ExitCode::SUCCESS)
}

async fn edit_entity(entity: &str, values: &[String]) -> anyhow::Result<ExitCode> {
    let kind: EntityKind = entity.parse()?;
    let values: Vec<&str> = values.iter().map(String::as_str).collect();
    let mut helper = helper()?;
    let _guard = schoolmate_xss::fixture::lock(kind).await;

    helper
        .edit(kind, &values)
        .await
        .with_context(|| format!("editing {}", kind))?;
    println!("[OK] {} updated; run `schoolmate-xss restore {}` afterwards", kind, kind);
    Ok(ExitCode::SUCCESS)
}

async fn probe_entity(entity: &str, rest: &[String]) -> anyhow::Result<ExitCode> {
    let kind: EntityKind = entity.parse()?;

    let mut payload = None;
    let mut field = None;
    let mut args = rest.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--field" => match args.next() {
                Some(name) => field = Some(name.as_str()),
                None => bail!("--field needs a field name"),
            },
            other if payload.is_none() => payload = Some(other),
            other => bail!("unexpected argument: {}", other),
        }
    }

    let mut scenario = match payload {
        Some(raw) => StoredXssScenario::new(kind, raw),
        None => StoredXssScenario::with_payload(kind, &StoredPayload::with_random_marker())?,
    };
    if let Some(name) = field {
        scenario = scenario.field(name)?;
    }

    println!("Probing {} with: {}", kind, scenario.payload());

    let mut helper = helper()?;
    let report = scenario
        .run(&mut helper)
        .await
        .with_context(|| format!("probing {}", kind))?;

    println!("\n=== {} ({}) ===", report.entity, report.field);
    println!("Reflection: {}", report.reflection);
    println!("Inline script injected: {}", report.script_injected);
    if let Some(ref restoration) = report.restoration {
        println!(
            "Restored out of band: {} ({}ms)",
            restoration.status, restoration.elapsed_ms
        );
    }
    for (name, value) in &report.verified {
        println!("  {} = {}", name, value);
    }

    if report.is_vulnerable() {
        println!("\n[VULNERABLE] Payload rendered unescaped");
        Ok(ExitCode::from(2))
    } else {
        println!("\n[OK] Payload not rendered as markup");
        Ok(ExitCode::SUCCESS)
    }
}
