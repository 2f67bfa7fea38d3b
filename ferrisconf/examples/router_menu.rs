//! Router menu example: log in, configure, query and save.
//!
//! Connects to a Cisco IOS router, escalates to privileged exec, applies one
//! catalog template, prints a few queries and logs out.
//!
//! # Usage
//!
//! Over telnet (the usual lab setup):
//! ```bash
//! cargo run --example router_menu -- --host 10.0.0.1 --password cisco --secret class \
//!     --template loopback --param loopback_id=0 --param address=10.1.1.1 --param mask=255.255.255.255
//! ```
//!
//! Over SSH:
//! ```bash
//! cargo run --example router_menu -- --ssh --host 10.0.0.1 --user admin --password cisco \
//!     --secret class --template hostname --param hostname=R1
//! ```

use std::env;
use std::time::Duration;

use ferrisconf::{LogSink, Mode, SessionAutomaton, SessionBuilder, Transport, catalog};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut builder = SessionBuilder::new(&args.host)
        .username(&args.user)
        .password(&args.password)
        .timeout(Duration::from_secs(args.timeout))
        .sink(LogSink::default());
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    if let Some(secret) = &args.secret {
        builder = builder.enable_secret(secret);
    }

    println!("Connecting to {}...", args.host);
    if args.ssh {
        let session = builder.connect_ssh().await?;
        run(session, &args).await
    } else {
        let session = builder.connect_telnet().await?;
        run(session, &args).await
    }
}

async fn run<T: Transport>(
    mut session: SessionAutomaton<T>,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode = session.authenticate().await?;
    println!("Logged in at {} ({})", session.context().prompt(), mode);

    session.enter_privileged().await?;
    println!("Now in {}", session.mode());

    let catalog = catalog::cisco_ios();

    if let Some(name) = &args.template {
        let template = catalog.template(name)?;
        let params: Vec<(&str, &str)> = args
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        println!("\nApplying template '{}'", name);
        println!("{}", "-".repeat(50));
        for result in session.apply_template(template, &params).await? {
            println!("{} -> {}", result.command(), result.prompt());
        }
        println!("{}", "-".repeat(50));
    }

    for name in ["interface_brief", "startup_config"] {
        let query = catalog.query(name)?;
        println!("\nExecuting: {}", query.command);
        println!("{}", "-".repeat(50));
        let result = session.run_query(query, &[]).await?;
        print!("{}", result);
        println!("{}", "-".repeat(50));
        println!(
            "{} page(s) in {:?}",
            result.pages(),
            result.elapsed()
        );
    }

    let clock = session.run_command("show clock", Mode::PrivilegedExec).await?;
    println!("\nDevice clock: {}", clock.output().trim());

    println!("\nLogging out...");
    session.logout().await?;
    println!("Done!");

    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    port: Option<u16>,
    user: String,
    password: String,
    secret: Option<String>,
    ssh: bool,
    template: Option<String>,
    params: Vec<(String, String)>,
    timeout: u64,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = None;
        let mut user = String::new();
        let mut password = String::new();
        let mut secret = None;
        let mut ssh = false;
        let mut template = None;
        let mut params = Vec::new();
        let mut timeout = 30u64;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = args[i].clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().ok();
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = args[i].clone();
                    }
                }
                "--secret" | "-s" => {
                    i += 1;
                    if i < args.len() {
                        secret = Some(args[i].clone());
                    }
                }
                "--ssh" => {
                    ssh = true;
                }
                "--template" => {
                    i += 1;
                    if i < args.len() {
                        template = Some(args[i].clone());
                    }
                }
                "--param" => {
                    i += 1;
                    if i < args.len() {
                        match args[i].split_once('=') {
                            Some((k, v)) => params.push((k.to_string(), v.to_string())),
                            None => eprintln!("Ignoring malformed --param: {}", args[i]),
                        }
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(30);
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            secret,
            ssh,
            template,
            params,
            timeout,
        }
    }

    fn print_help() {
        println!(
            r#"ferrisconf router_menu example

USAGE:
    cargo run --example router_menu -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Target router [default: localhost]
    -p, --port <PORT>        Port [default: 23, or 22 with --ssh]
    -u, --user <USER>        Username (required with --ssh)
    -P, --password <PASS>    Login password
    -s, --secret <SECRET>    Enable secret
        --ssh                Connect over SSH instead of telnet
        --template <NAME>    Apply a template: hostname, loopback, ospf, eigrp, rip
        --param <KEY=VALUE>  Template parameter (repeatable)
    -t, --timeout <SECS>     Connection timeout [default: 30]
    --help                   Print this help message
"#
        );
    }
}
