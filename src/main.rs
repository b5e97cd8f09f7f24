use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;
use v2clash::{Conversion, OutputKind, RECHECK_HINT, convert_to};

#[derive(Parser)]
#[command(
    version,
    about = "Convert VMess, VLESS and Trojan links into VLESS links and Clash YAML entries",
    long_about = None
)]
struct Args {
    #[arg(help = "Link to convert; read from stdin when omitted or '-'")]
    link: Option<String>,

    #[arg(
        short,
        long = "kind",
        value_name = "KIND",
        help = "Output kind (vless-link, clash-vmess-yaml, clash-vless-yaml, clash-trojan-yaml); repeatable, defaults to every kind relevant to the link"
    )]
    kinds: Vec<OutputKind>,

    #[arg(long, help = "Print the parsed link and outputs as JSON")]
    json: bool,

    #[arg(short, long, help = "Emit trace logs on stderr")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}\n\n{}", e, RECHECK_HINT);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_env("V2CLASH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let link = match args.link.as_deref() {
        Some(link) if link != "-" => link.to_string(),
        _ => read_link_from_stdin()?,
    };
    tracing::info!("Converting {} byte link", link.len());

    let conversion = convert_to(&link, &args.kinds)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &conversion)
            .context("Failed to write JSON output")?;
        writeln!(out)?;
    } else {
        write_report(&mut out, &conversion)?;
    }
    Ok(())
}

fn read_link_from_stdin() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read link from stdin")?;
    let link = line.trim();
    if link.is_empty() {
        bail!("No link given on the command line or stdin");
    }
    Ok(link.to_string())
}

fn write_report(out: &mut impl Write, conversion: &Conversion) -> Result<()> {
    let descriptor = &conversion.descriptor;
    writeln!(
        out,
        "Source: {} (network: {})",
        descriptor.source_kind, descriptor.network
    )?;
    for rendered in &conversion.outputs {
        writeln!(out, "\n{}:", rendered.kind.title())?;
        writeln!(out, "{}", rendered.text)?;
    }
    Ok(())
}
