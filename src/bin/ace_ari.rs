//! Command-line ARI transcoder.
//!
//! Reads ARIs in one form, resolves them against the loaded ADMs, and writes
//! them in another form. ADMs are loaded from `--adm-path` and the
//! `ADM_PATH` environment variable.

use std::io::{Read as _, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};
use tracing::{debug, error, info};

use ace_ari::{adm_json, AdmCatalog, Form, Transcoder};

fn cli() -> Command {
    Command::new("ace_ari")
        .about("Convert ARIs between text and CBOR encoding forms")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_parser(["debug", "info", "warning", "error"])
                .default_value("info")
                .help("The minimum log severity"),
        )
        .arg(
            Arg::new("inform")
                .long("inform")
                .value_parser(["text", "cbor", "cborhex"])
                .default_value("text")
                .help("The input encoding"),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .default_value("-")
                .help("The input file or \"-\" for stdin"),
        )
        .arg(
            Arg::new("outform")
                .long("outform")
                .value_parser(["text", "cbor", "cborhex"])
                .default_value("cbor")
                .help("The desired output encoding"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .default_value("-")
                .help("The output file or \"-\" for stdout"),
        )
        .arg(
            Arg::new("must-lookup")
                .long("must-lookup")
                .alias("must-nickname")
                .action(ArgAction::SetTrue)
                .help("Fail when a reference cannot be resolved in the loaded ADMs"),
        )
        .arg(
            Arg::new("adm-path")
                .long("adm-path")
                .value_parser(clap::value_parser!(PathBuf))
                .help("A directory of ADM JSON files to load"),
        )
}

fn load_adms(catalog: &mut AdmCatalog, arg_dir: Option<&PathBuf>) -> Result<(), String> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(dir) = arg_dir {
        dirs.push(dir.clone());
    }
    if let Ok(env_path) = std::env::var("ADM_PATH") {
        dirs.extend(std::env::split_paths(&env_path));
    }
    for dir in dirs {
        if !dir.is_dir() {
            debug!("skipping missing ADM dir {}", dir.display());
            continue;
        }
        let count = adm_json::load_dir(catalog, &dir)
            .map_err(|err| format!("loading ADMs from {}: {err}", dir.display()))?;
        debug!("loaded {count} ADMs from {}", dir.display());
    }
    Ok(())
}

fn read_input(path: &str) -> std::io::Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin().lock().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path)
    }
}

fn run() -> Result<(), String> {
    let matches = cli().get_matches();

    let level = match matches.get_one::<String>("log-level").map(String::as_str) {
        Some("debug") => tracing::Level::DEBUG,
        Some("warning") => tracing::Level::WARN,
        Some("error") => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let inform = matches
        .get_one::<String>("inform")
        .map(String::as_str)
        .and_then(Form::from_name)
        .ok_or("unknown input form")?;
    let outform = matches
        .get_one::<String>("outform")
        .map(String::as_str)
        .and_then(Form::from_name)
        .ok_or("unknown output form")?;
    let must_lookup = matches.get_flag("must-lookup");

    let mut catalog = AdmCatalog::new();
    load_adms(&mut catalog, matches.get_one::<PathBuf>("adm-path"))?;
    info!("loaded {} ADMs", catalog.len());

    let input_path = matches
        .get_one::<String>("input")
        .map_or("-", String::as_str);
    let input = read_input(input_path).map_err(|err| format!("reading {input_path}: {err}"))?;

    let tc = Transcoder::new(&catalog, must_lookup);
    let aris = tc
        .decode_stream(&input, inform)
        .map_err(|err| err.to_string())?;

    let mut out: Vec<u8> = Vec::new();
    for ari in &aris {
        debug!("decoded ARI {ari:?}");
        let resolved = tc.resolve(ari).map_err(|err| err.to_string())?;
        out.extend(tc.emit(&resolved, outform).map_err(|err| err.to_string())?);
        if outform != Form::Cbor {
            out.push(b'\n');
        }
    }

    let output_path = matches
        .get_one::<String>("output")
        .map_or("-", String::as_str);
    if output_path == "-" {
        std::io::stdout()
            .lock()
            .write_all(&out)
            .map_err(|err| format!("writing stdout: {err}"))?;
    } else {
        std::fs::write(output_path, &out)
            .map_err(|err| format!("writing {output_path}: {err}"))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            error!("{msg}");
            ExitCode::FAILURE
        }
    }
}
