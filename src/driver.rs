use anyhow::{Context, Result};
use log::{error, info};

use crate::args::{self, Operation, ParsedArguments};
use crate::client::{App, AppOptions, Client, Settings};
use crate::exec;
use crate::logging;

pub const DOCUMENT_PATH: &str = "DocProbe/TestDoc";

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

pub fn run(program: &str, tokens: Vec<String>) -> i32 {
    let parsed = args::parse(tokens);
    logging::init(parsed.as_ref().map(|a| a.debug_logging).unwrap_or(false));

    let args = match parsed {
        Ok(args) => args,
        Err(e) => {
            error!("Invalid command-line arguments: {}", e);
            return EXIT_USAGE;
        }
    };

    if args.show_help {
        print!("{}", args::help_text(program));
        return EXIT_OK;
    }

    if args.debug_logging {
        info!("Enabling debug logging");
    }

    match run_operations(&args) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    }
}

fn run_operations(args: &ParsedArguments) -> Result<()> {
    info!("Creating App");
    let app = AppOptions::load()
        .and_then(App::create)
        .context("Creating App FAILED")?;

    info!("Creating Client");
    let mut client = Client::get_instance(&app)
        .context("Creating Client FAILED")?;

    if args.use_emulator {
        let settings = Settings::emulator();
        info!("Using the emulator at {}", settings.host());
        client.set_settings(settings)
            .context("Connecting to the emulator FAILED")?;
    }

    let doc = client.document(DOCUMENT_PATH)?;
    info!("Performing {} operations on document: {}", args.operations.len(), doc.path());

    let (key, value) = args.write_pair();

    // Per-operation failures are already logged and do not end the run.
    for operation in &args.operations {
        match operation {
            Operation::Read => {
                let _ = exec::do_read(&doc);
            }
            Operation::Write => {
                let _ = exec::do_write(&doc, key, value);
            }
        }
    }

    Ok(())
}
