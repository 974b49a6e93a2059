//! `crm` binary: reads commands from stdin, prints screens to stdout.

use crm_console::{Console, HttpRecordStore, Reply, StdinConfirm, TracingSink, ViewController};
use crm_core::{AppConfig, BookingRecord, ConsultationRecord};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

fn fail(message: impl std::fmt::Display) -> ! {
    tracing::error!("{}", message);
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Logs go to stderr; stdout carries the screens.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    tracing::info!("CRM console starting against {}", config.api.base_url);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => fail(format!("Failed to create tokio runtime: {}", e)),
    };
    let _guard = rt.enter();

    let consultations = HttpRecordStore::<ConsultationRecord>::new(&config.api)
        .unwrap_or_else(|e| fail(e));
    let bookings =
        HttpRecordStore::<BookingRecord>::new(&config.api).unwrap_or_else(|e| fail(e));

    let confirm = Arc::new(StdinConfirm);
    let sink = Arc::new(TracingSink);
    let mut console = Console::new(
        ViewController::new(Arc::new(consultations), confirm.clone(), sink.clone()),
        ViewController::new(Arc::new(bookings), confirm, sink),
    );

    println!("{}", rt.block_on(console.start()));
    println!("Type 'help' for commands.");

    let stdin = io::stdin();
    loop {
        print!("{}> ", console.screen());
        if io::stdout().flush().is_err() {
            break;
        }

        // The lock is released before the command runs so a delete
        // confirmation can read stdin.
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        }

        match rt.block_on(console.handle_line(&line)) {
            Reply::Quit => break,
            Reply::Output(text) if text.is_empty() => {}
            Reply::Output(text) => println!("{}", text),
        }
    }

    tracing::info!("CRM console exiting");
}
