mod cli;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use clap::Parser;
use log::info;

use medication_tracker_backend::storage::yaml::ZoneSetting;
use medication_tracker_backend::Backend;

use crate::cli::{render_card, render_pending, CliArgs};

fn main() -> Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let backend = Backend::from_files(&args.data, args.settings.as_deref())
        .context("failed to load household data")?;

    let requested_now = args
        .now
        .as_deref()
        .map(DateTime::parse_from_rfc3339)
        .transpose()
        .context("--now must be an RFC 3339 timestamp")?;

    match backend.settings.timezone {
        ZoneSetting::Local => run(&backend, &args, resolve_now(&Local, requested_now)),
        ZoneSetting::Utc => run(&backend, &args, resolve_now(&Utc, requested_now)),
        ZoneSetting::Fixed(offset) => run(&backend, &args, resolve_now(&offset, requested_now)),
    }
}

fn resolve_now<Tz: TimeZone>(tz: &Tz, requested: Option<DateTime<FixedOffset>>) -> DateTime<Tz> {
    match requested {
        Some(now) => now.with_timezone(tz),
        None => Utc::now().with_timezone(tz),
    }
}

fn run<Tz: TimeZone>(backend: &Backend, args: &CliArgs, now: DateTime<Tz>) -> Result<()> {
    let child = args.child.as_deref();

    if args.pending {
        let responses = backend.pending_medications(child, &now)?;
        info!("Rendering pending medications for {} children", responses.len());
        if args.json {
            println!("{}", serde_json::to_string_pretty(&responses)?);
        } else {
            for response in &responses {
                print!("{}", render_pending(response));
            }
        }
        return Ok(());
    }

    let cards = backend.medication_cards(child, &now)?;
    info!("Rendering {} medication cards", cards.len());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
    } else {
        for card in &cards {
            print!("{}", render_card(card));
        }
    }
    Ok(())
}
