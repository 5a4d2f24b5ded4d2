//! A searcher for non-adjustable-reduced-speed spaceships.

mod args;

use nrss_lib::{Error, Status};
use std::{io, process::exit, sync::atomic::Ordering, time::Instant};

/// Trials per batch between stop-flag and status checks.
const BATCH: u64 = 256;

/// Seconds between status lines.
const STATUS_EVERY: u64 = 10;

fn main() {
    let args = args::parse().unwrap_or_else(|e| {
        let _ = e.print();
        exit(1);
    });
    if let Err(e) = run(args) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(args: args::Args) -> Result<(), Error> {
    let mut search = args.config.search(&args.state_file)?;
    let stop = search.stop_flag();
    ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let mut status = StatusLine::new(search.total_soups());
    let mut known_ships = search.ship_count();
    loop {
        let outcome = search.search(Some(BATCH))?;
        for speed in &search.ledger().speeds()[known_ships..] {
            println!("{} found ({} NRSS total)!", speed, search.ship_count());
        }
        known_ships = search.ship_count();
        match outcome {
            Status::Searching => status.tick(search.soup_count()),
            Status::Exhausted | Status::Stopped => {
                status.flush(search.soup_count());
                return Ok(());
            }
        }
    }
}

/// Periodic progress printing.
struct StatusLine {
    total: Option<u64>,
    start: Instant,
    last: Instant,
    last_soups: u64,
}

impl StatusLine {
    fn new(total: Option<u64>) -> Self {
        let now = Instant::now();
        StatusLine {
            total,
            start: now,
            last: now,
            last_soups: 0,
        }
    }

    fn tick(&mut self, soups: u64) {
        if self.last.elapsed().as_secs() >= STATUS_EVERY {
            self.flush(soups);
        }
    }

    fn flush(&mut self, soups: u64) {
        let current = (soups - self.last_soups) as f64 / self.last.elapsed().as_secs_f64();
        let overall = soups as f64 / self.start.elapsed().as_secs_f64();
        match self.total {
            Some(total) if total > 0 => println!(
                "{} soups completed ({:.3}%, {:.3} soups/second current, {:.3} overall)",
                soups,
                soups as f64 / total as f64 * 100.0,
                current,
                overall
            ),
            _ => println!(
                "{} soups completed ({:.3} soups/second current, {:.3} overall)",
                soups, current, overall
            ),
        }
        self.last = Instant::now();
        self.last_soups = soups;
    }
}
