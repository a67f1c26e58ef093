mod app;
mod cli;
mod error;
mod network;
mod report;
mod ui;
mod utils;

use std::{
    io,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::app::App;
use crate::cli::Cli;
use crate::network::capture::{list_devices, CaptureConfig};
use crate::ui::{draw_flows, draw_help_overlay};

fn draw_ui(f: &mut Frame, app: &App) {
    draw_flows(f, app, f.size());

    if app.show_help {
        draw_help_overlay(f, f.size());
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    // Reporting interval: the ranked view refreshes once per second
    let tick_rate = Duration::from_secs(1);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw_ui(f, app))?;

        // Capture thread died on its own; stop reporting and let main
        // surface the failure. The last snapshot stays on screen until then.
        if app.capture_failed() {
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // If help is showing, any key closes it
                if app.show_help {
                    app.show_help = false;
                } else {
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char('s') => app.toggle_sort(),
                        KeyCode::Char('h') => app.show_help = true,
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.update();
            last_tick = Instant::now();
        }
    }
}

// Interactive interface menu, used when -i is not given
fn select_interface() -> Result<String> {
    let devices = list_devices()?;
    if devices.is_empty() {
        bail!("no capture-capable interfaces found (missing privileges?)");
    }

    println!("Available network interfaces:");
    for (idx, dev) in devices.iter().enumerate() {
        match &dev.desc {
            Some(desc) => println!("  [{}] {} - {}", idx, dev.name, desc),
            None => println!("  [{}] {}", idx, dev.name),
        }
    }

    println!("\nEnter the number of the interface to monitor:");
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let selected_idx = match input.trim().parse::<usize>() {
        Ok(idx) if idx < devices.len() => idx,
        _ => {
            println!("Invalid selection, using first interface");
            0
        }
    };

    let name = devices[selected_idx].name.clone();
    println!("Selected network interface: {}", name);

    Ok(name)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let interface = match cli.interface {
        Some(name) => name,
        None => select_interface()?,
    };

    let config = CaptureConfig {
        interface,
        promiscuous: cli.promiscuous,
    };

    // A bad interface or missing permission fails here, before the
    // terminal is touched
    let mut app = App::start(config, cli.sort).context("failed to start capture")?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;

    // A requested stop joins cleanly and returns Ok; a loop that died
    // mid-capture hands back its device error here
    app.stop().context("capture ended with an error")?;

    Ok(())
}
