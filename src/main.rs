//! LCD Stream
//!
//! Command-line front end for streaming fills and images to an ILI9341
//! panel through the kernel driver's character device.
//!
//! # Usage
//!
//! ```bash
//! # Bring the panel up and paint it black
//! lcd-stream --init background --color black
//!
//! # Fill a rectangle on an already running panel
//! lcd-stream fill --color '#FF8000' --x 10 --y 20 --width 100 --height 50
//!
//! # Push a raw 24-bit RGB image of panel size
//! lcd-stream blit frame.rgb
//!
//! # Show the frames a fill would produce without touching the device
//! lcd-stream --dry-run fill --color red --width 4 --height 2
//!
//! # Blank the panel without losing what is drawn
//! lcd-stream off
//!
//! # Print the effective configuration as TOML
//! lcd-stream config
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use spi_lcd_stream::display::parse_rgb888;
use spi_lcd_stream::transport::Frame;
use spi_lcd_stream::{
    CaptureTransport, CharDevice, Display, FillReport, Framebuffer, Mode, PanelConfig, Transport,
};

/// LCD Stream
///
/// Tiled pixel streaming to ILI9341 SPI displays
#[derive(Parser)]
#[command(name = "lcd-stream")]
#[command(version = "0.1.0")]
#[command(about = "Stream solid fills and images to an ILI9341 SPI LCD")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Panel configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Device node (overrides the config file)
    #[arg(short, long, global = true)]
    device: Option<PathBuf>,

    /// Record frames in memory and print them instead of writing the device
    #[arg(long, global = true)]
    dry_run: bool,

    /// Run the controller bring-up sequence before drawing
    #[arg(long, global = true)]
    init: bool,

    /// Frames to hexdump on a dry run
    #[arg(long, global = true, default_value_t = 8)]
    dump: usize,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset the controller and address the whole panel
    Init,

    /// Fill a rectangle with a solid color
    Fill {
        /// Color (#RRGGBB, 0xRRGGBB or name)
        #[arg(long, value_parser = parse_rgb888)]
        color: u32,

        #[arg(long, default_value_t = 0)]
        x: u16,

        #[arg(long, default_value_t = 0)]
        y: u16,

        #[arg(long)]
        width: u16,

        #[arg(long)]
        height: u16,
    },

    /// Fill the whole panel with a solid color
    Background {
        /// Color (#RRGGBB, 0xRRGGBB or name)
        #[arg(long, value_parser = parse_rgb888)]
        color: u32,
    },

    /// Stream a raw 24-bit RGB image of exactly panel size
    Blit {
        /// Path to the raw image (R G B bytes, raster order)
        path: PathBuf,
    },

    /// Unblank the panel
    On,

    /// Blank the panel, keeping its contents
    Off,

    /// Show panel geometry and streaming parameters
    Info,

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => PanelConfig::load(path)?,
        None => PanelConfig::default(),
    };
    if let Some(device) = &cli.device {
        config.device_path = device.clone();
    }

    match cli.command {
        Commands::Info => {
            print_info(&config);
            return Ok(());
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            return Ok(());
        }
        _ => {}
    }

    if cli.dry_run {
        let mut display = Display::new(CaptureTransport::new(), &config)?;
        let report = run(&mut display, &cli.command, cli.init)?;
        print_report(&cli.command, report);
        print_capture(display.controller().transport(), cli.dump);
    } else {
        let device = CharDevice::open(&config.device_path).with_context(|| {
            format!("Failed to open LCD device: {}", config.device_path.display())
        })?;
        let mut display = Display::new(device, &config)?;
        let report = run(&mut display, &cli.command, cli.init)?;
        print_report(&cli.command, report);
    }

    Ok(())
}

fn run<T: Transport>(
    display: &mut Display<T>,
    command: &Commands,
    init: bool,
) -> Result<Option<FillReport>> {
    if init || matches!(command, Commands::Init) {
        display.init().context("Display initialization failed")?;
    } else {
        display.attach();
    }

    let report = match command {
        Commands::Init | Commands::Info | Commands::Config => None,

        Commands::On | Commands::Off => {
            let on = matches!(command, Commands::On);
            display.set_display_on(on).context("Display on/off failed")?;
            None
        }

        Commands::Fill {
            color,
            x,
            y,
            width,
            height,
        } => Some(
            display
                .fill_rect(*color, *x, *width, *y, *height)
                .context("Fill failed")?,
        ),

        Commands::Background { color } => {
            Some(display.set_background(*color).context("Background fill failed")?)
        }

        Commands::Blit { path } => {
            let geometry = display.geometry();
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read image: {}", path.display()))?;
            let framebuffer = Framebuffer::from_rgb888_bytes(geometry.width, geometry.height, &bytes)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Image is {} bytes, expected {} ({}x{} RGB888)",
                        bytes.len(),
                        geometry.pixel_count() * 3,
                        geometry.width,
                        geometry.height
                    )
                })?;

            Some(
                display
                    .blit(&framebuffer, 0, geometry.width, 0, geometry.height)
                    .context("Blit failed")?,
            )
        }
    };

    Ok(report)
}

fn print_report(command: &Commands, report: Option<FillReport>) {
    match report {
        Some(r) => println!(
            "{} {} bytes in {} tiles",
            "[OK]".green().bold(),
            r.bytes_sent,
            r.tiles
        ),
        None => {
            let what = match command {
                Commands::On => "Display on",
                Commands::Off => "Display off",
                _ => "Display initialized",
            };
            println!("{} {}", "[OK]".green().bold(), what);
        }
    }
}

fn print_info(config: &PanelConfig) {
    let geometry = config.geometry();
    let capacity_pixels = config.buffer_capacity / geometry.bytes_per_pixel() as usize;

    println!("{}", "=".repeat(60));
    println!("{}", "ILI9341 Panel".cyan().bold());
    println!("{}", "=".repeat(60));

    println!("\n{}", "Panel:".white().bold());
    println!("  Device: {}", config.device_path.display());
    println!("  Orientation: {:?}", config.orientation);
    println!("  Active size: {}x{}", geometry.width, geometry.height);
    println!("  Pixel format: RGB565 ({} bytes/pixel)", geometry.bytes_per_pixel());
    println!("  Pixel frames: {}", config.pixel_mode.frame_mode());

    println!("\n{}", "Streaming:".white().bold());
    println!(
        "  Staging buffers: 2 x {} bytes ({} pixels)",
        config.buffer_capacity, capacity_pixels
    );
    let full = geometry.pixel_count() as usize;
    println!(
        "  Full-panel fill: {} bytes, ~{} transmits",
        full * geometry.bytes_per_pixel() as usize,
        full.div_ceil(capacity_pixels.max(1))
    );

    println!("\n{}", "=".repeat(60));
}

fn print_capture(capture: &CaptureTransport, dump: usize) {
    let frames = capture.frames();
    let data_bytes = capture.payload_bytes(Mode::Data8) + capture.payload_bytes(Mode::Data16);

    println!("\n{}", "Captured frames:".white().bold());
    println!(
        "  {} frames, {} commands, {} data bytes",
        frames.len(),
        capture.commands().len(),
        data_bytes
    );

    for (i, frame) in frames.iter().take(dump).enumerate() {
        print_frame(i, frame);
    }
    if frames.len() > dump {
        println!("  {}", format!("... {} more", frames.len() - dump).dimmed());
    }
}

fn print_frame(index: usize, frame: &Frame) {
    let label = match frame.mode {
        Mode::Command => format!("{}", frame.mode).yellow().bold(),
        _ => format!("{}", frame.mode).cyan(),
    };
    println!("\n  #{} {} ({} bytes)", index, label, frame.payload.len());
    hexdump::hexdump(&frame.to_bytes());
}
