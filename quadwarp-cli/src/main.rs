use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;

use quadwarp::settings::WarpSettings;
use quadwarp::{solve, Homography, Point2, Quad, Rect};

/// Quad warp CLI: solve keystone homographies and print GL-ready matrices
#[derive(Parser)]
#[command(name = "quadwarp", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the target-to-source transform instead
    #[arg(long, global = true)]
    inverse: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Solve from corner points given on the command line
    Solve {
        /// Source corners "x,y" in TL TR BR BL order
        #[arg(
            long,
            num_args = 4,
            value_parser = parse_point,
            allow_hyphen_values = true,
            required_unless_present = "src_rect"
        )]
        src: Vec<Point2>,
        /// Source rectangle "x,y,width,height"
        #[arg(long, value_parser = parse_rect, allow_hyphen_values = true, conflicts_with = "src")]
        src_rect: Option<Rect>,
        /// Target corners "x,y" in TL TR BR BL order
        #[arg(
            long,
            num_args = 4,
            value_parser = parse_point,
            allow_hyphen_values = true,
            required_unless_present = "dst_rect"
        )]
        dst: Vec<Point2>,
        /// Target rectangle "x,y,width,height"
        #[arg(long, value_parser = parse_rect, allow_hyphen_values = true, conflicts_with = "dst")]
        dst_rect: Option<Rect>,
    },
    /// Solve from a saved TOML settings file
    Show {
        /// Path to the settings file
        #[arg(long)]
        settings: String,
    },
}

#[derive(Serialize)]
struct Output {
    /// Row-major 3x3, normalized so the last entry is 1
    homography: [f64; 9],
    /// Column-major 4x4
    matrix: [f64; 16],
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{v}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected {N} comma-separated numbers, got {}", v.len()))
}

fn parse_point(s: &str) -> Result<Point2, String> {
    let [x, y] = parse_numbers::<2>(s)?;
    Ok(Point2::new(x, y))
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let [x, y, width, height] = parse_numbers::<4>(s)?;
    Ok(Rect::new(x, y, width, height))
}

fn quad_from(points: &[Point2], rect: Option<Rect>, what: &str) -> Result<Quad> {
    match rect {
        Some(r) => Ok(Quad::from_rect(&r)),
        None if points.is_empty() => bail!("either --{what} or --{what}-rect is required"),
        None => Quad::from_points(points).with_context(|| format!("invalid --{what} points")),
    }
}

fn load_settings(path: &str) -> Result<(Quad, Quad)> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read settings: {path}"))?;
    let settings = WarpSettings::from_toml_str(&text)
        .with_context(|| format!("failed to parse settings: {path}"))?;
    Ok((Quad::new(settings.src), Quad::new(settings.dst)))
}

fn output_for(h: &Homography) -> Output {
    Output {
        homography: h.as_row_major(),
        matrix: h.to_column_major_4x4().data,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let (src, dst) = match &cli.command {
        Command::Solve {
            src,
            src_rect,
            dst,
            dst_rect,
        } => (
            quad_from(src, *src_rect, "src")?,
            quad_from(dst, *dst_rect, "dst")?,
        ),
        Command::Show { settings } => load_settings(settings)?,
    };
    debug!("src={src:?} dst={dst:?} inverse={}", cli.inverse);

    let (from, to) = if cli.inverse { (&dst, &src) } else { (&src, &dst) };
    let h = solve(from, to).context("failed to solve homography")?;

    let result = output_for(&h);
    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");

    Ok(())
}
