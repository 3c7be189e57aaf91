use anyhow::{Context, Result};
use census_scatter::{
    Chart, ChartConfig, DataSource, FieldSelection, ScheduledChange, SelectionController,
    Timeline,
};
use census_scatter::{loader, stats, storage, viz};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "census-scatter",
    version,
    about = "Draw and animate census scatterplots"
)]
struct Cli {
    /// Chart configuration (JSON). Defaults to <config_dir>/census-scatter/config.json when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw the chart once, settled or at a given time, to .svg or .png.
    Render(RenderArgs),
    /// Play scheduled field changes and write the frames as SVGs or a GIF.
    Animate(AnimateArgs),
    /// Print count, missing cells, min and max for every value column.
    Fields(FieldsArgs),
    /// Write the settled mark geometry as .csv or .json.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct DataArgs {
    /// CSV file path or http(s) URL.
    #[arg(short, long)]
    data: DataSource,
    /// Field plotted on the x axis (overrides the config).
    #[arg(short = 'x', long)]
    x_field: Option<String>,
    /// Field plotted on the y axis (overrides the config).
    #[arg(short = 'y', long)]
    y_field: Option<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Time in ms after the first render; defaults to when every mark has settled.
    #[arg(long)]
    at: Option<f64>,
    /// Output path (.svg or .png).
    #[arg(long)]
    out: PathBuf,
    /// TrueType font for PNG labels.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("output").required(true).args(["out_dir", "gif"])))]
struct AnimateArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Field change as AT_MS:AXIS=FIELD, e.g. 2000:x=Females. Repeatable.
    #[arg(long = "change")]
    changes: Vec<ScheduledChange>,
    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,
    /// Directory for numbered SVG frames.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Animated GIF output (needs --font).
    #[arg(long)]
    gif: Option<PathBuf>,
    /// TrueType font for GIF labels.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FieldsArgs {
    /// CSV file path or http(s) URL.
    #[arg(short, long)]
    data: DataSource,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Output path (.csv or .json).
    #[arg(long)]
    out: PathBuf,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = ChartConfig::load(cli.config.as_deref()).context("loading configuration")?;
    match cli.cmd {
        Command::Render(args) => cmd_render(cfg, args),
        Command::Animate(args) => cmd_animate(cfg, args),
        Command::Fields(args) => cmd_fields(cfg, args),
        Command::Export(args) => cmd_export(cfg, args),
    }
}

/// Load the dataset and perform the first render at t = 0.
fn open_chart(cfg: ChartConfig, args: &DataArgs) -> Result<(Chart, FieldSelection)> {
    let mut selection = cfg.initial_selection();
    if let Some(x) = &args.x_field {
        selection.x_field = x.clone();
    }
    if let Some(y) = &args.y_field {
        selection.y_field = y.clone();
    }
    let data = loader::load(&args.data, &cfg.load_options())
        .with_context(|| format!("loading {}", args.data))?;
    let mut chart = Chart::new(data, cfg)?;
    let outcome = chart.render(&selection, 0.0)?;
    if outcome.excluded > 0 {
        eprintln!(
            "{} record(s) without a value for {} or {} were left out",
            outcome.excluded, selection.x_field, selection.y_field
        );
    }
    Ok((chart, selection))
}

fn register_font(font: Option<&Path>) -> Result<()> {
    if let Some(path) = font {
        viz::register_font_file(path)?;
    }
    Ok(())
}

fn cmd_render(cfg: ChartConfig, args: RenderArgs) -> Result<()> {
    register_font(args.font.as_deref())?;
    let (chart, _) = open_chart(cfg, &args.data)?;
    let t = args.at.unwrap_or_else(|| chart.settled_at());
    let frame = chart.frame(t);
    viz::save_frame(&frame, &args.out)?;
    eprintln!(
        "Wrote {} marks at t={}ms to {}",
        frame.marks.len(),
        t,
        args.out.display()
    );
    Ok(())
}

fn cmd_animate(cfg: ChartConfig, args: AnimateArgs) -> Result<()> {
    register_font(args.font.as_deref())?;
    let (mut chart, selection) = open_chart(cfg, &args.data)?;
    let mut controller = SelectionController::for_dataset(selection.clone(), chart.dataset());
    let timeline = Timeline::new(args.fps, args.changes);
    let frames = timeline.run(&mut chart, &mut controller, &selection)?;

    if let Some(dir) = args.out_dir.as_ref() {
        let written = viz::write_svg_frames(&frames, dir)?;
        eprintln!("Wrote {} frames to {}", written.len(), dir.display());
    }
    if let Some(gif) = args.gif.as_ref() {
        let delay = timeline.frame_interval_ms().round() as u32;
        viz::write_gif(&frames, gif, delay)?;
        eprintln!("Wrote {} frames to {}", frames.len(), gif.display());
    }
    Ok(())
}

fn cmd_fields(cfg: ChartConfig, args: FieldsArgs) -> Result<()> {
    let data = loader::load(&args.data, &cfg.load_options())
        .with_context(|| format!("loading {}", args.data))?;
    println!(
        "{} records, {} states",
        data.len(),
        data.distinct_states().len()
    );
    for s in stats::field_summaries(&data) {
        println!(
            "{}  count={} missing={}  min={} max={}",
            s.field,
            s.count,
            s.missing,
            fmt_opt(s.min),
            fmt_opt(s.max)
        );
    }
    Ok(())
}

fn cmd_export(cfg: ChartConfig, args: ExportArgs) -> Result<()> {
    let (chart, _) = open_chart(cfg, &args.data)?;
    let frame = chart.frame(chart.settled_at());
    let ext = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => storage::save_marks_csv(&frame, &args.out)?,
        "json" => storage::save_frame_json(&frame, &args.out)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} marks to {}", frame.marks.len(), args.out.display());
    Ok(())
}
