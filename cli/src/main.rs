use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre;

use ndview_core::{
    render_slice, ArraySource, ArrayStats, Colormap, Levels, NpyFile, RangeIncl, SliceNavigator,
    ViewerOptions,
};
use ndview_egui::{run_modal, ImageViewWindow};
use tracing::debug;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the shape and value statistics of an array
    Info {
        /// Path to the .npy file
        file: PathBuf,
    },
    /// Write one slice of an array as a PNG image
    Render {
        /// Path to the .npy file
        file: PathBuf,
        /// Where to write the image
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Open the interactive viewer
    Show {
        /// Path to the .npy file, asks with a file dialog if missing
        file: Option<PathBuf>,
        /// Window title, defaults to the file name
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(Args)]
struct DisplayArgs {
    /// Index of each leading dimension, e.g. `3,1`
    #[arg(short, long, value_delimiter = ',')]
    index: Vec<usize>,
    #[arg(short, long, default_value_t = Colormap::Gray)]
    colormap: Colormap,
    /// Value range mapped onto the colormap as `MIN,MAX`, the slice's own range if missing
    #[arg(short, long, value_parser = parse_levels, allow_hyphen_values = true)]
    levels: Option<RangeIncl<f64>>,
}

impl DisplayArgs {
    fn levels(&self) -> Levels {
        self.levels.map_or(Levels::Auto, Levels::Fixed)
    }
}

fn parse_levels(s: &str) -> Result<RangeIncl<f64>, String> {
    let (min, max) = s
        .split_once(',')
        .ok_or_else(|| format!("expected MIN,MAX, got {s:?}"))?;
    let min = min.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let max = max.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if min > max {
        return Err(format!("minimum {min} is larger than maximum {max}"));
    }
    Ok(RangeIncl::new(min, max))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Cli::parse();

    match args.command {
        Command::Info { file } => info(file),
        Command::Render { file, out, display } => render(file, out, &display),
        Command::Show {
            file,
            title,
            display,
        } => show(file, title, &display),
    }
}

fn info(file: PathBuf) -> color_eyre::Result<()> {
    let arr = NpyFile::new(&file).into_array()?;
    let nav = SliceNavigator::new(arr.view())?;

    println!("File:     {}", file.display());
    println!("Shape:    {:?}", nav.shape());
    println!("Leading:  {:?}", nav.leading_shape());
    match ArrayStats::new(arr.iter().copied()) {
        Some(stats) => {
            println!("Range:    {} ..= {}", stats.range.min, stats.range.max);
            println!("Mean:     {}", stats.mean);
            println!("Std dev:  {}", stats.std_dev);
            println!("Values:   {} of {}", stats.count, arr.len());
        }
        None => println!("Values:   none"),
    }
    Ok(())
}

fn render(file: PathBuf, out: PathBuf, display: &DisplayArgs) -> color_eyre::Result<()> {
    let arr = NpyFile::new(&file).into_array()?;
    let mut nav = SliceNavigator::new(arr.view())?;
    if !display.index.is_empty() {
        nav.set_indices(&display.index)?;
    }

    let slice = nav.current_slice()?;
    let image = render_slice(&slice, &display.levels(), display.colormap);
    image.write_png(&out)?;

    println!(
        "Wrote slice {} of {} to {}",
        nav.current_index_label(),
        file.display(),
        out.display()
    );
    Ok(())
}

fn show(
    file: Option<PathBuf>,
    title: Option<String>,
    display: &DisplayArgs,
) -> color_eyre::Result<()> {
    let file = match file {
        Some(file) => file,
        None => rfd::FileDialog::new()
            .add_filter("NumPy array", &["npy"])
            .pick_file()
            .ok_or_else(|| eyre::eyre!("No file selected"))?,
    };
    debug!("Opening {:?}", file);

    let title = title.unwrap_or_else(|| match file.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => file.display().to_string(),
    });
    let options = ViewerOptions::default()
        .title(title)
        .colormap(display.colormap)
        .levels(display.levels());

    let mut window = ImageViewWindow::new(NpyFile::new(&file), options)?;
    if !display.index.is_empty() {
        window.navigator_mut().set_indices(&display.index)?;
    }

    // eframe's error is not Send, so it can't be wrapped as is
    run_modal(window).map_err(|e| eyre::eyre!("{e}"))?;
    Ok(())
}
