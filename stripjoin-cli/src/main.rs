use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stripjoin::image::io::{load_oriented, save_jpeg, DEFAULT_JPEG_QUALITY};
use stripjoin::{
    block_edge_distance, find_optimal_seam, stitch, ColorModel, Comparison, FileSource,
    JoinSpec, Orientation, Overlap, RowComparator, SeamSearch, Sequencer, SequencerConfig,
    StitchedRun, StripJoinResult, Tolerance,
};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Reassemble photographs sliced into strips")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Enable tracing output.
    #[arg(long, global = true)]
    trace: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stitch the given fragments, in order, into one image.
    Join(JoinArgs),
    /// Group the fragments of a directory into runs and stitch each run.
    Assemble(AssembleArgs),
    /// Find how many leading rows of the bottom fragment repeat the top one.
    Seam(SeamArgs),
    /// Score the seam between two fragments.
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
struct JoinArgs {
    /// Fragments in stacking order.
    #[arg(required = true, num_args = 2..)]
    files: Vec<PathBuf>,
    /// Output JPEG path.
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
    /// Join left to right instead of top to bottom.
    #[arg(long)]
    horizontal: bool,
    /// Pixels each fragment is drawn back over its predecessor.
    #[arg(long, default_value_t = 0)]
    overlap: usize,
    /// Pixels clipped from the head of each later fragment.
    #[arg(long, default_value_t = 0)]
    reverse_overlap: usize,
    /// Shift across the seam for every fragment after the first.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,
    /// Fill pixels between fragments.
    #[arg(long, default_value_t = 0)]
    spacing: usize,
    /// Center fragments of different widths.
    #[arg(long)]
    force: bool,
    /// Trim repeated rows, searching this fraction of each later fragment.
    #[arg(long, value_name = "FRACTION")]
    trim: Option<f32>,
    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    quality: u8,
}

#[derive(Args, Debug)]
struct AssembleArgs {
    /// Directory of fragments, processed in file name order.
    #[arg(required_unless_present = "print_example")]
    dir: Option<PathBuf>,
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Stitch fixed groups of this many fragments without comparing them.
    #[arg(long, value_name = "N")]
    pieces: Option<usize>,
    /// Directory for stitched output (defaults to the input directory).
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
}

#[derive(Args, Debug)]
struct SeamArgs {
    top: PathBuf,
    bottom: PathBuf,
    /// Fraction of the bottom fragment to search.
    #[arg(long, default_value_t = 0.5)]
    fraction: f32,
    /// Center rows of different widths.
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug)]
struct CompareArgs {
    top: PathBuf,
    bottom: PathBuf,
    /// Column shift applied to the bottom fragment.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,
    /// Channel selection in the legacy bit layout (decimal or 0x hex).
    #[arg(long, value_name = "BITS")]
    channels: Option<String>,
    /// Compare block averages of this size instead of whole rows.
    #[arg(long, value_name = "N")]
    block: Option<usize>,
    /// Center rows of different widths.
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ComparisonConfig {
    Row,
    Block,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OrientationConfig {
    Vertical,
    Horizontal,
}

impl From<OrientationConfig> for Orientation {
    fn from(value: OrientationConfig) -> Self {
        match value {
            OrientationConfig::Vertical => Orientation::Vertical,
            OrientationConfig::Horizontal => Orientation::Horizontal,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct JoinConfigJson {
    orientation: OrientationConfig,
    overlap: usize,
    reverse_overlap: usize,
    offset: i64,
    spacing: usize,
    fill: [u8; 3],
    force: bool,
    trim: Option<f32>,
}

impl Default for JoinConfigJson {
    fn default() -> Self {
        let spec = JoinSpec::default();
        Self {
            orientation: OrientationConfig::Vertical,
            overlap: spec.overlap.forward,
            reverse_overlap: spec.overlap.reverse,
            offset: spec.offset,
            spacing: spec.spacing,
            fill: spec.fill,
            force: spec.force,
            trim: None,
        }
    }
}

impl From<JoinConfigJson> for JoinSpec {
    fn from(value: JoinConfigJson) -> Self {
        let spec = JoinSpec::default()
            .with_orientation(value.orientation.into())
            .with_overlap(Overlap {
                forward: value.overlap,
                reverse: value.reverse_overlap,
            })
            .with_offset(value.offset)
            .with_spacing(value.spacing)
            .with_fill(value.fill)
            .with_force(value.force);
        match value.trim {
            Some(fraction) => spec.with_seam_search(SeamSearch::default().with_fraction(fraction)),
            None => spec,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    comparison: ComparisonConfig,
    channels: u32,
    force: bool,
    block_size: usize,
    tolerance: Option<f64>,
    jpeg_quality: u8,
    join: JoinConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            comparison: ComparisonConfig::Row,
            channels: ColorModel::RGB.legacy_bits(),
            force: false,
            block_size: 3,
            tolerance: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            join: JoinConfigJson::default(),
        }
    }
}

impl Config {
    fn sequencer_config(self) -> Result<SequencerConfig, Box<dyn std::error::Error>> {
        let model = ColorModel::from_legacy_bits(self.channels)?;
        // Either flag enables force-fit for both comparison and stitching.
        let force = self.force || self.join.force;
        let comparison = match self.comparison {
            ComparisonConfig::Row => Comparison::Row { model, force },
            ComparisonConfig::Block => Comparison::Block {
                block_size: self.block_size,
                model,
            },
        };
        let mut config = SequencerConfig::default()
            .with_comparison(comparison)
            .with_join(JoinSpec::from(self.join).with_force(force));
        if let Some(threshold) = self.tolerance {
            config = config.with_tolerance(Tolerance::new(threshold)?);
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct RunRecord {
    output: String,
    members: Vec<String>,
    width: usize,
    height: usize,
}

#[derive(Debug, Serialize)]
struct AssembleOutput {
    stitched: usize,
    runs: Vec<RunRecord>,
    unjoined: Vec<String>,
    skipped: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SeamOutput {
    row: usize,
    score: Option<f64>,
    skipped_duplicate: bool,
}

#[derive(Debug, Serialize)]
struct CompareOutput {
    score: Option<f64>,
    within_tolerance: bool,
    tolerance: f64,
    error: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("stripjoin=info".parse()?))
            .with_target(false)
            .init();
    }

    match cli.command {
        Command::Join(args) => run_join(args),
        Command::Assemble(args) => run_assemble(args),
        Command::Seam(args) => run_seam(args),
        Command::Compare(args) => run_compare(args),
    }
}

fn run_join(args: JoinArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pieces = args
        .files
        .iter()
        .map(load_oriented)
        .collect::<Result<Vec<_>, _>>()?;

    let orientation = if args.horizontal {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    };
    let mut spec = JoinSpec::default()
        .with_orientation(orientation)
        .with_overlap(Overlap {
            forward: args.overlap,
            reverse: args.reverse_overlap,
        })
        .with_offset(args.offset)
        .with_spacing(args.spacing)
        .with_force(args.force);
    if let Some(fraction) = args.trim {
        spec = spec.with_seam_search(SeamSearch::default().with_fraction(fraction));
    }

    let image = stitch(&pieces, &spec)?;
    save_jpeg(&image, &args.output, args.quality)?;
    let record = RunRecord {
        output: args.output.display().to_string(),
        members: args.files.iter().map(|p| p.display().to_string()).collect(),
        width: image.width(),
        height: image.height(),
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn run_assemble(args: AssembleArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }
    let dir = args.dir.ok_or("a fragment directory is required")?;
    let config: Config = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    let quality = config.jpeg_quality;
    let sequencer = Sequencer::new(config.sequencer_config()?);

    let source = FileSource::from_dir(&dir)?;
    let out_dir = args.out_dir.unwrap_or_else(|| dir.clone());
    fs::create_dir_all(&out_dir)?;

    let mut runs = Vec::new();
    let sink = |run: StitchedRun| -> StripJoinResult<()> {
        let path = output_path(&out_dir, &run);
        save_jpeg(&run.image, &path, quality)?;
        tracing::info!(output = %path.display(), members = run.members.len(), "saved run");
        runs.push(RunRecord {
            output: path.display().to_string(),
            width: run.image.width(),
            height: run.image.height(),
            members: run.members,
        });
        Ok(())
    };
    let report = match args.pieces {
        Some(pieces) => sequencer.assemble_fixed(&source, pieces, sink)?,
        None => sequencer.assemble(&source, sink)?,
    };

    let output = AssembleOutput {
        stitched: report.stitched,
        runs,
        unjoined: report.unjoined,
        skipped: report.skipped,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_seam(args: SeamArgs) -> Result<(), Box<dyn std::error::Error>> {
    let top = load_oriented(&args.top)?;
    let bottom = load_oriented(&args.bottom)?;
    let search = SeamSearch::default()
        .with_fraction(args.fraction)
        .with_force(args.force);
    let seam = find_optimal_seam(&top, &bottom, &search);
    let output = SeamOutput {
        row: seam.row,
        score: seam.score,
        skipped_duplicate: seam.skipped_duplicate,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_compare(args: CompareArgs) -> Result<(), Box<dyn std::error::Error>> {
    let top = load_oriented(&args.top)?;
    let bottom = load_oriented(&args.bottom)?;

    let (result, tolerance) = match args.block {
        Some(block_size) => {
            let model = match &args.channels {
                Some(bits) => ColorModel::from_legacy_bits(parse_bits(bits)?)?,
                None => ColorModel::HUE,
            };
            let score = block_edge_distance(&top, &bottom, block_size, model, args.offset);
            (score, Tolerance::BLOCK_LUMINANCE)
        }
        None => {
            let model = match &args.channels {
                Some(bits) => ColorModel::from_legacy_bits(parse_bits(bits)?)?,
                None => ColorModel::RGB,
            };
            let comparator = RowComparator::new(model).with_force(args.force);
            (
                comparator.edge_distance(&top, &bottom, args.offset),
                Tolerance::ROW_RGB,
            )
        }
    };

    let output = match result {
        Ok(score) => CompareOutput {
            score: Some(score),
            within_tolerance: tolerance.accepts(score),
            tolerance: tolerance.threshold(),
            error: None,
        },
        Err(err) if err.is_incomparable() => CompareOutput {
            score: None,
            within_tolerance: false,
            tolerance: tolerance.threshold(),
            error: Some(err.to_string()),
        },
        Err(err) => return Err(err.into()),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_bits(text: &str) -> Result<u32, std::num::ParseIntError> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    }
}

/// `<first>-<last>.jpg` in `dir`, with a numeric suffix when taken.
fn output_path(dir: &Path, run: &StitchedRun) -> PathBuf {
    let stem = |name: &str| {
        Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string())
    };
    let base = format!("{}-{}", stem(&run.first), stem(&run.last));
    let mut path = dir.join(format!("{base}.jpg"));
    let mut suffix = 1;
    while path.exists() {
        path = dir.join(format!("{base}-{suffix}.jpg"));
        suffix += 1;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::{output_path, parse_bits, Config};
    use stripjoin::{ColorModel, Comparison, PixelBuffer, StitchedRun, Tolerance};

    #[test]
    fn example_config_parses() {
        let config: Config = serde_json::from_str(super::EXAMPLE_JSON).unwrap();
        let seq = config.sequencer_config().unwrap();
        assert_eq!(
            seq.comparison,
            Comparison::Row {
                model: ColorModel::RGB,
                force: false
            }
        );
        assert_eq!(seq.tolerance, Tolerance::ROW_RGB);
    }

    #[test]
    fn force_flags_apply_to_comparison_and_join() {
        for json in [r#"{"force": true}"#, r#"{"join": {"force": true}}"#] {
            let config: Config = serde_json::from_str(json).unwrap();
            let seq = config.sequencer_config().unwrap();
            assert_eq!(
                seq.comparison,
                Comparison::Row {
                    model: ColorModel::RGB,
                    force: true
                },
                "{json}"
            );
            assert!(seq.join.force, "{json}");
        }
    }

    #[test]
    fn block_config_switches_tolerance() {
        let config: Config =
            serde_json::from_str(r#"{"comparison": "block", "channels": 1}"#).unwrap();
        let seq = config.sequencer_config().unwrap();
        assert_eq!(seq.tolerance, Tolerance::BLOCK_LUMINANCE);
    }

    #[test]
    fn bits_parse_in_hex_and_decimal() {
        assert_eq!(parse_bits("0x70000").unwrap(), 0x70000);
        assert_eq!(parse_bits("4").unwrap(), 4);
        assert!(parse_bits("red").is_err());
    }

    #[test]
    fn output_names_use_member_stems() {
        let run = StitchedRun {
            first: "/in/Image-259.png".to_string(),
            last: "/in/Image-262.png".to_string(),
            members: Vec::new(),
            image: PixelBuffer::filled(1, 1, [0, 0, 0]).unwrap(),
        };
        let dir = std::env::temp_dir().join("stripjoin-cli-names-test");
        let path = output_path(&dir, &run);
        assert_eq!(path.file_name().unwrap(), "Image-259-Image-262.jpg");
    }
}
