use clap::Parser;
use cloth_layout::render::AsciiRenderer;
use cloth_layout::types::{Batch, Demand, Rect};
use cloth_layout::{ArticleOutcome, LayoutPlanner, Material, MaterialRequirement, StockSnapshot};

#[derive(Parser)]
#[command(
    name = "cloth_layout",
    about = "Estimate cloth roll usage for an order and pick a stocked batch"
)]
struct Cli {
    /// Cloth article number
    #[arg(long, default_value_t = 1)]
    article: u32,

    /// Roll width in centimeters
    #[arg(long)]
    roll_width: u32,

    /// Cut pieces as LxW:qty in centimeters (e.g. 80x60:3 40x30:5)
    #[arg(long = "cuts", num_args = 1..)]
    cuts: Vec<String>,

    /// Stocked batches as number:meters (e.g. 1:5.0 2:12.5)
    #[arg(long = "batches", num_args = 0..)]
    batches: Vec<String>,

    /// Show ASCII layout of the roll
    #[arg(long)]
    layout: bool,

    /// Log packing progress to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn parse_dimensions(s: &str) -> Result<Rect, String> {
    let (length, width) = s
        .split_once('x')
        .ok_or_else(|| format!("invalid dimensions '{}', expected LxW", s))?;
    let length = length
        .parse::<u32>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let width = width
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    if length == 0 || width == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok(Rect::new(length, width))
}

fn parse_cut(s: &str) -> Result<Demand, String> {
    let (dims, qty) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid cut '{}', expected LxW:qty", s))?;
    let rect = parse_dimensions(dims)?;
    let qty = qty
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    if qty == 0 {
        return Err(format!("quantity must be non-zero in '{}'", s));
    }
    Ok(Demand::new(rect, qty))
}

fn parse_batch(s: &str) -> Result<Batch, String> {
    let (number, length) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid batch '{}', expected number:meters", s))?;
    let number = number
        .parse::<u32>()
        .map_err(|_| format!("invalid batch number in '{}'", s))?;
    let length = length
        .parse::<f64>()
        .ok()
        .filter(|l| l.is_finite() && *l >= 0.0)
        .ok_or_else(|| format!("invalid length in '{}'", s))?;
    Ok(Batch::new(number, length))
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    if cli.roll_width == 0 {
        fail("roll width must be non-zero");
    }

    let demands: Vec<Demand> = cli
        .cuts
        .iter()
        .map(|c| parse_cut(c))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| fail(e));

    let batches: Vec<Batch> = cli
        .batches
        .iter()
        .map(|b| parse_batch(b))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| fail(e));

    let stock = StockSnapshot::from_materials([Material {
        article: cli.article,
        roll_width: cli.roll_width,
        batches,
        patches: Vec::new(),
    }])
    .unwrap_or_else(|e| fail(e));

    let renderer = AsciiRenderer;
    let mut planner = LayoutPlanner::new(&stock);
    if cli.layout {
        planner = planner.with_renderer(&renderer);
    }
    let plan = planner.plan(&[MaterialRequirement {
        article: cli.article,
        pieces: demands,
    }]);

    for outcome in &plan.outcomes {
        let result = match outcome {
            ArticleOutcome::Packed(result) => result,
            ArticleOutcome::Failed { error, .. } => fail(error),
        };
        println!("Article {}:", result.article);
        for p in &result.layout.placements {
            let rot = if p.rotated { " [rotated]" } else { "" };
            println!("  {} @ ({}, {}){}", p.rect, p.x, p.y, rot);
        }
        if let Some(map) = &result.map {
            print!("{}", map);
        }
        println!();
        println!(
            "Summary: {:.2} m used, {:.1}% waste, {}",
            result.used_length,
            result.layout.waste_percent(),
            match result.allocation.batch_number() {
                Some(n) => format!("batch {}", n),
                None if result.allocation.is_satisfied() => "no batch needed".to_string(),
                None => "insufficient stock".to_string(),
            }
        );
    }

    if !plan.is_satisfied() {
        std::process::exit(2);
    }
}
