//! DetView Sample Replay CLI
//!
//! Replay a sample detection topic through the display and report what it drew.

use clap::Parser;
use detview_sim::{SampleTopic, SimConfig, SimError, SimRunner};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// DetView sample replay CLI
#[derive(Parser, Debug)]
#[command(name = "detview-sim")]
#[command(about = "Replay sample 3D detections through a DetView display", long_about = None)]
struct Args {
    /// Seed for random scores and labels (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,
    
    /// Topic to replay (bounding_box, detection, array)
    #[arg(short, long, default_value = "array")]
    topic: String,
    
    /// Number of messages to publish
    #[arg(short, long, default_value = "20")]
    frames: u64,
    
    /// Render wireframes instead of solid boxes
    #[arg(long)]
    edge_only: bool,
    
    /// Wireframe width in meters
    #[arg(long)]
    line_width: Option<f32>,
    
    /// Opacity of boxes and wireframes
    #[arg(long)]
    alpha: Option<f32>,
    
    /// Show score labels above each box
    #[arg(long)]
    show_score: bool,
    
    /// Fixed frame of the display (map, odom, base_link)
    #[arg(long, default_value = "map")]
    fixed_frame: String,
    
    /// Frame the samples are stamped in
    #[arg(long, default_value = "map")]
    source_frame: String,
    
    /// Saved display config (JSON) to load before replaying
    #[arg(long)]
    config: Option<String>,
    
    /// Flip wireframe mode every N messages
    #[arg(long)]
    toggle_every: Option<u64>,
    
    /// Export frames to a JSON file
    #[arg(long)]
    export: Option<String>,
    
    /// Stream the replay to a Rerun viewer
    #[cfg(feature = "visualization")]
    #[arg(long)]
    rerun: bool,
    
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
    
    /// JSON output for scripting
    #[arg(long)]
    json: bool,
}

fn build_config(args: &Args) -> Result<SimConfig, SimError> {
    let topic: SampleTopic = args
        .topic
        .parse()
        .map_err(SimError::InvalidArgument)?;
    
    let config_blob = match &args.config {
        Some(path) => Some(serde_json::from_str(&std::fs::read_to_string(path)?)?),
        None => None,
    };
    
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };
    
    Ok(SimConfig {
        seed,
        topic,
        frames: args.frames,
        fixed_frame: args.fixed_frame.clone(),
        source_frame: args.source_frame.clone(),
        edge_only: args.edge_only,
        line_width: args.line_width,
        alpha: args.alpha,
        show_score: args.show_score,
        config_blob,
        toggle_every: args.toggle_every,
        export: args.export.is_some(),
    })
}

fn main() {
    let args = Args::parse();
    
    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
    
    if !args.json {
        info!("DetView Sample Replay v0.1.0");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
    
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Available topics: bounding_box, detection, array");
            std::process::exit(1);
        }
    };
    
    let runner = SimRunner::new(config);
    
    #[cfg(feature = "visualization")]
    let result = if args.rerun {
        runner.run_rerun("detview_sim")
    } else {
        runner.run()
    };
    #[cfg(not(feature = "visualization"))]
    let result = runner.run();
    
    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!("Replay failed: {}", e);
            std::process::exit(1);
        }
    };
    
    if let (Some(path), Some(export)) = (&args.export, &summary.export) {
        match export.write_to_file(path) {
            Ok(()) => info!("Exported {} frames to {}", export.frames.len(), path),
            Err(e) => error!("Failed to write export: {:?}", e),
        }
    }
    
    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!(
            "{} (seed={}): {} frames, {} detections, {} mode toggles",
            summary.topic, summary.seed, summary.frames, summary.detections, summary.toggles
        );
        if summary.transform_errors > 0 {
            error!("❌ {} render passes failed to resolve frames", summary.transform_errors);
        } else {
            info!("✅ All render passes resolved into '{}'", runner.config().fixed_frame);
        }
    }
    
    if summary.transform_errors > 0 {
        std::process::exit(1);
    }
}
