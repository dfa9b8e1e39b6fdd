use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use mirror_capture::capture::{FramePattern, SyntheticSource};
use mirror_capture::{CaptureConfig, CaptureSession, Region};

/// Demo driver for the capture pipeline against a synthetic mirrored
/// display: one JPEG snapshot by default, or a rate-limited stream of
/// JSON records with --stream.
#[derive(Parser, Debug)]
#[command(name = "mcap")]
#[command(about = "Capture frames from a mirrored display surface")]
struct Args {
    /// Output JPEG path for snapshot mode
    #[arg(default_value = "capture.jpg", help = "Snapshot output file path")]
    output: String,

    /// Run continuous capture instead of a single snapshot
    #[arg(long, help = "Stream results until the duration elapses")]
    stream: bool,

    /// Target frames per second in stream mode (0 = unthrottled)
    #[arg(short, long, default_value_t = 15,
          help = "Frames per second for stream mode; 0 disables throttling")]
    fps: u32,

    /// Stream duration (supports seconds, minutes, hours)
    #[arg(short, long, default_value = "2s",
          help = "How long to stream: 30s (30 seconds), 2m (2 minutes), 1h (1 hour)")]
    duration: String,

    /// Crop region
    #[arg(short, long, help = "Crop region as x,y,WxH (e.g. 100,50,640x360)")]
    region: Option<String>,

    /// Emit full JSON records instead of one-line summaries
    #[arg(long, help = "Print each capture result as a JSON record")]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let region = args.region.as_deref().map(parse_region).transpose()?;

    let source = Arc::new(
        SyntheticSource::new(1280, 720)
            .with_row_padding(32)
            .with_pattern(FramePattern::Gradient),
    );
    let session = CaptureSession::new(source);

    if args.stream {
        let duration = parse_duration(&args.duration)?;
        let config = CaptureConfig::new().with_fps(args.fps);
        let config = match region {
            Some(region) => config.with_region(region),
            None => config,
        };

        let mut results = session.start(config).await?;
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                result = results.recv() => match result {
                    Some(result) if args.json => println!("{}", result.to_json()),
                    Some(result) => println!(
                        "frame {}: {}x{} at t={} ({} JPEG bytes, {} YUV bytes)",
                        result.queue,
                        result.width,
                        result.height,
                        result.time,
                        result.bytes.len(),
                        result.planar_yuv.len()
                    ),
                    None => break,
                },
            }
        }
        session.stop().await;
    } else {
        let result = session.take_capture(region).await?;
        std::fs::write(&args.output, &result.bytes)?;
        if args.json {
            println!("{}", result.to_json());
        } else {
            println!(
                "Saved {} ({}x{}, seq {})",
                args.output, result.width, result.height, result.queue
            );
        }
    }

    Ok(())
}

/// Parse a stream duration: a bare number of seconds, or a number with an
/// s/m/h suffix.
fn parse_duration(spec: &str) -> Result<Duration> {
    let spec = spec.trim();
    if let Ok(seconds) = spec.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let (value, unit) = spec.split_at(spec.len().saturating_sub(1));
    let value: u64 = value
        .parse()
        .map_err(|_| anyhow::anyhow!("unparseable duration '{}'", spec))?;
    let seconds = match unit {
        "s" => value,
        "m" => value * 60,
        "h" => value * 3600,
        _ => return Err(anyhow::anyhow!("unknown duration unit in '{}'", spec)),
    };
    Ok(Duration::from_secs(seconds))
}

/// Parse a crop region string like "100,50,640x360" into a Region
fn parse_region(spec: &str) -> Result<Region> {
    let parts: Vec<&str> = spec.split(',').collect();
    if parts.len() != 3 {
        return Err(anyhow::anyhow!(
            "Invalid region format: {}. Expected x,y,WxH (e.g. 100,50,640x360)",
            spec
        ));
    }

    let x: u32 = parts[0]
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid region x: {}", parts[0]))?;
    let y: u32 = parts[1]
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid region y: {}", parts[1]))?;

    let (w_str, h_str) = parts[2]
        .trim()
        .split_once('x')
        .ok_or_else(|| anyhow::anyhow!("Invalid region size: {}. Expected WxH", parts[2]))?;
    let width: u32 = w_str
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid region width: {}", w_str))?;
    let height: u32 = h_str
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid region height: {}", h_str))?;

    Ok(Region::new(x, y, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_forms() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("s").is_err());
    }

    #[test]
    fn test_parse_region_forms() {
        let region = parse_region("100,50,640x360").unwrap();
        assert_eq!(region, Region::new(100, 50, 640, 360));
        assert!(parse_region("100,50").is_err());
        assert!(parse_region("100,50,640").is_err());
        assert!(parse_region("a,b,cxd").is_err());
    }
}
