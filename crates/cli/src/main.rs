use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{select, Receiver};

use moodcam_core::camera::infrastructure::directory_camera::DirectoryCamera;
use moodcam_core::detection::infrastructure::replay_face_detector::ReplayFaceDetector;
use moodcam_core::detection::infrastructure::threaded_detector::ThreadedDetector;
use moodcam_core::pipeline::capture_scheduler::CaptureScheduler;
use moodcam_core::pipeline::frame_pipeline::FramePipeline;
use moodcam_core::pipeline::infrastructure::channel_result_sink::ChannelResultSink;
use moodcam_core::pipeline::infrastructure::fan_out_result_sink::FanOutResultSink;
use moodcam_core::pipeline::infrastructure::logging_result_sink::LoggingResultSink;
use moodcam_core::pipeline::infrastructure::threaded_pipeline_runtime::ThreadedPipelineRuntime;
use moodcam_core::pipeline::pipeline_config::{ConfigError, PipelineConfig};
use moodcam_core::pipeline::pipeline_controller::PipelineParts;
use moodcam_core::pipeline::pipeline_logger::SummaryPipelineLogger;
use moodcam_core::shared::camera_selector::CameraSelector;

/// Periodic face capture with emotion labelling, played from still-image folders.
#[derive(Parser)]
#[command(name = "moodcam")]
struct Cli {
    /// Directory holding `front/` and `back/` folders of still images.
    frames_dir: PathBuf,

    /// JSON script of detector results, replayed one entry per capture.
    #[arg(long)]
    detections: PathBuf,

    /// JSON pipeline config. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Milliseconds between still captures.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Camera to open first: front or back.
    #[arg(long)]
    camera: Option<CameraSelector>,

    /// Capture width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Capture height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Stop after this many seconds.
    #[arg(long)]
    duration_secs: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Toggle,
    Quit,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let config = load_config(&cli)?;

    let detector = ReplayFaceDetector::from_json_file(&cli.detections, config.detector)?;
    let (channel_sink, results) = ChannelResultSink::new();
    let sink = FanOutResultSink::new(vec![Box::new(channel_sink), Box::new(LoggingResultSink)]);
    let parts = PipelineParts {
        camera: Box::new(DirectoryCamera::new(&cli.frames_dir)),
        detector: Box::new(ThreadedDetector::spawn(Box::new(detector))),
        frames: FramePipeline::default(),
        scheduler: Box::new(CaptureScheduler::new()),
        sink: Box::new(sink),
        logger: Box::new(SummaryPipelineLogger::default()),
    };

    eprintln!("Commands: t = toggle camera, q = quit");
    let handle = ThreadedPipelineRuntime::spawn(config, parts)?;
    let controls = handle.controls();
    let commands = spawn_stdin_reader();
    let deadline = cli
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let timeout = deadline
        .map(crossbeam_channel::at)
        .unwrap_or_else(crossbeam_channel::never);
    let closed_stdin = crossbeam_channel::never();
    let mut stdin_open = true;

    loop {
        let command_rx = if stdin_open { &commands } else { &closed_stdin };
        select! {
            recv(results) -> msg => match msg {
                Ok(result) => println!("{}\n", LoggingResultSink::format(&result)),
                Err(_) => break,
            },
            recv(command_rx) -> msg => match msg {
                Ok(Command::Toggle) => {
                    controls.toggle_camera();
                }
                Ok(Command::Quit) => break,
                // Without a time limit, end of input ends the run.
                Err(_) if deadline.is_none() => break,
                Err(_) => stdin_open = false,
            },
            recv(timeout) -> _ => break,
        }
    }

    handle.shutdown();
    for result in results.try_iter() {
        println!("{}\n", LoggingResultSink::format(&result));
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<PipelineConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(ms) = cli.interval_ms {
        config.capture_interval_ms = ms;
    }
    if let Some(camera) = cli.camera {
        config.initial_camera = camera;
    }
    if let Some(width) = cli.width {
        config.capture_width = width;
    }
    if let Some(height) = cli.height {
        config.capture_height = height;
    }
    config.validate()?;
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.frames_dir.is_dir() {
        return Err(format!(
            "Frames directory not found: {}",
            cli.frames_dir.display()
        )
        .into());
    }
    if !cli.detections.is_file() {
        return Err(format!(
            "Detection script not found: {}",
            cli.detections.display()
        )
        .into());
    }
    if cli.duration_secs == Some(0) {
        return Err("Duration must be at least 1 second".into());
    }
    Ok(())
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "t" | "toggle" => Some(Command::Toggle),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

/// Forwards stdin commands. The channel disconnects at end of input.
fn spawn_stdin_reader() -> Receiver<Command> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let spawned = thread::Builder::new()
        .name("stdin-commands".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    None => eprintln!("Unknown command '{}' (t = toggle, q = quit)", line.trim()),
                }
            }
        });
    if let Err(e) = spawned {
        log::warn!("Could not read commands from stdin: {e}");
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "moodcam",
            "frames",
            "--detections",
            "script.json",
            "--interval-ms",
            "250",
            "--camera",
            "back",
            "--width",
            "320",
            "--height",
            "240",
        ]);
        let config = load_config(&cli).unwrap();

        assert_eq!(config.capture_interval_ms, 250);
        assert_eq!(config.initial_camera, CameraSelector::Back);
        assert_eq!((config.capture_width, config.capture_height), (320, 240));
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = parse(&["moodcam", "frames", "--detections", "script.json"]);
        assert_eq!(load_config(&cli).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_zero_interval_flag_is_rejected() {
        let cli = parse(&[
            "moodcam",
            "frames",
            "--detections",
            "script.json",
            "--interval-ms",
            "0",
        ]);
        assert!(matches!(load_config(&cli), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_camera_is_a_parse_error() {
        let parsed = Cli::try_parse_from([
            "moodcam",
            "frames",
            "--detections",
            "s.json",
            "--camera",
            "side",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_command("t"), Some(Command::Toggle));
        assert_eq!(parse_command(" toggle "), Some(Command::Toggle));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("snap"), None);
    }
}
