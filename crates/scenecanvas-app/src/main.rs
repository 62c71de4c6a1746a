//! Main application entry point (native).
//!
//! Usage: `scenecanvas <script.json> [--out DIR] [--config FILE]`

use scenecanvas_app::{Replay, Script};
use scenecanvas_core::{EditorConfig, FileStorage};
use std::path::PathBuf;
use std::process::ExitCode;

struct Args {
    script: PathBuf,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut script = None;
    let mut out = None;
    let mut config = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => out = Some(args.next().ok_or("--out needs a directory")?.into()),
            "--config" => config = Some(args.next().ok_or("--config needs a file")?.into()),
            flag if flag.starts_with("--") => return Err(format!("Unknown option {}", flag)),
            _ if script.is_none() => script = Some(PathBuf::from(arg)),
            _ => return Err(format!("Unexpected argument {}", arg)),
        }
    }

    Ok(Args {
        script: script.ok_or("Missing script path")?,
        out,
        config,
    })
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let script = Script::load(&args.script)?;

    let mut replay = Replay::for_script(&script, config);
    replay.run(&script);

    let editor = replay.editor();
    log::info!(
        "Replay finished: {} elements, {} host events, {} frames",
        editor.elements().len(),
        replay.events().len(),
        editor.surface().frames()
    );

    let storage = match args.out {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    pollster::block_on(replay.save(&storage, &script.key))?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Scene Canvas replay");

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            log::error!("{}", message);
            eprintln!("{}\nUsage: scenecanvas <script.json> [--out DIR] [--config FILE]", message);
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Replay failed: {}", e);
            eprintln!("Replay failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["room.json", "--out", "drawings", "--config", "tuning.json"]).unwrap();
        assert_eq!(parsed.script, PathBuf::from("room.json"));
        assert_eq!(parsed.out, Some(PathBuf::from("drawings")));
        assert_eq!(parsed.config, Some(PathBuf::from("tuning.json")));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["room.json", "--out"]).is_err());
        assert!(args(&["room.json", "--verbose"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn test_run_saves_document() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        std::fs::write(
            &script_path,
            r#"{"key": "study", "steps": [
                {"step": "mode", "mode": "edit"},
                {"step": "tool", "tool": "rect"},
                {"step": "start", "at": 0, "touches": [[10, 10]]},
                {"step": "move", "at": 30, "touches": [[90, 70]]},
                {"step": "end", "at": 50, "changed": [[90, 70]]}
            ]}"#,
        )
        .unwrap();
        let out = dir.path().join("out");

        run(Args {
            script: script_path,
            out: Some(out.clone()),
            config: None,
        })
        .unwrap();

        let saved = std::fs::read_to_string(out.join("study.json")).unwrap();
        assert!(saved.contains("\"type\": \"rect\""));
    }
}
