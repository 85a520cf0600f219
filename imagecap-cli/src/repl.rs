use std::path::PathBuf;
use std::sync::Arc;

use imagecap_core::error::ViewError;
use imagecap_engine::view::CaptionView;
use imagecap_platform::picker::read_file_input;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::render;

pub const HELP: &str = "\
commands:
  open <path>   select an image (previews it, clears the caption)
  open          dismiss the picker without choosing
  caption       upload the image and generate a caption (runs in background)
  copy          copy the caption to the clipboard
  clear         reset everything
  show          print the current state
  help          print this help
  quit          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(Option<PathBuf>),
    Caption,
    Copy,
    Clear,
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "open" | "o" => Command::Open((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "caption" | "generate" | "g" => Command::Caption,
        "copy" | "c" => Command::Copy,
        "clear" => Command::Clear,
        "show" | "s" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(cmd))
}

pub async fn run(view: Arc<CaptionView>) -> anyhow::Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        match cmd {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Show => print!("{}", render(&view.snapshot())),
            Command::Open(path) => {
                let input = match path {
                    Some(path) => match read_file_input(&path) {
                        Ok(input) => Some(input),
                        Err(e) => {
                            println!("could not read {}: {e:#}", path.display());
                            continue;
                        }
                    },
                    None => None,
                };
                let _ = view.select_file(input);
                print!("{}", render(&view.snapshot()));
            }
            Command::Caption => {
                let view = view.clone();
                tokio::spawn(async move {
                    match view.generate_caption().await {
                        Err(ViewError::Busy) => println!("a caption is already being generated"),
                        Err(ViewError::Cancelled | ViewError::TornDown) => {}
                        _ => print!("{}", render(&view.snapshot())),
                    }
                });
                println!("Generating...");
            }
            Command::Copy => match view.copy_caption().await {
                Ok(true) => println!("caption copied"),
                Ok(false) => println!("nothing to copy"),
                Err(_) => print!("{}", render(&view.snapshot())),
            },
            Command::Clear => {
                view.clear_all()?;
                print!("{}", render(&view.snapshot()));
            }
        }
    }

    view.teardown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(
            parse_command("open ~/Pictures/my cat.png").unwrap(),
            Some(Command::Open(Some(PathBuf::from("~/Pictures/my cat.png"))))
        );
        assert_eq!(parse_command("open").unwrap(), Some(Command::Open(None)));
        assert_eq!(parse_command("  G ").unwrap(), Some(Command::Caption));
        assert_eq!(parse_command("copy").unwrap(), Some(Command::Copy));
        assert_eq!(parse_command("exit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_command("").unwrap(), None);
    }

    #[test]
    fn unknown_command_is_reported() {
        let err = parse_command("upload x.png").unwrap_err();
        assert!(err.contains("unknown command: upload"));
    }
}
