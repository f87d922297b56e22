//! Command line flow: argument checks, the export/view menu and the closing
//! prompt.
//!
//! Input and output are passed in so the whole flow can run against
//! in-memory buffers.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::AppConfig;
use crate::constants::RAW_EXTENSION;
use crate::data::EnviLoader;
use crate::error::{EnviError, Result};
use crate::export::{BandExporter, ExportReport, export_dir_for};
use crate::viewer;

const MENU_TEXT: &str = "Please select an option by typing 1 or 2, then press enter.\n\n\
                         1: Export all bands as TIFF files.\n\
                         2: Produce a spectral radiance graph for a given pixel.\n";

/// Command line of `envi-view`.
///
/// The number of paths is not limited here; [`input_path`] checks it.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "envi-view", version)]
#[command(about = "Export the bands of an ENVI .raw image as TIFF files or plot a pixel spectrum")]
pub struct Args {
    /// ENVI image (`.raw`) with its `.hdr` header next to it
    #[arg(value_name = "IMAGE")]
    pub inputs: Vec<PathBuf>,
}

impl Args {
    /// Parse the process arguments.
    pub fn from_env() -> Result<Self> {
        Ok(Self::try_parse()?)
    }
}

/// What the user asked for after the image was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ExportBands,
    OpenViewer,
}

impl MenuChoice {
    /// Parse a menu answer (`1` or `2`, surrounding whitespace ignored).
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim() {
            "1" => Ok(MenuChoice::ExportBands),
            "2" => Ok(MenuChoice::OpenViewer),
            other => Err(EnviError::InvalidMenuChoice {
                input: other.to_string(),
            }),
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Bands were written to disk
    Exported(ExportReport),
    /// The viewer was shown and closed
    Viewed,
}

/// The single `.raw` file among the positional arguments.
pub fn input_path(inputs: &[PathBuf]) -> Result<PathBuf> {
    let path = match inputs {
        [] => return Err(EnviError::MissingInput),
        [single] => single.clone(),
        _ => return Err(EnviError::TooManyInputs { count: inputs.len() }),
    };

    if has_raw_extension(&path) {
        Ok(path)
    } else {
        Err(EnviError::WrongExtension { path })
    }
}

fn has_raw_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == RAW_EXTENSION)
}

/// Show the menu until a valid answer is given.
///
/// Invalid answers are reported and the menu is shown again; end of input
/// ends the run.
pub fn prompt_menu<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<MenuChoice> {
    loop {
        writeln!(output, "{}", MENU_TEXT)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no menu choice was entered",
            )
            .into());
        }

        match MenuChoice::parse(&line) {
            Ok(choice) => return Ok(choice),
            Err(e) => {
                log::debug!("Rejected menu input {:?}", line);
                writeln!(output, "\n{}\n", e)?;
            }
        }
    }
}

/// Print `message` and wait for Enter.
pub fn acknowledge<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
    prompt: &str,
) -> std::io::Result<()> {
    writeln!(output, "{}\n\n{}", message, prompt)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

/// Show the final message, waiting for Enter when `pause` is set.
pub fn finish<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
    prompt: &str,
    pause: bool,
) -> std::io::Result<()> {
    if pause {
        return acknowledge(input, output, message, prompt);
    }
    writeln!(output, "{}", message)?;
    output.flush()
}

/// Prompt shown after an error: input problems invite another attempt.
pub fn closing_prompt(error: &EnviError) -> &'static str {
    use clap::error::ErrorKind;

    match error {
        EnviError::Arguments(e)
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            "Press enter to close."
        }
        EnviError::MissingInput
        | EnviError::Arguments(_)
        | EnviError::TooManyInputs { .. }
        | EnviError::WrongExtension { .. }
        | EnviError::MissingHeaderSidecar { .. } => "Press enter to try again.",
        _ => "Press enter to close.",
    }
}

/// Run the whole flow for one invocation.
pub fn run<R: BufRead, W: Write>(
    args: &Args,
    config: &AppConfig,
    input: &mut R,
    output: &mut W,
) -> Result<RunOutcome> {
    let raw_path = input_path(&args.inputs)?;

    writeln!(output, "Reading image.\n")?;
    let image = EnviLoader::new().open(&raw_path)?;

    match prompt_menu(input, output)? {
        MenuChoice::ExportBands => {
            writeln!(output, "\nSaving.\n")?;
            let report = BandExporter::new(&image)?.export_to(&export_dir_for(&raw_path))?;
            Ok(RunOutcome::Exported(report))
        }
        MenuChoice::OpenViewer => {
            writeln!(output, "\nOpening graph.")?;
            output.flush()?;
            let spectral = image.spectral()?;
            let (_, cube) = image.into_parts();
            viewer::run_viewer(cube, spectral, &config.viewer)?;
            Ok(RunOutcome::Viewed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn args(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_args_collect_every_path() {
        let args = Args::try_parse_from(["envi-view", "a.raw", "b c.raw"]).expect("parse");
        assert_eq!(args.inputs, vec![PathBuf::from("a.raw"), PathBuf::from("b c.raw")]);

        let args = Args::try_parse_from(["envi-view"]).expect("no paths is still parseable");
        assert!(matches!(input_path(&args.inputs), Err(EnviError::MissingInput)));
    }

    #[test]
    fn test_bad_flags_invite_retry() {
        let err = EnviError::from(
            Args::try_parse_from(["envi-view", "--bogus"]).expect_err("unknown flag"),
        );
        assert!(err.is_user_input());
        assert_eq!(closing_prompt(&err), "Press enter to try again.");

        let err = EnviError::from(
            Args::try_parse_from(["envi-view", "--help"]).expect_err("help exits early"),
        );
        assert!(err.to_string().contains("IMAGE"));
        assert_eq!(closing_prompt(&err), "Press enter to close.");
    }

    #[test]
    fn test_input_path_checks() {
        assert!(matches!(input_path(&[]), Err(EnviError::MissingInput)));
        assert!(matches!(
            input_path(&args(&["a.raw", "b.raw"])),
            Err(EnviError::TooManyInputs { count: 2 })
        ));
        assert!(matches!(
            input_path(&args(&["scene.hdr"])),
            Err(EnviError::WrongExtension { .. })
        ));
        assert!(matches!(
            input_path(&args(&["scene.RAW"])),
            Err(EnviError::WrongExtension { .. })
        ));
        assert_eq!(
            input_path(&args(&["dir/scene.raw"])).expect("valid"),
            PathBuf::from("dir/scene.raw")
        );
    }

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("1\n").expect("1"), MenuChoice::ExportBands);
        assert_eq!(MenuChoice::parse(" 2 ").expect("2"), MenuChoice::OpenViewer);
        assert!(matches!(
            MenuChoice::parse("3"),
            Err(EnviError::InvalidMenuChoice { .. })
        ));
        assert!(MenuChoice::parse("").is_err());
    }

    #[test]
    fn test_menu_reprompts_until_valid() {
        let mut input = Cursor::new("x\n\n12\n2\n");
        let mut output = Vec::new();
        let choice = prompt_menu(&mut input, &mut output).expect("eventually valid");
        assert_eq!(choice, MenuChoice::OpenViewer);

        let text = String::from_utf8(output).expect("utf8");
        assert_eq!(text.matches("Please select an option").count(), 4);
        assert_eq!(text.matches("Unexpected input").count(), 3);
    }

    #[test]
    fn test_menu_end_of_input() {
        let mut input = Cursor::new("nope\n");
        let mut output = Vec::new();
        let err = prompt_menu(&mut input, &mut output).unwrap_err();
        assert!(matches!(err, EnviError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_closing_prompt() {
        assert_eq!(closing_prompt(&EnviError::MissingInput), "Press enter to try again.");
        assert_eq!(
            closing_prompt(&EnviError::UnsupportedDepth {
                found: "4".to_string()
            }),
            "Press enter to close."
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_finish_without_pause() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        finish(&mut input, &mut output, "Done.", "Press enter to close.", false).expect("printed");
        assert_eq!(String::from_utf8(output).expect("utf8"), "Done.\n");

        let err = finish(&mut input, &mut ClosedPipe, "Done.", "unused", false).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_acknowledge_waits_for_line() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        acknowledge(&mut input, &mut output, "Done.", "Press enter to close.").expect("ack");
        assert_eq!(
            String::from_utf8(output).expect("utf8"),
            "Done.\n\nPress enter to close.\n"
        );
    }
}
