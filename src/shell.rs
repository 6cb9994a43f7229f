use crate::constraint::GenerationForm;
use crate::constraint::GenerationMode;
use crate::errors::AppError;
use crate::orchestrator::{FallbackDecision, FallbackOffer, FallbackPrompt, Orchestrator, SubmitOutcome};
use crate::panel::{DialName, ParameterPanel};
use crate::presentation::{ClipboardSink, Presentation, SystemClipboard};
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use tracing::{debug, error, warn};

pub const HELP: &str = "\
Commands:
  mode <word|sentence|paragraph>   choose what to generate
  count <n>                        how many units (bounded by the mode)
  enhanced <on|off>                toggle enhanced mode and its tuning dials
  dial <name> <0-10>               set a tuning dial (enhanced mode only)
  generate                         request text from the server
  copy                             copy the last output to the clipboard
  show                             show the current form and output
  status                           show the current status message
  help                             show this help
  quit                             leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mode(GenerationMode),
    Count(i64),
    Enhanced(bool),
    Dial(DialName, i64),
    Generate,
    Copy,
    Show,
    Status,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, AppError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = parts.split_first() else {
        return Ok(None);
    };

    let command = match (verb.to_lowercase().as_str(), args) {
        ("mode", [mode]) => Command::Mode(mode.parse()?),
        ("count", [count]) => Command::Count(parse_number(count)?),
        ("enhanced", [state]) => Command::Enhanced(parse_switch(state)?),
        ("dial", [name, value]) => Command::Dial(name.parse()?, parse_number(value)?),
        ("generate" | "gen", []) => Command::Generate,
        ("copy", []) => Command::Copy,
        ("show", []) => Command::Show,
        ("status", []) => Command::Status,
        ("help" | "?", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        (other, _) => {
            return Err(AppError::InvalidInput(format!(
                "Cannot understand '{}'",
                if args.is_empty() { other.to_string() } else { line.trim().to_string() }
            )))
        }
    };
    Ok(Some(command))
}

fn parse_number(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::InvalidInput(format!("'{}' is not a whole number", raw)))
}

fn parse_switch(raw: &str) -> Result<bool, AppError> {
    match raw.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(AppError::InvalidInput(format!("Expected on or off, got '{}'", raw))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The page: every control the user can touch, owned in one place.
pub struct Session<C: ClipboardSink = SystemClipboard> {
    pub form: GenerationForm,
    pub panel: ParameterPanel,
    pub presentation: Presentation<C>,
    pub orchestrator: Orchestrator,
}

impl<C: ClipboardSink> Session<C> {
    pub fn new(panel: ParameterPanel, orchestrator: Orchestrator, presentation: Presentation<C>) -> Self {
        Self {
            form: GenerationForm::default(),
            panel,
            presentation,
            orchestrator,
        }
    }

    /// Applies one command. Returns text to print, if any.
    pub fn handle<P>(&mut self, command: Command, prompt: &mut P) -> (Flow, Option<String>)
    where
        P: FallbackPrompt + ?Sized,
    {
        let reply = match command {
            Command::Mode(mode) => {
                self.form.on_mode_change(mode);
                Some(self.describe_form())
            }
            Command::Count(count) => {
                self.form.on_count_input(count);
                Some(self.describe_form())
            }
            Command::Enhanced(enabled) => {
                self.panel.on_toggle_change(enabled);
                Some(self.describe_panel())
            }
            Command::Dial(name, value) => {
                if !self.panel.tuning_section_visible() {
                    report_error(
                        &mut self.presentation,
                        AppError::InvalidInput("Tuning dials are hidden while enhanced mode is off".to_string()),
                        "setting dial",
                    );
                    None
                } else {
                    let value = self.panel.on_dial_input(name, value);
                    Some(format!("{}: {}", name, value))
                }
            }
            Command::Generate => {
                let outcome = self.orchestrator.submit(
                    &self.form,
                    &self.panel,
                    &mut self.presentation,
                    prompt,
                );
                debug!("Submit finished: {:?}", outcome);
                match outcome {
                    SubmitOutcome::Rendered => Some(self.presentation.text().to_string()),
                    SubmitOutcome::FallbackDeclined(message) => {
                        // the prompt may have outlived the first showing
                        self.presentation.show_status(message);
                        None
                    }
                    _ => None,
                }
            }
            Command::Copy => {
                if let Err(err) = self.presentation.copy() {
                    debug!("Copy failed: {}", err);
                }
                None
            }
            Command::Show => {
                let mut view = format!("{}\n{}", self.describe_form(), self.describe_panel());
                if self.presentation.copy_visible() {
                    let _ = write!(view, "\n\n{}", self.presentation.text());
                }
                Some(view)
            }
            Command::Status => Some(
                self.presentation
                    .status()
                    .visible()
                    .unwrap_or("(no status)")
                    .to_string(),
            ),
            Command::Help => Some(HELP.to_string()),
            Command::Quit => return (Flow::Quit, None),
        };
        (Flow::Continue, reply)
    }

    fn describe_form(&self) -> String {
        format!(
            "mode: {}  count: {} (max {})",
            self.form.mode(),
            self.form.count(),
            self.form.max()
        )
    }

    fn describe_panel(&self) -> String {
        if !self.panel.tuning_section_visible() {
            return "enhanced: off".to_string();
        }
        let dials: Vec<String> = self
            .panel
            .dials()
            .iter()
            .map(|dial| format!("{}={}", dial.name(), dial.label()))
            .collect();
        format!("enhanced: on  {}", dials.join(" "))
    }
}

/// Logs an error and surfaces it as the current status.
pub(crate) fn report_error<C: ClipboardSink>(
    presentation: &mut Presentation<C>,
    error: AppError,
    context: &str,
) {
    error!("{} while {}", error, context);
    presentation.show_status(error.status_line());
}

/// Yes/no question on the shell's own input and output.
pub struct LinePrompt<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> LinePrompt<'a, R, W> {
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, message: &str) -> io::Result<bool> {
        writeln!(self.output, "{}", message)?;
        write!(self.output, "Retry without enhanced mode? [y/N] ")?;
        self.output.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

impl<R: BufRead, W: Write> FallbackPrompt for LinePrompt<'_, R, W> {
    fn offer(&mut self, offer: FallbackOffer) -> FallbackDecision {
        match self.ask(offer.message()) {
            Ok(true) => offer.accept(),
            Ok(false) => offer.decline(),
            Err(err) => {
                warn!("Could not read fallback answer: {}", err);
                offer.decline()
            }
        }
    }
}

pub fn run_shell<C, R, W>(session: &mut Session<C>, mut input: R, mut output: W) -> io::Result<()>
where
    C: ClipboardSink,
    R: BufRead,
    W: Write,
{
    writeln!(output, "{}", HELP)?;
    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let revision = session.presentation.status().revision();
        let (flow, reply) = match parse_command(&line) {
            Ok(None) => (Flow::Continue, None),
            Ok(Some(command)) => {
                let mut prompt = LinePrompt::new(&mut input, &mut output);
                session.handle(command, &mut prompt)
            }
            Err(err) => {
                report_error(&mut session.presentation, err, "parsing command");
                (Flow::Continue, None)
            }
        };

        if let Some(reply) = reply {
            writeln!(output, "{}", reply)?;
        }
        if session.presentation.status().revision() != revision {
            if let Some(status) = session.presentation.status().visible() {
                writeln!(output, "[{}]", status)?;
            }
        }
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}
