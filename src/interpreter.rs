use crate::submit::SubmitOutcome;

pub const WELCOME: [&str; 2] = [
    "Welcome to VinylCode - Create your song with code!",
    "Type \"help\" for available commands.",
];

const HELP: [&str; 9] = [
    "Available commands:",
    "  help - Show this list",
    "  create - Go to Muse to create your song",
    "  paste - Paste your song code",
    "  end - Finish pasting your song code",
    "  submit - Submit your song code to Google Sheets",
    "  preview - Preview your current song code",
    "  clear - Clear the terminal",
    "  vinyl - Show vinyl image",
];

const VINYL: [&str; 10] = [
    "Displaying vinyl image:",
    "  _____________",
    " /             \\",
    "/               \\",
    "|      ___      |",
    "|     /   \\     |",
    "|    |     |    |",
    "|     \\___/     |",
    "\\               /",
    " \\_____________/",
];

const NO_CODE_END: &str = "No song code entered. Use \"paste\" to input your code.";
const NO_CODE_SUBMIT: &str = "No song code entered. Use \"paste\" to input your code first.";
const NO_CODE_PREVIEW: &str = "No song code entered yet. Use \"paste\" to input your code.";

/// Every keyword the interpreter recognizes, in help order.
pub const KEYWORDS: [&str; 8] = [
    "help", "create", "paste", "end", "submit", "preview", "clear", "vinyl",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// The user's own input, echoed behind the prompt marker.
    Echo,
    Output,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub text: String,
    pub kind: LineKind,
}

impl TranscriptLine {
    fn new(text: impl Into<String>, kind: LineKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Create,
    Paste,
    End,
    Submit,
    Preview,
    Clear,
    Vinyl,
}

impl Command {
    /// Whole-line, case-insensitive keyword match.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "help" => Some(Self::Help),
            "create" => Some(Self::Create),
            "paste" => Some(Self::Paste),
            "end" => Some(Self::End),
            "submit" => Some(Self::Submit),
            "preview" => Some(Self::Preview),
            "clear" => Some(Self::Clear),
            "vinyl" => Some(Self::Vinyl),
            _ => None,
        }
    }
}

/// Where the interpreter stands with respect to pasted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Idle,
    /// `fresh` stays true until the first line of this paste session lands;
    /// that line replaces whatever code was held before.
    Capturing { fresh: bool },
    Ready,
}

/// Side effects the front end carries out on the interpreter's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenUrl(String),
    Submit(String),
}

pub struct Interpreter {
    transcript: Vec<TranscriptLine>,
    code: String,
    mode: CaptureMode,
    create_url: String,
    /// Bumped on every `clear`, so renderers can tell a reset from growth.
    generation: u64,
}

impl Interpreter {
    pub fn new(create_url: impl Into<String>) -> Self {
        let mut interpreter = Self {
            transcript: Vec::new(),
            code: String::new(),
            mode: CaptureMode::Idle,
            create_url: create_url.into(),
            generation: 0,
        };
        for line in WELCOME {
            interpreter.output(line);
        }
        interpreter
    }

    pub fn transcript(&self) -> &[TranscriptLine] {
        &self.transcript
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs one input line: echo, then dispatch.
    pub fn dispatch(&mut self, input: &str) -> Vec<Effect> {
        self.push(format!("> {}", input), LineKind::Echo);

        let command = Command::parse(input);
        // Keywords always run as commands; only other lines are song code.
        if let (CaptureMode::Capturing { fresh }, None) = (self.mode, command) {
            self.capture(input, fresh);
            return Vec::new();
        }

        let Some(command) = command else {
            if !input.trim().is_empty() {
                self.push(format!("Unknown command: {}", input), LineKind::Error);
            }
            return Vec::new();
        };

        tracing::debug!(?command, mode = ?self.mode, "dispatching command");

        match command {
            Command::Help => {
                for line in HELP {
                    self.output(line);
                }
                Vec::new()
            }
            Command::Create => {
                self.output("Redirecting to Muse...");
                self.output("Create your song there and copy the code.");
                self.output("When done, use the \"paste\" command to input your code.");
                vec![Effect::OpenUrl(self.create_url.clone())]
            }
            Command::Paste => {
                self.output("Please paste your song code below:");
                self.output("Type \"end\" on a new line when finished.");
                self.mode = CaptureMode::Capturing { fresh: true };
                Vec::new()
            }
            Command::End => {
                if self.code.is_empty() {
                    self.output(NO_CODE_END);
                    self.mode = CaptureMode::Idle;
                } else {
                    self.output("Song code received. Use \"submit\" to send it to Google Sheets.");
                    self.mode = CaptureMode::Ready;
                }
                Vec::new()
            }
            Command::Submit => {
                if self.code.is_empty() {
                    self.output(NO_CODE_SUBMIT);
                    return Vec::new();
                }
                self.output("Submitting your song code to Google Sheets...");
                vec![Effect::Submit(self.code.clone())]
            }
            Command::Preview => {
                if self.code.is_empty() {
                    self.output(NO_CODE_PREVIEW);
                } else {
                    self.output("Your current song code:");
                    let code = self.code.clone();
                    self.output(code);
                }
                Vec::new()
            }
            Command::Clear => {
                self.transcript.clear();
                self.code.clear();
                self.mode = CaptureMode::Idle;
                self.generation += 1;
                Vec::new()
            }
            Command::Vinyl => {
                for line in VINYL {
                    self.output(line);
                }
                Vec::new()
            }
        }
    }

    /// Appends the single line reporting how a submission went.
    pub fn record_submission(&mut self, outcome: &SubmitOutcome) {
        match outcome {
            Ok(_) => self.push(
                "Song code submitted successfully to Google Sheets!",
                LineKind::Success,
            ),
            Err(err) => self.push(
                format!("Error submitting song code ({}). Please try again.", err),
                LineKind::Error,
            ),
        }
    }

    /// Reports a front-end failure (e.g. the browser could not be opened).
    pub fn record_error(&mut self, text: impl Into<String>) {
        self.push(text, LineKind::Error);
    }

    fn capture(&mut self, input: &str, fresh: bool) {
        if input.trim().is_empty() {
            return;
        }
        if fresh {
            self.code.clear();
            self.mode = CaptureMode::Capturing { fresh: false };
        }
        self.code.push_str(input);
        self.code.push('\n');
    }

    fn output(&mut self, text: impl Into<String>) {
        self.push(text, LineKind::Output);
    }

    fn push(&mut self, text: impl Into<String>, kind: LineKind) {
        self.transcript.push(TranscriptLine::new(text, kind));
    }
}
